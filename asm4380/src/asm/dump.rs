use std::fmt;

use crate::asm::scanner::{Context, State};

const WIDTH: usize = 16;

// Offset, hex and ascii columns, 16 bytes per row
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, chunk) in self.0.chunks(WIDTH).enumerate() {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            let ascii: String = chunk.iter()
                .map(|&b| if (32..127).contains(&b) { b as char } else { '.' })
                .collect();

            writeln!(f, "{:08X}: {:<width$}  {}", row * WIDTH, hex.join(" "), ascii, width = WIDTH * 3)?;
        }
        Ok(())
    }
}

// Snapshot of the assembler, printed when a run fails
pub struct Dump<'a, 'b> {
    pub state: State,
    pub ctx: &'a Context<'b>,
}

impl fmt::Display for Dump<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ctx = self.ctx;

        writeln!(f, "Dump of current session:")?;
        writeln!(f, "\tline             {}", ctx.stream.line())?;
        writeln!(f, "\tstate            {:?}", self.state)?;
        writeln!(f, "\tlocation_counter {}", ctx.location())?;
        writeln!(f, "\tdata_possible    {}", ctx.data_possible)?;

        writeln!(f, "\tsymbol_table     ({})", ctx.symbols.len())?;
        for (label, addr) in ctx.symbols.sorted() {
            writeln!(f, "\t\t{:<16} {}", label, addr)?;
        }

        writeln!(f, "\tentries          ({})", ctx.entries.len())?;
        for e in &ctx.entries {
            writeln!(f, "\t\t{:08X} {:<5} {}", e.addr, e.mnemonic, e.operands.join(", "))?;
        }

        writeln!(f, "\tfixups           ({})", ctx.fixups.len())?;
        for fix in &ctx.fixups {
            writeln!(f, "\t\t{:08X} {:?} {}", fix.field_addr(), fix.slot, fix.label)?;
        }

        writeln!(f)?;
        writeln!(f, "\tdata bytes:")?;
        write!(f, "{}", HexDump(&ctx.bytes))
    }
}
