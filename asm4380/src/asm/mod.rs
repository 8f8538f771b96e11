pub mod ast;
pub mod directive;
pub mod dump;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod scanner;
pub mod stream;
pub mod symbol;

#[cfg(test)]
mod test;

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

pub use crate::asm::error::{AsmError, ErrorKind, Result};

use crate::asm::ast::Entry;
use crate::asm::dump::Dump;
use crate::asm::scanner::{Context, State, HEADER_LEN};
use crate::asm::symbol::Fixup;


// Passes:
// 1. Scan the source line by line, emitting data directives immediately and
//    reserving 8 bytes per instruction, labels get their address as they are seen
// 2. Write the entry address into the header
// 3. Encode every reserved instruction, unknown labels become fixups
// 4. Patch the fixups against the now complete symbol table
pub struct Assembler<'a> {
    ctx: Context<'a>,
    state: State,
}

impl<'a> Assembler<'a> {
    pub fn new(input: &'a str) -> Assembler<'a> {
        Assembler {
            ctx: Context::new(input),
            state: State::LineStart,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        while self.state != State::Done {
            self.state = scanner::step(self.state, &mut self.ctx)?;
        }
        debug!(
            symbols = self.ctx.symbols.len(),
            entries = self.ctx.entries.len(),
            bytes = self.ctx.bytes.len(),
            "scan complete"
        );

        let entry_addr = self.ctx.entries.first().map_or(0, |e| e.addr);
        LittleEndian::write_u32(&mut self.ctx.bytes[..HEADER_LEN], entry_addr);

        encoder::generate_object_code(
            &mut self.ctx.bytes,
            &self.ctx.entries,
            &self.ctx.symbols,
            &mut self.ctx.fixups,
        )?;
        debug!(fixups = self.ctx.fixups.len(), "encode complete");

        symbol::resolve_fixups(&mut self.ctx.bytes, &self.ctx.fixups, &self.ctx.symbols)?;
        debug!(entry_addr, "fixups resolved");

        #[cfg(feature = "debug")]
        debug!("\n{}", self.dump());

        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.ctx.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.ctx.bytes
    }

    pub fn symbol(&self, label: &str) -> Option<u32> {
        self.ctx.symbols.get(label)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.ctx.entries
    }

    pub fn fixups(&self) -> &[Fixup] {
        &self.ctx.fixups
    }

    pub fn dump(&self) -> Dump<'_, 'a> {
        Dump { state: self.state, ctx: &self.ctx }
    }
}

// Assemble a whole program into its binary image
pub fn assemble(input: &str) -> Result<Vec<u8>> {
    let mut asm = Assembler::new(input);
    asm.run()?;
    Ok(asm.into_bytes())
}
