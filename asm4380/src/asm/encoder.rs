use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::asm::ast::{Entry, Register, Slot};
use crate::asm::directive::parse_decimal;
use crate::asm::error::{AsmError, ErrorKind, Result};
use crate::asm::escape::unescape;
use crate::asm::symbol::{Fixup, SymbolTable};


#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(Register),
    Immediate(u32),
    CharLiteral(u8),
    LabelReference(String),
}

impl Operand {
    // Priority: #imm, 'c', register, then anything else is a label
    pub fn classify(token: &str) -> std::result::Result<Operand, ErrorKind> {
        if let Some(digits) = token.strip_prefix('#') {
            return parse_decimal(digits).map(Operand::Immediate);
        }
        if token.starts_with('\'') {
            return char_literal(token).map(Operand::CharLiteral);
        }
        match token.parse::<Register>() {
            Ok(r) => Ok(Operand::Register(r)),
            Err(_) => Ok(Operand::LabelReference(token.to_string())),
        }
    }
}

fn char_literal(token: &str) -> std::result::Result<u8, ErrorKind> {
    let bad = || ErrorKind::BadCharLiteral(token.to_string());

    let inner = token.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .ok_or_else(bad)?;

    let mut chars = inner.chars();
    let c = match (chars.next(), chars.next(), chars.next()) {
        (Some('\\'), Some(e), None) => unescape(e).ok_or(ErrorKind::BadEscape(e))?,
        (Some(c), None, None) if c != '\\' => c,
        _ => return Err(bad()),
    };

    u8::try_from(c as u32).map_err(|_| ErrorKind::ValueOutOfRange(c as u32))
}

// Second pass, fills in the reserved 8 byte slot of every entry
pub fn generate_object_code(
    bytes: &mut [u8],
    entries: &[Entry],
    symbols: &SymbolTable,
    fixups: &mut Vec<Fixup>,
) -> Result<()> {
    for entry in entries {
        let mut fields = [0u32; 4];

        for (idx, slot) in entry.mnemonic.shape().slots().iter().enumerate() {
            let token = entry.operands.get(idx).ok_or_else(|| {
                AsmError::new(entry.line, ErrorKind::MissingOperand { mnemonic: entry.mnemonic, index: idx })
            })?;
            fields[slot_idx(*slot)] = resolve_operand(token, entry, *slot, symbols, fixups)?;
        }

        trace!(addr = entry.addr, mnemonic = %entry.mnemonic, ?fields, "encode");
        write_inst(bytes, entry.addr as usize, entry.mnemonic.opcode(), fields);
    }
    Ok(())
}

fn slot_idx(slot: Slot) -> usize {
    match slot {
        Slot::Op1 => 0,
        Slot::Op2 => 1,
        Slot::Op3 => 2,
        Slot::Imm => 3,
    }
}

fn resolve_operand(
    token: &str,
    entry: &Entry,
    slot: Slot,
    symbols: &SymbolTable,
    fixups: &mut Vec<Fixup>,
) -> Result<u32> {
    let operand = Operand::classify(token).map_err(|k| AsmError::new(entry.line, k))?;

    Ok(match operand {
        Operand::Immediate(n) => n,
        Operand::CharLiteral(c) => c as u32,
        Operand::Register(r) => u8::from(r) as u32,
        Operand::LabelReference(label) => match symbols.get(&label) {
            Some(addr) => addr,
            None => {
                // Never defined, resolve_fixups reports it
                fixups.push(Fixup { addr: entry.addr, slot, label, line: entry.line });
                0
            },
        },
    })
}

// [opcode] [op1] [op2] [op3] [imm]
fn write_inst(bytes: &mut [u8], addr: usize, opcode: u8, fields: [u32; 4]) {
    bytes[addr] = opcode;
    bytes[addr + 1] = fields[0] as u8;
    bytes[addr + 2] = fields[1] as u8;
    bytes[addr + 3] = fields[2] as u8;
    LittleEndian::write_u32(&mut bytes[addr + 4..addr + 8], fields[3]);
}
