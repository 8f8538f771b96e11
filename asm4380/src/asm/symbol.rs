use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace};

use crate::asm::ast::Slot;
use crate::asm::error::{AsmError, ErrorKind, Result};


// Label -> byte address, labels are case sensitive
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolTable {
    table: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable { table: HashMap::new() }
    }

    // Last definition wins
    pub fn define(&mut self, label: &str, addr: u32) {
        if let Some(old) = self.table.insert(label.to_string(), addr) {
            debug!(label, old, addr, "label redefined");
        }
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.table.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // Sorted by name so dumps are stable
    pub fn sorted(&self) -> Vec<(&str, u32)> {
        let mut symbols: Vec<(&str, u32)> = self.table.iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        symbols.sort();
        symbols
    }
}


// A label reference the symbol table could not answer at encode time
#[derive(Debug, Clone, PartialEq)]
pub struct Fixup {
    pub addr: u32,
    pub slot: Slot,
    pub label: String,
    pub line: usize,
}

impl Fixup {
    // Start of the instruction slot this fixup lands in
    pub fn field_addr(&self) -> usize {
        (self.addr + self.slot.offset()) as usize
    }
}

pub fn resolve_fixups(bytes: &mut [u8], fixups: &[Fixup], symbols: &SymbolTable) -> Result<()> {
    for fixup in fixups {
        let target = symbols.get(&fixup.label).ok_or_else(|| {
            AsmError::new(fixup.line, ErrorKind::UnresolvedLabel(fixup.label.clone()))
        })?;
        let at = fixup.field_addr();

        trace!(label = %fixup.label, at, target, "fixup");
        match fixup.slot {
            Slot::Imm => LittleEndian::write_u32(&mut bytes[at..at + 4], target),
            // Register slots only hold a byte
            _ => bytes[at] = target as u8,
        }
    }
    Ok(())
}
