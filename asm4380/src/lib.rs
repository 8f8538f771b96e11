pub mod asm;

pub use crate::asm::{assemble, Assembler, AsmError, ErrorKind};
