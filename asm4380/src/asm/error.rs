use thiserror::Error;

use crate::asm::ast::Mnemonic;

pub type Result<T> = std::result::Result<T, AsmError>;

// First fault aborts the run, there is no recovery
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AsmError {
    pub line: usize,
    pub kind: ErrorKind,
}

impl AsmError {
    pub fn new(line: usize, kind: ErrorKind) -> AsmError {
        AsmError { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unknown mnemonic {0:?}")]
    UnknownMnemonic(String),

    #[error("unknown directive {0:?}")]
    UnknownDirective(String),

    #[error("directive after the start of the code section")]
    DirectiveAfterCode,

    #[error("malformed directive payload, {0}")]
    BadDirectivePayload(&'static str),

    #[error("value {0} is out of range")]
    ValueOutOfRange(u32),

    #[error("string of {0} characters exceeds 255")]
    StringTooLong(usize),

    #[error("unknown escape sequence \\{0}")]
    BadEscape(char),

    #[error("malformed character literal {0:?}")]
    BadCharLiteral(String),

    #[error("malformed number {0:?}")]
    BadNumber(String),

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("{mnemonic} is missing operand {index}")]
    MissingOperand { mnemonic: Mnemonic, index: usize },

    #[error("unresolved label {0:?}")]
    UnresolvedLabel(String),
}
