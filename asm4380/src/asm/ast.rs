use std::fmt;
use std::str::FromStr;


// Instruction set for the 4380
// Every instruction occupies one 8 byte slot:
//   [opcode] [op1] [op2] [op3] [imm (u32, little endian)]
// Unused slots are zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    JMP, JMR, BNZ, BGT, BLT, BRZ, MOV, MOVI,
    LDA, STR, LDR, STB, LDB, ISTR, ILDR, ISTB,
    ILDB, ADD, ADDI, SUB, SUBI, MUL, MULI, DIV,
    SDIV, DIVI, AND, OR, CMP, CMPI, TRP, ALCI,
    ALLC, IALLC, PSHR, PSHB, POPR, POPB, CALL, RET,
}

// Which raw operand feeds which slot of the instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    None,
    Imm,          // imm
    Reg,          // op1
    RegImm,       // op1, imm
    RegReg,       // op1, op2
    RegRegReg,    // op1, op2, op3
    RegRegImm,    // op1, op2, imm
}

// Where a resolved operand lands within the 8 byte slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Op1,
    Op2,
    Op3,
    Imm,
}

impl Slot {
    pub fn offset(self) -> u32 {
        match self {
            Slot::Op1 => 1,
            Slot::Op2 => 2,
            Slot::Op3 => 3,
            Slot::Imm => 4,
        }
    }
}

impl Shape {
    pub fn slots(self) -> &'static [Slot] {
        match self {
            Shape::None      => &[],
            Shape::Imm       => &[Slot::Imm],
            Shape::Reg       => &[Slot::Op1],
            Shape::RegImm    => &[Slot::Op1, Slot::Imm],
            Shape::RegReg    => &[Slot::Op1, Slot::Op2],
            Shape::RegRegReg => &[Slot::Op1, Slot::Op2, Slot::Op3],
            Shape::RegRegImm => &[Slot::Op1, Slot::Op2, Slot::Imm],
        }
    }
}

impl Mnemonic {
    pub fn opcode(self) -> u8 {
        match self {
            Mnemonic::JMP   => 0x01,
            Mnemonic::JMR   => 0x02,
            Mnemonic::BNZ   => 0x03,
            Mnemonic::BGT   => 0x04,
            Mnemonic::BLT   => 0x05,
            Mnemonic::BRZ   => 0x06,
            Mnemonic::MOV   => 0x07,
            Mnemonic::MOVI  => 0x08,
            Mnemonic::LDA   => 0x09,
            Mnemonic::STR   => 0x0A,
            Mnemonic::LDR   => 0x0B,
            Mnemonic::STB   => 0x0C,
            Mnemonic::LDB   => 0x0D,
            Mnemonic::ISTR  => 0x0E,
            Mnemonic::ILDR  => 0x0F,
            Mnemonic::ISTB  => 0x10,
            Mnemonic::ILDB  => 0x11,
            Mnemonic::ADD   => 0x12,
            Mnemonic::ADDI  => 0x13,
            Mnemonic::SUB   => 0x14,
            Mnemonic::SUBI  => 0x15,
            Mnemonic::MUL   => 0x16,
            Mnemonic::MULI  => 0x17,
            Mnemonic::DIV   => 0x18,
            Mnemonic::SDIV  => 0x19,
            Mnemonic::DIVI  => 0x1A,
            Mnemonic::AND   => 0x1B,
            Mnemonic::OR    => 0x1C,
            Mnemonic::CMP   => 0x1D,
            Mnemonic::CMPI  => 0x1E,
            Mnemonic::TRP   => 0x1F,
            Mnemonic::ALCI  => 0x20,
            Mnemonic::ALLC  => 0x21,
            Mnemonic::IALLC => 0x22,
            Mnemonic::PSHR  => 0x23,
            Mnemonic::PSHB  => 0x24,
            Mnemonic::POPR  => 0x25,
            Mnemonic::POPB  => 0x26,
            Mnemonic::CALL  => 0x27,
            Mnemonic::RET   => 0x28,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Mnemonic::RET => Shape::None,

            // Branch target, trap code, call target
            Mnemonic::JMP | Mnemonic::TRP | Mnemonic::CALL => Shape::Imm,

            Mnemonic::JMR | Mnemonic::PSHR | Mnemonic::PSHB
                | Mnemonic::POPR | Mnemonic::POPB => Shape::Reg,

            Mnemonic::BNZ | Mnemonic::BGT | Mnemonic::BLT | Mnemonic::BRZ
                | Mnemonic::MOVI | Mnemonic::LDA | Mnemonic::STR | Mnemonic::LDR
                | Mnemonic::STB | Mnemonic::LDB | Mnemonic::ADDI | Mnemonic::SUBI
                | Mnemonic::MULI | Mnemonic::DIVI | Mnemonic::ALCI
                | Mnemonic::ALLC => Shape::RegImm,

            Mnemonic::MOV | Mnemonic::ISTR | Mnemonic::ILDR | Mnemonic::ISTB
                | Mnemonic::ILDB | Mnemonic::IALLC => Shape::RegReg,

            Mnemonic::ADD | Mnemonic::SUB | Mnemonic::MUL | Mnemonic::DIV
                | Mnemonic::SDIV | Mnemonic::AND | Mnemonic::OR
                | Mnemonic::CMP => Shape::RegRegReg,

            Mnemonic::CMPI => Shape::RegRegImm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMnemonicError { _priv: () }

// Mnemonics are case insensitive
impl FromStr for Mnemonic {
    type Err = ParseMnemonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MNEMONIC.get(s.to_uppercase().as_str())
            .copied()
            .ok_or(ParseMnemonicError { _priv: () })
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&format!("{:?}", self))
    }
}


// R0-R15 are general purpose, the rest are the
// program counter and the stack/heap bookkeeping registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    R0, R1, R2, R3, R4, R5, R6, R7,
    R8, R9, R10, R11, R12, R13, R14, R15,
    PC, SL, SB, SP, FP, HP,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRegisterError { _priv: () }

// Registers are case insensitive
impl FromStr for Register {
    type Err = ParseRegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REGISTER.get(s.to_uppercase().as_str())
            .copied()
            .ok_or(ParseRegisterError { _priv: () })
    }
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg as u8
    }
}

// Codegen from phf_codegen
include!(concat!(env!("OUT_DIR"), "/tables.rs"));


// One instruction line, recorded during the scan and encoded afterward
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub mnemonic: Mnemonic,
    pub operands: Vec<String>,
    pub addr: u32,
    pub line: usize,
}

impl Entry {
    pub fn new(mnemonic: Mnemonic, addr: u32, line: usize) -> Entry {
        Entry {
            mnemonic,
            operands: Vec::new(),
            addr,
            line,
        }
    }
}
