use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const MNEMONICS: [&str; 40] = [
    "JMP", "JMR", "BNZ", "BGT", "BLT", "BRZ", "MOV", "MOVI",
    "LDA", "STR", "LDR", "STB", "LDB", "ISTR", "ILDR", "ISTB",
    "ILDB", "ADD", "ADDI", "SUB", "SUBI", "MUL", "MULI", "DIV",
    "SDIV", "DIVI", "AND", "OR", "CMP", "CMPI", "TRP", "ALCI",
    "ALLC", "IALLC", "PSHR", "PSHB", "POPR", "POPB", "CALL", "RET",
];

const REGISTERS: [&str; 22] = [
    "R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7",
    "R8", "R9", "R10", "R11", "R12", "R13", "R14", "R15",
    "PC", "SL", "SB", "SP", "FP", "HP",
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // phf_codegen for the mnemonic and register tables
    let path = Path::new(&env::var("OUT_DIR").unwrap()).join("tables.rs");
    let mut file = BufWriter::new(File::create(&path).unwrap());

    let values: Vec<String> = MNEMONICS.iter().map(|m| format!("Mnemonic::{}", m)).collect();
    let mut mnemonic = phf_codegen::Map::new();
    for (m, v) in MNEMONICS.iter().zip(values.iter()) {
        mnemonic.entry(*m, v.as_str());
    }
    writeln!(
        &mut file,
        "static MNEMONIC: phf::Map<&'static str, Mnemonic> = {};",
        mnemonic.build()
    ).unwrap();

    let values: Vec<String> = REGISTERS.iter().map(|r| format!("Register::{}", r)).collect();
    let mut register = phf_codegen::Map::new();
    for (r, v) in REGISTERS.iter().zip(values.iter()) {
        register.entry(*r, v.as_str());
    }
    writeln!(
        &mut file,
        "static REGISTER: phf::Map<&'static str, Register> = {};",
        register.build()
    ).unwrap();
}
