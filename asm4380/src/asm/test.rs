use super::*;
use crate::asm::ast::{Mnemonic, Slot};

fn body(input: &str) -> Vec<u8> {
    assemble(input).unwrap()[HEADER_LEN..].to_vec()
}

fn header(bytes: &[u8]) -> u32 {
    LittleEndian::read_u32(&bytes[..HEADER_LEN])
}

fn imm(bytes: &[u8], addr: usize) -> u32 {
    LittleEndian::read_u32(&bytes[addr + 4..addr + 8])
}

fn err(input: &str) -> AsmError {
    assemble(input).err().unwrap()
}


mod directive_programs {
    use super::*;

    #[test]
    fn test_byt_decimal() {
        for n in [0u32, 1, 42, 127, 128, 255] {
            assert_eq!(vec![n as u8], body(&format!(".BYT #{}\n", n)));
        }
        assert_eq!(vec![0x2A], body(".BYT #42\n"));
    }

    #[test]
    fn test_byt_bare_decimal() {
        assert_eq!(vec![7], body(".BYT 7"));
    }

    #[test]
    fn test_byt_char() {
        assert_eq!(vec![0x0A], body(".BYT '\\n'"));
        assert_eq!(vec![b'A'], body(".BYT 'A'\n"));
        assert_eq!(vec![b' '], body(".BYT ' ' ; space\n"));
        assert_eq!(vec![0x08], body(".BYT '\\b'"));
        assert_eq!(vec![b'"'], body(".BYT '\\\"'"));
    }

    #[test]
    fn test_byt_empty() {
        assert_eq!(vec![0], body(".BYT\n"));
        assert_eq!(vec![0], body(".BYT ; nothing\n"));
        assert_eq!(vec![0], body(".BYT"));
    }

    #[test]
    fn test_byt_errors() {
        assert_eq!(AsmError::new(1, ErrorKind::ValueOutOfRange(256)), err(".BYT #256\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadEscape('z')), err(".BYT '\\z'\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadCharLiteral("'a".to_string())), err(".BYT 'ab'\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadNumber(String::new())), err(".BYT #x\n"));
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload(".BYT expects a number or a character")),
            err(".BYT \"a\"\n")
        );
    }

    #[test]
    fn test_int() {
        assert_eq!(vec![0x04, 0x03, 0x02, 0x01], body(".INT #16909060\n"));
        assert_eq!(vec![0, 0, 0, 0], body(".INT\n"));
        assert_eq!(vec![0, 0, 0, 0], body(".int ; lowercase keyword\n"));
        assert_eq!(vec![0xFF, 0xFF, 0xFF, 0xFF], body(".INT #4294967295"));
    }

    #[test]
    fn test_int_no_sign() {
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload(".INT expects #value")),
            err(".INT -5\n")
        );
        assert_eq!(AsmError::new(1, ErrorKind::BadNumber(String::new())), err(".INT #-5\n"));
    }

    #[test]
    fn test_bts() {
        assert_eq!(vec![0, 0, 0], body("\t.BTS #3\t\n"));

        let bytes = assemble("LABELHERE .BTS #3\t\n").unwrap();
        assert_eq!(4 + 3, bytes.len());

        let mut asm = Assembler::new("labelhere .BTS #13");
        asm.run().unwrap();
        assert_eq!(4 + 13, asm.bytes().len());
        assert_eq!(vec![0; 13], asm.bytes()[4..].to_vec());
        assert_eq!(Some(4), asm.symbol("labelhere"));
    }

    #[test]
    fn test_bts_errors() {
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload(".BTS expects #count")),
            err(".BTS 'a'\n")
        );
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload(".BTS expects #count")),
            err(".BTS\n")
        );
    }

    #[test]
    fn test_str_string() {
        let s = "beavis and butthead";
        let mut expected = vec![s.len() as u8];
        expected.extend(s.bytes());
        expected.push(0);

        assert_eq!(expected, body("\t.STR \"beavis and butthead\""));

        let mut asm = Assembler::new("beavis\t.STR\t\"beavis and butthead\"");
        asm.run().unwrap();
        assert_eq!(4 + 1 + s.len() + 1, asm.bytes().len());
        assert_eq!(expected, asm.bytes()[4..].to_vec());
        assert_eq!(Some(4), asm.symbol("beavis"));
    }

    #[test]
    fn test_str_escapes() {
        assert_eq!(vec![4, b'a', b'\t', b'"', b'\\', 0], body(".STR \"a\\t\\\"\\\\\"\n"));
        assert_eq!(vec![0, 0], body(".STR \"\"\n"));
    }

    #[test]
    fn test_str_max_len() {
        let ok = format!(".STR \"{}\"\n", "x".repeat(255));
        let bytes = body(&ok);
        assert_eq!(257, bytes.len());
        assert_eq!(255, bytes[0]);
        assert_eq!(0, bytes[256]);

        let long = format!(".STR \"{}\"\n", "x".repeat(256));
        assert_eq!(AsmError::new(1, ErrorKind::StringTooLong(256)), err(&long));
    }

    #[test]
    fn test_str_numeric() {
        let bytes = assemble("\t.STR\t#4\n").unwrap();
        assert_eq!(vec![0, 0, 0, 0, 4, 0, 0, 0, 0, 0], bytes);

        let mut asm = Assembler::new("beavis\t.STR\t#4");
        asm.run().unwrap();
        assert_eq!(10, asm.bytes().len());
        assert_eq!(Some(4), asm.symbol("beavis"));
    }

    #[test]
    fn test_str_errors() {
        assert_eq!(AsmError::new(1, ErrorKind::ValueOutOfRange(256)), err("\t.STR\t#256\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadEscape('q')), err(".STR \"a\\q\"\n"));
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload("unterminated string")),
            err(".STR \"open\n")
        );
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload("unterminated string")),
            err(".STR \"open")
        );
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload(".STR expects \"text\" or #count")),
            err(".STR 5\n")
        );
    }

    #[test]
    fn test_fault_line_before_newline() {
        assert_eq!(
            AsmError::new(1, ErrorKind::BadDirectivePayload("unterminated string")),
            err(".STR \"open\n\tRET\n")
        );
        assert_eq!(
            AsmError::new(2, ErrorKind::BadDirectivePayload("unterminated string")),
            err("\n.STR \"open\n.INT #1\n")
        );
        assert_eq!(AsmError::new(1, ErrorKind::BadCharLiteral("'a".to_string())), err(".BYT 'a\n.BYT #1\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadEscape('\n')), err(".BYT '\\\n.BYT #1\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadEscape('\n')), err(".STR \"a\\\nb\"\n"));
    }

    #[test]
    fn test_bts_past_address_space() {
        assert_eq!(
            AsmError::new(1, ErrorKind::ValueOutOfRange(u32::MAX)),
            err(".BTS #4294967295\nx .INT #1\n")
        );
        assert_eq!(
            AsmError::new(2, ErrorKind::ValueOutOfRange(4294967292)),
            err(".BYT #1\n.BTS #4294967292\n")
        );
    }

    #[test]
    fn test_data_only_header_is_zero() {
        let bytes = assemble("a .INT #1\nb .BYT #2\n").unwrap();
        assert_eq!(0, header(&bytes));
        assert_eq!(vec![0, 0, 0, 0, 1, 0, 0, 0, 2], bytes);
    }
}


mod instruction_programs {
    use super::*;

    #[test]
    fn test_and_shape_based() {
        let expected = vec![0x1B, 0x00, 0x01, 0x02, 0, 0, 0, 0];
        assert_eq!(expected, body("\tAND R0 R1 R2"));
        assert_eq!(expected, body("\tAND #0 #1 R2"));
        assert_eq!(expected, body("ANDLABEL AND #0 #1 R2"));
    }

    #[test]
    fn test_or_shape_based() {
        let expected = vec![0x1C, 0x00, 0x01, 0x02, 0, 0, 0, 0];
        assert_eq!(expected, body("\tOR R0 R1 R2"));
        assert_eq!(expected, body("\tOR #0 #1 R2"));
        assert_eq!(expected, body("ORLABEL OR #0 #1 R2"));
    }

    #[test]
    fn test_stack_ops() {
        assert_eq!(vec![0x23, 0, 0, 0, 0, 0, 0, 0], body("\tpshr r0"));
        assert_eq!(vec![0x24, 0, 0, 0, 0, 0, 0, 0], body("\tpshb r0"));
        assert_eq!(vec![0x25, 0, 0, 0, 0, 0, 0, 0], body("\tpopr r0"));
        assert_eq!(vec![0x26, 0, 0, 0, 0, 0, 0, 0], body("\tpopb r0"));
        assert_eq!(vec![0x26, 19, 0, 0, 0, 0, 0, 0], body("\tPOPB SP"));
    }

    #[test]
    fn test_ret() {
        assert_eq!(vec![0x28, 0, 0, 0, 0, 0, 0, 0], body("\tret "));
        assert_eq!(vec![0x28, 0, 0, 0, 0, 0, 0, 0], body("\tRET;done"));
    }

    #[test]
    fn test_call_forward_reference() {
        let mut asm = Assembler::new("start CALL func\n\tTRP #0\nfunc TRP #0");
        asm.run().unwrap();
        let bytes = asm.bytes();

        assert_eq!(0x27, bytes[4]);
        assert_eq!(0, bytes[5]);
        assert_eq!(20, imm(bytes, 4));
        assert_eq!(Some(20), asm.symbol("func"));
        assert_eq!(Some(4), asm.symbol("start"));
        // Labels are all known once the scan is done
        assert!(asm.fixups().is_empty());

        // lowercase mnemonics
        let bytes = assemble("start call func\n \ttrp #0\nfunc trp #0").unwrap();
        assert_eq!(20, imm(&bytes, 4));
    }

    #[test]
    fn test_undefined_label_becomes_fixup() {
        let mut asm = Assembler::new("main\tJMP missing\n\tRET\n");
        assert_eq!(
            Err(AsmError::new(1, ErrorKind::UnresolvedLabel("missing".to_string()))),
            asm.run()
        );

        let fixups = asm.fixups();
        assert_eq!(1, fixups.len());
        assert_eq!(4, fixups[0].addr);
        assert_eq!(Slot::Imm, fixups[0].slot);
        assert_eq!(8, fixups[0].field_addr());
        assert_eq!(1, fixups[0].line);
    }

    #[test]
    fn test_alci() {
        assert_eq!(vec![0x20, 0, 0, 0, 255, 0, 0, 0], body("\talci r0, #255"));
    }

    #[test]
    fn test_allc_backward_label() {
        let mut asm = Assembler::new("n .INT #64\n\tallc r2, n");
        asm.run().unwrap();
        let bytes = asm.bytes();

        assert_eq!(vec![0x21, 2, 0, 0, 4, 0, 0, 0], bytes[8..16].to_vec());
        assert!(asm.fixups().is_empty());
        assert_eq!(8, header(bytes));
    }

    #[test]
    fn test_every_mnemonic_reserves_eight_bytes() {
        let src = "\
            \tJMP #1\n\tJMR R1\n\tBNZ R1 #1\n\tBGT R1 #1\n\tBLT R1 #1\n\tBRZ R1 #1\n\
            \tMOV R1 R2\n\tMOVI R1 #1\n\tLDA R1 #1\n\tSTR R1 #1\n\tLDR R1 #1\n\tSTB R1 #1\n\
            \tLDB R1 #1\n\tISTR R1 R2\n\tILDR R1 R2\n\tISTB R1 R2\n\tILDB R1 R2\n\
            \tADD R1 R2 R3\n\tADDI R1 #1\n\tSUB R1 R2 R3\n\tSUBI R1 #1\n\
            \tMUL R1 R2 R3\n\tMULI R1 #1\n\tDIV R1 R2 R3\n\tSDIV R1 R2 R3\n\
            \tDIVI R1 #1\n\tAND R1 R2 R3\n\tOR R1 R2 R3\n\tCMP R1 R2 R3\n\
            \tCMPI R1 R2 #1\n\tTRP #1\n\tALCI R1 #1\n\tALLC R1 #1\n\tIALLC R1 R2\n\
            \tPSHR R1\n\tPSHB R1\n\tPOPR R1\n\tPOPB R1\n\tCALL #1\n\tRET\n";
        let bytes = assemble(src).unwrap();
        assert_eq!(4 + 40 * 8, bytes.len());
        for i in 0..40 {
            assert_eq!(i as u8 + 1, bytes[4 + i * 8], "slot {}", i);
        }
    }

    #[test]
    fn test_reg_imm_layout() {
        assert_eq!(vec![0x1E, 1, 2, 0, 7, 0, 0, 0], body("\tCMPI R1, R2, #7"));
        assert_eq!(vec![0x13, 1, 0, 0, 7, 0, 0, 0], body("\tADDI R1, #7"));
        // BRZ takes rs, addr
        assert_eq!(vec![0x06, 3, 0, 0, 4, 0, 0, 0], body("top BRZ R3 top"));
        // MOVI takes a char literal immediate
        assert_eq!(vec![0x08, 0, 0, 0, b'\n', 0, 0, 0], body("\tMOVI R0 '\\n'"));
    }

    #[test]
    fn test_entry_header() {
        let bytes = assemble("d .BTS #5\nmain\tMOVI R0 #1\n\tTRP #0\n").unwrap();
        assert_eq!(9, header(&bytes));
    }

    #[test]
    fn test_forward_label_in_register_slot() {
        let bytes = assemble("\tMOV R1 later\n\tRET\nlater RET\n").unwrap();
        assert_eq!(vec![0x07, 1, 20, 0, 0, 0, 0, 0], bytes[4..12].to_vec());
    }

    #[test]
    fn test_duplicate_label_last_wins() {
        let bytes = assemble("x .BYT #1\nx .BYT #2\n\tJMP x\n").unwrap();
        assert_eq!(5, imm(&bytes, 6));
    }

    #[test]
    fn test_register_beats_label() {
        let bytes = assemble("R1 .INT #9\n\tMOVI R2 R1\n").unwrap();
        assert_eq!(1, imm(&bytes, 8));
    }

    #[test]
    fn test_deterministic() {
        let src = "msg .STR \"hi\"\nn .INT #3\nmain LDR R1 n\n\tLDA R2 msg\n\tTRP #0\n";
        assert_eq!(assemble(src).unwrap(), assemble(src).unwrap());
    }

    #[test]
    fn test_instruction_errors() {
        assert_eq!(AsmError::new(2, ErrorKind::UnknownMnemonic("FOO".to_string())), err("\tRET\n\tFOO R1\n"));
        assert_eq!(
            AsmError::new(1, ErrorKind::MissingOperand { mnemonic: Mnemonic::ADD, index: 2 }),
            err("\tADD R1 R2\n")
        );
        assert_eq!(AsmError::new(3, ErrorKind::UnresolvedLabel("nowhere".to_string())), err("\tRET\n\n\tJMP nowhere\n"));
        assert_eq!(AsmError::new(1, ErrorKind::UnresolvedLabel("Func".to_string())), err("\tCALL Func\nfunc RET\n"));
        assert_eq!(AsmError::new(1, ErrorKind::BadNumber("-3".to_string())), err("\tMOVI R1 #-3\n"));
        assert_eq!(AsmError::new(2, ErrorKind::DirectiveAfterCode), err("\tRET\n\t.INT #1\n"));
    }

    #[test]
    fn test_dump_after_error() {
        let mut asm = Assembler::new("a .INT #1\n\tRET\n\t.BYT #1\n");
        assert!(asm.run().is_err());
        let out = asm.dump().to_string();
        assert!(out.contains("state            LineStart"));
        assert!(out.contains("data_possible    false"));
    }
}
