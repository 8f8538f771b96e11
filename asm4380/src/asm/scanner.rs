use tracing::trace;

use crate::asm::ast::{Entry, Mnemonic};
use crate::asm::directive::{self, Directive};
use crate::asm::error::{AsmError, ErrorKind, Result};
use crate::asm::stream::{is_blank, is_line_end, CharStream};
use crate::asm::symbol::{Fixup, SymbolTable};


// The first 4 bytes of the image hold the entry address
pub const HEADER_LEN: usize = 4;

// Line grammar
//   line      = [label] (directive | instruction) [comment]
//   directive = '.' (INT | BYT | BTS | STR) payload
//   comment   = ';' to end of line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    LineStart,
    LabelStart,
    LabelComplete,
    DirectiveStart,
    Directive(Directive),
    NumberFound,
    DirectiveComplete,
    CodeStart,
    OperandGather,
    LineComplete,
    Done,
}

// Everything mutated while scanning, the location counter is
// always the length of the output buffer
pub struct Context<'a> {
    pub stream: CharStream<'a>,
    pub bytes: Vec<u8>,
    pub symbols: SymbolTable,
    pub entries: Vec<Entry>,
    pub fixups: Vec<Fixup>,
    pub data_possible: bool,
}

impl<'a> Context<'a> {
    pub fn new(input: &'a str) -> Context<'a> {
        Context {
            stream: CharStream::new(input),
            bytes: vec![0; HEADER_LEN],
            symbols: SymbolTable::new(),
            entries: Vec::new(),
            fixups: Vec::new(),
            data_possible: true,
        }
    }

    // emit keeps the image within u32 addresses
    pub fn location(&self) -> u32 {
        u32::try_from(self.bytes.len()).unwrap_or(u32::MAX)
    }

    pub fn emit(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?;
        trace!(at = self.location(), len = data.len(), "emit");
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub fn emit_zeros(&mut self, len: usize) -> Result<()> {
        self.reserve(len)?;
        trace!(at = self.location(), len, "emit");
        self.bytes.resize(self.bytes.len() + len, 0);
        Ok(())
    }

    fn reserve(&self, len: usize) -> Result<()> {
        if fits_image(self.bytes.len(), len) {
            Ok(())
        } else {
            let len = u32::try_from(len).unwrap_or(u32::MAX);
            Err(self.error(ErrorKind::ValueOutOfRange(len)))
        }
    }

    pub fn error(&self, kind: ErrorKind) -> AsmError {
        AsmError::new(self.stream.line(), kind)
    }

    fn is_alpha_numeric(&self) -> bool {
        self.stream.peek_char().is_some_and(|c| c.is_ascii_alphanumeric())
    }

    fn is_label_char(&self) -> bool {
        self.stream.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '$' || c == '_')
    }
}

// Every address, the end of the image included, must be a u32
fn fits_image(at: usize, len: usize) -> bool {
    at.checked_add(len).is_some_and(|end| end <= u32::MAX as usize)
}

pub fn step(state: State, ctx: &mut Context) -> Result<State> {
    let next = match state {
        State::LineStart         => line_start(ctx),
        State::LabelStart        => Ok(label_start(ctx)),
        State::LabelComplete     => label_complete(ctx),
        State::DirectiveStart    => directive_start(ctx),
        State::Directive(d)      => directive::dispatch(ctx, d),
        State::NumberFound       => directive::number_found(ctx),
        State::DirectiveComplete => directive_complete(ctx),
        State::CodeStart         => code_start(ctx),
        State::OperandGather     => operand_gather(ctx),
        State::LineComplete      => line_complete(ctx),
        State::Done              => Ok(State::Done),
    }?;

    trace!(line = ctx.stream.line(), ?state, ?next, "step");
    Ok(next)
}

// Run the state machine over the whole input
pub fn scan(ctx: &mut Context) -> Result<()> {
    let mut state = State::LineStart;
    while state != State::Done {
        state = step(state, ctx)?;
    }
    Ok(())
}

fn line_start(ctx: &mut Context) -> Result<State> {
    if ctx.stream.is_eof() {
        return Ok(State::Done);
    }

    // Left-justified alphanumeric is always a label
    if ctx.is_alpha_numeric() {
        return Ok(State::LabelStart);
    }

    ctx.stream.skip_whitespace();
    match ctx.stream.peek_char() {
        None | Some('\n') | Some(';') => Ok(State::LineComplete),
        Some('.') => enter_directive(ctx),
        Some(c) if c.is_ascii_alphanumeric() => Ok(enter_code(ctx)),
        Some(c) => Err(ctx.error(ErrorKind::UnexpectedChar(c))),
    }
}

fn enter_directive(ctx: &mut Context) -> Result<State> {
    if !ctx.data_possible {
        return Err(ctx.error(ErrorKind::DirectiveAfterCode));
    }
    // Eat the .
    ctx.stream.discard_char();
    Ok(State::DirectiveStart)
}

// Once code starts, no more data
fn enter_code(ctx: &mut Context) -> State {
    ctx.data_possible = false;
    State::CodeStart
}

fn label_start(ctx: &mut Context) -> State {
    let mut label = String::new();
    while ctx.is_label_char() {
        if let Some(c) = ctx.stream.read_char() {
            label.push(c);
        }
    }

    trace!(%label, addr = ctx.location(), "label");
    let addr = ctx.location();
    ctx.symbols.define(&label, addr);
    State::LabelComplete
}

fn label_complete(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();
    match ctx.stream.peek_char() {
        Some('.') => enter_directive(ctx),
        Some(c) if c.is_ascii_alphanumeric() => Ok(enter_code(ctx)),
        Some(c) => Err(ctx.error(ErrorKind::UnexpectedChar(c))),
        None => Err(ctx.error(ErrorKind::UnexpectedEof)),
    }
}

fn directive_start(ctx: &mut Context) -> Result<State> {
    let keyword = ctx.stream.peek_str(3);
    match keyword.parse::<Directive>() {
        Ok(d) => {
            for _ in 0..3 {
                ctx.stream.discard_char();
            }
            Ok(State::Directive(d))
        },
        Err(_) => Err(ctx.error(ErrorKind::UnknownDirective(keyword))),
    }
}

// Only blanks or a comment may trail a directive
fn directive_complete(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();
    match ctx.stream.peek_char() {
        None | Some('\n') | Some(';') => Ok(State::LineComplete),
        Some(c) => Err(ctx.error(ErrorKind::UnexpectedChar(c))),
    }
}

fn code_start(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();

    let mut op = String::new();
    while let Some(c) = ctx.stream.peek_char() {
        if is_blank(c) || is_line_end(Some(c)) {
            break;
        }
        op.push(c);
        ctx.stream.discard_char();
    }

    let mnemonic = op.parse::<Mnemonic>()
        .map_err(|_| ctx.error(ErrorKind::UnknownMnemonic(op.clone())))?;

    // Reserve the slot, it gets encoded once every label is known
    let addr = ctx.location();
    let line = ctx.stream.line();
    ctx.entries.push(Entry::new(mnemonic, addr, line));
    ctx.emit(&[0; 8])?;

    Ok(State::OperandGather)
}

fn operand_gather(ctx: &mut Context) -> Result<State> {
    let mut operands = Vec::new();

    loop {
        ctx.stream.skip_whitespace();
        let c = ctx.stream.peek_char();
        if is_line_end(c) {
            break;
        }

        let token = if c == Some('\'') {
            read_char_literal(ctx)?
        } else {
            let mut token = String::new();
            while let Some(c) = ctx.stream.peek_char() {
                if is_blank(c) || is_line_end(Some(c)) || c == ',' {
                    break;
                }
                token.push(c);
                ctx.stream.discard_char();
            }
            token
        };

        // Optional comma between operands
        ctx.stream.skip_whitespace();
        if ctx.stream.peek_char() == Some(',') {
            ctx.stream.discard_char();
        }

        if !token.is_empty() {
            operands.push(token);
        }
    }

    if let Some(entry) = ctx.entries.last_mut() {
        entry.operands = operands;
    }
    Ok(State::LineComplete)
}

// Raw text of a 'c' or '\c' operand, quotes included
fn read_char_literal(ctx: &mut Context) -> Result<String> {
    let line = ctx.stream.line();
    let mut literal = String::new();

    // Opening quote
    ctx.stream.discard_char();
    literal.push('\'');

    match ctx.stream.read_char() {
        None => return Err(AsmError::new(line, ErrorKind::UnexpectedEof)),
        Some('\\') => {
            literal.push('\\');
            match ctx.stream.read_char() {
                Some(e) => literal.push(e),
                None => return Err(AsmError::new(line, ErrorKind::UnexpectedEof)),
            }
        },
        Some(c) => literal.push(c),
    }

    match ctx.stream.read_char() {
        Some('\'') => {
            literal.push('\'');
            Ok(literal)
        },
        _ => Err(AsmError::new(line, ErrorKind::BadCharLiteral(literal))),
    }
}

fn line_complete(ctx: &mut Context) -> Result<State> {
    if ctx.stream.peek_char() == Some(';') {
        ctx.stream.skip_to_eol();
    }
    if ctx.stream.peek_char() == Some('\n') {
        ctx.stream.discard_char();
    }
    Ok(State::LineStart)
}
