use std::fmt;
use std::str::FromStr;

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::asm::error::{AsmError, ErrorKind, Result};
use crate::asm::escape::unescape;
use crate::asm::scanner::{Context, State};
use crate::asm::stream::is_line_end;


const MAX_STR: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive { Int, Byt, Bts, Str }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectiveError { _priv: () }

impl FromStr for Directive {
    type Err = ParseDirectiveError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match &s.to_uppercase()[..] {
            "INT" => Ok(Directive::Int),
            "BYT" => Ok(Directive::Byt),
            "BTS" => Ok(Directive::Bts),
            "STR" => Ok(Directive::Str),
            _     => Err(ParseDirectiveError { _priv: () }),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Directive::Int => write!(f, ".INT"),
            Directive::Byt => write!(f, ".BYT"),
            Directive::Bts => write!(f, ".BTS"),
            Directive::Str => write!(f, ".STR"),
        }
    }
}

pub fn dispatch(ctx: &mut Context, directive: Directive) -> Result<State> {
    match directive {
        Directive::Int => int_directive(ctx),
        Directive::Byt => byt_directive(ctx),
        Directive::Bts => bts_directive(ctx),
        Directive::Str => str_directive(ctx),
    }
}

// Decimal digits only, no sign
pub fn parse_decimal(text: &str) -> std::result::Result<u32, ErrorKind> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ErrorKind::BadNumber(text.to_string()));
    }
    text.parse::<u32>().map_err(|_| ErrorKind::BadNumber(text.to_string()))
}

fn read_number(ctx: &mut Context) -> Result<u32> {
    let mut digits = String::new();
    while let Some(c) = ctx.stream.peek_char() {
        if c.is_ascii_digit() {
            digits.push(c);
            ctx.stream.discard_char();
        } else {
            break;
        }
    }
    parse_decimal(&digits).map_err(|k| ctx.error(k))
}

fn byte_value(ctx: &Context, value: u32) -> Result<u8> {
    u8::try_from(value).map_err(|_| ctx.error(ErrorKind::ValueOutOfRange(value)))
}

// Body of a quoted char, the opening quote is already consumed.
// Faults report the line the literal starts on.
fn read_quoted_char(ctx: &mut Context) -> Result<char> {
    let line = ctx.stream.line();

    let c = match ctx.stream.read_char() {
        None => return Err(AsmError::new(line, ErrorKind::UnexpectedEof)),
        Some('\\') => read_escape(ctx).map_err(|k| AsmError::new(line, k))?,
        Some(c) => c,
    };
    match ctx.stream.read_char() {
        Some('\'') => Ok(c),
        _ => Err(AsmError::new(line, ErrorKind::BadCharLiteral(format!("'{}", c)))),
    }
}

// Char after the backslash
fn read_escape(ctx: &mut Context) -> std::result::Result<char, ErrorKind> {
    match ctx.stream.read_char() {
        None => Err(ErrorKind::UnexpectedEof),
        Some(e) => unescape(e).ok_or(ErrorKind::BadEscape(e)),
    }
}

// .INT #value, 4 bytes little endian, no operand is zero
fn int_directive(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();

    match ctx.stream.peek_char() {
        Some('#') => Ok(State::NumberFound),
        c if is_line_end(c) => {
            ctx.emit(&[0; 4])?;
            Ok(State::DirectiveComplete)
        },
        _ => Err(ctx.error(ErrorKind::BadDirectivePayload(".INT expects #value"))),
    }
}

pub fn number_found(ctx: &mut Context) -> Result<State> {
    // Eat the #
    ctx.stream.discard_char();
    let n = read_number(ctx)?;

    let mut buf = [0; 4];
    LittleEndian::write_u32(&mut buf, n);
    ctx.emit(&buf)?;

    Ok(State::DirectiveComplete)
}

// .BYT [#]value | .BYT 'c' | .BYT
fn byt_directive(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();

    let hash = ctx.stream.peek_char() == Some('#');
    if hash {
        ctx.stream.discard_char();
    }

    let value = match ctx.stream.peek_char() {
        Some(c) if c.is_ascii_digit() => read_number(ctx)?,
        Some('\'') if !hash => {
            ctx.stream.discard_char();
            read_quoted_char(ctx)? as u32
        },
        c if is_line_end(c) && !hash => 0,
        // A bare # is a number with no digits
        _ if hash => return Err(ctx.error(ErrorKind::BadNumber(String::new()))),
        _ => return Err(ctx.error(ErrorKind::BadDirectivePayload(".BYT expects a number or a character"))),
    };

    let byte = byte_value(ctx, value)?;
    ctx.emit(&[byte])?;
    Ok(State::DirectiveComplete)
}

// .BTS #count, count zero bytes
fn bts_directive(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();

    if ctx.stream.peek_char() != Some('#') {
        return Err(ctx.error(ErrorKind::BadDirectivePayload(".BTS expects #count")));
    }
    ctx.stream.discard_char();

    let n = read_number(ctx)?;
    ctx.emit_zeros(n as usize)?;
    Ok(State::DirectiveComplete)
}

// .STR "text" | .STR #count
// [len] [chars...] [0] or [count] [0 * (count + 1)]
fn str_directive(ctx: &mut Context) -> Result<State> {
    ctx.stream.skip_whitespace();

    match ctx.stream.peek_char() {
        Some('"') => {
            ctx.stream.discard_char();
            str_string(ctx)?;
        },
        Some('#') => {
            ctx.stream.discard_char();
            str_numeric(ctx)?;
        },
        _ => return Err(ctx.error(ErrorKind::BadDirectivePayload(".STR expects \"text\" or #count"))),
    }
    Ok(State::DirectiveComplete)
}

fn str_string(ctx: &mut Context) -> Result<()> {
    let line = ctx.stream.line();

    let mut text = Vec::new();
    loop {
        match ctx.stream.read_char() {
            None | Some('\n') => {
                return Err(AsmError::new(line, ErrorKind::BadDirectivePayload("unterminated string")));
            },
            Some('"') => break,
            Some('\\') => text.push(read_escape(ctx).map_err(|k| AsmError::new(line, k))?),
            Some(c) => text.push(c),
        }
    }

    if text.len() > MAX_STR {
        return Err(ctx.error(ErrorKind::StringTooLong(text.len())));
    }

    let mut buf = Vec::with_capacity(text.len() + 2);
    buf.push(text.len() as u8);
    for c in text {
        buf.push(byte_value(ctx, c as u32)?);
    }
    buf.push(0);

    ctx.emit(&buf)
}

fn str_numeric(ctx: &mut Context) -> Result<()> {
    let n = read_number(ctx)?;
    let len = byte_value(ctx, n)?;

    let mut buf = vec![0; len as usize + 2];
    buf[0] = len;

    trace!(len, "reserved string");
    ctx.emit(&buf)
}
