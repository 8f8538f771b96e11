use std::str::Chars;

// Sequential reader over the program text, tracks the 1-based line number
pub struct CharStream<'a> {
    input_iter: Chars<'a>,
    line: usize,
}

impl<'a> CharStream<'a> {
    pub fn new(input: &'a str) -> CharStream<'a> {
        CharStream {
            input_iter: input.chars(),
            line: 1,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn read_char(&mut self) -> Option<char> {
        let c = self.input_iter.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    pub fn discard_char(&mut self) {
        let _ = self.read_char();
    }

    pub fn peek_char(&self) -> Option<char> {
        self.input_iter.clone().next()
    }

    // Up to n chars ahead, fewer at the end of input
    pub fn peek_str(&self, n: usize) -> String {
        self.input_iter.clone().take(n).collect()
    }

    pub fn is_eof(&self) -> bool {
        self.peek_char().is_none()
    }

    pub fn skip_whitespace(&mut self) {
        // Dont skip newlines
        while let Some(c) = self.peek_char() {
            if is_blank(c) {
                self.discard_char();
            } else {
                break;
            }
        }
    }

    pub fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                '\n' => break,
                _ => self.discard_char(),
            }
        }
    }
}

pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

// Anything that terminates the useful part of a line
pub fn is_line_end(c: Option<char>) -> bool {
    matches!(c, None | Some('\n') | Some(';'))
}
