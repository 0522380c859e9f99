//! Byte cursor shared by the markup and style parsers.
//!
//! The cursor always points at the *current* byte: the next one a grammar
//! rule will look at. Reaching `src.len()` means end of input, at which point
//! [`Cursor::current`] yields `None`.

use memchr::{memchr_iter, memmem};

use crate::error::{ErrorKind, ParseError, Result};

pub struct Cursor<'s> {
    src: &'s [u8],
    pos: usize,
    line: usize,
    line_start: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(src: &'s [u8]) -> Self {
        Self { src, pos: 0, line: 1, line_start: 0 }
    }

    pub fn source(&self) -> &'s [u8] {
        self.src
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Byte under the cursor.
    pub fn current(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// Byte after the current one, without consuming anything.
    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }

    /// Moves to the next byte and returns it; `None` once input is exhausted.
    pub fn advance(&mut self) -> Option<u8> {
        if self.pos < self.src.len() {
            self.pos += 1;
        }
        self.current()
    }

    /// Like [`advance`](Self::advance) but running out of input is `kind`.
    pub fn advance_or(&mut self, kind: ErrorKind) -> Result<u8> {
        match self.advance() {
            Some(b) => Ok(b),
            None => Err(self.error(kind)),
        }
    }

    /// Advances and requires the new byte to be `expected`.
    pub fn expect(&mut self, expected: u8, kind: ErrorKind) -> Result<()> {
        match self.advance() {
            Some(b) if b == expected => Ok(()),
            _ => Err(self.error(kind)),
        }
    }

    /// Steps one byte back. Returns `false` at the start of input.
    pub fn backtrack(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    /// Jumps to an absolute offset, clamped to the end of input.
    pub fn set(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    /// Records that the byte under the cursor is a line break.
    pub fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.pos + 1;
    }

    /// Consumes spaces, tabs, carriage returns and newlines starting at the
    /// current byte. Returns the first visible byte, or `None` at end of input.
    pub fn skip_whitespace(&mut self) -> Option<u8> {
        while let Some(b) = self.current() {
            match b {
                b' ' | b'\t' | b'\r' => {}
                b'\n' => self.newline(),
                _ => return Some(b),
            }
            self.pos += 1;
        }
        None
    }

    /// Consumes a run of identifier bytes. Empty if the current byte cannot
    /// start an identifier.
    pub fn read_identifier(&mut self) -> &'s str {
        let start = self.pos;
        while matches!(self.current(), Some(b) if is_ident(b)) {
            self.pos += 1;
        }
        // identifier bytes are ASCII
        std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default()
    }

    /// Consumes a numeric literal: optional leading `-`, digits, at most one
    /// `.`. A `-` that is not followed by a digit or `.` is not a number and
    /// leaves the cursor untouched.
    pub fn read_number(&mut self) -> Option<&'s str> {
        let start = self.pos;
        if self.current() == Some(b'-') {
            if !matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.') {
                return None;
            }
            self.pos += 1;
        }
        let mut dot = false;
        while let Some(b) = self.current() {
            match b {
                b'0'..=b'9' => {}
                b'.' if !dot => dot = true,
                _ => break,
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        std::str::from_utf8(&self.src[start..self.pos]).ok()
    }

    /// Whether the upcoming bytes (starting at the current one) equal `lit`.
    pub fn check_literal(&self, lit: &[u8]) -> bool {
        self.src[self.pos..].starts_with(lit)
    }

    /// Moves past the next occurrence of `needle`, counting the lines it
    /// skips. Returns `false` and stays put when `needle` never occurs.
    pub fn skip_past(&mut self, needle: &[u8]) -> bool {
        let Some(offset) = memmem::find(&self.src[self.pos..], needle) else {
            return false;
        };
        let end = self.pos + offset + needle.len();
        for nl in memchr_iter(b'\n', &self.src[self.pos..end]) {
            self.line += 1;
            self.line_start = self.pos + nl + 1;
        }
        self.pos = end;
        true
    }

    /// 1-based `(line, column)` of the current byte.
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.pos.saturating_sub(self.line_start) + 1)
    }

    /// Wraps `kind` with the current location.
    pub fn error(&self, kind: ErrorKind) -> ParseError {
        let (line, col) = self.location();
        ParseError::new(kind, line, col)
    }
}

pub fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

pub fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.' || b == b'-'
}
