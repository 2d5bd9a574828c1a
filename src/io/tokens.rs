//! Whitespace tokenizer over a buffered reader, with newline-based skipping.
//!
//! The connectivity format is whitespace-delimited, but a process jumps to
//! its own records by counting newlines, so the tokenizer keeps the current
//! line buffered and knows where it stands within it.

use crate::lattice_error::CxnErrorKind;
use std::io::BufRead;
use std::str::FromStr;

pub(crate) struct Tokens<R> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> Tokens<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }

    /// Byte span of the next token within `self.line`, `None` at end of stream.
    fn advance(&mut self) -> std::io::Result<Option<(usize, usize)>> {
        loop {
            let rest = &self.line[self.pos..];
            if let Some(off) = rest.find(|c: char| !c.is_whitespace()) {
                let start = self.pos + off;
                let end = self.line[start..]
                    .find(char::is_whitespace)
                    .map_or(self.line.len(), |e| start + e);
                self.pos = end;
                return Ok(Some((start, end)));
            }
            self.line.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }

    /// Next token parsed as `T`; `context` names what was being read.
    pub(crate) fn parse<T: FromStr>(
        &mut self,
        context: impl FnOnce() -> String,
    ) -> Result<T, CxnErrorKind> {
        match self.advance() {
            Err(error) => Err(CxnErrorKind::Io {
                context: context(),
                error,
            }),
            Ok(None) => Err(CxnErrorKind::UnexpectedEof { context: context() }),
            Ok(Some((start, end))) => {
                let token = &self.line[start..end];
                token.parse::<T>().map_err(|_| CxnErrorKind::MalformedToken {
                    context: context(),
                    token: token.to_string(),
                })
            }
        }
    }

    /// Next token as an owned string.
    pub(crate) fn word(&mut self, context: impl FnOnce() -> String) -> Result<String, CxnErrorKind> {
        self.parse::<String>(context)
    }

    /// Skip `n` newlines counted from the current position: the remainder of
    /// the current line is the first one.
    ///
    /// Returns `false` if the stream ends first.
    pub(crate) fn skip_lines(&mut self, n: usize) -> std::io::Result<bool> {
        if n == 0 {
            return Ok(true);
        }
        let had_newline = self.line.ends_with('\n');
        self.line.clear();
        self.pos = 0;
        if !had_newline {
            return Ok(false);
        }
        for _ in 1..n {
            if self.reader.skip_until(b'\n')? == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
