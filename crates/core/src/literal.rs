//! Parser for the human-readable key literal.
//!
//! ```text
//! literal    := KEY "(" [ NAMESPACE "(" string ")" "," ] level ( "," level )* ")"
//! level      := kind "," identifier          (every level but the last)
//!             | kind [ "," identifier ]      (last level; omitted = incomplete)
//! kind       := bare-token | "`" ... "`"     (`` inside back-quotes is one `)
//! identifier := non-zero decimal | "'" ... "'" | '"' ... '"'
//! ```
//!
//! Keywords are case-insensitive. Whitespace between tokens is ignored.

use crate::error::{Error, Result};
use crate::key::{Identifier, Key};

struct Level {
    kind: String,
    identifier: Option<Identifier>,
}

pub(crate) struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        LiteralParser {
            src: src.trim(),
            pos: 0,
        }
    }

    pub(crate) fn parse(mut self, default_namespace: &str) -> Result<Key> {
        self.keyword("KEY")?;
        self.expect('(')?;

        let mut namespace = default_namespace.to_string();
        if self.at_namespace() {
            self.keyword("NAMESPACE")?;
            self.expect('(')?;
            namespace = self.quoted_string()?;
            self.expect(')')?;
            self.expect(',')?;
        }

        let mut levels = Vec::new();
        loop {
            let kind = self.kind()?;
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    levels.push(Level {
                        kind,
                        identifier: None,
                    });
                    break;
                }
                Some(',') => self.bump(),
                _ => return Err(self.error("expected ',' or ')' after kind")),
            }

            let identifier = self.identifier()?;
            levels.push(Level {
                kind,
                identifier: Some(identifier),
            });

            self.skip_ws();
            match self.peek() {
                Some(',') => self.bump(),
                Some(')') => {
                    self.bump();
                    break;
                }
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }

        self.skip_ws();
        if self.pos != self.src.len() {
            return Err(self.error("unexpected trailing characters"));
        }

        let levels = levels.into_iter().map(|level| (level.kind, level.identifier));
        Key::from_path(namespace, levels).map_err(|e| match e {
            Error::InvalidKey(reason) => Error::key_syntax(self.src, reason),
            other => other,
        })
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn kind(&mut self) -> Result<String> {
        self.skip_ws();
        if self.peek() == Some('`') {
            self.bump();
            let mut kind = String::new();
            loop {
                match self.next_char() {
                    Some('`') if self.peek() == Some('`') => {
                        self.bump();
                        kind.push('`');
                    }
                    Some('`') => break,
                    Some(c) => kind.push(c),
                    None => return Err(self.error("unterminated back-quoted kind")),
                }
            }
            if kind.is_empty() {
                return Err(self.error("empty kind"));
            }
            return Ok(kind);
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | '(' | ')' | '"' | '\'' | '`') {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("empty kind"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn identifier(&mut self) -> Result<Identifier> {
        self.skip_ws();
        match self.peek() {
            Some('"') | Some('\'') => {
                let name = self.quoted_string()?;
                if name.is_empty() {
                    return Err(self.error("empty name"));
                }
                Ok(Identifier::Name(name))
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.bump();
                }
                let digits = &self.src[start..self.pos];
                let id: i64 = digits
                    .parse()
                    .map_err(|_| self.error("id out of range"))?;
                if id == 0 {
                    return Err(self.error("id must not be 0"));
                }
                Ok(Identifier::Id(id))
            }
            _ => Err(self.error("expected id or quoted name")),
        }
    }

    fn quoted_string(&mut self) -> Result<String> {
        self.skip_ws();
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted string")),
        };
        self.bump();

        let mut out = String::new();
        loop {
            match self.next_char() {
                Some('\\') => match self.next_char() {
                    Some(c) => out.push(c),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated quoted string")),
            }
        }
    }

    fn keyword(&mut self, word: &str) -> Result<()> {
        self.skip_ws();
        let end = self.pos + word.len();
        match self.src.get(self.pos..end) {
            Some(found) if found.eq_ignore_ascii_case(word) => {
                self.pos = end;
                Ok(())
            }
            _ => Err(self.error(format!("expected {}", word))),
        }
    }

    /// `NAMESPACE` followed by `(`; a bare kind named NAMESPACE is followed by `,`.
    fn at_namespace(&self) -> bool {
        let rest = self.src[self.pos..].trim_start();
        let word = "NAMESPACE";
        match rest.get(..word.len()) {
            Some(found) if found.eq_ignore_ascii_case(word) => {
                rest[word.len()..].trim_start().starts_with('(')
            }
            _ => false,
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", c)))
        }
    }

    // ------------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------------

    fn skip_ws(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::key_syntax(self.src, format!("{} at offset {}", reason.into(), self.pos))
    }
}
