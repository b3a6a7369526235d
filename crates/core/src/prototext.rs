//! Protobuf text form of wire keys, percent-encoded into a single token.
//!
//! The emitted text is canonical single-line text format:
//!
//! ```text
//! partition_id { namespace_id: "ns" } path { kind: "Org" id: 1 } path { kind: "Person" name: "alice" }
//! ```
//!
//! The reader accepts the usual text-format latitude: optional `:` before a
//! message body, `,`/`;` field separators, single- or double-quoted strings
//! and arbitrary whitespace.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};
use crate::wire;
use crate::wire::key::path_element::IdType;

/// Everything except RFC 3986 unreserved characters is escaped.
const TOKEN_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn encode_key(key: &wire::Key) -> String {
    utf8_percent_encode(&key_to_text(key), TOKEN_ESCAPE).to_string()
}

pub(crate) fn decode_key(token: &str) -> Result<wire::Key> {
    let text = percent_decode_str(token)
        .decode_utf8()
        .map_err(|e| Error::InvalidEncoding(format!("wire-proto token is not UTF-8: {}", e)))?;
    text_to_key(&text)
}

pub(crate) fn key_to_text(key: &wire::Key) -> String {
    let mut fields = Vec::new();
    if let Some(partition) = &key.partition_id {
        let mut inner = Vec::new();
        for (name, value) in [
            ("project_id", &partition.project_id),
            ("database_id", &partition.database_id),
            ("namespace_id", &partition.namespace_id),
        ] {
            if !value.is_empty() {
                inner.push(format!("{}: {}", name, quote(value)));
            }
        }
        fields.push(format!("partition_id {{ {} }}", inner.join(" ")));
    }
    for element in &key.path {
        let mut inner = vec![format!("kind: {}", quote(&element.kind))];
        match &element.id_type {
            Some(IdType::Id(id)) => inner.push(format!("id: {}", id)),
            Some(IdType::Name(name)) => inner.push(format!("name: {}", quote(name))),
            None => {}
        }
        fields.push(format!("path {{ {} }}", inner.join(" ")));
    }
    fields.join(" ")
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn text_to_key(text: &str) -> Result<wire::Key> {
    let mut reader = TextReader::new(text);
    let mut key = wire::Key::default();

    while let Some(field) = reader.field_name()? {
        match field.as_str() {
            "partition_id" => {
                reader.open_message()?;
                let mut partition = wire::PartitionId::default();
                while let Some(inner) = reader.field_name_in_message()? {
                    reader.colon()?;
                    let value = reader.string()?;
                    match inner.as_str() {
                        "project_id" => partition.project_id = value,
                        "database_id" => partition.database_id = value,
                        "namespace_id" => partition.namespace_id = value,
                        other => return Err(reader.error(&format!("unknown field {:?}", other))),
                    }
                }
                key.partition_id = Some(partition);
            }
            "path" => {
                reader.open_message()?;
                let mut element = wire::key::PathElement::default();
                while let Some(inner) = reader.field_name_in_message()? {
                    reader.colon()?;
                    match inner.as_str() {
                        "kind" => element.kind = reader.string()?,
                        "id" => element.id_type = Some(IdType::Id(reader.integer()?)),
                        "name" => element.id_type = Some(IdType::Name(reader.string()?)),
                        other => return Err(reader.error(&format!("unknown field {:?}", other))),
                    }
                }
                key.path.push(element);
            }
            other => return Err(reader.error(&format!("unknown field {:?}", other))),
        }
    }

    Ok(key)
}

struct TextReader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TextReader<'a> {
    fn new(src: &'a str) -> Self {
        TextReader { src, pos: 0 }
    }

    fn error(&self, reason: &str) -> Error {
        Error::InvalidEncoding(format!(
            "wire-proto text: {} at offset {}",
            reason, self.pos
        ))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Whitespace and `,`/`;` separators.
    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || c == ';' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected field name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    /// Next top-level field name, or `None` at end of input.
    fn field_name(&mut self) -> Result<Option<String>> {
        self.skip_separators();
        if self.peek().is_none() {
            return Ok(None);
        }
        self.identifier().map(Some)
    }

    /// Next field name inside a message body, or `None` after its closing brace.
    fn field_name_in_message(&mut self) -> Result<Option<String>> {
        self.skip_separators();
        match self.peek() {
            Some('}') | Some('>') => {
                self.pos += 1;
                Ok(None)
            }
            None => Err(self.error("unterminated message")),
            Some(_) => self.identifier().map(Some),
        }
    }

    fn open_message(&mut self) -> Result<()> {
        self.skip_separators();
        if self.peek() == Some(':') {
            self.pos += 1;
            self.skip_separators();
        }
        match self.next_char() {
            Some('{') | Some('<') => Ok(()),
            _ => Err(self.error("expected '{'")),
        }
    }

    fn colon(&mut self) -> Result<()> {
        self.skip_separators();
        match self.next_char() {
            Some(':') => Ok(()),
            _ => Err(self.error("expected ':'")),
        }
    }

    fn integer(&mut self) -> Result<i64> {
        self.skip_separators();
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| self.error("expected integer"))
    }

    fn string(&mut self) -> Result<String> {
        self.skip_separators();
        let quote = match self.next_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted string")),
        };

        let mut bytes = Vec::new();
        loop {
            match self.next_char() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => break,
                Some('\\') => match self.next_char() {
                    Some('n') => bytes.push(b'\n'),
                    Some('r') => bytes.push(b'\r'),
                    Some('t') => bytes.push(b'\t'),
                    Some(d @ '0'..='7') => {
                        let mut value = d.to_digit(8).unwrap_or(0);
                        for _ in 0..2 {
                            match self.peek().and_then(|c| c.to_digit(8)) {
                                Some(digit) => {
                                    value = value * 8 + digit;
                                    self.pos += 1;
                                }
                                None => break,
                            }
                        }
                        let byte = u8::try_from(value)
                            .map_err(|_| self.error("octal escape out of range"))?;
                        bytes.push(byte);
                    }
                    Some(c) => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        String::from_utf8(bytes).map_err(|_| self.error("string is not UTF-8"))
    }
}
