//! Key stream formats
//!
//! Keys travel between commands as one of four formats:
//!
//! | Format | CLI name | Stream shape |
//! |--------|----------|--------------|
//! | [`KeyFormat::Json`] | `json` | whitespace-separated JSON objects |
//! | [`KeyFormat::Literal`] | `gql` | one `KEY(...)` literal per line |
//! | [`KeyFormat::Opaque`] | `encoded` | one opaque token per line |
//! | [`KeyFormat::WireProto`] | `proto` | one wire-proto token per line |
//!
//! [`KeyReader::auto`] picks the format from the first four bytes of the
//! stream without consuming them.

use std::fmt;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read, Write};
use std::str::FromStr;

use serde_json::de::IoRead;
use serde_json::StreamDeserializer;
use tracing::debug;

use crate::error::{Error, Result};
use crate::json::write_json_line;
use crate::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFormat {
    /// Structured JSON form
    Json,
    /// `KEY(Kind, id)` literal
    Literal,
    /// URL-safe base64 of the binary wire key
    Opaque,
    /// Percent-encoded protobuf text form
    WireProto,
}

impl KeyFormat {
    /// CLI name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyFormat::Json => "json",
            KeyFormat::Literal => "gql",
            KeyFormat::Opaque => "encoded",
            KeyFormat::WireProto => "proto",
        }
    }

    /// Render one key as a single line (without the newline).
    pub fn render(&self, key: &Key) -> Result<String> {
        Ok(match self {
            KeyFormat::Json => serde_json::to_string(key)?,
            KeyFormat::Literal => key.to_literal(),
            KeyFormat::Opaque => key.encode(),
            KeyFormat::WireProto => key.encode_wire_proto(),
        })
    }

    /// Parse one line of a line-oriented format.
    pub fn parse(&self, line: &str, default_namespace: &str) -> Result<Key> {
        match self {
            KeyFormat::Json => Ok(serde_json::from_str(line)?),
            KeyFormat::Literal => Key::parse_literal(line, default_namespace),
            KeyFormat::Opaque => Key::decode(line),
            KeyFormat::WireProto => Key::parse_wire_proto(line),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(KeyFormat::Json),
            "gql" | "literal" => Ok(KeyFormat::Literal),
            "encoded" | "opaque" => Ok(KeyFormat::Opaque),
            "proto" | "wire" => Ok(KeyFormat::WireProto),
            other => Err(Error::InvalidEncoding(format!("unknown key format: {:?}", other))),
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Number of bytes inspected by [`detect_format`].
pub const DETECT_LEN: usize = 4;

/// `{` first ⇒ JSON; `(` fourth (as in `KEY(`) ⇒ literal; otherwise opaque.
pub fn detect_format(head: &[u8]) -> KeyFormat {
    if head.first() == Some(&b'{') {
        KeyFormat::Json
    } else if head.get(3) == Some(&b'(') {
        KeyFormat::Literal
    } else {
        KeyFormat::Opaque
    }
}

/// Peeked bytes followed by the rest of the stream.
pub type Rewound<R> = Chain<Cursor<Vec<u8>>, R>;

/// Read up to [`DETECT_LEN`] bytes, detect the format and hand back a reader
/// that still yields every byte.
pub fn peek_format<R: Read>(mut reader: R) -> Result<(KeyFormat, Rewound<R>)> {
    let mut head = Vec::with_capacity(DETECT_LEN);
    (&mut reader).take(DETECT_LEN as u64).read_to_end(&mut head)?;
    let format = detect_format(&head);
    debug!(format = %format, head = %String::from_utf8_lossy(&head), "detected key format");
    Ok((format, Cursor::new(head).chain(reader)))
}

// ============================================================================
// Reader
// ============================================================================

enum Source<R: Read> {
    Json(StreamDeserializer<'static, IoRead<R>, Key>),
    Lines(io::Lines<BufReader<R>>),
}

/// Iterator over the keys of a stream.
///
/// Blank lines are skipped in line-oriented formats. The first error ends
/// the useful part of the stream.
pub struct KeyReader<R: Read> {
    format: KeyFormat,
    namespace: String,
    source: Source<R>,
}

impl<R: Read> KeyReader<R> {
    /// `namespace` is the default for literal keys without `NAMESPACE(...)`.
    pub fn new(format: KeyFormat, reader: R, namespace: impl Into<String>) -> Self {
        let source = match format {
            KeyFormat::Json => {
                Source::Json(serde_json::Deserializer::from_reader(reader).into_iter())
            }
            _ => Source::Lines(BufReader::new(reader).lines()),
        };
        KeyReader {
            format,
            namespace: namespace.into(),
            source,
        }
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }
}

impl<R: Read> KeyReader<Rewound<R>> {
    /// Reader whose format is detected from the stream itself.
    pub fn auto(reader: R, namespace: impl Into<String>) -> Result<Self> {
        let (format, reader) = peek_format(reader)?;
        Ok(KeyReader::new(format, reader, namespace))
    }
}

impl<R: Read> Iterator for KeyReader<R> {
    type Item = Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Json(stream) => stream.next().map(|item| item.map_err(Error::from)),
            Source::Lines(lines) => loop {
                let line = match lines.next()? {
                    Ok(line) => line,
                    Err(e) => return Some(Err(e.into())),
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                return Some(self.format.parse(line, &self.namespace));
            },
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Writes one key per line in a fixed format.
pub struct KeyWriter<W: Write> {
    format: KeyFormat,
    writer: W,
}

impl<W: Write> KeyWriter<W> {
    pub fn new(format: KeyFormat, writer: W) -> Self {
        KeyWriter { format, writer }
    }

    pub fn write(&mut self, key: &Key) -> Result<()> {
        if self.format == KeyFormat::Json {
            return write_json_line(&mut self.writer, key);
        }
        let line = self.format.render(key)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
