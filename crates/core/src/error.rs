//! Error types for the key/value/entity model
//!
//! Every parse and conversion in this crate returns [`Result`]. Malformed
//! input never panics; it surfaces as one of the variants below.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the key/value/entity model
#[derive(Debug, Error)]
pub enum Error {
    /// Human-readable key literal could not be parsed
    #[error("invalid key: {input:?} ({reason})")]
    InvalidKeySyntax {
        /// The text that was being parsed
        input: String,
        /// What went wrong, including the offset
        reason: String,
    },

    /// A key level breaks the key invariants (empty kind, id not positive,
    /// empty name, incomplete ancestor)
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Opaque token, wire-proto token or wire message is malformed
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A JSON value envelope carried a type tag this codec does not know
    #[error("unknown value type: {0}")]
    UnknownValueType(String),

    /// A wire value carried no recognizable value type
    #[error("unknown native value type: {0}")]
    UnknownNativeType(String),

    /// Low-level lookup found no entity for the key
    #[error("key={0} is not found")]
    EntityNotFound(String),

    /// Low-level lookup kept deferring the key
    #[error("lookup for key={key} deferred {attempts} times")]
    LookupDeferred {
        /// Literal form of the key
        key: String,
        /// Number of lookups issued
        attempts: usize,
    },

    /// Failure reported by a protocol-level client
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON encode/decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading or writing a stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn key_syntax(input: &str, reason: impl Into<String>) -> Self {
        Error::InvalidKeySyntax {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        Error::InvalidEncoding(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::InvalidEncoding(e.to_string())
    }
}
