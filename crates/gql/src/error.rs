//! Translation errors
//!
//! Raised when a parsed condition or query cannot be expressed as a
//! Datastore filter or query. Model errors (key syntax, encodings) are
//! wrapped from [`dutil_core::Error`].

use thiserror::Error;

/// Result type alias for translation
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for GQL translation
#[derive(Debug, Error)]
pub enum Error {
    /// More than one `HAS ANCESTOR` constraint in one condition tree
    #[error("multiple ancestor conditions are invalid")]
    MultipleAncestorConditions,

    /// `HAS ANCESTOR` applied to a property other than `__key__`
    #[error("HAS ANCESTOR is only valid for __key__, got {property:?}")]
    InvalidAncestorField {
        /// The property the condition named
        property: String,
    },

    /// Comparator the store has no filter operator for
    #[error("comparator {comparator} is not supported")]
    UnsupportedComparator {
        /// GQL spelling of the comparator
        comparator: String,
    },

    /// `__key__` compared against something other than a key
    #[error("__key__ must be compared with a key literal, got {value}")]
    InvalidKeyComparisonValue {
        /// Description of the offending value
        value: String,
    },

    /// Aggregation the store client cannot express
    #[error("{aggregation} aggregation is not supported")]
    UnsupportedAggregation {
        /// GQL spelling of the aggregation
        aggregation: String,
    },

    /// `LIMIT` or `OFFSET` below zero
    #[error("{clause} must not be negative, got {value}")]
    NegativeClause {
        /// `LIMIT` or `OFFSET`
        clause: &'static str,
        value: i32,
    },

    /// The query-language parser rejected the input
    #[error("parse error: {reason}")]
    Parse {
        /// Parser message
        reason: String,
    },

    /// Key or value model error
    #[error(transparent)]
    Core(#[from] dutil_core::Error),
}

impl Error {
    /// Wrap a parser failure.
    pub fn parse(reason: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
        }
    }
}
