//! GQL translation for dutil
//!
//! This crate turns parsed GQL into Datastore filters and queries:
//! - ast: the condition / query AST contract and the parser traits
//! - FilterTranslator: condition tree → filter tree + ancestor key
//! - QueryTranslator: query / aggregation AST → `Query` / `AggregationQuery`
//!
//! The grammar itself is not part of this crate; plug a parser in through
//! [`ConditionParser`] and [`QueryParser`].

#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod filter;
pub mod query;

pub use ast::{
    AggregationAst, AggregationQueryAst, Comparator, Condition, ConditionParser, KeyLiteral,
    Literal, OrderBy, ParsedQuery, PathSegment, QueryAst, QueryParser,
};
pub use error::{Error, Result};
pub use filter::{FilterTranslator, NullEquality, TranslatedCondition};
pub use query::{QueryTranslator, TranslatedQuery};
