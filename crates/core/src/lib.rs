//! Data model for the dutil Datastore client
//!
//! This crate defines the types every command works with:
//! - Key: hierarchical identifier with literal, opaque, wire-proto and JSON forms
//! - Value / Property / Entity: the recursively typed value model
//! - JSON codec: two-phase `{"type", "value"}` envelopes and line streams
//! - Query / Filter / AggregationQuery: translator output, lowered to wire messages
//! - MetadataLookup: entity version and timestamps through a protocol-level client
//! - KeyFormat / KeyReader / KeyWriter: key streams for `convert key`
//! - ExplainMetrics: query plan and execution statistics
//! - TableEntry / group_tables: display rows for `convert table`
//! - wire: the Datastore v1 protocol messages (the store's native model)

#![warn(clippy::all)]

pub mod error;
pub mod explain;
pub mod json;
pub mod key;
pub mod key_format;
mod literal;
pub mod lookup;
mod prototext;
pub mod query;
pub mod table;
pub mod value;
pub mod wire;

pub use error::{Error, Result};
pub use explain::{ExecutionStats, ExplainMetrics, PlanSummary};
pub use json::{decode_property, decode_value, read_json_stream, write_json_line};
pub use key::{Identifier, Key, KEY_PROPERTY};
pub use key_format::{detect_format, peek_format, KeyFormat, KeyReader, KeyWriter};
pub use lookup::{LookupClient, MetadataLookup};
pub use query::{
    Aggregation, AggregationKind, AggregationQuery, Direction, Filter, Operator, Order,
    PropertyFilter, Query,
};
pub use table::{format_cell, group_tables, Table, TableEntry};
pub use value::{
    aggregation_row_to_properties, Entity, EntityMetadata, GeoPoint, Property, Value, ValueType,
};
