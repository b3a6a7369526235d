//! dutil: the Cloud Datastore data model, its text/JSON/wire encodings and
//! GQL translation.
//!
//! This facade re-exports the member crates:
//! - everything from `dutil-core` at the top level (keys, values, entities,
//!   the query model and the metadata lookup)
//! - `dutil-gql` as [`gql`] (AST contract plus filter/query translators)
//!
//! ```
//! use dutil::{Key, KeyFormat};
//!
//! let key = Key::parse_literal("KEY(Org, 1, Person, 'alice')", "").unwrap();
//! assert_eq!(key.parent().and_then(Key::id), Some(1));
//! assert_eq!(KeyFormat::Literal.render(&key).unwrap(), "KEY(Org, 1, Person, \"alice\")");
//! ```

pub use dutil_core::*;
pub use dutil_gql as gql;
