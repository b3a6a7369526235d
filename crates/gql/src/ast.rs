//! GQL abstract syntax tree
//!
//! The grammar and lexer live outside this crate. Any parser that produces
//! these types (through [`ConditionParser`] / [`QueryParser`]) can feed the
//! translators.

use std::fmt;

use chrono::{DateTime, Utc};
use dutil_core::key::{quote_kind, quote_string};
use dutil_core::Identifier;

use crate::error::Result;

// ============================================================================
// Conditions
// ============================================================================

/// A `WHERE` condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    /// `property IS NULL`
    IsNull { property: String },
    /// `property <comparator> value`, or `value <comparator> property` for
    /// the backward comparators
    Compare {
        property: String,
        comparator: Comparator,
        value: Literal,
    },
}

impl Condition {
    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::Or(Box::new(left), Box::new(right))
    }

    pub fn is_null(property: impl Into<String>) -> Self {
        Condition::IsNull {
            property: property.into(),
        }
    }

    pub fn compare(
        property: impl Into<String>,
        comparator: Comparator,
        value: impl Into<Literal>,
    ) -> Self {
        Condition::Compare {
            property: property.into(),
            comparator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// `property IN [..]`
    In,
    /// `property NOT IN [..]`
    NotIn,
    /// `property CONTAINS value`
    Contains,
    /// `__key__ HAS ANCESTOR key`
    HasAncestor,
    /// `value IN property` (backward)
    ValueIn,
    /// `key HAS DESCENDANT __key__` (backward)
    HasDescendant,
}

impl Comparator {
    /// GQL spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
            Comparator::LessThan => "<",
            Comparator::LessThanOrEqual => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::In | Comparator::ValueIn => "IN",
            Comparator::NotIn => "NOT IN",
            Comparator::Contains => "CONTAINS",
            Comparator::HasAncestor => "HAS ANCESTOR",
            Comparator::HasDescendant => "HAS DESCENDANT",
        }
    }

    /// The value is written before the property.
    pub fn is_backward(&self) -> bool {
        matches!(self, Comparator::ValueIn | Comparator::HasDescendant)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Literals
// ============================================================================

/// A literal value in a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Key(KeyLiteral),
    Array(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Double(d) => write!(f, "{}", d),
            Literal::String(s) => f.write_str(&quote_string(s)),
            Literal::Blob(b) => write!(f, "BLOB({} bytes)", b.len()),
            Literal::Timestamp(ts) => write!(f, "DATETIME({:?})", ts.to_rfc3339()),
            Literal::Key(key) => write!(f, "{}", key),
            Literal::Array(values) => {
                f.write_str("ARRAY(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<i32> for Literal {
    fn from(i: i32) -> Self {
        Literal::Integer(i as i64)
    }
}

impl From<f64> for Literal {
    fn from(d: f64) -> Self {
        Literal::Double(d)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<KeyLiteral> for Literal {
    fn from(key: KeyLiteral) -> Self {
        Literal::Key(key)
    }
}

impl From<Vec<Literal>> for Literal {
    fn from(values: Vec<Literal>) -> Self {
        Literal::Array(values)
    }
}

/// One `Kind, idOrName` pair of a key literal. The identifier is absent for
/// an incomplete leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub kind: String,
    pub identifier: Option<Identifier>,
}

/// `KEY([PROJECT(..),] [NAMESPACE(..),] Kind, idOrName, ...)`
///
/// `path` is stored leaf first: `path[0]` is the key itself and the last
/// element is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLiteral {
    pub project: Option<String>,
    pub namespace: Option<String>,
    pub path: Vec<PathSegment>,
}

impl KeyLiteral {
    /// Single-level key.
    pub fn root(kind: impl Into<String>, identifier: Identifier) -> Self {
        KeyLiteral {
            project: None,
            namespace: None,
            path: vec![PathSegment {
                kind: kind.into(),
                identifier: Some(identifier),
            }],
        }
    }

    /// Append a level below the current leaf.
    pub fn child(mut self, kind: impl Into<String>, identifier: Identifier) -> Self {
        self.path.insert(
            0,
            PathSegment {
                kind: kind.into(),
                identifier: Some(identifier),
            },
        );
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

impl fmt::Display for KeyLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(project) = &self.project {
            parts.push(format!("PROJECT({})", quote_string(project)));
        }
        if let Some(namespace) = &self.namespace {
            parts.push(format!("NAMESPACE({})", quote_string(namespace)));
        }
        for segment in self.path.iter().rev() {
            parts.push(quote_kind(&segment.kind));
            match &segment.identifier {
                Some(Identifier::Id(id)) => parts.push(id.to_string()),
                Some(Identifier::Name(name)) => parts.push(quote_string(name)),
                None => {}
            }
        }
        write!(f, "KEY({})", parts.join(", "))
    }
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub property: String,
    pub descending: bool,
}

/// `SELECT ... FROM kind WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryAst {
    /// `None` for `SELECT *`
    pub properties: Option<Vec<String>>,
    pub distinct: bool,
    pub distinct_on: Vec<String>,
    pub kind: String,
    pub condition: Option<Condition>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationAst {
    Count { alias: Option<String> },
    CountUpTo { limit: i64, alias: Option<String> },
    Sum { property: String, alias: Option<String> },
    Avg { property: String, alias: Option<String> },
}

/// `AGGREGATE ... OVER (query)` or `SELECT COUNT(*) ... FROM ...`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationQueryAst {
    pub query: QueryAst,
    pub aggregations: Vec<AggregationAst>,
}

/// Output of a query parser: either form.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    Query(QueryAst),
    Aggregation(AggregationQueryAst),
}

// ============================================================================
// Parser seams
// ============================================================================

/// Parses a bare condition (the text after `WHERE`).
pub trait ConditionParser {
    fn parse_condition(&self, text: &str) -> Result<Condition>;
}

/// Parses a full query or aggregation query.
pub trait QueryParser {
    fn parse_query(&self, text: &str) -> Result<ParsedQuery>;
}
