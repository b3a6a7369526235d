//! Query and filter model
//!
//! [`Filter`] and [`Query`] are what the query-language translators produce.
//! They are plain values; [`Query::to_wire`] and [`AggregationQuery::to_wire`]
//! lower them to the protocol messages.
//!
//! An ancestor constraint is carried separately from the filter tree and is
//! AND-ed in as a `__key__ HAS_ANCESTOR` filter when lowering.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::key::{Key, KEY_PROPERTY};
use crate::value::Value;
use crate::wire;
use crate::wire::{composite_filter, property_filter, property_order};

/// Comparison operator of a property filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    NotEqual,
    In,
    NotIn,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::NotEqual => "!=",
            Operator::In => "in",
            Operator::NotIn => "not-in",
        }
    }

    fn to_wire(self) -> property_filter::Operator {
        match self {
            Operator::Equal => property_filter::Operator::Equal,
            Operator::LessThan => property_filter::Operator::LessThan,
            Operator::LessThanOrEqual => property_filter::Operator::LessThanOrEqual,
            Operator::GreaterThan => property_filter::Operator::GreaterThan,
            Operator::GreaterThanOrEqual => property_filter::Operator::GreaterThanOrEqual,
            Operator::NotEqual => property_filter::Operator::NotEqual,
            Operator::In => property_filter::Operator::In,
            Operator::NotIn => property_filter::Operator::NotIn,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "=" => Operator::Equal,
            "<" => Operator::LessThan,
            "<=" => Operator::LessThanOrEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterThanOrEqual,
            "!=" => Operator::NotEqual,
            "in" => Operator::In,
            "not-in" => Operator::NotIn,
            other => {
                return Err(Error::InvalidEncoding(format!(
                    "unknown filter operator: {:?}",
                    other
                )))
            }
        })
    }
}

/// `field <op> value`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub field_name: String,
    pub operator: Operator,
    pub value: Value,
}

/// Boolean predicate tree.
///
/// Compound nodes always hold two children; an absent side is collapsed
/// away before a compound node is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Comparison(PropertyFilter),
}

impl Filter {
    pub fn comparison(
        field_name: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        Filter::Comparison(PropertyFilter {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn and(left: Filter, right: Filter) -> Self {
        Filter::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Filter, right: Filter) -> Self {
        Filter::Or(Box::new(left), Box::new(right))
    }

    pub fn to_wire(&self) -> wire::Filter {
        match self {
            Filter::And(left, right) => composite(composite_filter::Operator::And, left, right),
            Filter::Or(left, right) => composite(composite_filter::Operator::Or, left, right),
            Filter::Comparison(cmp) => comparison_filter(
                &cmp.field_name,
                cmp.operator.to_wire(),
                cmp.value.to_native(),
            ),
        }
    }
}

fn composite(op: composite_filter::Operator, left: &Filter, right: &Filter) -> wire::Filter {
    wire::Filter {
        filter_type: Some(wire::filter::FilterType::CompositeFilter(
            wire::CompositeFilter {
                op: op as i32,
                filters: vec![left.to_wire(), right.to_wire()],
            },
        )),
    }
}

fn comparison_filter(name: &str, op: property_filter::Operator, value: wire::Value) -> wire::Filter {
    wire::Filter {
        filter_type: Some(wire::filter::FilterType::PropertyFilter(wire::PropertyFilter {
            property: Some(property_reference(name)),
            op: op as i32,
            value: Some(value),
        })),
    }
}

fn property_reference(name: &str) -> wire::PropertyReference {
    wire::PropertyReference {
        name: name.to_string(),
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Order {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Order {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// `field` sorts ascending, `-field` descending.
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix('-') {
            Some(field) => Order::desc(field),
            None => Order::asc(text),
        }
    }

    fn to_wire(&self) -> wire::PropertyOrder {
        let direction = match self.direction {
            Direction::Ascending => property_order::Direction::Ascending,
            Direction::Descending => property_order::Direction::Descending,
        };
        wire::PropertyOrder {
            property: Some(property_reference(&self.field)),
            direction: direction as i32,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Ascending => f.write_str(&self.field),
            Direction::Descending => write!(f, "-{}", self.field),
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Entity query.
///
/// An empty projection returns full entities; the singleton projection
/// `["__key__"]` returns keys only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub kind: String,
    pub namespace: String,
    pub distinct: bool,
    pub distinct_on: Vec<String>,
    pub projection: Vec<String>,
    pub ancestor: Option<Key>,
    pub filter: Option<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<i32>,
    pub offset: i32,
}

impl Query {
    pub fn new(kind: impl Into<String>) -> Self {
        Query {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Deduplicate on the projected properties.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn distinct_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.distinct_on = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn keys_only(mut self) -> Self {
        self.projection = vec![KEY_PROPERTY.to_string()];
        self
    }

    pub fn is_keys_only(&self) -> bool {
        self.projection.len() == 1 && self.projection[0] == KEY_PROPERTY
    }

    pub fn ancestor(mut self, ancestor: Key) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    /// AND a filter onto the existing one.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => Filter::and(existing, filter),
            None => filter,
        });
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    /// Partition to run the query in, when a namespace is set.
    pub fn partition_id(&self) -> Option<wire::PartitionId> {
        (!self.namespace.is_empty()).then(|| wire::PartitionId {
            namespace_id: self.namespace.clone(),
            ..Default::default()
        })
    }

    pub fn to_wire(&self) -> wire::Query {
        let kind = if self.kind.is_empty() {
            Vec::new()
        } else {
            vec![wire::KindExpression {
                name: self.kind.clone(),
            }]
        };

        let projection = self
            .projection
            .iter()
            .map(|name| wire::Projection {
                property: Some(property_reference(name)),
            })
            .collect();

        let distinct_fields = if self.distinct {
            &self.projection
        } else {
            &self.distinct_on
        };
        let distinct_on = distinct_fields
            .iter()
            .map(|name| property_reference(name))
            .collect();

        let ancestor = self.ancestor.as_ref().map(|key| {
            comparison_filter(
                KEY_PROPERTY,
                property_filter::Operator::HasAncestor,
                Value::Key(key.clone()).to_native(),
            )
        });
        let filter = match (ancestor, self.filter.as_ref().map(Filter::to_wire)) {
            (Some(ancestor), Some(filter)) => Some(wire::Filter {
                filter_type: Some(wire::filter::FilterType::CompositeFilter(
                    wire::CompositeFilter {
                        op: composite_filter::Operator::And as i32,
                        filters: vec![ancestor, filter],
                    },
                )),
            }),
            (ancestor, filter) => ancestor.or(filter),
        };

        wire::Query {
            projection,
            kind,
            filter,
            order: self.order.iter().map(Order::to_wire).collect(),
            distinct_on,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationKind {
    Count,
    Sum(String),
    Avg(String),
}

/// One aggregation clause with an optional result alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub kind: AggregationKind,
    pub alias: Option<String>,
}

impl Aggregation {
    fn to_wire(&self) -> wire::aggregation_query::Aggregation {
        use wire::aggregation_query::aggregation::{Avg, Count, Operator, Sum};

        let operator = match &self.kind {
            AggregationKind::Count => Operator::Count(Count { up_to: None }),
            AggregationKind::Sum(field) => Operator::Sum(Sum {
                property: Some(property_reference(field)),
            }),
            AggregationKind::Avg(field) => Operator::Avg(Avg {
                property: Some(property_reference(field)),
            }),
        };
        wire::aggregation_query::Aggregation {
            alias: self.alias.clone().unwrap_or_default(),
            operator: Some(operator),
        }
    }
}

/// A query whose result is a single row of computed values.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationQuery {
    pub query: Query,
    pub aggregations: Vec<Aggregation>,
}

impl AggregationQuery {
    pub fn new(query: Query) -> Self {
        AggregationQuery {
            query,
            aggregations: Vec::new(),
        }
    }

    pub fn with_count(self, alias: Option<String>) -> Self {
        self.with(AggregationKind::Count, alias)
    }

    pub fn with_sum(self, field: impl Into<String>, alias: Option<String>) -> Self {
        self.with(AggregationKind::Sum(field.into()), alias)
    }

    pub fn with_avg(self, field: impl Into<String>, alias: Option<String>) -> Self {
        self.with(AggregationKind::Avg(field.into()), alias)
    }

    fn with(mut self, kind: AggregationKind, alias: Option<String>) -> Self {
        self.aggregations.push(Aggregation { kind, alias });
        self
    }

    pub fn to_wire(&self) -> wire::AggregationQuery {
        wire::AggregationQuery {
            nested_query: Some(self.query.to_wire()),
            aggregations: self.aggregations.iter().map(Aggregation::to_wire).collect(),
        }
    }
}
