//! Query AST → store query translation
//!
//! Clauses are applied in order: kind, namespace, distinct / distinct-on,
//! projection, where, order, limit, offset, and finally the aggregations
//! of an aggregation query.

use dutil_core::{AggregationQuery, Order, Query, KEY_PROPERTY};

use crate::ast::{AggregationAst, AggregationQueryAst, ParsedQuery, QueryAst, QueryParser};
use crate::error::{Error, Result};
use crate::filter::{FilterTranslator, NullEquality};

/// Result of translating a [`ParsedQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum TranslatedQuery {
    Query(Query),
    Aggregation(AggregationQuery),
}

/// Stateless query translator; conditions go through [`FilterTranslator`].
#[derive(Debug, Clone, Default)]
pub struct QueryTranslator {
    filter: FilterTranslator,
}

impl QueryTranslator {
    /// `namespace` is set on every query and used for key literals.
    pub fn new(namespace: impl Into<String>) -> Self {
        QueryTranslator {
            filter: FilterTranslator::new(namespace),
        }
    }

    pub fn with_null_equality(mut self, null_equality: NullEquality) -> Self {
        self.filter = self.filter.with_null_equality(null_equality);
        self
    }

    /// Parse `text` with `parser` and translate the result.
    pub fn parse_query<P>(&self, parser: &P, text: &str) -> Result<TranslatedQuery>
    where
        P: QueryParser + ?Sized,
    {
        let parsed = parser.parse_query(text)?;
        self.translate(&parsed)
    }

    pub fn translate(&self, parsed: &ParsedQuery) -> Result<TranslatedQuery> {
        match parsed {
            ParsedQuery::Query(ast) => self.translate_query(ast).map(TranslatedQuery::Query),
            ParsedQuery::Aggregation(ast) => self
                .translate_aggregation(ast)
                .map(TranslatedQuery::Aggregation),
        }
    }

    pub fn translate_query(&self, ast: &QueryAst) -> Result<Query> {
        let mut query = Query::new(ast.kind.as_str());
        if !self.filter.namespace.is_empty() {
            query = query.namespace(self.filter.namespace.as_str());
        }
        if ast.distinct {
            query = query.distinct();
        }
        if !ast.distinct_on.is_empty() {
            query = query.distinct_on(ast.distinct_on.iter().cloned());
        }
        if let Some(properties) = &ast.properties {
            if properties.len() == 1 && properties[0] == KEY_PROPERTY {
                query = query.keys_only();
            } else {
                query = query.project(properties.iter().cloned());
            }
        }
        if let Some(condition) = &ast.condition {
            let translated = self.filter.translate(condition)?;
            if let Some(ancestor) = translated.ancestor {
                query = query.ancestor(ancestor);
            }
            if let Some(filter) = translated.filter {
                query = query.filter(filter);
            }
        }
        for order in &ast.order_by {
            query = query.order(if order.descending {
                Order::desc(order.property.as_str())
            } else {
                Order::asc(order.property.as_str())
            });
        }
        if let Some(limit) = ast.limit {
            query = query.limit(non_negative("LIMIT", limit)?);
        }
        if let Some(offset) = ast.offset {
            query = query.offset(non_negative("OFFSET", offset)?);
        }
        Ok(query)
    }

    pub fn translate_aggregation(&self, ast: &AggregationQueryAst) -> Result<AggregationQuery> {
        let mut aggregation = AggregationQuery::new(self.translate_query(&ast.query)?);
        for clause in &ast.aggregations {
            aggregation = match clause {
                AggregationAst::Count { alias } => aggregation.with_count(alias.clone()),
                AggregationAst::CountUpTo { .. } => {
                    return Err(Error::UnsupportedAggregation {
                        aggregation: "COUNT_UP_TO".to_string(),
                    })
                }
                AggregationAst::Sum { property, alias } => {
                    aggregation.with_sum(property.as_str(), alias.clone())
                }
                AggregationAst::Avg { property, alias } => {
                    aggregation.with_avg(property.as_str(), alias.clone())
                }
            };
        }
        Ok(aggregation)
    }
}

fn non_negative(clause: &'static str, value: i32) -> Result<i32> {
    if value < 0 {
        return Err(Error::NegativeClause { clause, value });
    }
    Ok(value)
}
