//! Condition → filter translation
//!
//! [`FilterTranslator::translate`] walks a [`Condition`] tree and produces
//! the store's [`Filter`] tree plus the ancestor key pulled out of any
//! `__key__ HAS ANCESTOR` condition.
//!
//! Rules:
//! - `AND`/`OR` combine both sides; a side that yields no filter (it only
//!   carried the ancestor) collapses away. Only one side may carry an
//!   ancestor.
//! - `IS NULL` becomes `in [null]` by default or `= null` (see
//!   [`NullEquality`]).
//! - `CONTAINS` and backward `IN` become `=`; `HAS DESCENDANT` is rejected.
//! - An array value turns `=` into `in` and `!=` into `not-in`.
//! - `__key__` is only ever compared with key literals.

use dutil_core::{Filter, Key, Operator, Value, KEY_PROPERTY};
use tracing::debug;

use crate::ast::{Comparator, Condition, ConditionParser, KeyLiteral, Literal};
use crate::error::{Error, Result};

/// How `IS NULL` is expressed as a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullEquality {
    /// `property in [null]`
    #[default]
    InNull,
    /// `property = null`
    Equal,
}

/// Filter tree plus the extracted ancestor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslatedCondition {
    pub ancestor: Option<Key>,
    pub filter: Option<Filter>,
}

/// Stateless condition translator.
#[derive(Debug, Clone, Default)]
pub struct FilterTranslator {
    /// Namespace for key literals without `NAMESPACE(...)`
    pub namespace: String,
    pub null_equality: NullEquality,
}

impl FilterTranslator {
    pub fn new(namespace: impl Into<String>) -> Self {
        FilterTranslator {
            namespace: namespace.into(),
            null_equality: NullEquality::default(),
        }
    }

    pub fn with_null_equality(mut self, null_equality: NullEquality) -> Self {
        self.null_equality = null_equality;
        self
    }

    /// Parse `text` with `parser` and translate the result.
    pub fn parse_filter<P>(&self, parser: &P, text: &str) -> Result<TranslatedCondition>
    where
        P: ConditionParser + ?Sized,
    {
        let condition = parser.parse_condition(text)?;
        self.translate(&condition)
    }

    pub fn translate(&self, condition: &Condition) -> Result<TranslatedCondition> {
        match condition {
            Condition::And(left, right) => self.compound(left, right, Filter::and),
            Condition::Or(left, right) => self.compound(left, right, Filter::or),
            Condition::IsNull { property } => {
                let filter = match self.null_equality {
                    NullEquality::InNull => Filter::comparison(
                        property.as_str(),
                        Operator::In,
                        Value::Array(vec![Value::Null]),
                    ),
                    NullEquality::Equal => {
                        Filter::comparison(property.as_str(), Operator::Equal, Value::Null)
                    }
                };
                Ok(TranslatedCondition {
                    ancestor: None,
                    filter: Some(filter),
                })
            }
            Condition::Compare {
                property,
                comparator,
                value,
            } => self.comparison(property, *comparator, value),
        }
    }

    fn compound(
        &self,
        left: &Condition,
        right: &Condition,
        combine: fn(Filter, Filter) -> Filter,
    ) -> Result<TranslatedCondition> {
        let left = self.translate(left)?;
        let right = self.translate(right)?;

        let ancestor = match (left.ancestor, right.ancestor) {
            (Some(_), Some(_)) => return Err(Error::MultipleAncestorConditions),
            (ancestor, None) | (None, ancestor) => ancestor,
        };
        let filter = match (left.filter, right.filter) {
            (Some(l), Some(r)) => Some(combine(l, r)),
            (filter, None) | (None, filter) => filter,
        };
        Ok(TranslatedCondition { ancestor, filter })
    }

    fn comparison(
        &self,
        property: &str,
        comparator: Comparator,
        value: &Literal,
    ) -> Result<TranslatedCondition> {
        let operator = match comparator {
            Comparator::HasAncestor => {
                if property != KEY_PROPERTY {
                    return Err(Error::InvalidAncestorField {
                        property: property.to_string(),
                    });
                }
                let Literal::Key(key) = value else {
                    return Err(Error::InvalidKeyComparisonValue {
                        value: value.to_string(),
                    });
                };
                let ancestor = self.convert_key_literal(key)?;
                debug!(ancestor = %ancestor, "extracted ancestor condition");
                return Ok(TranslatedCondition {
                    ancestor: Some(ancestor),
                    filter: None,
                });
            }
            Comparator::HasDescendant => {
                return Err(Error::UnsupportedComparator {
                    comparator: comparator.to_string(),
                })
            }
            Comparator::Equal | Comparator::Contains | Comparator::ValueIn => Operator::Equal,
            Comparator::NotEqual => Operator::NotEqual,
            Comparator::LessThan => Operator::LessThan,
            Comparator::LessThanOrEqual => Operator::LessThanOrEqual,
            Comparator::GreaterThan => Operator::GreaterThan,
            Comparator::GreaterThanOrEqual => Operator::GreaterThanOrEqual,
            Comparator::In => Operator::In,
            Comparator::NotIn => Operator::NotIn,
        };

        if property == KEY_PROPERTY && !is_key_operand(value) {
            return Err(Error::InvalidKeyComparisonValue {
                value: value.to_string(),
            });
        }

        let value = self.convert_literal(value)?;
        let is_array = matches!(value, Value::Array(_));
        let (operator, value) = match operator {
            Operator::Equal if is_array => (Operator::In, value),
            Operator::NotEqual if is_array => (Operator::NotIn, value),
            Operator::In | Operator::NotIn if !is_array => (operator, Value::Array(vec![value])),
            _ => (operator, value),
        };

        Ok(TranslatedCondition {
            ancestor: None,
            filter: Some(Filter::comparison(property, operator, value)),
        })
    }

    /// Build a key from a leaf-first literal path.
    ///
    /// Every level receives the literal's namespace, or this translator's
    /// namespace when the literal has none. The project is not part of a
    /// key and is ignored.
    pub fn convert_key_literal(&self, literal: &KeyLiteral) -> Result<Key> {
        let namespace = literal.namespace.as_deref().unwrap_or(&self.namespace);
        let invalid = |reason: &str| {
            Error::Core(dutil_core::Error::InvalidKeySyntax {
                input: literal.to_string(),
                reason: reason.to_string(),
            })
        };

        let levels = literal
            .path
            .iter()
            .rev()
            .map(|segment| (segment.kind.as_str(), segment.identifier.clone()));
        Key::from_path(namespace, levels).map_err(|e| match e {
            dutil_core::Error::InvalidKey(reason) => invalid(reason.as_str()),
            other => Error::Core(other),
        })
    }

    /// Convert a literal into a model value; key literals go through
    /// [`FilterTranslator::convert_key_literal`].
    pub fn convert_literal(&self, literal: &Literal) -> Result<Value> {
        Ok(match literal {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Integer(i) => Value::Int(*i),
            Literal::Double(d) => Value::Float(*d),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Blob(b) => Value::Blob(b.clone()),
            Literal::Timestamp(ts) => Value::Timestamp(*ts),
            Literal::Key(key) => Value::Key(self.convert_key_literal(key)?),
            Literal::Array(values) => Value::Array(
                values
                    .iter()
                    .map(|v| self.convert_literal(v))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

/// A key literal, or an array made only of key literals.
fn is_key_operand(value: &Literal) -> bool {
    match value {
        Literal::Key(_) => true,
        Literal::Array(values) => values.iter().all(|v| matches!(v, Literal::Key(_))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dutil_core::Identifier;

    fn key_lit(kind: &str, id: i64) -> KeyLiteral {
        KeyLiteral::root(kind, Identifier::Id(id))
    }

    fn translate(condition: Condition) -> Result<TranslatedCondition> {
        FilterTranslator::default().translate(&condition)
    }

    #[test]
    fn test_simple_comparison() {
        let out = translate(Condition::compare("age", Comparator::GreaterThan, 20)).unwrap();
        assert_eq!(out.ancestor, None);
        assert_eq!(
            out.filter,
            Some(Filter::comparison("age", Operator::GreaterThan, 20))
        );
    }

    #[test]
    fn test_ancestor_and_property() {
        let condition = Condition::and(
            Condition::compare("__key__", Comparator::HasAncestor, key_lit("Kind", 1)),
            Condition::compare("prop", Comparator::Equal, 5),
        );
        let out = translate(condition).unwrap();
        assert_eq!(out.ancestor, Some(Key::with_id("Kind", 1).unwrap()));
        assert_eq!(out.filter, Some(Filter::comparison("prop", Operator::Equal, 5)));
    }

    #[test]
    fn test_ancestor_only() {
        let out = translate(Condition::compare(
            "__key__",
            Comparator::HasAncestor,
            key_lit("Kind", 1),
        ))
        .unwrap();
        assert_eq!(out.ancestor, Some(Key::with_id("Kind", 1).unwrap()));
        assert_eq!(out.filter, None);
    }

    #[test]
    fn test_two_ancestors_rejected() {
        let condition = Condition::and(
            Condition::compare("__key__", Comparator::HasAncestor, key_lit("A", 1)),
            Condition::or(
                Condition::compare("x", Comparator::Equal, 1),
                Condition::compare("__key__", Comparator::HasAncestor, key_lit("B", 2)),
            ),
        );
        assert!(matches!(
            translate(condition),
            Err(Error::MultipleAncestorConditions)
        ));
    }

    #[test]
    fn test_or_keeps_both_sides() {
        let condition = Condition::or(
            Condition::compare("a", Comparator::Equal, 1),
            Condition::compare("b", Comparator::LessThanOrEqual, 2.5),
        );
        assert_eq!(
            translate(condition).unwrap().filter,
            Some(Filter::or(
                Filter::comparison("a", Operator::Equal, 1),
                Filter::comparison("b", Operator::LessThanOrEqual, 2.5),
            ))
        );
    }

    #[test]
    fn test_ancestor_on_other_field_rejected() {
        let result = translate(Condition::compare(
            "owner",
            Comparator::HasAncestor,
            key_lit("A", 1),
        ));
        assert!(matches!(result, Err(Error::InvalidAncestorField { property }) if property == "owner"));
    }

    #[test]
    fn test_ancestor_needs_key_value() {
        let result = translate(Condition::compare("__key__", Comparator::HasAncestor, 1));
        assert!(matches!(result, Err(Error::InvalidKeyComparisonValue { .. })));
    }

    #[test]
    fn test_has_descendant_unsupported() {
        let result = translate(Condition::compare(
            "__key__",
            Comparator::HasDescendant,
            key_lit("A", 1),
        ));
        assert!(matches!(result, Err(Error::UnsupportedComparator { comparator }) if comparator == "HAS DESCENDANT"));
    }

    #[test]
    fn test_is_null_default() {
        let out = translate(Condition::is_null("deleted_at")).unwrap();
        assert_eq!(
            out.filter,
            Some(Filter::comparison(
                "deleted_at",
                Operator::In,
                Value::Array(vec![Value::Null])
            ))
        );
    }

    #[test]
    fn test_is_null_as_equality() {
        let translator = FilterTranslator::new("").with_null_equality(NullEquality::Equal);
        let out = translator.translate(&Condition::is_null("deleted_at")).unwrap();
        assert_eq!(
            out.filter,
            Some(Filter::comparison("deleted_at", Operator::Equal, Value::Null))
        );
    }

    #[test]
    fn test_list_rewrites_equality() {
        let list = Literal::Array(vec![1.into(), 2.into(), 3.into()]);
        let out = translate(Condition::compare("p", Comparator::Equal, list)).unwrap();
        assert_eq!(
            out.filter,
            Some(Filter::comparison(
                "p",
                Operator::In,
                Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
            ))
        );

        let list = Literal::Array(vec![1.into(), 2.into()]);
        let out = translate(Condition::compare("p", Comparator::NotEqual, list)).unwrap();
        assert!(matches!(
            out.filter,
            Some(Filter::Comparison(ref pf)) if pf.operator == Operator::NotIn
        ));
    }

    #[test]
    fn test_scalar_in_is_wrapped() {
        let out = translate(Condition::compare("p", Comparator::In, 4)).unwrap();
        assert_eq!(
            out.filter,
            Some(Filter::comparison("p", Operator::In, Value::Array(vec![Value::Int(4)])))
        );
    }

    #[test]
    fn test_contains_and_backward_in_are_equality() {
        for comparator in [Comparator::Contains, Comparator::ValueIn] {
            let out = translate(Condition::compare("tags", comparator, "red")).unwrap();
            assert_eq!(
                out.filter,
                Some(Filter::comparison("tags", Operator::Equal, "red"))
            );
        }
    }

    #[test]
    fn test_key_comparison_requires_key_literal() {
        let result = translate(Condition::compare("__key__", Comparator::Equal, "Person:1"));
        assert!(matches!(result, Err(Error::InvalidKeyComparisonValue { .. })));

        let mixed = Literal::Array(vec![key_lit("A", 1).into(), 2.into()]);
        let result = translate(Condition::compare("__key__", Comparator::In, mixed));
        assert!(matches!(result, Err(Error::InvalidKeyComparisonValue { .. })));
    }

    #[test]
    fn test_key_comparison_with_keys() {
        let out = translate(Condition::compare(
            "__key__",
            Comparator::GreaterThan,
            key_lit("A", 1),
        ))
        .unwrap();
        assert_eq!(
            out.filter,
            Some(Filter::comparison(
                "__key__",
                Operator::GreaterThan,
                Key::with_id("A", 1).unwrap()
            ))
        );
    }

    #[test]
    fn test_convert_key_literal_chain_and_namespace() {
        let literal = KeyLiteral::root("Org", Identifier::Id(1))
            .child("Person", Identifier::Name("alice".to_string()));

        let key = FilterTranslator::new("tenant")
            .convert_key_literal(&literal)
            .unwrap();
        assert_eq!(
            key,
            Key::with_name("Person", "alice")
                .unwrap()
                .in_namespace("tenant")
                .parent_key(Key::with_id("Org", 1).unwrap())
                .unwrap()
        );

        let key = FilterTranslator::new("tenant")
            .convert_key_literal(&literal.with_namespace("explicit"))
            .unwrap();
        assert_eq!(key.namespace(), "explicit");
        assert_eq!(key.parent().unwrap().namespace(), "explicit");
    }

    #[test]
    fn test_convert_key_literal_rejects_bad_paths() {
        let translator = FilterTranslator::default();
        let empty = KeyLiteral {
            project: None,
            namespace: None,
            path: vec![],
        };
        assert!(matches!(
            translator.convert_key_literal(&empty),
            Err(Error::Core(dutil_core::Error::InvalidKeySyntax { .. }))
        ));

        let mut incomplete_parent = key_lit("Person", 2);
        incomplete_parent.path.push(crate::ast::PathSegment {
            kind: "Org".to_string(),
            identifier: None,
        });
        assert!(translator.convert_key_literal(&incomplete_parent).is_err());

        for literal in [
            KeyLiteral::root("Person", Identifier::Id(0)),
            KeyLiteral::root("Person", Identifier::Id(-3)),
            KeyLiteral::root("Person", Identifier::Name(String::new())),
        ] {
            assert!(matches!(
                translator.convert_key_literal(&literal),
                Err(Error::Core(dutil_core::Error::InvalidKeySyntax { .. }))
            ));
        }
    }

    #[test]
    fn test_convert_key_literal_incomplete_leaf() {
        let literal = KeyLiteral {
            project: None,
            namespace: None,
            path: vec![crate::ast::PathSegment {
                kind: "Person".to_string(),
                identifier: None,
            }],
        };
        let key = FilterTranslator::default()
            .convert_key_literal(&literal)
            .unwrap();
        assert!(key.is_incomplete());
    }

    #[test]
    fn test_parse_filter_uses_parser() {
        struct Fixed;
        impl ConditionParser for Fixed {
            fn parse_condition(&self, text: &str) -> Result<Condition> {
                if text == "bad" {
                    return Err(Error::parse("unexpected token"));
                }
                Ok(Condition::compare("x", Comparator::Equal, text))
            }
        }

        let translator = FilterTranslator::default();
        let out = translator.parse_filter(&Fixed, "hello").unwrap();
        assert_eq!(out.filter, Some(Filter::comparison("x", Operator::Equal, "hello")));
        assert!(matches!(
            translator.parse_filter(&Fixed, "bad"),
            Err(Error::Parse { .. })
        ));
    }
}
