//! Condition trees become filter trees plus an ancestor key.

use crate::test_utils::*;
use dutil::gql::{Error, NullEquality, QueryAst, QueryTranslator};
use dutil::Query;
use proptest::prelude::*;

#[test]
fn ancestor_is_extracted_from_and() {
    let condition = Condition::and(
        Condition::compare("__key__", Comparator::HasAncestor, key_literal("Kind", 1)),
        Condition::compare("prop", Comparator::Equal, 5i64),
    );
    let translated = translator().translate(&condition).unwrap();
    assert_eq!(translated.ancestor, Some(Key::with_id("Kind", 1).unwrap()));
    assert_eq!(
        translated.filter,
        Some(Filter::comparison("prop", Operator::Equal, 5i64))
    );
}

#[test]
fn two_ancestors_are_rejected() {
    let condition = Condition::and(
        Condition::compare("__key__", Comparator::HasAncestor, key_literal("A", 1)),
        Condition::compare("__key__", Comparator::HasAncestor, key_literal("B", 2)),
    );
    assert!(matches!(
        translator().translate(&condition),
        Err(Error::MultipleAncestorConditions)
    ));
}

#[test]
fn is_null_becomes_in_null() {
    let translated = translator().translate(&Condition::is_null("prop")).unwrap();
    assert_eq!(
        translated.filter,
        Some(Filter::comparison(
            "prop",
            Operator::In,
            Value::Array(vec![Value::Null])
        ))
    );
}

#[test]
fn is_null_as_equality_when_configured() {
    let translated = translator()
        .with_null_equality(NullEquality::Equal)
        .translate(&Condition::is_null("prop"))
        .unwrap();
    assert_eq!(
        translated.filter,
        Some(Filter::comparison("prop", Operator::Equal, Value::Null))
    );
}

#[test]
fn not_equal_array_becomes_not_in() {
    let condition = Condition::compare(
        "prop",
        Comparator::NotEqual,
        vec![Literal::from(1i64), Literal::from(2i64)],
    );
    let translated = translator().translate(&condition).unwrap();
    assert_eq!(
        translated.filter,
        Some(Filter::comparison(
            "prop",
            Operator::NotIn,
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        ))
    );
}

#[test]
fn query_translation_carries_ancestor_to_wire() {
    let ast = QueryAst {
        kind: "Task".to_string(),
        condition: Some(Condition::and(
            Condition::compare("done", Comparator::Equal, false),
            Condition::compare("__key__", Comparator::HasAncestor, key_literal("List", 7)),
        )),
        limit: Some(10),
        ..Default::default()
    };
    let query = QueryTranslator::new("").translate_query(&ast).unwrap();
    assert_eq!(
        query,
        Query::new("Task")
            .ancestor(Key::with_id("List", 7).unwrap())
            .filter(Filter::comparison("done", Operator::Equal, false))
            .limit(10)
    );

    let wire = query.to_wire();
    assert_eq!(wire.kind[0].name, "Task");
    assert!(wire.filter.is_some());
}

proptest! {
    #[test]
    fn equal_array_becomes_in(ints in prop::collection::vec(any::<i64>(), 1..6)) {
        let literal = Literal::Array(ints.iter().copied().map(Literal::Integer).collect());
        let condition = Condition::compare("prop", Comparator::Equal, literal);
        let translated = translator().translate(&condition).unwrap();
        prop_assert_eq!(translated.ancestor, None);
        prop_assert_eq!(
            translated.filter,
            Some(Filter::comparison(
                "prop",
                Operator::In,
                Value::Array(ints.into_iter().map(Value::Int).collect())
            ))
        );
    }

    #[test]
    fn scalar_comparisons_keep_their_operator(n in any::<i64>()) {
        let cases = [
            (Comparator::Equal, Operator::Equal),
            (Comparator::NotEqual, Operator::NotEqual),
            (Comparator::LessThan, Operator::LessThan),
            (Comparator::LessThanOrEqual, Operator::LessThanOrEqual),
            (Comparator::GreaterThan, Operator::GreaterThan),
            (Comparator::GreaterThanOrEqual, Operator::GreaterThanOrEqual),
        ];
        for (comparator, operator) in cases {
            let translated = translator()
                .translate(&Condition::compare("prop", comparator, n))
                .unwrap();
            prop_assert_eq!(
                translated.filter,
                Some(Filter::comparison("prop", operator, Value::Int(n)))
            );
        }
    }
}
