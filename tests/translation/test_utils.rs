//! Strategies and builders shared by the translation tests.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

pub use dutil::gql::{Comparator, Condition, FilterTranslator, KeyLiteral, Literal};
pub use dutil::{Filter, GeoPoint, Identifier, Key, KeyFormat, Operator, Property, Value};

// =============================================================================
// Keys
// =============================================================================

/// Build a key chain from root-first levels, every level in `namespace`.
pub fn build_key(namespace: &str, levels: Vec<(String, Option<Identifier>)>) -> Key {
    Key::from_path(namespace, levels).expect("valid levels")
}

/// Any non-empty kind, including characters that need back-quoting.
pub fn arb_kind() -> impl Strategy<Value = String> {
    prop_oneof!["[A-Z][A-Za-z0-9_]{0,8}", "\\PC{1,10}"]
}

/// Any positive id or non-empty name.
pub fn arb_identifier() -> impl Strategy<Value = Identifier> {
    prop_oneof![
        (1..=i64::MAX).prop_map(Identifier::Id),
        "\\PC{1,12}".prop_map(Identifier::Name),
    ]
}

pub fn arb_namespace() -> impl Strategy<Value = String> {
    prop_oneof!["", "\\PC{1,6}"]
}

/// Keys of one to four levels; the leaf may be incomplete.
pub fn arb_key() -> impl Strategy<Value = Key> {
    (
        arb_namespace(),
        prop::collection::vec((arb_kind(), arb_identifier()), 0..3),
        arb_kind(),
        prop::option::weighted(0.8, arb_identifier()),
    )
        .prop_map(|(namespace, ancestors, kind, leaf)| {
            let mut levels: Vec<(String, Option<Identifier>)> = ancestors
                .into_iter()
                .map(|(kind, identifier)| (kind, Some(identifier)))
                .collect();
            levels.push((kind, leaf));
            build_key(&namespace, levels)
        })
}

/// Levels with their own namespaces, chained through the builder methods.
pub fn arb_mixed_namespace_levels(
) -> impl Strategy<Value = Vec<(String, Identifier, String)>> {
    prop::collection::vec((arb_kind(), arb_identifier(), arb_namespace()), 1..4)
}

// =============================================================================
// Values
// =============================================================================

/// Any finite double.
pub fn arb_float() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |f| f.is_finite())
}

pub fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
        Utc.timestamp_opt(secs, nanos)
            .single()
            .expect("in range")
    })
}

pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        arb_float().prop_map(Value::Float),
        ".{0,12}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Blob),
        arb_timestamp().prop_map(Value::Timestamp),
        (arb_float(), arb_float()).prop_map(|(lat, lng)| Value::Geo(GeoPoint { lat, lng })),
        arb_key().prop_map(Value::Key),
    ]
}

/// Nested values. Embedded entities carry unique property names in sorted
/// order, and an empty array is never marked unindexed.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", (inner, any::<bool>()), 0..4).prop_map(
                |props| {
                    Value::Entity(
                        props
                            .into_iter()
                            .map(|(name, (value, no_index))| property(name, value, no_index))
                            .collect(),
                    )
                }
            ),
        ]
    })
}

pub fn property(name: String, value: Value, no_index: bool) -> Property {
    let empty_array = matches!(&value, Value::Array(values) if values.is_empty());
    Property {
        name,
        no_index: no_index && !empty_array,
        value,
    }
}

/// `{a: {b: {c: [1, "x"]}}}`
pub fn deep_value() -> Value {
    let leaf = Value::Array(vec![Value::Int(1), Value::from("x")]);
    let level3 = Value::Entity(vec![Property::new("c", leaf)]);
    let level2 = Value::Entity(vec![Property::new("b", level3).unindexed()]);
    Value::Entity(vec![Property::new("a", level2)])
}

// =============================================================================
// Conditions
// =============================================================================

pub fn key_literal(kind: &str, id: i64) -> Literal {
    Literal::Key(KeyLiteral::root(kind, Identifier::Id(id)))
}

pub fn translator() -> FilterTranslator {
    FilterTranslator::new("")
}
