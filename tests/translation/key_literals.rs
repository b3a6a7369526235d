//! Key literal parsing through the public entry points.

use crate::test_utils::*;
use dutil::Error;

#[test]
fn parses_numeric_id() {
    assert_eq!(
        Key::parse_literal("key(Person, 123)", "").unwrap(),
        Key::with_id("Person", 123).unwrap()
    );
}

#[test]
fn parses_name() {
    assert_eq!(
        Key::parse_literal("key(Person, \"alice\")", "").unwrap(),
        Key::with_name("Person", "alice").unwrap()
    );
}

#[test]
fn parses_ancestor_chain() {
    let key = Key::parse_literal("key(Org, 1, Person, 2)", "").unwrap();
    assert_eq!(key, Key::with_id("Person", 2)
        .unwrap()
        .parent_key(Key::with_id("Org", 1).unwrap())
        .unwrap());
}

#[test]
fn rejects_zero_id() {
    assert!(matches!(
        Key::parse_literal("key(Person, 0)", ""),
        Err(Error::InvalidKeySyntax { .. })
    ));
}

#[test]
fn rejects_missing_identifier() {
    assert!(matches!(
        Key::parse_literal("key(Person,)", ""),
        Err(Error::InvalidKeySyntax { .. })
    ));
}

#[test]
fn default_namespace_reaches_every_level() {
    let key = Key::parse_literal("KEY(Org, 1, Person, 2)", "tenant").unwrap();
    assert!(key.path().iter().all(|level| level.namespace() == "tenant"));
}

#[test]
fn command_line_keys_accept_both_forms() {
    let key = Key::with_name("Person", "alice")
        .unwrap()
        .parent_key(Key::with_id("Org", 1).unwrap())
        .unwrap();
    assert_eq!(Key::parse(&key.encode(), "").unwrap(), key);
    assert_eq!(Key::parse(&key.to_literal(), "").unwrap(), key);
}

#[test]
fn gql_key_literal_matches_core_literal() {
    let literal = KeyLiteral::root("Org", Identifier::Id(1))
        .child("Person", Identifier::Name("alice".to_string()))
        .with_namespace("tenant");
    let from_gql = translator().convert_key_literal(&literal).unwrap();
    let from_text = Key::parse_literal(&literal.to_string(), "").unwrap();
    assert_eq!(from_gql, from_text);
}
