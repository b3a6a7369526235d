//! Keys survive every text and wire form unchanged.

use crate::test_utils::*;
use dutil::Error;
use proptest::prelude::*;

proptest! {
    #[test]
    fn round_trip_opaque(key in arb_key()) {
        let token = key.encode();
        prop_assert!(!token.contains('='));
        prop_assert_eq!(Key::decode(&token).unwrap(), key);
    }

    #[test]
    fn round_trip_literal(key in arb_key()) {
        let literal = key.to_literal();
        prop_assert_eq!(Key::parse_literal(&literal, "").unwrap(), key);
    }

    #[test]
    fn round_trip_wire_proto(key in arb_key()) {
        let token = key.encode_wire_proto();
        prop_assert!(!token.chars().any(char::is_whitespace));
        prop_assert_eq!(Key::parse_wire_proto(&token).unwrap(), key);
    }

    #[test]
    fn round_trip_json(key in arb_key()) {
        let json = serde_json::to_string(&key).unwrap();
        prop_assert_eq!(serde_json::from_str::<Key>(&json).unwrap(), key);
    }

    #[test]
    fn round_trip_every_key_format(key in arb_key()) {
        for format in [KeyFormat::Json, KeyFormat::Literal, KeyFormat::Opaque, KeyFormat::WireProto] {
            let rendered = format.render(&key).unwrap();
            prop_assert_eq!(format.parse(&rendered, "").unwrap(), key.clone());
        }
    }

    #[test]
    fn round_trip_chained_conversions(key in arb_key()) {
        let via_literal = Key::parse_literal(&key.to_literal(), "").unwrap();
        let via_opaque = Key::decode(&via_literal.encode()).unwrap();
        let via_proto = Key::parse_wire_proto(&via_opaque.encode_wire_proto()).unwrap();
        prop_assert_eq!(via_proto, key);
    }
}

proptest! {
    #[test]
    fn round_trip_chain_built_from_mixed_namespaces(levels in arb_mixed_namespace_levels()) {
        let mut key: Option<Key> = None;
        for (kind, identifier, namespace) in levels {
            let level = Key::new(kind, Some(identifier)).unwrap().in_namespace(namespace);
            key = Some(match key {
                Some(parent) => level.parent_key(parent).unwrap(),
                None => level,
            });
        }
        let key = key.unwrap();
        prop_assert!(key.path().iter().all(|level| level.namespace() == key.namespace()));
        prop_assert_eq!(Key::decode(&key.encode()).unwrap(), key.clone());
        prop_assert_eq!(Key::parse_literal(&key.to_literal(), "").unwrap(), key);
    }

    #[test]
    fn invalid_ids_are_rejected(kind in arb_kind(), id in i64::MIN..=0) {
        prop_assert!(matches!(Key::with_id(kind, id), Err(Error::InvalidKey(_))));
    }
}

#[test]
fn invalid_levels_are_rejected() {
    assert!(matches!(Key::with_name("A", ""), Err(Error::InvalidKey(_))));
    assert!(matches!(Key::incomplete(""), Err(Error::InvalidKey(_))));
    let incomplete_parent = Key::incomplete("Org").unwrap();
    assert!(matches!(
        Key::with_id("Person", 1).unwrap().parent_key(incomplete_parent),
        Err(Error::InvalidKey(_))
    ));
}

#[test]
fn invalid_keys_are_rejected_on_decode() {
    assert!(serde_json::from_str::<Key>(r#"{"kind":"A","id":-5}"#).is_err());
    assert!(Key::parse_literal("KEY(A, -5)", "").is_err());
    assert!(Key::parse_literal("KEY(A, 0)", "").is_err());
    assert!(Key::parse_literal("KEY(Org, Person, 1)", "").is_err());
}

#[test]
fn round_trip_incomplete_leaf() {
    let key = Key::incomplete("Person")
        .unwrap()
        .parent_key(Key::with_id("Org", 7).unwrap())
        .unwrap();
    let decoded = Key::decode(&key.encode()).unwrap();
    assert!(decoded.is_incomplete());
    assert_eq!(decoded, key);
    assert_eq!(Key::parse_wire_proto(&key.encode_wire_proto()).unwrap(), key);
    assert_eq!(Key::parse_literal(&key.to_literal(), "").unwrap(), key);
}

#[test]
fn round_trip_preserves_chain_shape() {
    let key = build_key(
        "tenant",
        vec![
            ("Org".to_string(), Some(Identifier::Id(1))),
            ("Team".to_string(), Some(Identifier::Name("core".to_string()))),
            ("Person".to_string(), Some(Identifier::Id(42))),
        ],
    );
    let decoded = Key::decode(&key.encode()).unwrap();
    let kinds: Vec<&str> = decoded.path().into_iter().map(Key::kind).collect();
    assert_eq!(kinds, ["Org", "Team", "Person"]);
    assert!(decoded.path().iter().all(|level| level.namespace() == "tenant"));
}
