//! Values survive the JSON envelope and the native protocol form.

use crate::test_utils::*;
use dutil::Entity;
use proptest::prelude::*;

proptest! {
    #[test]
    fn round_trip_value_json(value in arb_value()) {
        let json = serde_json::to_string(&value).unwrap();
        prop_assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), value);
    }

    #[test]
    fn round_trip_value_native(value in arb_value()) {
        prop_assert_eq!(Value::from_native(&value.to_native()).unwrap(), value);
    }

    #[test]
    fn round_trip_property_json(value in arb_value(), no_index in any::<bool>()) {
        let prop = property("p".to_string(), value, no_index);
        let json = serde_json::to_string(&prop).unwrap();
        prop_assert_eq!(serde_json::from_str::<Property>(&json).unwrap(), prop);
    }

    #[test]
    fn round_trip_entity_native(
        key in arb_key(),
        props in prop::collection::btree_map("[a-z]{1,6}", (arb_value(), any::<bool>()), 0..5),
    ) {
        let entity = Entity {
            key: Some(key),
            properties: props
                .into_iter()
                .map(|(name, (value, no_index))| property(name, value, no_index))
                .collect(),
            metadata: None,
        };
        prop_assert_eq!(Entity::from_native(&entity.to_native()).unwrap(), entity);
    }
}

#[test]
fn round_trip_deep_value_json() {
    let value = deep_value();
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(
        json["value"][0]["value"][0]["value"][0]["value"][1]["value"],
        serde_json::json!("x")
    );
    assert_eq!(dutil::decode_value(json).unwrap(), value);
}

#[test]
fn round_trip_deep_value_native() {
    let value = deep_value();
    assert_eq!(Value::from_native(&value.to_native()).unwrap(), value);
}

#[test]
fn entity_native_sorts_properties() {
    let entity = Entity::new(Key::with_id("A", 1).unwrap())
        .with_property(Property::new("z", 1i64))
        .with_property(Property::new("a", 2i64));
    let back = Entity::from_native(&entity.to_native()).unwrap();
    let names: Vec<&str> = back.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["a", "z"]);
}

#[test]
fn unknown_type_tag_is_rejected_at_any_depth() {
    let json = serde_json::json!({
        "type": "array",
        "value": [{"type": "money", "value": 3}]
    });
    assert!(matches!(
        dutil::decode_value(json),
        Err(dutil::Error::UnknownValueType(tag)) if tag == "money"
    ));
}
