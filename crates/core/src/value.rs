//! Value, property and entity model
//!
//! This module defines:
//! - [`Value`]: the eleven storable value types
//! - [`Property`]: a named, optionally unindexed value
//! - [`Entity`]: optional key, properties and optional metadata
//!
//! ## Native conversion
//!
//! `from_native` / `to_native` map to and from the protocol messages in
//! [`crate::wire`]. They are exact inverses with two caveats inherited from
//! the protocol:
//! - entity properties are a map, so they come back sorted by name and
//!   duplicate names collapse to the last one
//! - an array property's `noIndex` travels on its elements, so it is lost for
//!   an empty array
//!
//! JSON encoding lives in [`crate::json`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key::Key;
use crate::wire;
use crate::wire::value::ValueType as Native;

/// Type tag of a [`Value`], as written in the JSON `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Array,
    Blob,
    Bool,
    Timestamp,
    Entity,
    Float,
    Geo,
    Int,
    Key,
    Null,
    String,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Array => "array",
            ValueType::Blob => "blob",
            ValueType::Bool => "bool",
            ValueType::Timestamp => "timestamp",
            ValueType::Entity => "entity",
            ValueType::Float => "float",
            ValueType::Geo => "geo",
            ValueType::Int => "int",
            ValueType::Key => "key",
            ValueType::Null => "null",
            ValueType::String => "string",
        }
    }
}

impl std::str::FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "array" => ValueType::Array,
            "blob" => ValueType::Blob,
            "bool" => ValueType::Bool,
            "timestamp" => ValueType::Timestamp,
            "entity" => ValueType::Entity,
            "float" => ValueType::Float,
            "geo" => ValueType::Geo,
            "int" => ValueType::Int,
            "key" => ValueType::Key,
            "null" => ValueType::Null,
            "string" => ValueType::String,
            other => return Err(Error::UnknownValueType(other.to_string())),
        })
    }
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A storable value.
///
/// The payload always matches the variant; `Array` and `Entity` hold
/// independently valid children.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Ordered list of values
    Array(Vec<Value>),
    /// Raw bytes
    Blob(Vec<u8>),
    Bool(bool),
    /// UTC instant with nanosecond precision
    Timestamp(DateTime<Utc>),
    /// Embedded record
    Entity(Vec<Property>),
    Float(f64),
    Geo(GeoPoint),
    Int(i64),
    Key(Key),
    Null,
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Array(_) => ValueType::Array,
            Value::Blob(_) => ValueType::Blob,
            Value::Bool(_) => ValueType::Bool,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Entity(_) => ValueType::Entity,
            Value::Float(_) => ValueType::Float,
            Value::Geo(_) => ValueType::Geo,
            Value::Int(_) => ValueType::Int,
            Value::Key(_) => ValueType::Key,
            Value::Null => ValueType::Null,
            Value::String(_) => ValueType::String,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert a protocol value.
    ///
    /// A value with no value type set fails with [`Error::UnknownNativeType`]:
    /// either the message was built wrongly or it carries a type newer than
    /// this codec.
    pub fn from_native(src: &wire::Value) -> Result<Value> {
        let value_type = src
            .value_type
            .as_ref()
            .ok_or_else(|| Error::UnknownNativeType(format!("{:?}", src)))?;

        Ok(match value_type {
            Native::NullValue(_) => Value::Null,
            Native::BooleanValue(b) => Value::Bool(*b),
            Native::IntegerValue(i) => Value::Int(*i),
            Native::DoubleValue(f) => Value::Float(*f),
            Native::TimestampValue(ts) => Value::Timestamp(timestamp_from_native(ts)?),
            Native::KeyValue(key) => Value::Key(Key::from_wire(key)?),
            Native::StringValue(s) => Value::String(s.clone()),
            Native::BlobValue(b) => Value::Blob(b.clone()),
            Native::GeoPointValue(geo) => Value::Geo(GeoPoint {
                lat: geo.latitude,
                lng: geo.longitude,
            }),
            Native::EntityValue(entity) => Value::Entity(
                entity
                    .properties
                    .iter()
                    .map(|(name, value)| Property::from_native(name, value))
                    .collect::<Result<_>>()?,
            ),
            Native::ArrayValue(array) => Value::Array(
                array
                    .values
                    .iter()
                    .map(Value::from_native)
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Convert to a protocol value. Exact inverse of [`Value::from_native`].
    pub fn to_native(&self) -> wire::Value {
        let value_type = match self {
            Value::Null => Native::NullValue(prost_types::NullValue::NullValue as i32),
            Value::Bool(b) => Native::BooleanValue(*b),
            Value::Int(i) => Native::IntegerValue(*i),
            Value::Float(f) => Native::DoubleValue(*f),
            Value::Timestamp(ts) => Native::TimestampValue(timestamp_to_native(ts)),
            Value::Key(key) => Native::KeyValue(key.to_wire()),
            Value::String(s) => Native::StringValue(s.clone()),
            Value::Blob(b) => Native::BlobValue(b.clone()),
            Value::Geo(geo) => Native::GeoPointValue(wire::LatLng {
                latitude: geo.lat,
                longitude: geo.lng,
            }),
            Value::Entity(properties) => Native::EntityValue(wire::Entity {
                key: None,
                properties: properties.iter().map(Property::to_native).collect(),
            }),
            Value::Array(values) => Native::ArrayValue(wire::ArrayValue {
                values: values.iter().map(Value::to_native).collect(),
            }),
        };
        wire::Value {
            meaning: 0,
            exclude_from_indexes: false,
            value_type: Some(value_type),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Key> for Value {
    fn from(k: Key) -> Self {
        Value::Key(k)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

fn timestamp_from_native(ts: &prost_types::Timestamp) -> Result<DateTime<Utc>> {
    u32::try_from(ts.nanos)
        .ok()
        .and_then(|nanos| DateTime::from_timestamp(ts.seconds, nanos))
        .ok_or_else(|| {
            Error::InvalidEncoding(format!(
                "timestamp out of range: {}s {}ns",
                ts.seconds, ts.nanos
            ))
        })
}

fn timestamp_to_native(ts: &DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: ts.timestamp(),
        nanos: ts.timestamp_subsec_nanos() as i32,
    }
}

// ============================================================================
// Property
// ============================================================================

/// A named value with an indexing hint.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub no_index: bool,
    pub value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Property {
            name: name.into(),
            no_index: false,
            value: value.into(),
        }
    }

    /// Same property, excluded from indexes.
    pub fn unindexed(mut self) -> Self {
        self.no_index = true;
        self
    }

    pub fn from_native(name: &str, src: &wire::Value) -> Result<Property> {
        let no_index = match &src.value_type {
            Some(Native::ArrayValue(array)) => {
                src.exclude_from_indexes || array.values.iter().any(|v| v.exclude_from_indexes)
            }
            _ => src.exclude_from_indexes,
        };
        Ok(Property {
            name: name.to_string(),
            no_index,
            value: Value::from_native(src)?,
        })
    }

    /// The protocol forbids `exclude_from_indexes` on an array value itself,
    /// so an unindexed array marks each element instead.
    pub fn to_native(&self) -> (String, wire::Value) {
        let mut native = self.value.to_native();
        if self.no_index {
            match &mut native.value_type {
                Some(Native::ArrayValue(array)) => {
                    for element in &mut array.values {
                        element.exclude_from_indexes = true;
                    }
                }
                _ => native.exclude_from_indexes = true,
            }
        }
        (self.name.clone(), native)
    }
}

/// Convert one aggregation result row (alias → value) into properties.
///
/// The row is a hash map, so the output order is unspecified.
pub fn aggregation_row_to_properties(row: &HashMap<String, wire::Value>) -> Result<Vec<Property>> {
    row.iter()
        .map(|(alias, value)| Property::from_native(alias, value))
        .collect()
}

// ============================================================================
// Entity
// ============================================================================

/// Server-side bookkeeping, only populated by the low-level lookup path.
///
/// The timestamps are absent when the server did not report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

/// A record: optional key, properties, optional metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    pub key: Option<Key>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntityMetadata>,
}

impl Entity {
    pub fn new(key: Key) -> Self {
        Entity {
            key: Some(key),
            ..Default::default()
        }
    }

    /// Append a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn from_native(src: &wire::Entity) -> Result<Entity> {
        Ok(Entity {
            key: src.key.as_ref().map(Key::from_wire).transpose()?,
            properties: src
                .properties
                .iter()
                .map(|(name, value)| Property::from_native(name, value))
                .collect::<Result<_>>()?,
            metadata: None,
        })
    }

    pub fn to_native(&self) -> wire::Entity {
        wire::Entity {
            key: self.key.as_ref().map(Key::to_wire),
            properties: self.properties.iter().map(Property::to_native).collect(),
        }
    }

    /// Entity from a lookup/query result, with its metadata attached.
    pub fn from_entity_result(src: &wire::EntityResult) -> Result<Entity> {
        let mut entity = match &src.entity {
            Some(entity) => Entity::from_native(entity)?,
            None => Entity::default(),
        };
        entity.metadata = Some(EntityMetadata::from_entity_result(src)?);
        Ok(entity)
    }
}

impl EntityMetadata {
    pub fn from_entity_result(src: &wire::EntityResult) -> Result<EntityMetadata> {
        Ok(EntityMetadata {
            version: src.version,
            create_time: src.create_time.as_ref().map(timestamp_from_native).transpose()?,
            update_time: src.update_time.as_ref().map(timestamp_from_native).transpose()?,
        })
    }
}
