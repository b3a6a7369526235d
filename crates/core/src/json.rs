//! JSON encoding of values, properties and line streams.
//!
//! A value is an envelope with a type tag and a payload whose shape depends
//! on the tag:
//!
//! | type | value |
//! |------|-------|
//! | `array` | list of value envelopes |
//! | `blob` | standard base64 |
//! | `bool` | `true` / `false` |
//! | `timestamp` | RFC 3339, UTC, nanosecond precision |
//! | `entity` | list of property objects |
//! | `float` | number, or `"NaN"` / `"Infinity"` / `"-Infinity"` |
//! | `geo` | `{"lat": .., "lng": ..}` |
//! | `int` | number |
//! | `key` | structured key |
//! | `null` | `null` |
//! | `string` | string |
//!
//! A property is the same envelope with `name` and, when set, `noIndex`
//! flattened into it.
//!
//! Decoding cannot be structural: the payload shape is only known after the
//! tag has been read. [`decode_value`] therefore reads the envelope first and
//! the payload second, and [`decode_property`] reads the property header and
//! the value envelope independently from the same JSON object.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, DeserializeOwned};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::value::{GeoPoint, Property, Value, ValueType};

// ============================================================================
// Encoding
// ============================================================================

/// Payload half of the envelope.
struct Payload<'a>(&'a Value);

impl Serialize for Payload<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Value::Array(values) => values.serialize(serializer),
            Value::Blob(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
            Value::Entity(properties) => properties.serialize(serializer),
            Value::Float(f) if f.is_nan() => serializer.serialize_str("NaN"),
            Value::Float(f) if f.is_infinite() && *f > 0.0 => serializer.serialize_str("Infinity"),
            Value::Float(f) if f.is_infinite() => serializer.serialize_str("-Infinity"),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Geo(geo) => geo.serialize(serializer),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Key(key) => key.serialize(serializer),
            Value::Null => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.value_type().as_str())?;
        map.serialize_entry("value", &Payload(self))?;
        map.end()
    }
}

impl Serialize for Property {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.no_index { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.value.value_type().as_str())?;
        map.serialize_entry("value", &Payload(&self.value))?;
        map.serialize_entry("name", &self.name)?;
        if self.no_index {
            map.serialize_entry("noIndex", &true)?;
        }
        map.end()
    }
}

/// RFC 3339 in UTC with as many fractional digits as needed (0, 3, 6 or 9).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ============================================================================
// Decoding
// ============================================================================

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    value: JsonValue,
}

#[derive(Deserialize)]
struct PropertyHeader {
    name: String,
    #[serde(default, rename = "noIndex")]
    no_index: bool,
}

/// Decode a value envelope: tag first, then the payload by tag.
pub fn decode_value(json: JsonValue) -> Result<Value> {
    let envelope: Envelope = serde_json::from_value(json)?;
    let tag: ValueType = envelope.tag.parse()?;
    let payload = envelope.value;

    Ok(match tag {
        ValueType::Array => Value::Array(
            serde_json::from_value::<Vec<JsonValue>>(payload)?
                .into_iter()
                .map(decode_value)
                .collect::<Result<_>>()?,
        ),
        ValueType::Blob => {
            let encoded: String = serde_json::from_value(payload)?;
            Value::Blob(BASE64.decode(encoded)?)
        }
        ValueType::Bool => Value::Bool(serde_json::from_value(payload)?),
        ValueType::Timestamp => {
            Value::Timestamp(serde_json::from_value::<DateTime<Utc>>(payload)?)
        }
        ValueType::Entity => Value::Entity(
            serde_json::from_value::<Vec<JsonValue>>(payload)?
                .into_iter()
                .map(decode_property)
                .collect::<Result<_>>()?,
        ),
        ValueType::Float => Value::Float(decode_float(&payload)?),
        ValueType::Geo => Value::Geo(serde_json::from_value::<GeoPoint>(payload)?),
        ValueType::Int => Value::Int(serde_json::from_value(payload)?),
        ValueType::Key => Value::Key(serde_json::from_value::<Key>(payload)?),
        ValueType::Null => Value::Null,
        ValueType::String => Value::String(serde_json::from_value(payload)?),
    })
}

/// Decode a property: the header and the value envelope are read
/// independently from the same object.
pub fn decode_property(json: JsonValue) -> Result<Property> {
    let header = PropertyHeader::deserialize(&json)?;
    let value = decode_value(json)?;
    Ok(Property {
        name: header.name,
        no_index: header.no_index,
        value,
    })
}

fn decode_float(payload: &JsonValue) -> Result<f64> {
    match payload {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::InvalidEncoding(format!("invalid float: {}", n))),
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" | "+Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => Err(Error::InvalidEncoding(format!("invalid float: {:?}", other))),
        },
        other => Err(Error::InvalidEncoding(format!("invalid float: {}", other))),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        decode_value(json).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Property {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        decode_property(json).map_err(de::Error::custom)
    }
}

// ============================================================================
// Line streams
// ============================================================================

/// Write one JSON document followed by a newline.
pub fn write_json_line<W, T>(writer: &mut W, item: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer(&mut *writer, item)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Iterate over whitespace-separated JSON documents.
///
/// The first malformed document ends the useful part of the stream; callers
/// stop at the first `Err`.
pub fn read_json_stream<R, T>(reader: R) -> impl Iterator<Item = Result<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<T>()
        .map(|item| item.map_err(Error::from))
}
