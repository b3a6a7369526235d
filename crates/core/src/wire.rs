//! Datastore v1 protocol messages
//!
//! Hand-declared `prost` messages for the subset of `google.datastore.v1`
//! this crate speaks. Field numbers follow the published protocol, so the
//! binary encoding is compatible with the service and its SDKs.
//!
//! These types are the "native" side of every conversion in the crate:
//! [`crate::Key::to_wire`], [`crate::Value::to_native`],
//! [`crate::Entity::to_native`] and [`crate::Query::to_wire`].

use std::collections::{BTreeMap, HashMap};

/// Partition (project, database and namespace) a key lives in.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PartitionId {
    #[prost(string, tag = "2")]
    pub project_id: String,
    #[prost(string, tag = "3")]
    pub database_id: String,
    #[prost(string, tag = "4")]
    pub namespace_id: String,
}

/// Unique identifier of an entity: partition plus root-first path.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
    #[prost(message, optional, tag = "1")]
    pub partition_id: Option<PartitionId>,
    #[prost(message, repeated, tag = "2")]
    pub path: Vec<key::PathElement>,
}

pub mod key {
    /// One level of a key path.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PathElement {
        #[prost(string, tag = "1")]
        pub kind: String,
        #[prost(oneof = "path_element::IdType", tags = "2, 3")]
        pub id_type: Option<path_element::IdType>,
    }

    pub mod path_element {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum IdType {
            #[prost(int64, tag = "2")]
            Id(i64),
            #[prost(string, tag = "3")]
            Name(String),
        }
    }
}

/// `google.type.LatLng`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LatLng {
    #[prost(double, tag = "1")]
    pub latitude: f64,
    #[prost(double, tag = "2")]
    pub longitude: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ArrayValue {
    #[prost(message, repeated, tag = "1")]
    pub values: Vec<Value>,
}

/// A typed property value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(int32, tag = "14")]
    pub meaning: i32,
    #[prost(bool, tag = "19")]
    pub exclude_from_indexes: bool,
    #[prost(oneof = "value::ValueType", tags = "11, 1, 2, 3, 10, 5, 17, 18, 8, 6, 9")]
    pub value_type: Option<value::ValueType>,
}

pub mod value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ValueType {
        #[prost(enumeration = "::prost_types::NullValue", tag = "11")]
        NullValue(i32),
        #[prost(bool, tag = "1")]
        BooleanValue(bool),
        #[prost(int64, tag = "2")]
        IntegerValue(i64),
        #[prost(double, tag = "3")]
        DoubleValue(f64),
        #[prost(message, tag = "10")]
        TimestampValue(::prost_types::Timestamp),
        #[prost(message, tag = "5")]
        KeyValue(super::Key),
        #[prost(string, tag = "17")]
        StringValue(String),
        #[prost(bytes = "vec", tag = "18")]
        BlobValue(Vec<u8>),
        #[prost(message, tag = "8")]
        GeoPointValue(super::LatLng),
        #[prost(message, tag = "6")]
        EntityValue(super::Entity),
        #[prost(message, tag = "9")]
        ArrayValue(super::ArrayValue),
    }
}

/// An entity (or embedded entity value).
///
/// Properties are a protobuf map; a `BTreeMap` keeps iteration in name order.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entity {
    #[prost(message, optional, tag = "1")]
    pub key: Option<Key>,
    #[prost(btree_map = "string, message", tag = "3")]
    pub properties: BTreeMap<String, Value>,
}

/// Entity plus the bookkeeping fields returned by lookups and queries.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntityResult {
    #[prost(message, optional, tag = "1")]
    pub entity: Option<Entity>,
    #[prost(int64, tag = "4")]
    pub version: i64,
    #[prost(message, optional, tag = "6")]
    pub create_time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub update_time: Option<::prost_types::Timestamp>,
    #[prost(bytes = "vec", tag = "3")]
    pub cursor: Vec<u8>,
}

/// One row of an aggregation query result.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregationResult {
    #[prost(map = "string, message", tag = "2")]
    pub aggregate_properties: HashMap<String, Value>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LookupRequest {
    #[prost(string, tag = "8")]
    pub project_id: String,
    #[prost(string, tag = "9")]
    pub database_id: String,
    #[prost(message, repeated, tag = "3")]
    pub keys: Vec<Key>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LookupResponse {
    #[prost(message, repeated, tag = "1")]
    pub found: Vec<EntityResult>,
    #[prost(message, repeated, tag = "2")]
    pub missing: Vec<EntityResult>,
    #[prost(message, repeated, tag = "3")]
    pub deferred: Vec<Key>,
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Query {
    #[prost(message, repeated, tag = "2")]
    pub projection: Vec<Projection>,
    #[prost(message, repeated, tag = "3")]
    pub kind: Vec<KindExpression>,
    #[prost(message, optional, tag = "4")]
    pub filter: Option<Filter>,
    #[prost(message, repeated, tag = "5")]
    pub order: Vec<PropertyOrder>,
    #[prost(message, repeated, tag = "6")]
    pub distinct_on: Vec<PropertyReference>,
    #[prost(int32, tag = "10")]
    pub offset: i32,
    #[prost(message, optional, tag = "12")]
    pub limit: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KindExpression {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertyReference {
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Projection {
    #[prost(message, optional, tag = "1")]
    pub property: Option<PropertyReference>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertyOrder {
    #[prost(message, optional, tag = "1")]
    pub property: Option<PropertyReference>,
    #[prost(enumeration = "property_order::Direction", tag = "2")]
    pub direction: i32,
}

pub mod property_order {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Direction {
        Unspecified = 0,
        Ascending = 1,
        Descending = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Filter {
    #[prost(oneof = "filter::FilterType", tags = "1, 2")]
    pub filter_type: Option<filter::FilterType>,
}

pub mod filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum FilterType {
        #[prost(message, tag = "1")]
        CompositeFilter(super::CompositeFilter),
        #[prost(message, tag = "2")]
        PropertyFilter(super::PropertyFilter),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompositeFilter {
    #[prost(enumeration = "composite_filter::Operator", tag = "1")]
    pub op: i32,
    #[prost(message, repeated, tag = "2")]
    pub filters: Vec<Filter>,
}

pub mod composite_filter {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Operator {
        Unspecified = 0,
        And = 1,
        Or = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PropertyFilter {
    #[prost(message, optional, tag = "1")]
    pub property: Option<PropertyReference>,
    #[prost(enumeration = "property_filter::Operator", tag = "2")]
    pub op: i32,
    #[prost(message, optional, tag = "3")]
    pub value: Option<Value>,
}

pub mod property_filter {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Operator {
        Unspecified = 0,
        LessThan = 1,
        LessThanOrEqual = 2,
        GreaterThan = 3,
        GreaterThanOrEqual = 4,
        Equal = 5,
        In = 6,
        NotEqual = 9,
        HasAncestor = 11,
        NotIn = 13,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregationQuery {
    #[prost(message, optional, tag = "1")]
    pub nested_query: Option<Query>,
    #[prost(message, repeated, tag = "3")]
    pub aggregations: Vec<aggregation_query::Aggregation>,
}

pub mod aggregation_query {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Aggregation {
        #[prost(string, tag = "7")]
        pub alias: String,
        #[prost(oneof = "aggregation::Operator", tags = "1, 2, 3")]
        pub operator: Option<aggregation::Operator>,
    }

    pub mod aggregation {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Count {
            #[prost(message, optional, tag = "1")]
            pub up_to: Option<i64>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Sum {
            #[prost(message, optional, tag = "1")]
            pub property: Option<super::super::PropertyReference>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Avg {
            #[prost(message, optional, tag = "1")]
            pub property: Option<super::super::PropertyReference>,
        }

        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Operator {
            #[prost(message, tag = "1")]
            Count(Count),
            #[prost(message, tag = "2")]
            Sum(Sum),
            #[prost(message, tag = "3")]
            Avg(Avg),
        }
    }
}
