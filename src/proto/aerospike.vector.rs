// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
    #[prost(string, tag = "1")]
    pub namespace: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "2")]
    pub set: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(oneof = "key::Value", tags = "3, 4, 5, 6")]
    pub value: ::core::option::Option<key::Value>,
}
/// Nested message and enum types in `Key`.
pub mod key {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "3")]
        StringValue(::prost::alloc::string::String),
        #[prost(bytes = "vec", tag = "4")]
        BytesValue(::prost::alloc::vec::Vec<u8>),
        #[prost(int32, tag = "5")]
        IntValue(i32),
        #[prost(int64, tag = "6")]
        LongValue(i64),
    }
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Boolean {
    #[prost(bool, tag = "1")]
    pub value: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexId {
    #[prost(string, tag = "1")]
    pub namespace: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatData {
    #[prost(float, repeated, tag = "1")]
    pub value: ::prost::alloc::vec::Vec<f32>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoolData {
    #[prost(bool, repeated, tag = "1")]
    pub value: ::prost::alloc::vec::Vec<bool>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Vector {
    #[prost(oneof = "vector::Data", tags = "1, 2")]
    pub data: ::core::option::Option<vector::Data>,
}
/// Nested message and enum types in `Vector`.
pub mod vector {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "1")]
        FloatData(super::FloatData),
        #[prost(message, tag = "2")]
        BoolData(super::BoolData),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapEntry {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub value: ::core::option::Option<Value>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Map {
    #[prost(message, repeated, tag = "1")]
    pub entries: ::prost::alloc::vec::Vec<MapEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct List {
    #[prost(message, repeated, tag = "1")]
    pub entries: ::prost::alloc::vec::Vec<Value>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(oneof = "value::Value", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10")]
    pub value: ::core::option::Option<value::Value>,
}
/// Nested message and enum types in `Value`.
pub mod value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        StringValue(::prost::alloc::string::String),
        #[prost(bytes = "vec", tag = "2")]
        BytesValue(::prost::alloc::vec::Vec<u8>),
        #[prost(int32, tag = "3")]
        IntValue(i32),
        #[prost(int64, tag = "4")]
        LongValue(i64),
        #[prost(float, tag = "5")]
        FloatValue(f32),
        #[prost(double, tag = "6")]
        DoubleValue(f64),
        #[prost(message, tag = "7")]
        MapValue(super::Map),
        #[prost(message, tag = "8")]
        ListValue(super::List),
        #[prost(message, tag = "9")]
        VectorValue(super::Vector),
        #[prost(bool, tag = "10")]
        BooleanValue(bool),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Field {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub value: ::core::option::Option<Value>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Record {
    #[prost(message, repeated, tag = "1")]
    pub fields: ::prost::alloc::vec::Vec<Field>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Neighbor {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<Key>,
    #[prost(message, optional, tag = "2")]
    pub record: ::core::option::Option<Record>,
    #[prost(float, tag = "3")]
    pub distance: f32,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct HnswSearchParams {
    #[prost(uint32, optional, tag = "1")]
    pub ef: ::core::option::Option<u32>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct HnswBatchingParams {
    #[prost(uint32, optional, tag = "1")]
    pub max_records: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub interval: ::core::option::Option<u32>,
    #[prost(bool, tag = "3")]
    pub disabled: bool,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct HnswParams {
    #[prost(uint32, optional, tag = "1")]
    pub m: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub ef_construction: ::core::option::Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub ef: ::core::option::Option<u32>,
    #[prost(message, optional, tag = "4")]
    pub batching_params: ::core::option::Option<HnswBatchingParams>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexStorage {
    #[prost(string, optional, tag = "1")]
    pub namespace: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "2")]
    pub set: ::core::option::Option<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexDefinition {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<IndexId>,
    #[prost(enumeration = "IndexType", tag = "2")]
    pub r#type: i32,
    #[prost(uint32, tag = "3")]
    pub dimensions: u32,
    #[prost(enumeration = "VectorDistanceMetric", tag = "4")]
    pub vector_distance_metric: i32,
    #[prost(string, tag = "5")]
    pub field: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "6")]
    pub set_filter: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(map = "string, string", tag = "8")]
    pub labels: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        ::prost::alloc::string::String,
    >,
    #[prost(message, optional, tag = "9")]
    pub storage: ::core::option::Option<IndexStorage>,
    #[prost(oneof = "index_definition::Params", tags = "7")]
    pub params: ::core::option::Option<index_definition::Params>,
}
/// Nested message and enum types in `IndexDefinition`.
pub mod index_definition {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
    pub enum Params {
        #[prost(message, tag = "7")]
        HnswParams(super::HnswParams),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IndexDefinitionList {
    #[prost(message, repeated, tag = "1")]
    pub indices: ::prost::alloc::vec::Vec<IndexDefinition>,
}
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IndexStatusResponse {
    #[prost(int64, tag = "1")]
    pub unmerged_record_count: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRequest {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<Key>,
    #[prost(enumeration = "WriteType", tag = "2")]
    pub write_type: i32,
    #[prost(message, repeated, tag = "3")]
    pub fields: ::prost::alloc::vec::Vec<Field>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRequest {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<Key>,
    #[prost(message, optional, tag = "2")]
    pub projection_spec: ::core::option::Option<ProjectionSpec>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExistsRequest {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<Key>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRequest {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<Key>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IsIndexedRequest {
    #[prost(message, optional, tag = "1")]
    pub key: ::core::option::Option<Key>,
    #[prost(message, optional, tag = "2")]
    pub index_id: ::core::option::Option<IndexId>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectionFilter {
    #[prost(enumeration = "ProjectionType", tag = "1")]
    pub r#type: i32,
    #[prost(string, repeated, tag = "2")]
    pub fields: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectionSpec {
    #[prost(message, optional, tag = "1")]
    pub include: ::core::option::Option<ProjectionFilter>,
    #[prost(message, optional, tag = "2")]
    pub exclude: ::core::option::Option<ProjectionFilter>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorSearchRequest {
    #[prost(message, optional, tag = "1")]
    pub index: ::core::option::Option<IndexId>,
    #[prost(message, optional, tag = "2")]
    pub query_vector: ::core::option::Option<Vector>,
    #[prost(uint32, tag = "3")]
    pub limit: u32,
    #[prost(message, optional, tag = "4")]
    pub projection: ::core::option::Option<ProjectionSpec>,
    #[prost(oneof = "vector_search_request::SearchParams", tags = "5")]
    pub search_params: ::core::option::Option<vector_search_request::SearchParams>,
}
/// Nested message and enum types in `VectorSearchRequest`.
pub mod vector_search_request {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
    pub enum SearchParams {
        #[prost(message, tag = "5")]
        HnswSearchParams(super::HnswSearchParams),
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum VectorDistanceMetric {
    SquaredEuclidean = 0,
    Cosine = 1,
    DotProduct = 2,
    Manhattan = 3,
    Hamming = 4,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IndexType {
    Hnsw = 0,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum WriteType {
    Upsert = 0,
    UpdateOnly = 1,
    InsertOnly = 2,
    Replace = 3,
    ReplaceOnly = 4,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProjectionType {
    All = 0,
    None = 1,
    Specified = 2,
}
include!("aerospike.vector.tonic.rs");
