use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::{HnswParams, VectorDistanceMetric};
use crate::error::{AvsError, Result};

/// Field map of a record, keyed by field (bin) name.
pub type RecordData = BTreeMap<String, Value>;

/// User key of a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyValue {
    Str(String),
    Int(i64),
    Bytes(Vec<u8>),
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Str(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Str(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Int(value.into())
    }
}

impl From<Vec<u8>> for KeyValue {
    fn from(value: Vec<u8>) -> Self {
        KeyValue::Bytes(value)
    }
}

impl From<&[u8]> for KeyValue {
    fn from(value: &[u8]) -> Self {
        KeyValue::Bytes(value.to_vec())
    }
}

/// Fully-qualified record key as returned by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub namespace: String,
    pub set: Option<String>,
    pub value: KeyValue,
}

/// Vector payload: dense floats or a bit vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Vector {
    Floats(Vec<f32>),
    Bools(Vec<bool>),
}

impl Vector {
    pub fn len(&self) -> usize {
        match self {
            Vector::Floats(v) => v.len(),
            Vector::Bools(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f32>> for Vector {
    fn from(value: Vec<f32>) -> Self {
        Vector::Floats(value)
    }
}

impl From<&[f32]> for Vector {
    fn from(value: &[f32]) -> Self {
        Vector::Floats(value.to_vec())
    }
}

impl From<Vec<bool>> for Vector {
    fn from(value: Vec<bool>) -> Self {
        Vector::Bools(value)
    }
}

/// A single field value stored in a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    Vector(Vector),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

/// Float lists are stored as vectors, the shape indexes expect.
impl From<Vec<f32>> for Value {
    fn from(value: Vec<f32>) -> Self {
        Value::Vector(Vector::Floats(value))
    }
}

impl From<Vector> for Value {
    fn from(value: Vector) -> Self {
        Value::Vector(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

/// Conversion from JSON documents.
///
/// Integral numbers become `Int`, others `Double`. JSON `null` has no field
/// representation and is rejected, at any depth.
impl TryFrom<serde_json::Value> for Value {
    type Error = AvsError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Ok(match value {
            serde_json::Value::Null => {
                return Err(AvsError::InvalidInput(
                    "JSON null has no field representation".into(),
                ));
            }
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_>>()?,
            ),
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| Value::try_from(v).map(|v| (k, v)))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

impl Value {
    /// Parse a JSON text into a field value.
    pub fn from_json_str(json: &str) -> Result<Value> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Value::try_from(parsed)
    }
}

/// Record returned by `get`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordWithKey {
    pub key: Key,
    pub fields: RecordData,
}

/// One ranked vector-search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub key: Key,
    pub fields: RecordData,
    pub distance: f32,
}

/// Identity of an index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexId {
    pub namespace: String,
    pub name: String,
}

impl IndexId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// Where an index keeps its own data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStorage {
    pub namespace: Option<String>,
    pub set: Option<String>,
}

/// Index metadata returned by `index_get` / `index_list`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub id: IndexId,
    pub dimensions: u32,
    pub vector_distance_metric: VectorDistanceMetric,
    pub field: String,
    pub sets: Option<String>,
    pub hnsw_params: HnswParams,
    pub storage: IndexStorage,
    pub labels: HashMap<String, String>,
}

/// Selects which record fields come back from reads and searches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    None,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

/// Write semantics for `put`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteType {
    #[default]
    Upsert,
    UpdateOnly,
    InsertOnly,
    Replace,
    ReplaceOnly,
}
