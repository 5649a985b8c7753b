//! Conversions between native SDK types and `aerospike.vector` wire messages.

use anyhow::anyhow;

use crate::config::{
    HnswBatchingParams, HnswParams, HnswSearchParams, IndexCreateConfig, VectorDistanceMetric,
};
use crate::error::{AvsError, Result};
use crate::proto;
use crate::types::{
    IndexDefinition, IndexId, IndexStorage, Key, KeyValue, Neighbor, Projection, RecordData,
    RecordWithKey, Value, Vector, WriteType,
};

// ===== Keys =====

pub fn key_to_proto(namespace: &str, set: Option<&str>, key: &KeyValue) -> proto::Key {
    let value = match key {
        KeyValue::Str(s) => proto::key::Value::StringValue(s.clone()),
        KeyValue::Int(i) => proto::key::Value::LongValue(*i),
        KeyValue::Bytes(b) => proto::key::Value::BytesValue(b.clone()),
    };
    proto::Key {
        namespace: namespace.to_string(),
        set: set.map(str::to_string),
        value: Some(value),
    }
}

pub fn key_from_proto(key: proto::Key) -> Result<Key> {
    let value = match key.value {
        Some(proto::key::Value::StringValue(s)) => KeyValue::Str(s),
        Some(proto::key::Value::BytesValue(b)) => KeyValue::Bytes(b),
        Some(proto::key::Value::IntValue(i)) => KeyValue::Int(i.into()),
        Some(proto::key::Value::LongValue(i)) => KeyValue::Int(i),
        None => return Err(malformed("key without a value")),
    };
    Ok(Key {
        namespace: key.namespace,
        set: key.set.filter(|s| !s.is_empty()),
        value,
    })
}

pub fn index_id_to_proto(id: &IndexId) -> proto::IndexId {
    proto::IndexId {
        namespace: id.namespace.clone(),
        name: id.name.clone(),
    }
}

// ===== Values =====

pub fn vector_to_proto(vector: &Vector) -> proto::Vector {
    let data = match vector {
        Vector::Floats(v) => proto::vector::Data::FloatData(proto::FloatData { value: v.clone() }),
        Vector::Bools(v) => proto::vector::Data::BoolData(proto::BoolData { value: v.clone() }),
    };
    proto::Vector { data: Some(data) }
}

pub fn vector_from_proto(vector: proto::Vector) -> Result<Vector> {
    match vector.data {
        Some(proto::vector::Data::FloatData(d)) => Ok(Vector::Floats(d.value)),
        Some(proto::vector::Data::BoolData(d)) => Ok(Vector::Bools(d.value)),
        None => Err(malformed("vector without data")),
    }
}

pub fn value_to_proto(value: &Value) -> proto::Value {
    use proto::value::Value as V;

    let inner = match value {
        Value::Bool(b) => V::BooleanValue(*b),
        Value::Int(i) => V::LongValue(*i),
        Value::Float(f) => V::FloatValue(*f),
        Value::Double(d) => V::DoubleValue(*d),
        Value::Str(s) => V::StringValue(s.clone()),
        Value::Bytes(b) => V::BytesValue(b.clone()),
        Value::Vector(v) => V::VectorValue(vector_to_proto(v)),
        Value::List(items) => V::ListValue(proto::List {
            entries: items.iter().map(value_to_proto).collect(),
        }),
        Value::Map(map) => V::MapValue(proto::Map {
            entries: map
                .iter()
                .map(|(k, v)| proto::MapEntry {
                    key: k.clone(),
                    value: Some(value_to_proto(v)),
                })
                .collect(),
        }),
    };
    proto::Value { value: Some(inner) }
}

pub fn value_from_proto(value: proto::Value) -> Result<Value> {
    use proto::value::Value as V;

    let Some(inner) = value.value else {
        return Err(malformed("value without data"));
    };
    Ok(match inner {
        V::StringValue(s) => Value::Str(s),
        V::BytesValue(b) => Value::Bytes(b),
        V::IntValue(i) => Value::Int(i.into()),
        V::LongValue(i) => Value::Int(i),
        V::FloatValue(f) => Value::Float(f),
        V::DoubleValue(d) => Value::Double(d),
        V::BooleanValue(b) => Value::Bool(b),
        V::VectorValue(v) => Value::Vector(vector_from_proto(v)?),
        V::ListValue(list) => Value::List(
            list.entries
                .into_iter()
                .map(value_from_proto)
                .collect::<Result<Vec<_>>>()?,
        ),
        V::MapValue(map) => {
            let mut out = std::collections::BTreeMap::new();
            for entry in map.entries {
                let v = entry
                    .value
                    .ok_or_else(|| malformed("map entry without value"))?;
                out.insert(entry.key, value_from_proto(v)?);
            }
            Value::Map(out)
        }
    })
}

pub fn fields_to_proto(data: &RecordData) -> Vec<proto::Field> {
    data.iter()
        .map(|(name, value)| proto::Field {
            name: name.clone(),
            value: Some(value_to_proto(value)),
        })
        .collect()
}

pub fn fields_from_proto(fields: Vec<proto::Field>) -> Result<RecordData> {
    let mut out = RecordData::new();
    for field in fields {
        let value = field
            .value
            .ok_or_else(|| malformed(&format!("field {} without value", field.name)))?;
        out.insert(field.name, value_from_proto(value)?);
    }
    Ok(out)
}

// ===== Requests =====

pub fn write_type_to_proto(write_type: WriteType) -> proto::WriteType {
    match write_type {
        WriteType::Upsert => proto::WriteType::Upsert,
        WriteType::UpdateOnly => proto::WriteType::UpdateOnly,
        WriteType::InsertOnly => proto::WriteType::InsertOnly,
        WriteType::Replace => proto::WriteType::Replace,
        WriteType::ReplaceOnly => proto::WriteType::ReplaceOnly,
    }
}

pub fn projection_to_proto(projection: &Projection) -> proto::ProjectionSpec {
    let filter = |kind: proto::ProjectionType, fields: &[String]| proto::ProjectionFilter {
        r#type: kind as i32,
        fields: fields.to_vec(),
    };
    let (include, exclude) = match projection {
        Projection::All => (
            filter(proto::ProjectionType::All, &[]),
            filter(proto::ProjectionType::None, &[]),
        ),
        Projection::None => (
            filter(proto::ProjectionType::None, &[]),
            filter(proto::ProjectionType::None, &[]),
        ),
        Projection::Include(fields) => (
            filter(proto::ProjectionType::Specified, fields),
            filter(proto::ProjectionType::None, &[]),
        ),
        Projection::Exclude(fields) => (
            filter(proto::ProjectionType::All, &[]),
            filter(proto::ProjectionType::Specified, fields),
        ),
    };
    proto::ProjectionSpec {
        include: Some(include),
        exclude: Some(exclude),
    }
}

pub fn search_params_to_proto(
    params: Option<&HnswSearchParams>,
) -> Option<proto::vector_search_request::SearchParams> {
    params.map(|p| {
        proto::vector_search_request::SearchParams::HnswSearchParams(proto::HnswSearchParams {
            ef: p.ef,
        })
    })
}

// ===== Index definitions =====

pub fn metric_to_proto(metric: VectorDistanceMetric) -> proto::VectorDistanceMetric {
    match metric {
        VectorDistanceMetric::SquaredEuclidean => proto::VectorDistanceMetric::SquaredEuclidean,
        VectorDistanceMetric::Cosine => proto::VectorDistanceMetric::Cosine,
        VectorDistanceMetric::DotProduct => proto::VectorDistanceMetric::DotProduct,
        VectorDistanceMetric::Manhattan => proto::VectorDistanceMetric::Manhattan,
        VectorDistanceMetric::Hamming => proto::VectorDistanceMetric::Hamming,
    }
}

pub fn metric_from_proto(metric: i32) -> Result<VectorDistanceMetric> {
    let metric = proto::VectorDistanceMetric::try_from(metric)
        .map_err(|_| malformed(&format!("unknown distance metric {metric}")))?;
    Ok(match metric {
        proto::VectorDistanceMetric::SquaredEuclidean => VectorDistanceMetric::SquaredEuclidean,
        proto::VectorDistanceMetric::Cosine => VectorDistanceMetric::Cosine,
        proto::VectorDistanceMetric::DotProduct => VectorDistanceMetric::DotProduct,
        proto::VectorDistanceMetric::Manhattan => VectorDistanceMetric::Manhattan,
        proto::VectorDistanceMetric::Hamming => VectorDistanceMetric::Hamming,
    })
}

pub fn hnsw_params_to_proto(params: &HnswParams) -> proto::HnswParams {
    proto::HnswParams {
        m: Some(params.m),
        ef_construction: Some(params.ef_construction),
        ef: Some(params.ef),
        batching_params: Some(proto::HnswBatchingParams {
            max_records: Some(params.batching_params.max_records),
            interval: Some(params.batching_params.interval),
            disabled: params.batching_params.disabled,
        }),
    }
}

/// Unset fields fall back to [`HnswParams::default`].
pub fn hnsw_params_from_proto(params: proto::HnswParams) -> HnswParams {
    let defaults = HnswParams::default();
    let batching = params
        .batching_params
        .map(|b| HnswBatchingParams {
            max_records: b.max_records.unwrap_or(defaults.batching_params.max_records),
            interval: b.interval.unwrap_or(defaults.batching_params.interval),
            disabled: b.disabled,
        })
        .unwrap_or(defaults.batching_params);
    HnswParams {
        m: params.m.unwrap_or(defaults.m),
        ef_construction: params.ef_construction.unwrap_or(defaults.ef_construction),
        ef: params.ef.unwrap_or(defaults.ef),
        batching_params: batching,
    }
}

pub fn index_definition_to_proto(
    id: &IndexId,
    vector_field: &str,
    dimensions: u32,
    config: &IndexCreateConfig,
) -> proto::IndexDefinition {
    proto::IndexDefinition {
        id: Some(index_id_to_proto(id)),
        r#type: proto::IndexType::Hnsw as i32,
        dimensions,
        vector_distance_metric: metric_to_proto(config.vector_distance_metric) as i32,
        field: vector_field.to_string(),
        set_filter: config.sets.clone(),
        labels: config.index_meta_data.clone(),
        storage: None,
        params: Some(proto::index_definition::Params::HnswParams(
            hnsw_params_to_proto(&config.index_params),
        )),
    }
}

pub fn index_definition_from_proto(def: proto::IndexDefinition) -> Result<IndexDefinition> {
    let id = def.id.ok_or_else(|| malformed("index definition without id"))?;
    let hnsw_params = match def.params {
        Some(proto::index_definition::Params::HnswParams(p)) => hnsw_params_from_proto(p),
        None => HnswParams::default(),
    };
    let storage = def
        .storage
        .map(|s| IndexStorage {
            namespace: s.namespace,
            set: s.set,
        })
        .unwrap_or_default();

    Ok(IndexDefinition {
        id: IndexId {
            namespace: id.namespace,
            name: id.name,
        },
        dimensions: def.dimensions,
        vector_distance_metric: metric_from_proto(def.vector_distance_metric)?,
        field: def.field,
        sets: def.set_filter,
        hnsw_params,
        storage,
        labels: def.labels,
    })
}

// ===== Responses =====

pub fn record_from_proto(key: Key, record: proto::Record) -> Result<RecordWithKey> {
    Ok(RecordWithKey {
        key,
        fields: fields_from_proto(record.fields)?,
    })
}

pub fn neighbor_from_proto(neighbor: proto::Neighbor) -> Result<Neighbor> {
    let key = neighbor
        .key
        .ok_or_else(|| malformed("neighbor without key"))?;
    let fields = match neighbor.record {
        Some(record) => fields_from_proto(record.fields)?,
        None => RecordData::new(),
    };
    Ok(Neighbor {
        key: key_from_proto(key)?,
        fields,
        distance: neighbor.distance,
    })
}

fn malformed(what: &str) -> AvsError {
    AvsError::Other(anyhow!("malformed response: {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn integer_keys_travel_as_long() {
        let key = key_to_proto("test", Some("people"), &KeyValue::Int(7));
        assert_eq!(key.value, Some(proto::key::Value::LongValue(7)));
        assert_eq!(key.set.as_deref(), Some("people"));
    }

    #[test]
    fn empty_set_on_returned_key_is_none() {
        let key = key_from_proto(proto::Key {
            namespace: "test".into(),
            set: Some(String::new()),
            value: Some(proto::key::Value::IntValue(3)),
        })
        .unwrap();
        assert_eq!(key.set, None);
        assert_eq!(key.value, KeyValue::Int(3));
    }

    #[test]
    fn key_without_value_is_rejected() {
        let err = key_from_proto(proto::Key::default()).unwrap_err();
        assert!(matches!(err, AvsError::Other(_)));
    }

    #[test]
    fn nested_values_survive_the_wire() {
        let mut inner = BTreeMap::new();
        inner.insert("lang".to_string(), Value::from("en"));
        let value = Value::List(vec![
            Value::Map(inner),
            Value::from(vec![1.0_f32, 2.0]),
            Value::Bool(true),
        ]);
        let back = value_from_proto(value_to_proto(&value)).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn projection_include_lists_fields() {
        let spec = projection_to_proto(&Projection::Include(vec!["title".into()]));
        let include = spec.include.unwrap();
        assert_eq!(include.r#type, proto::ProjectionType::Specified as i32);
        assert_eq!(include.fields, vec!["title".to_string()]);
        assert_eq!(
            spec.exclude.unwrap().r#type,
            proto::ProjectionType::None as i32
        );
    }

    #[test]
    fn sparse_hnsw_params_fill_defaults() {
        let params = hnsw_params_from_proto(proto::HnswParams {
            m: Some(32),
            ..Default::default()
        });
        assert_eq!(params.m, 32);
        assert_eq!(params.ef, 100);
        assert_eq!(params.batching_params.interval, 30_000);
    }

    #[test]
    fn index_definition_decodes() {
        let id = IndexId::new("test", "idx");
        let config = IndexCreateConfig {
            vector_distance_metric: VectorDistanceMetric::Cosine,
            ..Default::default()
        };
        let mut wire = index_definition_to_proto(&id, "science", 1024, &config);
        wire.storage = Some(proto::IndexStorage {
            namespace: Some("test".into()),
            set: Some("idx".into()),
        });

        let def = index_definition_from_proto(wire).unwrap();
        assert_eq!(def.id, id);
        assert_eq!(def.dimensions, 1024);
        assert_eq!(def.field, "science");
        assert_eq!(def.vector_distance_metric, VectorDistanceMetric::Cosine);
        assert_eq!(def.hnsw_params, HnswParams::default());
        assert_eq!(def.storage.set.as_deref(), Some("idx"));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!(metric_from_proto(99).is_err());
    }
}
