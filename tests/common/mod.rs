#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use avs_rs::proto;
use avs_rs::{AvsError, ClientConfig, NeighborStream, Result, Transport};
use futures::StreamExt;

/// Load ClientConfig from environment when `AVS_INTEGRATION=1` is set.
/// Returns None and prints a SKIP message otherwise.
pub fn load_config_for_integration() -> Option<ClientConfig> {
    if std::env::var("AVS_INTEGRATION").ok().as_deref() != Some("1") {
        eprintln!("SKIP: set AVS_INTEGRATION=1 and AVS_* env vars to run integration tests");
        return None;
    }
    ClientConfig::from_env().ok()
}

/// Namespace used by integration tests, `AVS_NAMESPACE` or `test`.
pub fn namespace() -> String {
    std::env::var("AVS_NAMESPACE").unwrap_or_else(|_| "test".to_string())
}

/// Millisecond timestamp string used to make index names unique.
pub fn ts_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    ts.to_string()
}

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One scripted answer to a status query.
#[derive(Clone, Debug)]
pub enum Reply {
    Count(i64),
    NotFound,
    Unavailable,
    Fatal(tonic::Code),
}

impl Reply {
    fn into_result(self) -> Result<i64> {
        match self {
            Reply::Count(n) => Ok(n),
            Reply::NotFound => Err(AvsError::NotFound("index status not found".into())),
            Reply::Unavailable => Err(AvsError::Unavailable("node unavailable".into())),
            Reply::Fatal(code) => Err(AvsError::Server {
                code,
                message: "scripted failure".into(),
            }),
        }
    }
}

/// In-memory transport: records live in a map, index status answers come from
/// a script whose last entry repeats forever.
#[derive(Default)]
pub struct FakeTransport {
    status_script: Mutex<VecDeque<Reply>>,
    records: Mutex<HashMap<String, Vec<proto::Field>>>,
    indexes: Mutex<Vec<proto::IndexDefinition>>,
    neighbors: Vec<proto::Neighbor>,
    pub status_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub drop_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(replies: impl IntoIterator<Item = Reply>) -> Self {
        let fake = Self::default();
        fake.status_script.lock().unwrap().extend(replies);
        fake
    }

    /// Neighbors the server streams back, in the given order.
    pub fn with_neighbors(mut self, neighbors: Vec<proto::Neighbor>) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> Result<i64> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.status_script.lock().unwrap();
        let reply = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        reply.unwrap_or(Reply::Count(0)).into_result()
    }
}

pub fn neighbor(id: i64, distance: f32) -> proto::Neighbor {
    proto::Neighbor {
        key: Some(proto::Key {
            namespace: "test".into(),
            set: None,
            value: Some(proto::key::Value::LongValue(id)),
        }),
        record: Some(proto::Record::default()),
        distance,
    }
}

fn record_key(key: Option<&proto::Key>) -> Result<String> {
    key.map(|k| format!("{k:?}"))
        .ok_or_else(|| AvsError::InvalidInput("request without key".into()))
}

#[async_trait]
impl Transport for FakeTransport {
    async fn put(&self, request: proto::PutRequest) -> Result<()> {
        let key = record_key(request.key.as_ref())?;
        let mut records = self.records.lock().unwrap();
        let exists = records.contains_key(&key);
        match proto::WriteType::try_from(request.write_type) {
            Ok(proto::WriteType::InsertOnly) if exists => Err(AvsError::Server {
                code: tonic::Code::AlreadyExists,
                message: "record exists".into(),
            }),
            Ok(proto::WriteType::UpdateOnly | proto::WriteType::ReplaceOnly) if !exists => {
                Err(AvsError::NotFound("record not found".into()))
            }
            Ok(proto::WriteType::UpdateOnly | proto::WriteType::Upsert) if exists => {
                let fields = records.entry(key).or_default();
                for field in request.fields {
                    fields.retain(|f| f.name != field.name);
                    fields.push(field);
                }
                Ok(())
            }
            Ok(_) => {
                records.insert(key, request.fields);
                Ok(())
            }
            Err(_) => Err(AvsError::Server {
                code: tonic::Code::InvalidArgument,
                message: "unknown write type".into(),
            }),
        }
    }

    async fn get(&self, request: proto::GetRequest) -> Result<proto::Record> {
        let key = record_key(request.key.as_ref())?;
        self.records
            .lock()
            .unwrap()
            .get(&key)
            .map(|fields| proto::Record {
                fields: fields.clone(),
            })
            .ok_or_else(|| AvsError::NotFound("record not found".into()))
    }

    async fn exists(&self, request: proto::ExistsRequest) -> Result<bool> {
        let key = record_key(request.key.as_ref())?;
        Ok(self.records.lock().unwrap().contains_key(&key))
    }

    async fn delete(&self, request: proto::DeleteRequest) -> Result<()> {
        let key = record_key(request.key.as_ref())?;
        self.records.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn is_indexed(&self, request: proto::IsIndexedRequest) -> Result<bool> {
        let key = record_key(request.key.as_ref())?;
        Ok(self.records.lock().unwrap().contains_key(&key))
    }

    async fn vector_search(&self, _request: proto::VectorSearchRequest) -> Result<NeighborStream> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<proto::Neighbor>> = self.neighbors.iter().cloned().map(Ok).collect();
        Ok(futures::stream::iter(items).boxed())
    }

    async fn index_create(&self, definition: proto::IndexDefinition) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.indexes.lock().unwrap().push(definition);
        Ok(())
    }

    async fn index_drop(&self, id: proto::IndexId) -> Result<()> {
        self.drop_calls.fetch_add(1, Ordering::SeqCst);
        self.indexes
            .lock()
            .unwrap()
            .retain(|def| def.id.as_ref() != Some(&id));
        Ok(())
    }

    async fn index_list(&self) -> Result<Vec<proto::IndexDefinition>> {
        Ok(self.indexes.lock().unwrap().clone())
    }

    async fn index_get(&self, id: proto::IndexId) -> Result<proto::IndexDefinition> {
        self.indexes
            .lock()
            .unwrap()
            .iter()
            .find(|def| def.id.as_ref() == Some(&id))
            .cloned()
            .ok_or_else(|| AvsError::NotFound(format!("index {} not found", id.name)))
    }

    async fn index_get_status(&self, _id: proto::IndexId) -> Result<i64> {
        self.next_status()
    }
}
