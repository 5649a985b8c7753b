//! Aerospike Vector Search Rust SDK.
//!
//! Record reads and writes, vector similarity search and index
//! administration over gRPC. Long-running index operations (creation,
//! deletion, merge completion) are awaited by polling the server; see
//! [`poll`].

mod codec;

pub mod admin;
pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod meta;
pub mod poll;
pub mod proto;
#[cfg(feature = "sync")]
pub mod sync;
pub mod transport;
pub mod types;

pub use crate::admin::{AdminApi, AdminClient};
pub use crate::channel::ChannelConfig;
pub use crate::client::{Client, ClientBuilder};
pub use crate::config::{
    ClientConfig, HnswBatchingParams, HnswParams, HnswSearchParams, HostPort, IndexCreateConfig,
    VectorDistanceMetric,
};
pub use crate::error::{AvsError, Result};
pub use crate::poll::{PollConfig, PollOutcome};
pub use crate::transport::{GrpcTransport, NeighborStream, Transport};
pub use crate::types::{
    IndexDefinition, IndexId, IndexStorage, Key, KeyValue, Neighbor, Projection, RecordData,
    RecordWithKey, Value, Vector, WriteType,
};

#[cfg(feature = "sync")]
pub use crate::sync::{SyncClient, SyncClientBuilder};
