use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::channel::ChannelConfig;
use crate::client::{Client, ClientBuilder};
use crate::config::{ClientConfig, HnswSearchParams, HostPort, IndexCreateConfig};
use crate::error::{AvsError, Result};
use crate::poll::PollConfig;
use crate::transport::Transport;
use crate::types::{
    IndexDefinition, IndexId, KeyValue, Neighbor, Projection, RecordData, RecordWithKey, Vector,
    WriteType,
};

/// Shared inner state for synchronous wrappers.
///
/// Holds the underlying async `Client` and the Tokio runtime that drives it.
/// The client is declared first so its channel is dropped while the runtime
/// is still alive.
struct Inner {
    client: Client,
    rt: tokio::runtime::Runtime,
}

/// Blocking/synchronous wrapper around [`Client`].
///
/// This type is only available when the `sync` feature is enabled. It runs all
/// operations on an internal Tokio runtime using `block_on`, so index waits
/// occupy the calling thread for their full duration, sleeps included.
///
/// Note: do not call these blocking APIs from within an existing Tokio runtime,
/// as that can lead to deadlocks. In async contexts, use the async
/// [`Client`] APIs directly instead.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<Inner>,
}

fn new_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| AvsError::Other(anyhow::Error::new(e)))
}

impl SyncClient {
    /// Build a synchronous client from a [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let rt = new_runtime()?;
        let client = rt.block_on(Client::from_config(config))?;
        Ok(Self::from_parts(client, rt))
    }

    /// Build a synchronous client from environment variables.
    pub fn from_env() -> Result<Self> {
        let rt = new_runtime()?;
        let client = rt.block_on(Client::from_env())?;
        Ok(Self::from_parts(client, rt))
    }

    /// Wrap an existing transport, e.g. a test double.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self> {
        let rt = new_runtime()?;
        Ok(Self::from_parts(Client::with_transport(transport), rt))
    }

    /// Start building a [`SyncClient`] using a fluent builder API.
    pub fn builder() -> SyncClientBuilder {
        SyncClientBuilder::new()
    }

    fn from_parts(client: Client, rt: tokio::runtime::Runtime) -> Self {
        Self {
            inner: Arc::new(Inner { client, rt }),
        }
    }

    /// The async client driven by this wrapper.
    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Release this handle. The runtime and channel shut down once no clone
    /// is left.
    pub fn close(self) {
        tracing::debug!(target: "avs_rs::sync", "Sync client closed");
    }

    // Records

    pub fn put(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.put(namespace, key, record_data, set_name))
    }

    pub fn upsert(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.upsert(namespace, key, record_data, set_name))
    }

    pub fn insert(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.insert(namespace, key, record_data, set_name))
    }

    pub fn update(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.update(namespace, key, record_data, set_name))
    }

    pub fn put_with(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
        write_type: WriteType,
    ) -> Result<()> {
        self.inner.rt.block_on(self.inner.client.put_with(
            namespace,
            key,
            record_data,
            set_name,
            write_type,
        ))
    }

    pub fn get(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        projection: Projection,
        set_name: Option<&str>,
    ) -> Result<RecordWithKey> {
        self.inner
            .rt
            .block_on(self.inner.client.get(namespace, key, projection, set_name))
    }

    pub fn exists(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        set_name: Option<&str>,
    ) -> Result<bool> {
        self.inner
            .rt
            .block_on(self.inner.client.exists(namespace, key, set_name))
    }

    pub fn delete(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.delete(namespace, key, set_name))
    }

    pub fn is_indexed(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        index_name: &str,
        index_namespace: Option<&str>,
        set_name: Option<&str>,
    ) -> Result<bool> {
        self.inner.rt.block_on(self.inner.client.is_indexed(
            namespace,
            key,
            index_name,
            index_namespace,
            set_name,
        ))
    }

    pub fn vector_search(
        &self,
        namespace: &str,
        index_name: &str,
        query: impl Into<Vector>,
        limit: u32,
        search_params: Option<HnswSearchParams>,
        projection: Projection,
    ) -> Result<Vec<Neighbor>> {
        self.inner.rt.block_on(self.inner.client.vector_search(
            namespace,
            index_name,
            query,
            limit,
            search_params,
            projection,
        ))
    }

    // Index management

    pub fn index_create(
        &self,
        namespace: &str,
        name: &str,
        vector_field: &str,
        dimensions: u32,
        config: IndexCreateConfig,
    ) -> Result<()> {
        self.inner.rt.block_on(self.inner.client.index_create(
            namespace,
            name,
            vector_field,
            dimensions,
            config,
        ))
    }

    pub fn index_drop(&self, namespace: &str, name: &str) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.index_drop(namespace, name))
    }

    pub fn index_list(&self) -> Result<Vec<IndexDefinition>> {
        self.inner.rt.block_on(self.inner.client.index_list())
    }

    pub fn index_get(&self, namespace: &str, name: &str) -> Result<IndexDefinition> {
        self.inner
            .rt
            .block_on(self.inner.client.index_get(namespace, name))
    }

    pub fn index_get_status(&self, namespace: &str, name: &str) -> Result<i64> {
        self.inner
            .rt
            .block_on(self.inner.client.index_get_status(namespace, name))
    }

    pub fn wait_for_index_completion(
        &self,
        namespace: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.inner.rt.block_on(
            self.inner
                .client
                .wait_for_index_completion(namespace, name, timeout),
        )
    }

    pub fn wait_for_index_creation(&self, id: &IndexId, config: PollConfig) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.wait_for_index_creation(id, config))
    }

    pub fn wait_for_index_deletion(&self, id: &IndexId, config: PollConfig) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.wait_for_index_deletion(id, config))
    }
}

/// Builder for constructing a [`SyncClient`].
pub struct SyncClientBuilder {
    inner: ClientBuilder,
}

impl SyncClientBuilder {
    fn new() -> Self {
        Self {
            inner: Client::builder(),
        }
    }

    /// Populate the builder from `AVS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            inner: ClientBuilder::from_env()?,
        })
    }

    pub fn seed(mut self, host: impl Into<String>, port: u16) -> Self {
        self.inner = self.inner.seed(host, port);
        self
    }

    pub fn seeds(mut self, seeds: impl IntoIterator<Item = HostPort>) -> Self {
        self.inner = self.inner.seeds(seeds);
        self
    }

    pub fn load_balancer(mut self, is_loadbalancer: bool) -> Self {
        self.inner = self.inner.load_balancer(is_loadbalancer);
        self
    }

    pub fn channel_config(mut self, channel: ChannelConfig) -> Self {
        self.inner = self.inner.channel_config(channel);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.connect_timeout(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.request_timeout(timeout);
        self
    }

    pub fn cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.inner = self.inner.cancellation(cancel);
        self
    }

    /// Build a [`SyncClient`] using the current builder configuration.
    pub fn build(self) -> Result<SyncClient> {
        let rt = new_runtime()?;
        let client = rt.block_on(self.inner.build())?;
        Ok(SyncClient::from_parts(client, rt))
    }
}
