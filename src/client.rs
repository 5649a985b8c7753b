use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use tokio::sync::watch;

use crate::admin::AdminApi;
use crate::channel::ChannelConfig;
use crate::codec;
use crate::config::{ClientConfig, HnswSearchParams, HostPort, IndexCreateConfig};
use crate::error::Result;
use crate::meta::{self, IndexNames};
use crate::poll::{self, IndexCreated, IndexDeleted, IndexMerged, PollConfig};
use crate::proto;
use crate::transport::{GrpcTransport, Transport};
use crate::types::{
    IndexDefinition, IndexId, Key, KeyValue, Neighbor, Projection, RecordData, RecordWithKey,
    Vector, WriteType,
};

/// How long `index_drop` waits for the index status to disappear.
pub const DEFAULT_DROP_TIMEOUT: Duration = Duration::from_secs(100_000);

/// Builder for configuring and constructing a [`Client`].
///
/// Mirrors [`ClientConfig`] and adds the cancellation signal observed by every
/// index wait.
pub struct ClientBuilder {
    seeds: Vec<HostPort>,
    is_loadbalancer: bool,
    channel: ChannelConfig,
    cancel: Option<watch::Receiver<bool>>,
}

/// Async client for an AVS cluster.
///
/// Cloning is cheap and clones share the underlying channel. Connections are
/// released when the last clone is dropped.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Client {
    /// Build a client from a `ClientConfig`. Connects lazily.
    pub async fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = GrpcTransport::connect(&config)?;
        tracing::debug!(
            target: "avs_rs::client",
            seeds = config.seeds.len(),
            is_loadbalancer = config.is_loadbalancer,
            "Client created"
        );
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub async fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Wrap an existing transport, e.g. a test double.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            cancel: None,
        }
    }

    /// Abort index waits once `cancel` holds `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Release this handle. The channel closes once no clone is left.
    pub fn close(self) {
        tracing::debug!(target: "avs_rs::client", "Client closed");
    }

    // ---- Records ----

    /// Write a record, creating or updating it.
    pub async fn put(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.put_with(namespace, key, record_data, set_name, WriteType::Upsert)
            .await
    }

    pub async fn upsert(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.put_with(namespace, key, record_data, set_name, WriteType::Upsert)
            .await
    }

    /// Write a record that must not exist yet.
    pub async fn insert(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.put_with(namespace, key, record_data, set_name, WriteType::InsertOnly)
            .await
    }

    /// Update fields of a record that must already exist.
    pub async fn update(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
    ) -> Result<()> {
        self.put_with(namespace, key, record_data, set_name, WriteType::UpdateOnly)
            .await
    }

    pub async fn put_with(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        record_data: RecordData,
        set_name: Option<&str>,
        write_type: WriteType,
    ) -> Result<()> {
        meta::validate_namespace(namespace)?;
        let request = proto::PutRequest {
            key: Some(codec::key_to_proto(namespace, set_name, &key.into())),
            write_type: codec::write_type_to_proto(write_type) as i32,
            fields: codec::fields_to_proto(&record_data),
        };
        self.transport.put(request).await
    }

    pub async fn get(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        projection: Projection,
        set_name: Option<&str>,
    ) -> Result<RecordWithKey> {
        meta::validate_namespace(namespace)?;
        let key = Key {
            namespace: namespace.to_string(),
            set: set_name.map(str::to_string),
            value: key.into(),
        };
        let request = proto::GetRequest {
            key: Some(codec::key_to_proto(namespace, set_name, &key.value)),
            projection_spec: Some(codec::projection_to_proto(&projection)),
        };
        let record = self.transport.get(request).await?;
        codec::record_from_proto(key, record)
    }

    pub async fn exists(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        set_name: Option<&str>,
    ) -> Result<bool> {
        meta::validate_namespace(namespace)?;
        let request = proto::ExistsRequest {
            key: Some(codec::key_to_proto(namespace, set_name, &key.into())),
        };
        self.transport.exists(request).await
    }

    pub async fn delete(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        set_name: Option<&str>,
    ) -> Result<()> {
        meta::validate_namespace(namespace)?;
        let request = proto::DeleteRequest {
            key: Some(codec::key_to_proto(namespace, set_name, &key.into())),
        };
        self.transport.delete(request).await
    }

    /// Whether the record has been merged into the index. The index lives in
    /// `namespace` unless `index_namespace` says otherwise.
    pub async fn is_indexed(
        &self,
        namespace: &str,
        key: impl Into<KeyValue>,
        index_name: &str,
        index_namespace: Option<&str>,
        set_name: Option<&str>,
    ) -> Result<bool> {
        let index = IndexId::new(index_namespace.unwrap_or(namespace), index_name);
        IndexNames::validate(&index)?;
        meta::validate_namespace(namespace)?;
        let request = proto::IsIndexedRequest {
            key: Some(codec::key_to_proto(namespace, set_name, &key.into())),
            index_id: Some(codec::index_id_to_proto(&index)),
        };
        self.transport.is_indexed(request).await
    }

    /// Nearest neighbors of `query`, closest first.
    ///
    /// The server streams results in rank order; they are returned in that
    /// order and never more than `limit` of them.
    pub async fn vector_search(
        &self,
        namespace: &str,
        index_name: &str,
        query: impl Into<Vector>,
        limit: u32,
        search_params: Option<HnswSearchParams>,
        projection: Projection,
    ) -> Result<Vec<Neighbor>> {
        let index = IndexId::new(namespace, index_name);
        IndexNames::validate(&index)?;
        let query = query.into();
        meta::validate_search(&query, limit)?;

        let request = proto::VectorSearchRequest {
            index: Some(codec::index_id_to_proto(&index)),
            query_vector: Some(codec::vector_to_proto(&query)),
            limit,
            projection: Some(codec::projection_to_proto(&projection)),
            search_params: codec::search_params_to_proto(search_params.as_ref()),
        };
        let stream = self.transport.vector_search(request).await?;
        stream
            .take(limit as usize)
            .map(|item| item.and_then(codec::neighbor_from_proto))
            .try_collect()
            .await
    }

    // ---- Index waits ----

    /// Wait until the server publishes status for the index.
    pub async fn wait_for_index_creation(&self, id: &IndexId, config: PollConfig) -> Result<()> {
        let wire = codec::index_id_to_proto(id);
        poll::await_condition(
            || self.transport.index_get_status(wire.clone()),
            &IndexCreated,
            config,
            self.cancel.clone(),
        )
        .await
    }

    /// Wait until the server no longer serves status for the index.
    pub async fn wait_for_index_deletion(&self, id: &IndexId, config: PollConfig) -> Result<()> {
        let wire = codec::index_id_to_proto(id);
        poll::await_condition(
            || self.transport.index_get_status(wire.clone()),
            &IndexDeleted,
            config,
            self.cancel.clone(),
        )
        .await
    }

    /// Wait until every written record has been merged into the index.
    pub async fn wait_for_index_merge(&self, id: &IndexId, config: PollConfig) -> Result<()> {
        let wire = codec::index_id_to_proto(id);
        poll::await_condition(
            || self.transport.index_get_status(wire.clone()),
            &IndexMerged,
            config,
            self.cancel.clone(),
        )
        .await
    }

    // ---- Internal admin helpers (shared by inherent & trait impl) ----

    async fn index_create_impl(
        &self,
        namespace: &str,
        name: &str,
        vector_field: &str,
        dimensions: u32,
        config: IndexCreateConfig,
    ) -> Result<()> {
        let id = IndexId::new(namespace, name);
        IndexNames::validate(&id)?;
        meta::validate_dimensions(dimensions)?;

        let definition = codec::index_definition_to_proto(&id, vector_field, dimensions, &config);
        self.transport.index_create(definition).await?;
        tracing::debug!(target: "avs_rs::client", namespace, name, dimensions, "Index create requested");

        self.wait_for_index_creation(
            &id,
            PollConfig::create_delete().with_timeout(config.wait_timeout),
        )
        .await
    }

    async fn index_drop_impl(&self, namespace: &str, name: &str) -> Result<()> {
        let id = IndexId::new(namespace, name);
        IndexNames::validate(&id)?;

        self.transport
            .index_drop(codec::index_id_to_proto(&id))
            .await?;
        tracing::debug!(target: "avs_rs::client", namespace, name, "Index drop requested");

        self.wait_for_index_deletion(
            &id,
            PollConfig::create_delete().with_timeout(DEFAULT_DROP_TIMEOUT),
        )
        .await
    }

    async fn index_list_impl(&self) -> Result<Vec<IndexDefinition>> {
        self.transport
            .index_list()
            .await?
            .into_iter()
            .map(codec::index_definition_from_proto)
            .collect()
    }

    async fn index_get_impl(&self, namespace: &str, name: &str) -> Result<IndexDefinition> {
        let id = IndexId::new(namespace, name);
        IndexNames::validate(&id)?;
        let definition = self
            .transport
            .index_get(codec::index_id_to_proto(&id))
            .await?;
        codec::index_definition_from_proto(definition)
    }

    async fn index_get_status_impl(&self, namespace: &str, name: &str) -> Result<i64> {
        let id = IndexId::new(namespace, name);
        IndexNames::validate(&id)?;
        self.transport
            .index_get_status(codec::index_id_to_proto(&id))
            .await
    }

    async fn wait_for_index_completion_impl(
        &self,
        namespace: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let id = IndexId::new(namespace, name);
        IndexNames::validate(&id)?;
        let mut config = PollConfig::merge();
        if let Some(timeout) = timeout {
            config = config.with_timeout(timeout);
        }
        self.wait_for_index_merge(&id, config).await
    }

    // Optional ergonomic inherent methods matching AdminApi for direct calls.

    /// Create an HNSW index and wait until the server reports it.
    pub async fn index_create(
        &self,
        namespace: &str,
        name: &str,
        vector_field: &str,
        dimensions: u32,
        config: IndexCreateConfig,
    ) -> Result<()> {
        self.index_create_impl(namespace, name, vector_field, dimensions, config)
            .await
    }

    /// Drop an index and wait until the server stops reporting it.
    pub async fn index_drop(&self, namespace: &str, name: &str) -> Result<()> {
        self.index_drop_impl(namespace, name).await
    }

    pub async fn index_list(&self) -> Result<Vec<IndexDefinition>> {
        self.index_list_impl().await
    }

    pub async fn index_get(&self, namespace: &str, name: &str) -> Result<IndexDefinition> {
        self.index_get_impl(namespace, name).await
    }

    /// Number of records not yet merged into the index.
    pub async fn index_get_status(&self, namespace: &str, name: &str) -> Result<i64> {
        self.index_get_status_impl(namespace, name).await
    }

    /// Wait for pending records to be merged. `None` waits without a deadline.
    pub async fn wait_for_index_completion(
        &self,
        namespace: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.wait_for_index_completion_impl(namespace, name, timeout)
            .await
    }
}

#[async_trait]
impl AdminApi for Client {
    async fn index_create(
        &self,
        namespace: &str,
        name: &str,
        vector_field: &str,
        dimensions: u32,
        config: IndexCreateConfig,
    ) -> Result<()> {
        self.index_create_impl(namespace, name, vector_field, dimensions, config)
            .await
    }

    async fn index_drop(&self, namespace: &str, name: &str) -> Result<()> {
        self.index_drop_impl(namespace, name).await
    }

    async fn index_list(&self) -> Result<Vec<IndexDefinition>> {
        self.index_list_impl().await
    }

    async fn index_get(&self, namespace: &str, name: &str) -> Result<IndexDefinition> {
        self.index_get_impl(namespace, name).await
    }

    async fn index_get_status(&self, namespace: &str, name: &str) -> Result<i64> {
        self.index_get_status_impl(namespace, name).await
    }

    async fn wait_for_index_completion(
        &self,
        namespace: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.wait_for_index_completion_impl(namespace, name, timeout)
            .await
    }
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            seeds: Vec::new(),
            is_loadbalancer: false,
            channel: ChannelConfig::default(),
            cancel: None,
        }
    }

    /// Populate the builder from `AVS_*` environment variables using
    /// [`ClientConfig::from_env`]. Individual fields can still be overridden
    /// afterwards via the other builder methods.
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Ok(Self {
            seeds: config.seeds,
            is_loadbalancer: config.is_loadbalancer,
            channel: config.channel,
            cancel: None,
        })
    }

    /// Add a seed node.
    pub fn seed(mut self, host: impl Into<String>, port: u16) -> Self {
        self.seeds.push(HostPort::new(host, port));
        self
    }

    pub fn seeds(mut self, seeds: impl IntoIterator<Item = HostPort>) -> Self {
        self.seeds.extend(seeds);
        self
    }

    pub fn load_balancer(mut self, is_loadbalancer: bool) -> Self {
        self.is_loadbalancer = is_loadbalancer;
        self
    }

    pub fn channel_config(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.channel = self.channel.with_connect_timeout(timeout);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.channel = self.channel.with_request_timeout(timeout);
        self
    }

    pub fn cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn into_parts(self) -> (ClientConfig, Option<watch::Receiver<bool>>) {
        let config = ClientConfig {
            seeds: self.seeds,
            is_loadbalancer: self.is_loadbalancer,
            channel: self.channel,
        };
        (config, self.cancel)
    }

    /// Build a [`Client`] using the current builder configuration.
    pub async fn build(self) -> Result<Client> {
        let (config, cancel) = self.into_parts();
        let client = Client::from_config(config).await?;
        Ok(match cancel {
            Some(cancel) => client.with_cancellation(cancel),
            None => client,
        })
    }
}
