//! Wire seam between the client facade and the AVS gRPC services.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use tonic::transport::Channel;

use crate::channel::create_channel;
use crate::config::ClientConfig;
use crate::error::{AvsError, Result};
use crate::proto;
use crate::proto::index_service_client::IndexServiceClient;
use crate::proto::transact_client::TransactClient;

/// Ordered neighbors streamed back by a vector search.
pub type NeighborStream = BoxStream<'static, Result<proto::Neighbor>>;

/// One method per RPC. Implementations must be shareable across tasks and
/// must not serialize concurrent calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn put(&self, request: proto::PutRequest) -> Result<()>;

    async fn get(&self, request: proto::GetRequest) -> Result<proto::Record>;

    async fn exists(&self, request: proto::ExistsRequest) -> Result<bool>;

    async fn delete(&self, request: proto::DeleteRequest) -> Result<()>;

    async fn is_indexed(&self, request: proto::IsIndexedRequest) -> Result<bool>;

    async fn vector_search(&self, request: proto::VectorSearchRequest) -> Result<NeighborStream>;

    async fn index_create(&self, definition: proto::IndexDefinition) -> Result<()>;

    async fn index_drop(&self, id: proto::IndexId) -> Result<()>;

    async fn index_list(&self) -> Result<Vec<proto::IndexDefinition>>;

    async fn index_get(&self, id: proto::IndexId) -> Result<proto::IndexDefinition>;

    /// Number of records written but not yet merged into the index.
    async fn index_get_status(&self, id: proto::IndexId) -> Result<i64>;
}

/// [`Transport`] over a shared tonic channel.
///
/// Generated clients are cheap handles onto the channel, so each call works on
/// its own clone and no lock is held across a round trip.
#[derive(Clone, Debug)]
pub struct GrpcTransport {
    transact: TransactClient<Channel>,
    index: IndexServiceClient<Channel>,
}

impl GrpcTransport {
    /// Build a lazily connecting transport. Must be called inside a tokio runtime.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let channel = create_channel(&config.seeds, config.is_loadbalancer, &config.channel)?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            transact: TransactClient::new(channel.clone()),
            index: IndexServiceClient::new(channel),
        }
    }
}

fn rpc_error(rpc: &'static str) -> impl FnOnce(tonic::Status) -> AvsError {
    move |status| {
        match status.code() {
            // Expected while waiting on index state changes.
            tonic::Code::Unavailable | tonic::Code::NotFound => tracing::debug!(
                target: "avs_rs::transport",
                rpc,
                code = ?status.code(),
                message = status.message(),
                "RPC returned transient status"
            ),
            code => tracing::error!(
                target: "avs_rs::transport",
                rpc,
                code = ?code,
                message = status.message(),
                "RPC failed"
            ),
        }
        AvsError::from(status)
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn put(&self, request: proto::PutRequest) -> Result<()> {
        self.transact
            .clone()
            .put(request)
            .await
            .map_err(rpc_error("Transact/Put"))?;
        Ok(())
    }

    async fn get(&self, request: proto::GetRequest) -> Result<proto::Record> {
        let response = self
            .transact
            .clone()
            .get(request)
            .await
            .map_err(rpc_error("Transact/Get"))?;
        Ok(response.into_inner())
    }

    async fn exists(&self, request: proto::ExistsRequest) -> Result<bool> {
        let response = self
            .transact
            .clone()
            .exists(request)
            .await
            .map_err(rpc_error("Transact/Exists"))?;
        Ok(response.into_inner().value)
    }

    async fn delete(&self, request: proto::DeleteRequest) -> Result<()> {
        self.transact
            .clone()
            .delete(request)
            .await
            .map_err(rpc_error("Transact/Delete"))?;
        Ok(())
    }

    async fn is_indexed(&self, request: proto::IsIndexedRequest) -> Result<bool> {
        let response = self
            .transact
            .clone()
            .is_indexed(request)
            .await
            .map_err(rpc_error("Transact/IsIndexed"))?;
        Ok(response.into_inner().value)
    }

    async fn vector_search(&self, request: proto::VectorSearchRequest) -> Result<NeighborStream> {
        let stream = self
            .transact
            .clone()
            .vector_search(request)
            .await
            .map_err(rpc_error("Transact/VectorSearch"))?
            .into_inner();
        Ok(stream
            .map(|item| item.map_err(rpc_error("Transact/VectorSearch")))
            .boxed())
    }

    async fn index_create(&self, definition: proto::IndexDefinition) -> Result<()> {
        self.index
            .clone()
            .create(definition)
            .await
            .map_err(rpc_error("IndexService/Create"))?;
        Ok(())
    }

    async fn index_drop(&self, id: proto::IndexId) -> Result<()> {
        self.index
            .clone()
            .drop(id)
            .await
            .map_err(rpc_error("IndexService/Drop"))?;
        Ok(())
    }

    async fn index_list(&self) -> Result<Vec<proto::IndexDefinition>> {
        let response = self
            .index
            .clone()
            .list(())
            .await
            .map_err(rpc_error("IndexService/List"))?;
        Ok(response.into_inner().indices)
    }

    async fn index_get(&self, id: proto::IndexId) -> Result<proto::IndexDefinition> {
        let response = self
            .index
            .clone()
            .get(id)
            .await
            .map_err(rpc_error("IndexService/Get"))?;
        Ok(response.into_inner())
    }

    async fn index_get_status(&self, id: proto::IndexId) -> Result<i64> {
        let response = self
            .index
            .clone()
            .get_status(id)
            .await
            .map_err(rpc_error("IndexService/GetStatus"))?;
        Ok(response.into_inner().unmerged_record_count)
    }
}
