use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::client::Client;
use crate::config::IndexCreateConfig;
use crate::error::Result;
use crate::types::IndexDefinition;

/// Admin API for index management
#[async_trait]
pub trait AdminApi {
    /// Create an index and wait until the server reports it.
    async fn index_create(
        &self,
        namespace: &str,
        name: &str,
        vector_field: &str,
        dimensions: u32,
        config: IndexCreateConfig,
    ) -> Result<()>;
    /// Drop an index and wait until the server stops reporting it.
    async fn index_drop(&self, namespace: &str, name: &str) -> Result<()>;
    async fn index_list(&self) -> Result<Vec<IndexDefinition>>;
    async fn index_get(&self, namespace: &str, name: &str) -> Result<IndexDefinition>;
    async fn index_get_status(&self, namespace: &str, name: &str) -> Result<i64>;
    async fn wait_for_index_completion(
        &self,
        namespace: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<()>;
}

/// Thin proxy that delegates admin operations to an underlying Client.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<Client>,
}

impl AdminClient {
    pub fn new(inner: Arc<Client>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn index_create(
        &self,
        namespace: &str,
        name: &str,
        vector_field: &str,
        dimensions: u32,
        config: IndexCreateConfig,
    ) -> Result<()> {
        self.inner
            .index_create(namespace, name, vector_field, dimensions, config)
            .await
    }

    async fn index_drop(&self, namespace: &str, name: &str) -> Result<()> {
        self.inner.index_drop(namespace, name).await
    }

    async fn index_list(&self) -> Result<Vec<IndexDefinition>> {
        self.inner.index_list().await
    }

    async fn index_get(&self, namespace: &str, name: &str) -> Result<IndexDefinition> {
        self.inner.index_get(namespace, name).await
    }

    async fn index_get_status(&self, namespace: &str, name: &str) -> Result<i64> {
        self.inner.index_get_status(namespace, name).await
    }

    async fn wait_for_index_completion(
        &self,
        namespace: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        self.inner
            .wait_for_index_completion(namespace, name, timeout)
            .await
    }
}
