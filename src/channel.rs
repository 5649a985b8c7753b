use std::time::Duration;

use tonic::transport::{Channel, Endpoint};

use crate::config::HostPort;
use crate::error::{AvsError, Result};

/// HTTP/2 and TCP settings applied to every seed endpoint.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub http2_keep_alive_interval: Option<Duration>,
    pub keep_alive_timeout: Duration,
    pub keep_alive_while_idle: bool,

    pub connect_timeout: Duration,
    /// Per-request deadline enforced by the transport.
    pub timeout: Duration,

    pub initial_connection_window_size: Option<u32>,
    pub initial_stream_window_size: Option<u32>,
    pub http2_adaptive_window: bool,

    pub tcp_nodelay: bool,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            http2_keep_alive_interval: Some(Duration::from_secs(30)),
            keep_alive_timeout: Duration::from_secs(10),
            keep_alive_while_idle: true,
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
            initial_connection_window_size: Some(1024 * 1024),
            initial_stream_window_size: Some(1024 * 1024),
            http2_adaptive_window: true,
            tcp_nodelay: true,
            tcp_keepalive: Some(Duration::from_secs(30)),
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the deadline for individual RPCs. Search streams count as one RPC.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.http2_keep_alive_interval = Some(interval);
        self
    }

    pub fn without_keep_alive(mut self) -> Self {
        self.http2_keep_alive_interval = None;
        self
    }

    pub fn with_window_size(mut self, size: u32) -> Self {
        self.initial_connection_window_size = Some(size);
        self.initial_stream_window_size = Some(size);
        self
    }

    pub(crate) fn apply_to_endpoint(&self, mut endpoint: Endpoint) -> Endpoint {
        if let Some(interval) = self.http2_keep_alive_interval {
            endpoint = endpoint.http2_keep_alive_interval(interval);
        }
        endpoint = endpoint
            .keep_alive_timeout(self.keep_alive_timeout)
            .keep_alive_while_idle(self.keep_alive_while_idle)
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout);

        if let Some(size) = self.initial_connection_window_size {
            endpoint = endpoint.initial_connection_window_size(size);
        }
        if let Some(size) = self.initial_stream_window_size {
            endpoint = endpoint.initial_stream_window_size(size);
        }
        endpoint = endpoint
            .http2_adaptive_window(self.http2_adaptive_window)
            .tcp_nodelay(self.tcp_nodelay);
        if let Some(keepalive) = self.tcp_keepalive {
            endpoint = endpoint.tcp_keepalive(Some(keepalive));
        }

        endpoint
    }
}

/// Build the shared channel for a set of seeds.
///
/// Connections are established lazily on the first request. With
/// `is_loadbalancer` only the first seed is used; otherwise requests are
/// spread across all seeds. Must be called from within a tokio runtime.
pub fn create_channel(
    seeds: &[HostPort],
    is_loadbalancer: bool,
    config: &ChannelConfig,
) -> Result<Channel> {
    let Some(first) = seeds.first() else {
        return Err(AvsError::Config("at least one seed host is required".into()));
    };

    if is_loadbalancer || seeds.len() == 1 {
        let endpoint = endpoint_for(first, config)?;
        tracing::debug!(
            target: "avs_rs::channel",
            addr = %first.uri(),
            is_loadbalancer,
            "Creating lazy gRPC channel"
        );
        return Ok(endpoint.connect_lazy());
    }

    let endpoints = seeds
        .iter()
        .map(|seed| endpoint_for(seed, config))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        target: "avs_rs::channel",
        seeds = seeds.len(),
        "Creating balanced gRPC channel"
    );
    Ok(Channel::balance_list(endpoints.into_iter()))
}

fn endpoint_for(seed: &HostPort, config: &ChannelConfig) -> Result<Endpoint> {
    let uri = seed.uri();
    let endpoint = Endpoint::from_shared(uri.clone()).map_err(|e| {
        tracing::error!(target: "avs_rs::channel", addr = %uri, error = ?e, "Invalid URI");
        AvsError::Config(format!("invalid seed address {uri}: {e}"))
    })?;
    Ok(config.apply_to_endpoint(endpoint))
}
