use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelConfig;
use crate::error::{AvsError, Result};

/// Default AVS gRPC port.
pub const DEFAULT_PORT: u16 = 5000;

/// A seed node address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host:port`; a bare host uses [`DEFAULT_PORT`]. IPv6 hosts are
    /// written `[addr]:port`, or bare without a port.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AvsError::Config("empty seed address".into()));
        }
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| AvsError::Config(format!("unclosed bracket in seed: {s}")))?;
            return match tail.strip_prefix(':') {
                Some(port) => Ok(Self::new(host, parse_port(port, s)?)),
                None if tail.is_empty() => Ok(Self::new(host, DEFAULT_PORT)),
                None => Err(AvsError::Config(format!("invalid seed: {s}"))),
            };
        }
        if s.matches(':').count() > 1 {
            return Ok(Self::new(s, DEFAULT_PORT));
        }
        match s.rsplit_once(':') {
            Some((host, port)) => Ok(Self::new(host, parse_port(port, s)?)),
            None => Ok(Self::new(s, DEFAULT_PORT)),
        }
    }

    pub(crate) fn uri(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

fn parse_port(port: &str, seed: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|_| AvsError::Config(format!("invalid port in seed: {seed}")))
}

/// Connection configuration for an AVS cluster.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub seeds: Vec<HostPort>,
    /// Treat the first seed as a load balancer and send every request there.
    pub is_loadbalancer: bool,
    pub channel: ChannelConfig,
}

impl ClientConfig {
    pub fn new(seeds: Vec<HostPort>) -> Self {
        Self {
            seeds,
            is_loadbalancer: false,
            channel: ChannelConfig::default(),
        }
    }

    /// Build configuration from environment variables:
    /// `AVS_SEEDS` (comma separated `host:port`) or `AVS_HOST` + `AVS_PORT`
    /// (default 5000), `AVS_IS_LOADBALANCER` (optional, default false),
    /// `AVS_CONNECT_TIMEOUT_MS` and `AVS_REQUEST_TIMEOUT_MS` (optional).
    pub fn from_env() -> Result<Self> {
        let seeds = match env::var("AVS_SEEDS") {
            Ok(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(HostPort::parse)
                .collect::<Result<Vec<_>>>()?,
            Err(_) => {
                let host = require_env("AVS_HOST")?;
                let port = parse_env("AVS_PORT").unwrap_or(DEFAULT_PORT);
                vec![HostPort::new(host, port)]
            }
        };
        if seeds.is_empty() {
            return Err(AvsError::Config("AVS_SEEDS contains no addresses".into()));
        }

        let mut channel = ChannelConfig::default();
        if let Some(ms) = parse_env::<u64>("AVS_CONNECT_TIMEOUT_MS") {
            channel = channel.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_env::<u64>("AVS_REQUEST_TIMEOUT_MS") {
            channel = channel.with_request_timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            seeds,
            is_loadbalancer: parse_env("AVS_IS_LOADBALANCER").unwrap_or(false),
            channel,
        })
    }
}

/// Supported vector distance metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorDistanceMetric {
    #[default]
    SquaredEuclidean,
    Cosine,
    DotProduct,
    Manhattan,
    Hamming,
}

impl VectorDistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorDistanceMetric::SquaredEuclidean => "SQUARED_EUCLIDEAN",
            VectorDistanceMetric::Cosine => "COSINE",
            VectorDistanceMetric::DotProduct => "DOT_PRODUCT",
            VectorDistanceMetric::Manhattan => "MANHATTAN",
            VectorDistanceMetric::Hamming => "HAMMING",
        }
    }
}

/// Batching of index updates on the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswBatchingParams {
    /// Maximum number of records per batch.
    pub max_records: u32,
    /// Maximum time between batches, in milliseconds.
    pub interval: u32,
    pub disabled: bool,
}

impl Default for HnswBatchingParams {
    fn default() -> Self {
        Self {
            max_records: 100_000,
            interval: 30_000,
            disabled: false,
        }
    }
}

/// HNSW tuning used during index creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswParams {
    pub m: u32,
    pub ef_construction: u32,
    pub ef: u32,
    pub batching_params: HnswBatchingParams,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 100,
            ef: 100,
            batching_params: HnswBatchingParams::default(),
        }
    }
}

/// Per-query HNSW overrides. `None` uses the index's own `ef`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HnswSearchParams {
    pub ef: Option<u32>,
}

/// Every option recognised by `index_create`, with its default.
#[derive(Clone, Debug)]
pub struct IndexCreateConfig {
    pub vector_distance_metric: VectorDistanceMetric,
    /// Restrict the index to records of this set.
    pub sets: Option<String>,
    pub index_params: HnswParams,
    pub index_meta_data: HashMap<String, String>,
    /// How long `index_create` waits for the server to publish the index.
    pub wait_timeout: Duration,
}

impl Default for IndexCreateConfig {
    fn default() -> Self {
        Self {
            vector_distance_metric: VectorDistanceMetric::default(),
            sets: None,
            index_params: HnswParams::default(),
            index_meta_data: HashMap::new(),
            wait_timeout: Duration::from_secs(100_000),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AvsError::Config(format!("missing env: {key}")))
}

fn parse_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seed_with_port() {
        let hp = HostPort::parse("10.0.0.1:5555").unwrap();
        assert_eq!(hp, HostPort::new("10.0.0.1", 5555));
        assert_eq!(hp.uri(), "http://10.0.0.1:5555");
    }

    #[test]
    fn parse_seed_without_port_uses_default() {
        let hp = HostPort::parse("avs.local").unwrap();
        assert_eq!(hp.port, DEFAULT_PORT);
    }

    #[test]
    fn parse_seed_rejects_garbage() {
        assert!(matches!(
            HostPort::parse("host:notaport"),
            Err(AvsError::Config(_))
        ));
        assert!(matches!(HostPort::parse("  "), Err(AvsError::Config(_))));
    }

    #[test]
    fn ipv6_seeds_are_bracketed_in_uri() {
        assert_eq!(HostPort::new("::1", 5000).uri(), "http://[::1]:5000");

        let hp = HostPort::parse("[fe80::2]:6000").unwrap();
        assert_eq!(hp, HostPort::new("fe80::2", 6000));
        assert_eq!(hp.uri(), "http://[fe80::2]:6000");

        assert_eq!(HostPort::parse("[::1]").unwrap(), HostPort::new("::1", DEFAULT_PORT));
        assert_eq!(HostPort::parse("::1").unwrap(), HostPort::new("::1", DEFAULT_PORT));
        assert!(matches!(HostPort::parse("[::1"), Err(AvsError::Config(_))));
        assert!(matches!(HostPort::parse("[::1]x"), Err(AvsError::Config(_))));
    }

    #[test]
    fn hnsw_defaults_match_server_defaults() {
        let p = HnswParams::default();
        assert_eq!(p.m, 16);
        assert_eq!(p.ef_construction, 100);
        assert_eq!(p.ef, 100);
        assert_eq!(p.batching_params.max_records, 100_000);
        assert_eq!(p.batching_params.interval, 30_000);
        assert!(!p.batching_params.disabled);
    }

    #[test]
    fn index_create_defaults() {
        let cfg = IndexCreateConfig::default();
        assert_eq!(
            cfg.vector_distance_metric,
            VectorDistanceMetric::SquaredEuclidean
        );
        assert!(cfg.sets.is_none());
        assert_eq!(cfg.wait_timeout, Duration::from_secs(100_000));
    }
}
