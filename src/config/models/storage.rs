//! Storage configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bucket store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Shared Redis instance
    #[default]
    Redis,
    /// Process-local buckets, for development
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Backend holding bucket state
    #[serde(default)]
    pub backend: StoreBackend,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// `host:port` or a `redis://` / `rediss://` URL
    #[serde(default = "default_redis_addr")]
    pub addr: String,
    /// Time allowed to establish the connection
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: default_redis_addr(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl RedisConfig {
    /// Connection URL for the configured address
    pub fn connection_url(&self) -> String {
        let addr = self.addr.trim();
        if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        }
    }
}
