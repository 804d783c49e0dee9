//! Command-line and environment overrides
//!
//! Every setting can come from a flag or its environment variable. Anything
//! left unset keeps the value from the YAML file given with `--config`, or the
//! built-in default.

use super::models::{FailMode, LogFormat, ServeMode, StoreBackend};
use super::Config;
use crate::utils::error::Result;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by both binaries
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// YAML configuration file providing base values
    #[arg(long = "config", env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Requests per window
    #[arg(long, env = "RATE_LIMIT")]
    pub limit: Option<i64>,

    /// Refill window, e.g. `1m`, `30s`
    #[arg(long, env = "WINDOW", value_parser = humantime::parse_duration)]
    pub window: Option<Duration>,

    /// Extra capacity on top of the limit
    #[arg(long, env = "BURST")]
    pub burst: Option<i64>,

    /// Redis address, `host:port` or `redis://` URL
    #[arg(long, env = "REDIS_ADDR")]
    pub redis_addr: Option<String>,

    /// Behavior when Redis is unreachable
    #[arg(long, env = "FAIL_MODE", value_enum, ignore_case = true)]
    pub fail_mode: Option<FailMode>,

    /// Header consulted first for the caller key
    #[arg(long, env = "KEY_HEADER")]
    pub key_header: Option<String>,

    /// Upper bound for one store round trip
    #[arg(long, env = "STORE_TIMEOUT", value_parser = humantime::parse_duration)]
    pub store_timeout: Option<Duration>,

    /// Bucket store backend
    #[arg(long, env = "STORE", value_enum, ignore_case = true)]
    pub store: Option<StoreBackend>,

    /// Log line format
    #[arg(long, env = "LOG_FORMAT", value_enum, ignore_case = true)]
    pub log_format: Option<LogFormat>,
}

impl CommonArgs {
    /// Load the base file, if any, and apply the overrides
    async fn base_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path).await?,
            None => Config::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    /// Overwrite every setting given on the command line or in the environment
    pub fn apply(&self, config: &mut Config) {
        if let Some(limit) = self.limit {
            config.rate_limit.limit = limit;
        }
        if let Some(window) = self.window {
            config.rate_limit.window = window;
        }
        if let Some(burst) = self.burst {
            config.rate_limit.burst = burst;
        }
        if let Some(fail_mode) = self.fail_mode {
            config.rate_limit.fail_mode = fail_mode;
        }
        if let Some(key_header) = &self.key_header {
            config.rate_limit.key_header = key_header.clone();
        }
        if let Some(store_timeout) = self.store_timeout {
            config.rate_limit.store_timeout = store_timeout;
        }
        if let Some(redis_addr) = &self.redis_addr {
            config.storage.redis.addr = redis_addr.clone();
        }
        if let Some(store) = self.store {
            config.storage.backend = store;
        }
        if let Some(log_format) = self.log_format {
            config.logging.format = log_format;
        }
    }
}

/// Rate limiting reverse proxy
#[derive(Parser, Debug, Clone)]
#[command(name = "ratelimit-proxy")]
#[command(about = "Reverse proxy enforcing a distributed rate limit in front of an upstream")]
#[command(version)]
pub struct ProxyArgs {
    /// Listen address
    #[arg(long, env = "PROXY_LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Base URL requests are forwarded to
    #[arg(long, env = "UPSTREAM_URL")]
    pub upstream: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ProxyArgs {
    /// Build and validate the proxy configuration
    pub async fn into_config(self) -> Result<Config> {
        let mut config = self.common.base_config().await?;
        if let Some(listen) = self.listen {
            config.server.listen = Some(listen);
        }
        if let Some(upstream) = self.upstream {
            config.proxy.upstream = upstream;
        }
        config.validate_for(ServeMode::Proxy)?;
        Ok(config)
    }
}

/// Demo API behind the rate limiting middleware
#[derive(Parser, Debug, Clone)]
#[command(name = "ratelimit-api")]
#[command(about = "Demo API protected by the distributed rate limiting middleware")]
#[command(version)]
pub struct ApiArgs {
    /// Listen address
    #[arg(long, env = "LISTEN_ADDR")]
    pub listen: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ApiArgs {
    /// Build and validate the API configuration
    pub async fn into_config(self) -> Result<Config> {
        let mut config = self.common.base_config().await?;
        if let Some(listen) = self.listen {
            config.server.listen = Some(listen);
        }
        config.validate_for(ServeMode::Api)?;
        Ok(config)
    }
}
