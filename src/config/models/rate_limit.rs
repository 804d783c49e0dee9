//! Rate limiting configuration

use super::*;
use crate::core::rate_limiter::LimiterOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavior when the shared store is unreachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailMode {
    /// Admit requests
    #[default]
    Open,
    /// Reject requests with 503
    Closed,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per window
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Duration over which `limit` tokens accrue
    #[serde(default = "default_window", with = "humantime_serde")]
    pub window: Duration,
    /// Extra capacity on top of `limit`
    #[serde(default)]
    pub burst: i64,
    /// Store outage policy
    #[serde(default)]
    pub fail_mode: FailMode,
    /// Header consulted first for the caller key
    #[serde(default = "default_key_header")]
    pub key_header: String,
    /// Upper bound for one store round trip
    #[serde(default = "default_store_timeout", with = "humantime_serde")]
    pub store_timeout: Duration,
    /// Namespace for bucket keys
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window: default_window(),
            burst: 0,
            fail_mode: FailMode::default(),
            key_header: default_key_header(),
            store_timeout: default_store_timeout(),
            key_prefix: String::new(),
        }
    }
}

impl RateLimitConfig {
    /// Limiter parameters described by this configuration
    pub fn limiter_options(&self) -> LimiterOptions {
        LimiterOptions::new(self.limit, self.window)
            .with_burst(self.burst)
            .with_fail_open(self.fail_mode == FailMode::Open)
            .with_store_timeout(self.store_timeout)
            .with_key_prefix(self.key_prefix.clone())
    }
}
