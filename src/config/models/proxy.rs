//! Reverse proxy configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reverse proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Base URL requests are forwarded to
    #[serde(default = "default_upstream")]
    pub upstream: String,
    /// Timeout for one forwarded request
    #[serde(default = "default_upstream_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream: default_upstream(),
            timeout: default_upstream_timeout(),
        }
    }
}
