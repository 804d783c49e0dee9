//! Server configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which surface a process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Demo application with inline middleware
    Api,
    /// Reverse proxy in front of an upstream
    Proxy,
}

impl ServeMode {
    /// Listen address used when none is configured
    pub fn default_listen(self) -> &'static str {
        match self {
            ServeMode::Api => "0.0.0.0:8081",
            ServeMode::Proxy => "0.0.0.0:8080",
        }
    }
}

impl std::fmt::Display for ServeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeMode::Api => write!(f, "api"),
            ServeMode::Proxy => write!(f, "proxy"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (`host:port` or `:port`), mode default when unset
    #[serde(default)]
    pub listen: Option<String>,
    /// Number of worker threads
    #[serde(default)]
    pub workers: Option<usize>,
    /// Time allowed for a client to send its request head
    #[serde(default = "default_read_header_timeout", with = "humantime_serde")]
    pub read_header_timeout: Duration,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: None,
            workers: None,
            read_header_timeout: default_read_header_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    /// Get the bind address for `mode`
    ///
    /// A bare `:port` binds all interfaces.
    pub fn bind_address(&self, mode: ServeMode) -> String {
        let listen = self
            .listen
            .as_deref()
            .map(str::trim)
            .filter(|listen| !listen.is_empty())
            .unwrap_or(mode.default_listen());

        if listen.starts_with(':') {
            format!("0.0.0.0{}", listen)
        } else {
            listen.to_string()
        }
    }
}
