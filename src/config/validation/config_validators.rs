//! Configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::identity::HeaderKeyResolver;
use tracing::debug;
use url::Url;

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating server configuration");

        if let Some(listen) = self.listen.as_deref().map(str::trim) {
            if !listen.is_empty() {
                validate_listen_address(listen)?;
            }
        }

        if self.workers == Some(0) {
            return Err("Server workers must be greater than 0".to_string());
        }

        if self.max_body_size == 0 {
            return Err("Server max_body_size must be greater than 0".to_string());
        }

        if self.read_header_timeout.is_zero() {
            return Err("Server read_header_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating rate limit configuration");

        if self.limit <= 0 {
            return Err("Rate limit must be greater than 0".to_string());
        }

        if self.window.is_zero() {
            return Err("Rate limit window must be greater than 0".to_string());
        }

        if self.burst < 0 {
            return Err("Rate limit burst cannot be negative".to_string());
        }

        if self.limit.checked_add(self.burst).is_none() {
            return Err("Rate limit plus burst is too large".to_string());
        }

        if self.store_timeout.is_zero() {
            return Err("Store timeout must be greater than 0".to_string());
        }

        HeaderKeyResolver::new(&self.key_header).map_err(|e| e.to_string())?;

        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        match self.backend {
            StoreBackend::Redis => self.redis.validate(),
            StoreBackend::Memory => Ok(()),
        }
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating Redis configuration");

        if self.addr.trim().is_empty() {
            return Err("Redis address cannot be empty".to_string());
        }

        let url = Url::parse(&self.connection_url())
            .map_err(|e| format!("Redis address is invalid: {}", e))?;
        match url.scheme() {
            "redis" | "rediss" => {}
            scheme => {
                return Err(format!(
                    "Redis address must use redis:// or rediss://, got: {}",
                    scheme
                ));
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err("Redis address must have a host".to_string());
        }

        if self.connect_timeout.is_zero() {
            return Err("Redis connect_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for ProxyConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating proxy configuration");

        let url = Url::parse(&self.upstream)
            .map_err(|e| format!("Upstream URL is invalid: {}", e))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "Upstream URL must use http:// or https://, got: {}",
                    scheme
                ));
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err("Upstream URL must have a host".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Upstream timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}

/// `host:port` or `:port` with a non-zero port
fn validate_listen_address(listen: &str) -> Result<(), String> {
    let (host, port) = listen
        .rsplit_once(':')
        .ok_or_else(|| format!("Listen address '{}' must be host:port", listen))?;

    let port: u16 = port
        .parse()
        .map_err(|_| format!("Listen address '{}' has an invalid port", listen))?;
    if port == 0 {
        return Err(format!("Listen address '{}' must use a non-zero port", listen));
    }

    if host.contains(char::is_whitespace) {
        return Err(format!("Listen address '{}' has an invalid host", listen));
    }

    Ok(())
}
