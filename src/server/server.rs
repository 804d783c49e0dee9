//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::config::{Config, ServeMode, ServerConfig};
use crate::server::builder::build_gate;
use crate::server::proxy::UpstreamProxy;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, web};
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server for one surface
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server for `mode`
    ///
    /// Connects to the bucket store; an unreachable Redis is a startup error.
    pub async fn new(mode: ServeMode, config: &Config) -> Result<Self> {
        info!(%mode, "Creating HTTP server");

        let gate = build_gate(config).await?;
        let state = match mode {
            ServeMode::Api => AppState::api(config.clone(), gate),
            ServeMode::Proxy => {
                let upstream = UpstreamProxy::new(&config.proxy)?;
                info!(upstream = %upstream.upstream(), "Forwarding admitted requests");
                AppState::proxy(config.clone(), gate, upstream)
            }
        };

        Ok(Self::from_state(config.server.clone(), state))
    }

    /// Create a server around prepared state
    pub fn from_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the HTTP server and run until shutdown
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.bind_address(self.state.mode);
        let max_body_size = self.config.max_body_size;

        info!("Starting HTTP server on {}", bind_addr);

        let state = self.state;
        let mut server = ActixHttpServer::new(move || {
            let state = state.clone();
            App::new()
                .wrap(TracingLogger::default())
                .app_data(web::PayloadConfig::new(max_body_size))
                .configure(move |cfg| routes::configure_app(cfg, &state))
        })
        .client_request_timeout(self.config.read_header_timeout);

        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| GatewayError::config(format!("failed to bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server.await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
