//! ratelimit-proxy - reverse proxy enforcing a distributed rate limit
//!
//! Every request except `/healthz` passes the admission gate before it is
//! forwarded to the configured upstream.

#![allow(missing_docs)]

use clap::Parser;
use ratelimit_gateway::config::ServeMode;
use ratelimit_gateway::config::cli::ProxyArgs;
use ratelimit_gateway::server;
use ratelimit_gateway::utils::logging::init_logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = ProxyArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ProxyArgs) -> ratelimit_gateway::Result<()> {
    let config = args.into_config().await?;
    init_logging(&config.logging)?;
    server::run_server(ServeMode::Proxy, config).await
}
