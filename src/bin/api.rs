//! ratelimit-api - demo API behind the rate limiting middleware

#![allow(missing_docs)]

use clap::Parser;
use ratelimit_gateway::config::ServeMode;
use ratelimit_gateway::config::cli::ApiArgs;
use ratelimit_gateway::server;
use ratelimit_gateway::utils::logging::init_logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = ApiArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ApiArgs) -> ratelimit_gateway::Result<()> {
    let config = args.into_config().await?;
    init_logging(&config.logging)?;
    server::run_server(ServeMode::Api, config).await
}
