//! Configuration layering tests

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ratelimit_gateway::config::cli::{ApiArgs, ProxyArgs};
    use ratelimit_gateway::config::{FailMode, LogFormat, ServeMode, StoreBackend};
    use std::io::Write;
    use std::time::Duration;

    const YAML: &str = r#"
server:
  listen: ":9000"
rate_limit:
  limit: 50
  window: 30s
  burst: 5
  fail_mode: closed
storage:
  backend: memory
proxy:
  upstream: http://backend:3000
logging:
  format: json
"#;

    fn config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_file_values_are_used() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let args = ApiArgs::try_parse_from(["ratelimit-api", "--config", path]).unwrap();
        let config = crate::assert_ok!(args.into_config().await);

        assert_eq!(config.rate_limit.limit, 50);
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(config.rate_limit.fail_mode, FailMode::Closed);
        assert_eq!(config.storage.backend, StoreBackend::Memory);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.bind_address(ServeMode::Api), "0.0.0.0:9000");

        let options = config.limiter_options();
        assert_eq!(options.burst, 5);
        assert!(!options.fail_open);
    }

    #[tokio::test]
    async fn test_flags_override_file() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let args = ProxyArgs::try_parse_from([
            "ratelimit-proxy",
            "--config",
            path,
            "--limit",
            "7",
            "--fail-mode",
            "OPEN",
            "--upstream",
            "https://api.internal",
            "--listen",
            "127.0.0.1:7000",
        ])
        .unwrap();
        let config = crate::assert_ok!(args.into_config().await);

        assert_eq!(config.rate_limit.limit, 7);
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(config.rate_limit.fail_mode, FailMode::Open);
        assert_eq!(config.proxy.upstream, "https://api.internal");
        assert_eq!(config.server.bind_address(ServeMode::Proxy), "127.0.0.1:7000");
    }

    #[tokio::test]
    async fn test_invalid_override_fails_validation() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let args =
            ApiArgs::try_parse_from(["ratelimit-api", "--config", path, "--limit", "0"]).unwrap();
        assert!(args.into_config().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_config_file_is_an_error() {
        let args = ApiArgs::try_parse_from([
            "ratelimit-api",
            "--config",
            "/nonexistent/ratelimit.yaml",
        ])
        .unwrap();
        assert!(args.into_config().await.is_err());
    }
}
