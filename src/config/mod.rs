// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file used when none is given (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the path given as first CLI argument,
    /// `APP_CONFIG`, or `config.toml` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("APP_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path
    ///
    /// Precedence, lowest first: built-in defaults, the file (optional),
    /// `APP_` environment variables (`APP_SERVER__PORT`), then `PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "server.port",
                std::env::var("PORT").ok().filter(|p| !p.is_empty()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| StartupError::InvalidAddress(format!("{}:{} ({e})", self.server.host, self.server.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("demo_api_{}_{name}.toml", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.keep_alive_timeout, 75);
        assert_eq!(cfg.performance.shutdown_timeout, 5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = Config::load_from("/nonexistent/demo_api/config").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        if std::env::var("PORT").is_err() {
            assert_eq!(cfg.server.port, 3000);
        }
    }

    #[test]
    fn test_load_from_file() {
        let path = write_temp_config(
            "file",
            r#"
[server]
host = "127.0.0.1"
port = 8081
workers = 2

[logging]
access_log = false
access_log_format = "json"

[performance]
max_connections = 64
"#,
        );
        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.server.host, "127.0.0.1");
        if std::env::var("PORT").is_err() {
            assert_eq!(cfg.server.port, 8081);
        }
        assert_eq!(cfg.server.workers, Some(2));
        assert!(!cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.performance.max_connections, Some(64));
        assert_eq!(cfg.performance.read_timeout, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let path = write_temp_config("env", "[performance]\nshutdown_timeout = 9\n");
        std::env::set_var("APP_PERFORMANCE__SHUTDOWN_TIMEOUT", "11");
        let cfg = Config::load_from(path.to_str().unwrap());
        std::env::remove_var("APP_PERFORMANCE__SHUTDOWN_TIMEOUT");
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.unwrap().performance.shutdown_timeout, 11);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 8080;
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());

        cfg.server.host = "not a host".to_string();
        assert!(matches!(cfg.socket_addr(), Err(StartupError::InvalidAddress(_))));
    }
}
