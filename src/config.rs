//! Process-wide configuration.
//!
//! Loaded once at startup from a YAML file and passed down by value; nothing
//! in the crate reads configuration from globals after that.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "FILESERVE_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

const DEFAULT_CONFIG_PATH: &str = "fileserve.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Pending-connection queue length handed to `listen(2)`.
    pub backlog: u32,
    pub read_timeout_secs: u64,
    /// Upper bound for a single read from a client socket.
    pub max_read_size: usize,
    /// Upper bound for a buffered request head before it is rejected.
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: String,
    pub default_resource: String,
    pub not_found_resource: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            backlog: 10,
            read_timeout_secs: 2,
            max_read_size: 1024,
            max_request_size: 8192,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: "webroot".to_string(),
            default_resource: "/index.html".to_string(),
            not_found_resource: "/404pic.png".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Config {
    /// Loads the config file named by `FILESERVE_CONFIG` (or `fileserve.yaml`),
    /// falling back to defaults when it does not exist, then applies the
    /// `LISTEN` override and validates the result.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut cfg = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen_addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let server = &self.server;
        if server.max_read_size == 0 {
            bail!("server.max_read_size must be greater than zero");
        }
        if server.max_request_size < server.max_read_size {
            bail!("server.max_request_size must be at least server.max_read_size");
        }
        if server.read_timeout_secs == 0 {
            bail!("server.read_timeout_secs must be greater than zero");
        }

        let files = &self.static_files;
        for (name, value) in [
            ("static_files.default_resource", &files.default_resource),
            ("static_files.not_found_resource", &files.not_found_resource),
        ] {
            if !value.starts_with('/') {
                bail!("{name} must start with '/', got {value:?}");
            }
        }
        Ok(())
    }
}
