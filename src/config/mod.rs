//! Configuration management for the wiremud server.
//!
//! Configuration is a small TOML file with three sections:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 4000
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! # file = "wiremud.log"
//! ```
//!
//! `Config::load` reads and validates a file; `Config::create_default`
//! writes a commented starter config for the `init` subcommand.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind, e.g. "0.0.0.0" or "127.0.0.1".
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the embedded world database.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of error/warn/info/debug/trace; CLI -v flags override it.
    pub level: String,
    /// Optional log file; appended to alongside stderr output.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# wiremud server configuration

[server]
# Interface and port players connect to (e.g. `nc host 4000`).
bind_address = "0.0.0.0"
port = 4000

[storage]
# Directory for the embedded world database. Created on first start and
# seeded with the starter world.
data_dir = "./data"

[logging]
# error | warn | info | debug | trace
level = "info"
# Uncomment to also append logs to a file:
# file = "wiremud.log"
"#;

impl Config {
    /// Load and validate a configuration file.
    pub async fn load(path: &str) -> Result<Config> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing config file {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the commented starter configuration. Refuses to overwrite.
    pub async fn create_default(path: &str) -> Result<()> {
        if fs::try_exists(path).await.unwrap_or(false) {
            return Err(anyhow!("config file {} already exists", path));
        }
        fs::write(path, DEFAULT_CONFIG)
            .await
            .with_context(|| format!("writing config file {}", path))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.server.bind_address.trim().is_empty() {
            return Err(anyhow!("server.bind_address must not be empty"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(anyhow!("unknown logging.level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("template must parse");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.storage.data_dir, "./data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_logging_section_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            "[server]\nbind_address = \"127.0.0.1\"\nport = 4000\n\n[storage]\ndata_dir = \"./data\"\n",
        )
        .unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let config: Config = toml::from_str(
            "[server]\nbind_address = \"127.0.0.1\"\nport = 4000\n\n[storage]\ndata_dir = \"./data\"\n\n[logging]\nlevel = \"loud\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
