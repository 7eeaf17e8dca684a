//! Configuration loading and validation.
//!
//! Values come from (highest precedence first) `BIRDLOG_` environment
//! variables, a TOML file, then built-in defaults. Nested keys in the
//! environment are separated by a double underscore, for example
//! `BIRDLOG_SERVER__PORT=9000`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{BirdError, BirdResult};

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "birdlog.toml";

const ENV_PREFIX: &str = "BIRDLOG_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file. Parent directories are created on open.
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are aborted.
    pub request_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".data").join("birdlog.db"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load() -> BirdResult<Self> {
        Self::load_from(None)
    }

    pub fn load_from(config_path: Option<PathBuf>) -> BirdResult<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BirdResult<()> {
        if self.server.port == 0 {
            return Err(BirdError::ConfigValidation(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(BirdError::ConfigValidation(
                "server.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(BirdError::ConfigValidation(
                "server.host cannot be blank".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
