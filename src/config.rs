//! Service configuration.
//!
//! Read from an optional TOML file (`config.toml`, or the path in
//! `TRIPSPLIT_CONFIG`), then patched by `TRIPSPLIT_HOST`/`TRIPSPLIT_PORT`.
//! Every field has a default so the service also starts without a file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::Path};

pub const CONFIG_PATH_ENV: &str = "TRIPSPLIT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Worker threads; actix picks one per core when unset.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins the browser client is served from. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// The file named by `TRIPSPLIT_CONFIG` (must exist), else
    /// `config.toml` if present, else defaults; then env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(env::var("TRIPSPLIT_HOST").ok(), env::var("TRIPSPLIT_PORT").ok())?;
        Ok(config)
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<String>) -> Result<()> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port
                .parse()
                .with_context(|| format!("TRIPSPLIT_PORT is not a port number: {port}"))?;
        }
        Ok(())
    }
}
