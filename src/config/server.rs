use super::load_json;
use crate::estimator::EstimatorConfig;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub estimator: EstimatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            estimator: EstimatorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Override the port with a `PORT`-style environment value.
    pub fn apply_port_env(&mut self, value: Option<&str>) -> Result<(), String> {
        if let Some(raw) = value {
            self.port = raw
                .trim()
                .parse()
                .map_err(|e| format!("Failed to parse PORT {raw:?}: {e}"))?;
        }
        Ok(())
    }
}

/// Defaults, optionally overlaid by a JSON file, then by `$PORT`.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, String> {
    let mut config = match path {
        Some(p) => load_json(p)?,
        None => ServerConfig::default(),
    };
    let port = std::env::var("PORT").ok();
    config.apply_port_env(port.as_deref())?;
    Ok(config)
}
