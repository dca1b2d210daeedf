use super::{config_path_from_args, load_json};
use crate::estimator::EstimatorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What the CLI prints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Both,
}

impl OutputFormat {
    pub fn includes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Write the full estimation report here instead of stdout.
    pub json_out: Option<PathBuf>,
    /// Grayscale input, rectified marker and report are dumped here.
    pub debug_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Image to measure.
    pub input: PathBuf,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), String> {
        let size = self.estimator.marker_size_mm;
        if !size.is_finite() || size <= 0.0 {
            return Err(format!("Invalid marker_size_mm {size}: expected a positive length"));
        }
        if self.estimator.detector.adaptive_thresh_windows.is_empty() {
            return Err("detector.adaptive_thresh_windows must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let config: RuntimeConfig = load_json(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse `<program> <config.json>` and load the config.
pub fn parse_cli(program: &str) -> Result<RuntimeConfig, String> {
    let path = config_path_from_args(program, std::env::args().skip(1))?;
    load_config(&path)
}
