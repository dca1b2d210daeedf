use super::{config_path_from_args, load_json};
use crate::synthetic::SceneSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Bare marker image for printing.
#[derive(Clone, Debug, Deserialize)]
pub struct MarkerSheetConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub id: u16,
    /// Pixels per marker cell
    #[serde(default = "default_cell_px")]
    pub cell_px: u32,
}

fn default_cell_px() -> u32 {
    50
}

#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    /// Where the synthetic scene is written.
    pub output: PathBuf,
    #[serde(default)]
    pub scene: SceneSpec,
    #[serde(default)]
    pub marker_sheet: Option<MarkerSheetConfig>,
}

pub fn load_config(path: &Path) -> Result<RenderConfig, String> {
    load_json(path)
}

pub fn parse_cli(program: &str) -> Result<RenderConfig, String> {
    let path = config_path_from_args(program, std::env::args().skip(1))?;
    load_config(&path)
}
