//! JSON configuration of the binaries.
//!
//! - [`runtime`] – the `marker_scale` CLI (`input`, estimator settings,
//!   output options).
//! - [`render`] – the `render_marker` scene generator.
//! - [`server`] – the HTTP adapter (bind address, estimator settings).

pub mod render;
pub mod runtime;
pub mod server;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read and parse a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Single positional `<config.json>` argument of a binary.
pub fn config_path_from_args(
    program: &str,
    mut args: impl Iterator<Item = String>,
) -> Result<std::path::PathBuf, String> {
    let path = args
        .next()
        .ok_or_else(|| format!("Usage: {program} <config.json>"))?;
    if args.next().is_some() {
        return Err(format!("Usage: {program} <config.json>"));
    }
    Ok(path.into())
}
