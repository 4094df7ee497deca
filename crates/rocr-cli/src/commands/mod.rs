//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod parse;
pub mod serve;

use std::path::{Path, PathBuf};

use rocr_core::RocrConfig;
use tracing::debug;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rocr")
        .join("config.json")
}

/// Load configuration and apply environment overrides.
///
/// An explicit path must exist; the default path is optional.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<RocrConfig> {
    let mut config = match config_path {
        Some(path) => RocrConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                RocrConfig::from_file(&path)?
            } else {
                RocrConfig::default()
            }
        }
    };

    config.apply_env_overrides()?;
    debug!("Using OCR engine {:?}", config.ocr.engine);
    Ok(config)
}
