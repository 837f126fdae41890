//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod serve;

use std::path::{Path, PathBuf};

use docintel_core::DocintelConfig;
use tracing::debug;

/// `<config dir>/docintel/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docintel")
        .join("config.json")
}

/// The file named by `--config`, else the default path.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration; an explicit path must exist, the default one may not.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<DocintelConfig> {
    if let Some(path) = explicit {
        return Ok(DocintelConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(DocintelConfig::from_file(&path)?)
    } else {
        debug!("No configuration file at {}, using defaults", path.display());
        Ok(DocintelConfig::default())
    }
}
