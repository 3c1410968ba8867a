//! CLI subcommands.

pub mod config;
pub mod list;
pub mod process;
pub mod save;

use std::path::PathBuf;

use cheqr_core::CheqrConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cheqr")
        .join("config.json")
}

/// Load configuration from an explicit path, the default location, or
/// built-in defaults, in that order.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CheqrConfig> {
    if let Some(path) = config_path {
        return Ok(CheqrConfig::from_file(std::path::Path::new(path))?);
    }
    let default_path = default_config_path();
    if default_path.exists() {
        return Ok(CheqrConfig::from_file(&default_path)?);
    }
    Ok(CheqrConfig::default())
}
