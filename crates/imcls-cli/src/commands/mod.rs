//! Subcommands of the `imcls` binary.

pub mod classify;
pub mod config;
pub mod labels;
pub mod models;

use std::path::Path;

use imcls_core::models::config::ImclsConfig;

/// Load the configuration named by `--config`, or the user config file when
/// it exists, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ImclsConfig> {
    if let Some(path) = config_path {
        return Ok(ImclsConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(ImclsConfig::from_file(&default_path)?)
    } else {
        Ok(ImclsConfig::default())
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
