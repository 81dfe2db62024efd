//! Finds and loads the conversion configuration.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use log::{debug, info};
use std::fs;
use std::path::Path;
use xtf2ifc_core::ConversionConfig;

pub const LOCAL_CONFIG: &str = "xtf2ifc.toml";

/// Search order:
/// 1. Explicit path (must exist)
/// 2. `xtf2ifc.toml` in the working directory
/// 3. `config.toml` in the platform config directory
/// 4. Built-in defaults
pub fn load_config(explicit_path: Option<&Path>) -> Result<ConversionConfig> {
    if let Some(path) = explicit_path {
        info!("loading configuration from {}", path.display());
        return load_config_file(path);
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.is_file() {
        info!("loading configuration from {}", local.display());
        return load_config_file(local);
    }

    if let Some(dirs) = ProjectDirs::from("ch", "xtf2ifc", "xtf2ifc") {
        let system = dirs.config_dir().join("config.toml");
        if system.is_file() {
            info!("loading configuration from {}", system.display());
            return load_config_file(&system);
        }
        debug!("no configuration at {}", system.display());
    } else {
        debug!("no platform config directory");
    }

    debug!("using default configuration");
    Ok(ConversionConfig::default())
}

pub fn load_config_file(path: &Path) -> Result<ConversionConfig> {
    if !path.is_file() {
        bail!("configuration file not found: {path:?}");
    }
    let content = fs::read_to_string(path).with_context(|| format!("read config: {path:?}"))?;
    let cfg: ConversionConfig =
        toml::from_str(&content).with_context(|| format!("parse config: {path:?}"))?;
    cfg.validate()
        .with_context(|| format!("validate config: {path:?}"))?;
    Ok(cfg)
}
