//! Locating and loading `nightclock.toml`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::builder::create_default_config;
use super::validation::validate_config;
use super::Config;

/// Directory given with `--config`, set once at startup.
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the custom configuration directory.
///
/// Only the first call has any effect. A leading `~/` is expanded.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    let path = dir.map(|d| super::expand_home(&d));
    if CONFIG_DIR.set(path).is_err() {
        log_debug!("Config directory already set, ignoring");
    }
    Ok(())
}

pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of `nightclock.toml`, honoring `--config`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join("nightclock.toml"));
    }
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("nightclock").join("nightclock.toml"))
}

/// Load the configuration, writing the default file first if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        create_default_config(&config_path).with_context(|| {
            format!(
                "Failed to create default config at {}",
                display_path(&config_path)
            )
        })?;
        log_block_start!(
            "Created default configuration: {}",
            display_path(&config_path)
        );
    }

    load_from_path(&config_path)
}

/// Load and validate the configuration at `path`. Does not create anything.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", display_path(path)))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", display_path(path)))?;

    validate_config(&config)
        .with_context(|| format!("Invalid configuration in {}", display_path(path)))?;

    Ok(config)
}

/// Path for log output with the home directory shortened to `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
