//! Configuration module for asset-search
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;

/// Where the loaded settings came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    File(PathBuf),
    Defaults,
}

/// Load settings from `.env`, a settings file or defaults, then apply environment overrides.
pub fn load() -> Result<(Settings, SettingsSource)> {
    // A missing .env is the normal case
    let _ = dotenvy::dotenv();

    let (mut settings, source) = match find_settings_file() {
        Some(path) => (Settings::from_file(&path)?, SettingsSource::File(path)),
        None => (Settings::default(), SettingsSource::Defaults),
    };
    settings.merge_env();
    settings.validate()?;

    Ok((settings, source))
}

fn find_settings_file() -> Option<PathBuf> {
    // Check environment variable first
    if let Ok(path) = std::env::var("ASSET_SEARCH_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("asset-search/settings.yml"));
    }

    paths.into_iter().find(|p| p.exists())
}
