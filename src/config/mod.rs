//! Configuration module for Volto-RSS-RS
//!
//! Handles loading settings from YAML files and environment variables.
//! Settings are built once at startup and handed to components by `Arc`.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load settings from an explicit file, the usual locations, or defaults.
///
/// Environment overrides are applied last in every case.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match locate(explicit) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };
    settings.merge_env();
    Ok(settings)
}

fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("RSS_FEED_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/volto-rss/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("volto-rss/settings.yml"));
    }

    paths.into_iter().find(|p| p.exists())
}
