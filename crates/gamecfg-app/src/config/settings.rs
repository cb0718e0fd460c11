//! Loading and saving user preferences

use std::path::{Path, PathBuf};

use gamecfg_core::prelude::*;

use super::types::Preferences;
use crate::io::write_atomic;

const APP_DIR: &str = "gamecfg";
const CONFIG_FILENAME: &str = "config.toml";

/// `<config_dir>/gamecfg`, or `None` when the platform has no config dir
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// Load preferences from the platform config directory
pub fn load_preferences() -> Preferences {
    match config_dir() {
        Some(dir) => load_preferences_from(&dir),
        None => {
            debug!("No config directory on this platform, using default preferences");
            Preferences::default()
        }
    }
}

/// Load preferences from `dir/config.toml`; problems fall back to defaults
pub fn load_preferences_from(dir: &Path) -> Preferences {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Preferences::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(prefs) => {
                debug!("Loaded preferences from {:?}", config_path);
                prefs
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Preferences::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Preferences::default()
        }
    }
}

pub fn save_preferences(prefs: &Preferences) -> Result<()> {
    let dir = config_dir().ok_or_else(|| Error::config("no config directory on this platform"))?;
    save_preferences_to(&dir, prefs)
}

/// Write `dir/config.toml` atomically, creating `dir` if needed
pub fn save_preferences_to(dir: &Path, prefs: &Preferences) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", dir, e)))?;
    }

    let content = toml::to_string_pretty(prefs)
        .map_err(|e| Error::config(format!("Failed to serialize preferences: {}", e)))?;

    let config_path = dir.join(CONFIG_FILENAME);
    write_atomic(&config_path, &format!("{}{}", generate_config_header(), content))?;

    info!("Saved preferences to {:?}", config_path);
    Ok(())
}

/// Record the directory of `file` as the last one used
///
/// Returns true when the preference changed.
pub fn remember_directory(prefs: &mut Preferences, file: &Path) -> bool {
    let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return false;
    };
    let dir = dir.to_path_buf();

    if prefs.general.last_directory.as_ref() == Some(&dir) {
        return false;
    }
    prefs.general.last_directory = Some(dir);
    true
}

fn generate_config_header() -> String {
    r#"# gamecfg preferences
# Edited by hand or updated by the gamecfg CLI

"#
    .to_string()
}
