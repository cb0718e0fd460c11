//! Configuration types for gamecfg
//!
//! Defines:
//! - `Preferences` - User preferences (`config.toml`)
//! - One sub-struct per TOML section

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// User preferences (`<config_dir>/gamecfg/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Preferences {
    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub save: SaveSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GeneralSettings {
    /// Directory of the most recently opened settings file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_directory: Option<PathBuf>,
}

/// Save behavior
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SaveSettings {
    /// Refuse to save while validation issues remain, unless forced
    #[serde(default = "default_true")]
    pub block_on_issues: bool,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            block_on_issues: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// Game id → JSON catalog replacing the built-in one
    #[serde(default)]
    pub overrides: BTreeMap<String, PathBuf>,
}

fn default_true() -> bool {
    true
}
