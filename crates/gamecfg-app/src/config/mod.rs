//! User preferences
//!
//! Stored in `<config_dir>/gamecfg/config.toml`:
//! - `[general]` - last opened directory
//! - `[save]` - whether validation issues block a save
//! - `[catalog]` - per-game catalog overrides

pub mod settings;
pub mod types;

pub use settings::{
    config_dir, load_preferences, load_preferences_from, remember_directory, save_preferences,
    save_preferences_to,
};
pub use types::*;
