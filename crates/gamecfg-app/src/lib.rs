//! gamecfg-app - Games, documents and files for gamecfg
//!
//! This crate ties the catalog and dialect crates together: the static game
//! registry with detection rules, the editable settings document, atomic
//! file loading/saving, JSON interchange and user preferences.

pub mod config;
pub mod document;
pub mod games;
pub mod interchange;
pub mod io;

// Re-export primary types
pub use document::SettingsDocument;
pub use games::{detect_game_for_path, find_game, GameModule, GAMES};
pub use interchange::{export, import, parse_export, read_export, write_export, ExportFile, ImportReport};
pub use io::{load, load_with, save, write_atomic, LoadOptions};
