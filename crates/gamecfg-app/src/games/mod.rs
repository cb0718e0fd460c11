//! Static registry of supported games
//!
//! Each [`GameModule`] pairs an embedded settings catalog with the rules used
//! to recognise that game's configuration files. The registry is fixed at
//! build time; nothing is loaded dynamically.

pub mod palworld;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use gamecfg_core::prelude::*;
use gamecfg_core::Catalog;

/// Bytes of file content inspected during detection
pub const DETECTION_SAMPLE_BYTES: u64 = 2048;

/// What detection rules get to look at
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    pub file_name: &'a str,
    /// Name of the directory containing the file
    pub dir_name: &'a str,
    /// The first [`DETECTION_SAMPLE_BYTES`] of the file
    pub content_sample: &'a str,
}

/// A supported game: catalog source plus detection rules
#[derive(Debug)]
pub struct GameModule {
    pub id: &'static str,
    pub display_name: &'static str,
    catalog_source: &'static str,
    detect: fn(&DetectionInput<'_>) -> bool,
}

impl GameModule {
    /// Parse the built-in catalog
    pub fn load_catalog(&self) -> Result<Catalog> {
        Catalog::from_json(self.catalog_source)
    }

    /// Load the catalog, preferring a user override file when one is configured
    pub fn load_catalog_with(&self, overrides: &BTreeMap<String, PathBuf>) -> Result<Catalog> {
        let Some(path) = overrides.get(self.id) else {
            return self.load_catalog();
        };

        info!("Using catalog override for {}: {}", self.id, path.display());
        let source = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Catalog::from_json(&source)
            .with_context(|| format!("Invalid catalog override {}", path.display()))
    }

    pub fn detect(&self, input: &DetectionInput<'_>) -> bool {
        (self.detect)(input)
    }

    /// True when `name` refers to this game by id or display name
    pub fn matches_name(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.display_name.eq_ignore_ascii_case(name)
    }
}

/// Every game module compiled into the binary
pub static GAMES: &[GameModule] = &[palworld::MODULE];

/// Look up a game by id or display name
pub fn find_game(name: &str) -> Result<&'static GameModule> {
    GAMES
        .iter()
        .find(|g| g.matches_name(name))
        .ok_or_else(|| Error::unknown_game(name))
}

/// First game whose rules accept the input
pub fn detect_game(input: &DetectionInput<'_>) -> Option<&'static GameModule> {
    GAMES.iter().find(|g| g.detect(input))
}

/// Detect the game for a file on disk
///
/// Returns `Ok(None)` when no module recognises the file.
pub fn detect_game_for_path(path: &Path) -> Result<Option<&'static GameModule>> {
    let sample = read_sample(path)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir_name = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let input = DetectionInput {
        file_name: &file_name,
        dir_name: &dir_name,
        content_sample: &sample,
    };

    let found = detect_game(&input);
    match found {
        Some(game) => debug!("Detected {} for {}", game.display_name, path.display()),
        None => debug!("No game module matched {}", path.display()),
    }
    Ok(found)
}

fn read_sample(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| Error::file_read(path, e))?;
    let mut bytes = Vec::with_capacity(DETECTION_SAMPLE_BYTES as usize);
    file.take(DETECTION_SAMPLE_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|e| Error::file_read(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
