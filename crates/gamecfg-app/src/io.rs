//! Loading and saving settings files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamecfg_core::prelude::*;
use gamecfg_core::ValidationIssue;

use crate::document::SettingsDocument;
use crate::games::{self, GameModule};

/// How to resolve the game and catalog of a file being loaded
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Game id or name; detected from the file when `None`
    pub game: Option<String>,

    /// Game id → path of a JSON catalog replacing the built-in one
    pub catalog_overrides: BTreeMap<String, PathBuf>,
}

impl LoadOptions {
    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }
}

/// Read a file as UTF-8, keeping the path in the error
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))
}

/// Load with game detection and the built-in catalogs
pub fn load(path: &Path) -> Result<(SettingsDocument, Vec<ValidationIssue>)> {
    load_with(path, &LoadOptions::default())
}

/// Load a settings file and validate every catalog setting it contains
pub fn load_with(
    path: &Path,
    options: &LoadOptions,
) -> Result<(SettingsDocument, Vec<ValidationIssue>)> {
    let game = resolve_game(path, options)?;
    let catalog = Arc::new(game.load_catalog_with(&options.catalog_overrides)?);

    let text = read_text(path)?;
    let doc = SettingsDocument::from_text(game, catalog, text)?.with_path(path);
    let issues = doc.validate();

    info!(
        "Loaded {} ({} settings, {} issues) as {}",
        path.display(),
        doc.settings().len(),
        issues.len(),
        game.display_name
    );
    Ok((doc, issues))
}

fn resolve_game(path: &Path, options: &LoadOptions) -> Result<&'static GameModule> {
    if let Some(name) = &options.game {
        return games::find_game(name);
    }
    games::detect_game_for_path(path)?.ok_or_else(|| Error::UndetectedGame {
        path: path.to_path_buf(),
    })
}

/// Write the document to `path` and adopt the written text as its baseline
///
/// When saving back to the file the document was loaded from, the current
/// disk content is used as the base so edits made outside the block since
/// loading are kept.
pub fn save(doc: &mut SettingsDocument, path: &Path) -> Result<()> {
    let text = match disk_base(doc, path)? {
        Some(base) => doc.render_onto(&base)?,
        None => doc.render()?,
    };

    write_atomic(path, &text)?;
    doc.mark_saved(text, Some(path.to_path_buf()))?;

    info!("Saved {}", path.display());
    Ok(())
}

/// Current disk text when it differs from what the document was loaded from
fn disk_base(doc: &SettingsDocument, path: &Path) -> Result<Option<String>> {
    if doc.path() != Some(path) || !path.exists() {
        return Ok(None);
    }

    let disk = read_text(path)?;
    if disk == doc.source_text() {
        return Ok(None);
    }

    warn!(
        "{} changed on disk since it was loaded; keeping its text outside the settings block",
        path.display()
    );
    Ok(Some(disk))
}

/// Write via a temp sibling then rename over the target
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings".to_string());
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&temp_path, content).map_err(|e| Error::file_write(&temp_path, e))?;

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::file_write(path, e));
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
