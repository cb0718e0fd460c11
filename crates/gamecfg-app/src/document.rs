//! In-memory settings document
//!
//! A [`SettingsDocument`] owns the text of one settings file, the parsed
//! OptionSettings mapping and the catalog it is edited against. Every edit
//! goes through here so the block span, quoting info and saved baseline stay
//! consistent.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamecfg_core::prelude::*;
use gamecfg_core::{
    canonical_raw, decode, validate_raw, Catalog, RawSettings, SettingDefinition, TypedValue,
    ValidationIssue,
};
use gamecfg_dialect::{parse, serialize_with_quoting, BlockSpan};

use crate::games::GameModule;

#[derive(Debug, Clone)]
pub struct SettingsDocument {
    game: &'static GameModule,
    catalog: Arc<Catalog>,

    /// File text the span refers to
    source_text: String,
    span: BlockSpan,

    settings: RawSettings,
    quoted: BTreeSet<String>,

    /// Mapping as last loaded or saved
    original: RawSettings,

    path: Option<PathBuf>,
}

impl SettingsDocument {
    /// Parse `text` as a settings file for `game`
    pub fn from_text(
        game: &'static GameModule,
        catalog: Arc<Catalog>,
        text: impl Into<String>,
    ) -> Result<Self> {
        let source_text = text.into();
        let parsed = parse(&source_text)?;

        Ok(Self {
            game,
            catalog,
            source_text,
            span: parsed.span,
            original: parsed.settings.clone(),
            settings: parsed.settings,
            quoted: parsed.quoted,
            path: None,
        })
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    // ─────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────

    pub fn game(&self) -> &'static GameModule {
        self.game
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &RawSettings {
        &self.settings
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn span(&self) -> BlockSpan {
        self.span
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.settings.get(name).map(String::as_str)
    }

    /// Decoded value of a catalog setting
    ///
    /// `Ok(None)` when the setting is not present in the file.
    pub fn typed(&self, name: &str) -> Result<Option<TypedValue>> {
        let def = self.definition(name)?;
        self.settings
            .get(name)
            .map(|raw| decode(raw, def))
            .transpose()
    }

    /// Settings present in the file that the catalog does not know
    pub fn passthrough_keys(&self) -> impl Iterator<Item = &str> {
        self.settings
            .keys()
            .filter(|k| !self.catalog.contains(k))
            .map(String::as_str)
    }

    // ─────────────────────────────────────────────────────────
    // Edits
    // ─────────────────────────────────────────────────────────

    /// Store a raw (unquoted) value
    ///
    /// Accepts catalog settings and passthrough settings already in the file.
    /// Returns the previous value.
    pub fn set_raw(&mut self, name: &str, raw: impl Into<String>) -> Result<Option<String>> {
        if !self.catalog.contains(name) && !self.settings.contains_key(name) {
            return Err(Error::unknown_setting(name));
        }

        let raw = raw.into();
        trace!("set {} = {:?}", name, raw);
        Ok(self.settings.insert(name.to_string(), raw))
    }

    /// Store a typed value in its canonical raw form
    pub fn set_typed(&mut self, name: &str, value: &TypedValue) -> Result<Option<String>> {
        let raw = canonical_raw(value, self.definition(name)?)?;
        self.set_raw(name, raw)
    }

    /// Remove a setting from the block; it will not be written on save
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.quoted.remove(name);
        self.settings.shift_remove(name)
    }

    /// Restore one catalog setting to its default
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let default = self.definition(name)?.default_raw().to_string();
        self.settings.insert(name.to_string(), default);
        Ok(())
    }

    /// Replace the whole mapping with the catalog defaults
    ///
    /// Passthrough settings are dropped.
    pub fn reset_all(&mut self) {
        let dropped = self.passthrough_keys().count();
        if dropped > 0 {
            info!("Reset to defaults drops {} unknown setting(s)", dropped);
        }
        self.settings = self.catalog.defaults();
        self.quoted.clear();
    }

    pub fn is_modified(&self) -> bool {
        self.settings != self.original
    }

    /// Names whose value differs from the last loaded/saved state
    pub fn changed_keys(&self) -> Vec<&str> {
        let mut changed: Vec<&str> = self
            .settings
            .iter()
            .filter(|(k, v)| self.original.get(*k) != Some(v))
            .map(|(k, _)| k.as_str())
            .collect();
        changed.extend(
            self.original
                .keys()
                .filter(|k| !self.settings.contains_key(*k))
                .map(String::as_str),
        );
        changed
    }

    // ─────────────────────────────────────────────────────────
    // Validation & rendering
    // ─────────────────────────────────────────────────────────

    /// Every issue for every catalog setting present, in catalog order
    pub fn validate(&self) -> Vec<ValidationIssue> {
        self.catalog
            .iter()
            .filter_map(|def| self.settings.get(&def.name).map(|raw| validate_raw(raw, def)))
            .flatten()
            .collect()
    }

    /// New file text with the current mapping spliced into the block
    pub fn render(&self) -> Result<String> {
        serialize_with_quoting(
            &self.settings,
            &self.catalog,
            &self.source_text,
            self.span,
            &self.quoted,
        )
    }

    /// Splice the current mapping into a different base text
    ///
    /// Used when the file changed on disk outside the block since it was
    /// loaded. Edits made to the block itself by someone else are lost.
    pub fn render_onto(&self, base: &str) -> Result<String> {
        let span = parse(base)?.span;
        serialize_with_quoting(&self.settings, &self.catalog, base, span, &self.quoted)
    }

    /// Adopt `text` as the saved file content
    ///
    /// Re-parses so the span and baseline match what is on disk.
    pub fn mark_saved(&mut self, text: String, path: Option<PathBuf>) -> Result<()> {
        let parsed = parse(&text)?;
        self.source_text = text;
        self.span = parsed.span;
        self.original = parsed.settings.clone();
        self.settings = parsed.settings;
        self.quoted = parsed.quoted;
        if path.is_some() {
            self.path = path;
        }
        Ok(())
    }

    fn definition(&self, name: &str) -> Result<&SettingDefinition> {
        self.catalog
            .get(name)
            .ok_or_else(|| Error::unknown_setting(name))
    }
}
