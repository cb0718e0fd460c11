//! JSON export and import of settings
//!
//! Export files carry the game id, the source file name and a timestamp
//! alongside the raw settings. Import merges what it can and reports the
//! rest instead of failing on the first bad key.

use std::path::Path;

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gamecfg_core::prelude::*;
use gamecfg_core::{canonical_raw, SettingDefinition, SettingType, TypedValue, ValidationIssue};

use crate::document::SettingsDocument;
use crate::io::{read_text, write_atomic};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFile {
    #[serde(default)]
    pub game: Option<String>,

    #[serde(default)]
    pub source_file: Option<String>,

    #[serde(default)]
    pub export_date: Option<DateTime<Local>>,

    pub settings: IndexMap<String, Value>,
}

/// Snapshot the document's settings for export
pub fn export(doc: &SettingsDocument) -> ExportFile {
    ExportFile {
        game: Some(doc.game().id.to_string()),
        source_file: doc
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned()),
        export_date: Some(Local::now()),
        settings: doc
            .settings()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    }
}

pub fn write_export(export: &ExportFile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    write_atomic(path, &json)?;
    info!(
        "Exported {} settings to {}",
        export.settings.len(),
        path.display()
    );
    Ok(())
}

pub fn read_export(path: &Path) -> Result<ExportFile> {
    parse_export(&read_text(path)?)
}

/// Parse export JSON; a missing `settings` object is an import error
pub fn parse_export(json: &str) -> Result<ExportFile> {
    let value: Value = serde_json::from_str(json)?;
    if !value.get("settings").is_some_and(Value::is_object) {
        return Err(Error::import("missing 'settings' object"));
    }
    Ok(serde_json::from_value(value)?)
}

/// Outcome of [`import`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Settings whose value was taken from the export
    pub applied: Vec<String>,

    /// Settings the catalog does not know and the file does not contain
    pub skipped_unknown: Vec<String>,

    /// Settings whose value could not be used, with the reason
    pub rejected: Vec<(String, String)>,

    /// Game id recorded in the export when it differs from the document's
    pub game_mismatch: Option<String>,

    /// Validation issues of the document after the merge
    pub issues: Vec<ValidationIssue>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_unknown.is_empty()
            && self.rejected.is_empty()
            && self.game_mismatch.is_none()
            && self.issues.is_empty()
    }
}

/// Merge exported settings into the document
pub fn import(doc: &mut SettingsDocument, export: &ExportFile) -> ImportReport {
    let mut report = ImportReport::default();

    if let Some(game) = &export.game {
        if game != doc.game().id {
            warn!(
                "Importing settings exported for '{}' into a {} document",
                game,
                doc.game().display_name
            );
            report.game_mismatch = Some(game.clone());
        }
    }

    for (name, value) in &export.settings {
        let raw = match doc.catalog().get(name) {
            Some(def) => json_to_raw(value, def),
            None if doc.settings().contains_key(name) => scalar_text(value)
                .ok_or_else(|| format!("expected a string, number or boolean, got {}", value)),
            None => {
                debug!("Skipping unknown imported setting '{}'", name);
                report.skipped_unknown.push(name.clone());
                continue;
            }
        };

        match raw.and_then(|raw| doc.set_raw(name, raw).map_err(|e| e.to_string())) {
            Ok(_) => report.applied.push(name.clone()),
            Err(reason) => {
                warn!("Rejected imported value for '{}': {}", name, reason);
                report.rejected.push((name.clone(), reason));
            }
        }
    }

    report.issues = doc.validate();
    info!(
        "Imported {} settings ({} skipped, {} rejected)",
        report.applied.len(),
        report.skipped_unknown.len(),
        report.rejected.len()
    );
    report
}

/// Raw string for a JSON value of a catalog setting
///
/// Strings are stored as-is so invalid text still reaches validation;
/// numbers and booleans are converted through the setting's type.
fn json_to_raw(value: &Value, def: &SettingDefinition) -> std::result::Result<String, String> {
    let typed = match value {
        Value::String(s) => return Ok(s.clone()),
        Value::Bool(b) => TypedValue::Bool(*b),
        Value::Number(n) => match (def.kind, n.as_i64()) {
            (SettingType::Int, Some(i)) => TypedValue::Int(i),
            (SettingType::Bool, Some(i)) => TypedValue::Bool(i != 0),
            (SettingType::String | SettingType::Enum, _) => TypedValue::Str(n.to_string()),
            _ => TypedValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        other => {
            return Err(format!(
                "expected a string, number or boolean, got {}",
                other
            ))
        }
    };

    canonical_raw(&typed, def).map_err(|e| e.to_string())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        _ => None,
    }
}
