//! Integration tests: load, edit and save real settings files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamecfg_app::games::palworld;
use gamecfg_app::{interchange, io, SettingsDocument};
use gamecfg_core::{Catalog, Error, SettingDefinition, SettingType, TypedValue};
use gamecfg_dialect::{parse, serialize, serialize_with_quoting};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("PalWorldSettings.ini")
}

fn fixture_text() -> String {
    std::fs::read_to_string(fixture_path()).unwrap()
}

fn palworld_catalog() -> Catalog {
    palworld::MODULE.load_catalog().unwrap()
}

/// Copy the fixture into a temp dir so tests can write to it
fn fixture_copy(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("PalWorldSettings.ini");
    std::fs::copy(fixture_path(), &path).unwrap();
    path
}

#[test]
fn fixture_parses_every_setting() {
    let parsed = parse(&fixture_text()).unwrap();
    let catalog = palworld_catalog();

    assert_eq!(parsed.settings.len(), catalog.len() + 2);
    assert_eq!(parsed.settings["ServerName"], "Friday Night Pals");
    assert_eq!(parsed.settings["CrossplayPlatforms"], "(Steam,Xbox,PS5,Mac)");
    assert_eq!(parsed.settings["bAllowGlobalPalboxExport"], "True");
}

#[test]
fn round_trip_preserves_mapping_and_outside_text() {
    let text = fixture_text();
    let catalog = palworld_catalog();
    let parsed = parse(&text).unwrap();

    let written = serialize_with_quoting(
        &parsed.settings,
        &catalog,
        &text,
        parsed.span,
        &parsed.quoted,
    )
    .unwrap();

    assert_eq!(&written[..parsed.span.start], &text[..parsed.span.start]);
    assert_eq!(
        &written[written.len() - (text.len() - parsed.span.end)..],
        &text[parsed.span.end..]
    );

    let reparsed = parse(&written).unwrap();
    assert_eq!(reparsed.settings, parsed.settings);
    assert_eq!(reparsed.quoted, parsed.quoted);
}

#[test]
fn serialize_is_idempotent() {
    let text = fixture_text();
    let catalog = palworld_catalog();

    let first = parse(&text).unwrap();
    let once = serialize(&first.settings, &catalog, &text, first.span).unwrap();
    let second = parse(&once).unwrap();
    let twice = serialize(&second.settings, &catalog, &once, second.span).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn normalization_is_applied_on_write() {
    let catalog = palworld_catalog();
    let text = "OptionSettings=(bIsPvP=1,ExpRate=3.5,ServerPlayerMaxNum=16,ServerName=Bare)";
    let parsed = parse(text).unwrap();

    let out = serialize(&parsed.settings, &catalog, text, parsed.span).unwrap();
    assert_eq!(
        out,
        "OptionSettings=(ExpRate=3.500000,\nbIsPvP=True,\nServerPlayerMaxNum=16,\nServerName=\"Bare\")"
    );
}

#[test]
fn concrete_edit_scenario() {
    let catalog = Catalog::new(vec![
        SettingDefinition::new("Difficulty", SettingType::Enum)
            .options(["None", "Casual", "Normal", "Hard"])
            .default_value("None"),
        SettingDefinition::new("ExpRate", SettingType::Float).bounds(0.1, 100.0),
        SettingDefinition::new("bIsPvP", SettingType::Bool),
    ])
    .unwrap();

    let text = "OptionSettings=(Difficulty=None,ExpRate=2.500000,bIsPvP=True)";
    let mut parsed = parse(text).unwrap();
    assert_eq!(parsed.settings["ExpRate"], "2.500000");

    parsed
        .settings
        .insert("ExpRate".to_string(), "5.0".to_string());
    let out = serialize(&parsed.settings, &catalog, text, parsed.span).unwrap();

    assert_eq!(
        out,
        "OptionSettings=(Difficulty=None,\nExpRate=5.000000,\nbIsPvP=True)"
    );
}

#[test]
fn plain_ini_without_block_is_a_format_error() {
    let err = parse("[ServerSettings]\nMaxPlayers=10\n").unwrap_err();
    assert!(matches!(err, Error::MissingBlock));
    assert!(err.is_format_error());
}

#[test]
fn document_save_and_reload() {
    let temp = TempDir::new().unwrap();
    let path = fixture_copy(&temp);

    let (mut doc, issues) = io::load(&path).unwrap();
    assert!(issues.is_empty(), "{:?}", issues);

    doc.set_typed("ExpRate", &TypedValue::Float(10.0)).unwrap();
    doc.set_typed("bIsPvP", &TypedValue::Bool(true)).unwrap();
    io::save(&mut doc, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("; This configuration file is a sample"));
    assert!(written.contains("ExpRate=10.000000,\n"));
    assert!(written.contains("CrossplayPlatforms=(Steam,Xbox,PS5,Mac)"));

    let (reloaded, _) = io::load(&path).unwrap();
    assert_eq!(reloaded.typed("bIsPvP").unwrap(), Some(TypedValue::Bool(true)));
    assert_eq!(reloaded.settings().len(), doc.settings().len());
    // Unknown settings follow the catalog settings in their original order
    let tail: Vec<_> = reloaded.settings().keys().rev().take(2).collect();
    assert_eq!(tail, ["bAllowGlobalPalboxExport", "CrossplayPlatforms"]);
}

#[test]
fn removed_settings_are_not_written() {
    let temp = TempDir::new().unwrap();
    let path = fixture_copy(&temp);

    let (mut doc, _) = io::load(&path).unwrap();
    doc.remove("PalEggDefaultHatchingTime");
    io::save(&mut doc, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("PalEggDefaultHatchingTime"));
}

#[test]
fn export_then_import_into_fresh_document() {
    let temp = TempDir::new().unwrap();
    let path = fixture_copy(&temp);
    let (doc, _) = io::load(&path).unwrap();

    let json_path = temp.path().join("export.json");
    interchange::write_export(&interchange::export(&doc), &json_path).unwrap();

    let catalog = Arc::new(palworld_catalog());
    let mut fresh = SettingsDocument::from_text(
        &palworld::MODULE,
        catalog,
        "OptionSettings=(CrossplayPlatforms=(Steam))",
    )
    .unwrap();
    let report = interchange::import(&mut fresh, &interchange::read_export(&json_path).unwrap());

    assert!(report.rejected.is_empty());
    assert_eq!(report.skipped_unknown, ["bAllowGlobalPalboxExport"]);
    assert_eq!(fresh.get("ServerName"), Some("Friday Night Pals"));
    assert_eq!(
        fresh.get("CrossplayPlatforms"),
        Some("(Steam,Xbox,PS5,Mac)")
    );
}
