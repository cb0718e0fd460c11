//! OptionSettings block serializer
//!
//! Re-encodes a settings mapping into the `OptionSettings=(...)` form and
//! splices it over the original block span. Bytes outside the span are copied
//! through untouched.

use std::collections::BTreeSet;

use gamecfg_core::prelude::*;
use gamecfg_core::{normalize, quote, Catalog, RawSettings, SettingDefinition};

use crate::parser::{locate_block, BlockSpan, BLOCK_OPENER};

/// Separator placed between `key=value` fragments
pub const FRAGMENT_SEPARATOR: &str = ",\n";

/// Serialize `settings` and splice the result into `original_text`
///
/// Catalog settings are written first, in catalog declaration order.
/// Settings the catalog does not know are appended afterwards in mapping
/// order. Catalog settings missing from the mapping are not written.
///
/// Fails with [`Error::SpanMismatch`] if `span` no longer locates the block in
/// `original_text`; re-parse before serializing again.
pub fn serialize(
    settings: &RawSettings,
    catalog: &Catalog,
    original_text: &str,
    span: BlockSpan,
) -> Result<String> {
    serialize_with_quoting(settings, catalog, original_text, span, &BTreeSet::new())
}

/// Like [`serialize`], re-quoting the passthrough keys listed in `quoted`
pub fn serialize_with_quoting(
    settings: &RawSettings,
    catalog: &Catalog,
    original_text: &str,
    span: BlockSpan,
    quoted: &BTreeSet<String>,
) -> Result<String> {
    check_span(original_text, span)?;

    let block = render_block(settings, catalog, quoted);

    let mut out = String::with_capacity(original_text.len() - span.len() + block.len());
    out.push_str(&original_text[..span.start]);
    out.push_str(&block);
    out.push_str(&original_text[span.end..]);

    debug!(
        "Serialized {} settings into block at {}..{}",
        settings.len(),
        span.start,
        span.end
    );
    Ok(out)
}

/// Render the complete `OptionSettings=(...)` text for `settings`
pub fn render_block(settings: &RawSettings, catalog: &Catalog, quoted: &BTreeSet<String>) -> String {
    let mut fragments: Vec<String> = Vec::with_capacity(settings.len());

    for def in catalog {
        match settings.get(&def.name) {
            Some(raw) => fragments.push(format!("{}={}", def.name, encode_fragment(raw, def))),
            None => trace!("'{}' not in mapping, not written", def.name),
        }
    }

    for (key, raw) in settings.iter().filter(|(key, _)| !catalog.contains(key)) {
        trace!("Passing through unknown setting '{}'", key);
        let value = if quoted.contains(key) {
            quote(raw)
        } else {
            raw.clone()
        };
        fragments.push(format!("{}={}", key, value));
    }

    format!("{}{})", BLOCK_OPENER, fragments.join(FRAGMENT_SEPARATOR))
}

/// Canonical wire form of a catalog value, or the raw text if it does not decode
fn encode_fragment(raw: &str, def: &SettingDefinition) -> String {
    match normalize(raw, def) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!("Writing '{}' verbatim: {}", def.name, e);
            raw.to_string()
        }
    }
}

fn check_span(text: &str, span: BlockSpan) -> Result<()> {
    let mismatch = || Error::SpanMismatch {
        start: span.start,
        end: span.end,
    };

    if span.start >= span.end
        || span.end > text.len()
        || !text.is_char_boundary(span.start)
        || !text.is_char_boundary(span.end)
    {
        return Err(mismatch());
    }

    match locate_block(text) {
        Some((found, _)) if found == span => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use gamecfg_core::{SettingDefinition, SettingType};

    fn scenario_catalog() -> Catalog {
        Catalog::new(vec![
            SettingDefinition::new("Difficulty", SettingType::Enum)
                .options(["None", "Casual", "Normal", "Hard"])
                .default_value("None"),
            SettingDefinition::new("ExpRate", SettingType::Float)
                .bounds(0.1, 100.0)
                .default_value("1.000000"),
            SettingDefinition::new("bIsPvP", SettingType::Bool).default_value("False"),
        ])
        .unwrap()
    }

    #[test]
    fn test_scenario_edit_and_serialize() {
        let text = "OptionSettings=(Difficulty=None,ExpRate=2.500000,bIsPvP=True)";
        let mut parsed = parse(text).unwrap();
        parsed
            .settings
            .insert("ExpRate".to_string(), "5.0".to_string());

        let out = serialize(&parsed.settings, &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(
            out,
            "OptionSettings=(Difficulty=None,\nExpRate=5.000000,\nbIsPvP=True)"
        );
    }

    #[test]
    fn test_bytes_outside_span_unchanged() {
        let head = "[/Script/Pal.PalGameWorldSettings]\r\n";
        let tail = "\r\n\r\n; trailing comment ✓\r\n";
        let text = format!("{}OptionSettings=(bIsPvP=1,ExpRate=2){}", head, tail);
        let parsed = parse(&text).unwrap();

        let out = serialize(&parsed.settings, &scenario_catalog(), &text, parsed.span).unwrap();
        assert!(out.starts_with(head));
        assert!(out.ends_with(tail));
        assert_eq!(
            &out[head.len()..out.len() - tail.len()],
            "OptionSettings=(ExpRate=2.000000,\nbIsPvP=True)"
        );
    }

    #[test]
    fn test_catalog_order_not_mapping_order() {
        let text = "OptionSettings=(bIsPvP=False,ExpRate=1.000000,Difficulty=Hard)";
        let parsed = parse(text).unwrap();

        let out = serialize(&parsed.settings, &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(
            out,
            "OptionSettings=(Difficulty=Hard,\nExpRate=1.000000,\nbIsPvP=False)"
        );
    }

    #[test]
    fn test_catalog_settings_absent_from_mapping_are_skipped() {
        let text = "OptionSettings=(ExpRate=1.000000)";
        let parsed = parse(text).unwrap();

        let out = serialize(&parsed.settings, &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(out, "OptionSettings=(ExpRate=1.000000)");
        assert!(!out.contains("Difficulty"));
        assert!(!out.contains("bIsPvP"));
    }

    #[test]
    fn test_unknown_keys_appended_after_catalog_keys() {
        let text = "OptionSettings=(Zeta=9,bIsPvP=True,Alpha=\"a b\",ExpRate=1.000000)";
        let parsed = parse(text).unwrap();

        let out = serialize_with_quoting(
            &parsed.settings,
            &scenario_catalog(),
            text,
            parsed.span,
            &parsed.quoted,
        )
        .unwrap();
        assert_eq!(
            out,
            "OptionSettings=(ExpRate=1.000000,\nbIsPvP=True,\nZeta=9,\nAlpha=\"a b\")"
        );
    }

    #[test]
    fn test_unknown_keys_without_quote_info_written_bare() {
        let text = "OptionSettings=(Alpha=\"a\")";
        let parsed = parse(text).unwrap();
        let out = serialize(&parsed.settings, &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(out, "OptionSettings=(Alpha=a)");
    }

    #[test]
    fn test_string_settings_quoted_once() {
        let catalog = Catalog::new(vec![SettingDefinition::new(
            "ServerName",
            SettingType::String,
        )])
        .unwrap();
        let text = "OptionSettings=(ServerName=\"My Server\")";
        let parsed = parse(text).unwrap();
        let out = serialize(&parsed.settings, &catalog, text, parsed.span).unwrap();
        assert_eq!(out, text);

        let mut settings = RawSettings::new();
        settings.insert("ServerName".into(), "Bare".into());
        let out = serialize(&settings, &catalog, text, parsed.span).unwrap();
        assert_eq!(out, "OptionSettings=(ServerName=\"Bare\")");
    }

    #[test]
    fn test_quotes_and_parens_inside_strings_round_trip() {
        let catalog = Catalog::new(vec![
            SettingDefinition::new("ServerDescription", SettingType::String),
            SettingDefinition::new("AdminPassword", SettingType::String),
        ])
        .unwrap();
        let text = "OptionSettings=(ServerDescription=\"x\",AdminPassword=\"pw\")\n[Next]\n";
        let mut parsed = parse(text).unwrap();
        parsed
            .settings
            .insert("ServerDescription".into(), "27\" monitors (ok".into());

        let out = serialize(&parsed.settings, &catalog, text, parsed.span).unwrap();
        assert_eq!(
            out,
            "OptionSettings=(ServerDescription=\"27\" monitors (ok\",\nAdminPassword=\"pw\")\n[Next]\n"
        );

        let reparsed = parse(&out).unwrap();
        assert_eq!(reparsed.settings, parsed.settings);
        assert_eq!(&out[reparsed.span.end..], "\n[Next]\n");
    }

    #[test]
    fn test_undecodable_value_written_verbatim() {
        let text = "OptionSettings=(ExpRate=fast)";
        let parsed = parse(text).unwrap();
        let out = serialize(&parsed.settings, &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_invalid_enum_value_round_trips() {
        let text = "OptionSettings=(Difficulty=Nightmare)";
        let parsed = parse(text).unwrap();
        let out = serialize(&parsed.settings, &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_stale_span_is_rejected() {
        let text = "OptionSettings=(ExpRate=1.000000)";
        let parsed = parse(text).unwrap();

        let changed = format!("; new header\n{}", text);
        let err = serialize(&parsed.settings, &scenario_catalog(), &changed, parsed.span)
            .unwrap_err();
        assert!(matches!(err, Error::SpanMismatch { .. }));

        let err = serialize(
            &parsed.settings,
            &scenario_catalog(),
            "no block here",
            parsed.span,
        )
        .unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_out_of_bounds_span_is_rejected() {
        let text = "OptionSettings=()";
        let err = serialize(
            &RawSettings::new(),
            &scenario_catalog(),
            text,
            BlockSpan::new(0, 500),
        )
        .unwrap_err();
        assert!(matches!(err, Error::SpanMismatch { start: 0, end: 500 }));
    }

    #[test]
    fn test_empty_mapping_renders_empty_block() {
        let text = "a\nOptionSettings=(ExpRate=1.0)\nb";
        let parsed = parse(text).unwrap();
        let out = serialize(&RawSettings::new(), &scenario_catalog(), text, parsed.span).unwrap();
        assert_eq!(out, "a\nOptionSettings=()\nb");
    }
}
