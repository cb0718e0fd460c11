//! Settings catalog
//!
//! The catalog is the ordered, declarative schema of every setting a game
//! module knows about. Declaration order is significant: the serializer emits
//! settings in exactly this order.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::prelude::*;
use crate::value::{unquote, RawSettings};

/// The declared type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "integer")]
    Int,
    Float,
    String,
    Enum,
}

impl SettingType {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingType::Bool => "bool",
            SettingType::Int => "int",
            SettingType::Float => "float",
            SettingType::String => "string",
            SettingType::Enum => "enum",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SettingType::Int | SettingType::Float)
    }
}

impl std::fmt::Display for SettingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.type_name())
    }
}

/// A compiled regular expression that (de)serializes as its source text
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|e| Error::catalog(format!("invalid pattern {:?}: {}", source, e)))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True when the pattern matches at the start of `value`
    ///
    /// Only the start is anchored; a pattern must end in `$` to require a
    /// full match.
    pub fn is_match(&self, value: &str) -> bool {
        self.0.find(value).is_some_and(|m| m.start() == 0)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Pattern)
            .map_err(serde::de::Error::custom)
    }
}

/// A single setting in the catalog
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SettingDefinition {
    /// Key as it appears inside the OptionSettings block
    pub name: String,

    /// Grouping label for presentation
    #[serde(default)]
    pub category: String,

    #[serde(rename = "type")]
    pub kind: SettingType,

    /// Canonical default value
    #[serde(default)]
    pub default: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Allowed values, enum settings only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Required shape, string settings only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,

    #[serde(default)]
    pub description: String,
}

impl SettingDefinition {
    pub fn new(name: impl Into<String>, kind: SettingType) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            kind,
            default: String::new(),
            min: None,
            max: None,
            options: Vec::new(),
            pattern: None,
            description: String::new(),
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Default value in the unquoted form stored in documents
    pub fn default_raw(&self) -> &str {
        unquote(&self.default)
    }

    fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::catalog("setting with an empty name"));
        }

        if self.kind == SettingType::Enum && self.options.is_empty() {
            return Err(Error::EmptyEnumOptions {
                name: self.name.clone(),
            });
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::catalog(format!(
                    "setting '{}' has min {} greater than max {}",
                    self.name, min, max
                )));
            }
        }

        // Fields that do not apply to the type are ignored, not rejected
        if !self.kind.is_numeric() && (self.min.is_some() || self.max.is_some()) {
            warn!("Bounds on non-numeric setting '{}' are ignored", self.name);
        }
        if self.kind != SettingType::Enum && !self.options.is_empty() {
            warn!("Options on non-enum setting '{}' are ignored", self.name);
        }
        if self.kind != SettingType::String && self.pattern.is_some() {
            warn!("Pattern on non-string setting '{}' is ignored", self.name);
        }

        Ok(())
    }
}

/// Ordered collection of setting definitions with name lookup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: Vec<SettingDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, enforcing unique names and well-formed definitions
    pub fn new(definitions: Vec<SettingDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(definitions.len());

        for (position, def) in definitions.iter().enumerate() {
            def.check()?;
            if index.insert(def.name.clone(), position).is_some() {
                return Err(Error::DuplicateSetting {
                    name: def.name.clone(),
                });
            }
        }

        debug!("Catalog loaded with {} settings", definitions.len());
        Ok(Self { definitions, index })
    }

    /// Parse a catalog from a JSON array of definitions
    pub fn from_json(source: &str) -> Result<Self> {
        let definitions: Vec<SettingDefinition> = serde_json::from_str(source)
            .map_err(|e| Error::catalog(format!("invalid catalog definition: {}", e)))?;
        Self::new(definitions)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.definitions)?)
    }

    pub fn get(&self, name: &str) -> Option<&SettingDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &SettingDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Category names, sorted and deduplicated
    pub fn categories(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .map(|d| d.category.as_str())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a SettingDefinition> + 'a {
        self.definitions
            .iter()
            .filter(move |d| d.category == category)
    }

    /// Default raw values in declaration order
    pub fn defaults(&self) -> RawSettings {
        self.definitions
            .iter()
            .map(|d| (d.name.clone(), d.default_raw().to_string()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a SettingDefinition;
    type IntoIter = std::slice::Iter<'a, SettingDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"name": "Difficulty", "category": "General", "type": "enum",
         "options": ["None", "Casual", "Normal", "Hard"], "default": "None"},
        {"name": "ExpRate", "category": "General", "type": "float",
         "min": 0.1, "max": 100, "default": "1.000000"},
        {"name": "bIsPvP", "category": "Server", "type": "boolean", "default": "False"},
        {"name": "CoopPlayerMaxNum", "category": "Server", "type": "integer",
         "min": 1, "max": 32, "default": "4"},
        {"name": "ServerName", "category": "Server", "type": "string",
         "pattern": "^[\\w\\s\\-\\.]{1,50}$", "default": "\"Default Palworld Server\""}
    ]"#;

    #[test]
    fn test_from_json_preserves_declaration_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            ["Difficulty", "ExpRate", "bIsPvP", "CoopPlayerMaxNum", "ServerName"]
        );
    }

    #[test]
    fn test_type_aliases() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.get("bIsPvP").unwrap().kind, SettingType::Bool);
        assert_eq!(
            catalog.get("CoopPlayerMaxNum").unwrap().kind,
            SettingType::Int
        );
        assert_eq!(catalog.get("ExpRate").unwrap().max, Some(100.0));
    }

    #[test]
    fn test_pattern_compiled_on_load() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let pattern = catalog.get("ServerName").unwrap().pattern.as_ref().unwrap();
        assert!(pattern.is_match("My Server"));
        assert!(!pattern.is_match("bad|name"));
    }

    #[test]
    fn test_pattern_is_anchored_at_start_only() {
        let pattern = Pattern::new(r"\d+").unwrap();
        assert!(pattern.is_match("12"));
        assert!(pattern.is_match("12ab"));
        assert!(!pattern.is_match("ab12"));

        let alternation = Pattern::new("b|ab").unwrap();
        assert!(alternation.is_match("ab"));
        assert!(!alternation.is_match("cab"));
    }

    #[test]
    fn test_invalid_pattern_is_catalog_error() {
        let json = r#"[{"name": "A", "type": "string", "pattern": "(unclosed"}]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Catalog { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = Catalog::new(vec![
            SettingDefinition::new("ExpRate", SettingType::Float),
            SettingDefinition::new("ExpRate", SettingType::Int),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateSetting { name } if name == "ExpRate"));
    }

    #[test]
    fn test_enum_without_options_rejected() {
        let err = Catalog::new(vec![SettingDefinition::new(
            "Difficulty",
            SettingType::Enum,
        )])
        .unwrap_err();
        assert!(matches!(err, Error::EmptyEnumOptions { .. }));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = Catalog::new(vec![
            SettingDefinition::new("ExpRate", SettingType::Float).bounds(10.0, 1.0)
        ])
        .unwrap_err();
        assert!(err.to_string().contains("greater than max"));
    }

    #[test]
    fn test_categories_sorted_and_unique() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.categories(), vec!["General", "Server"]);
        let server: Vec<&str> = catalog
            .by_category("Server")
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(server, ["bIsPvP", "CoopPlayerMaxNum", "ServerName"]);
    }

    #[test]
    fn test_defaults_are_unquoted_and_ordered() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let defaults = catalog.defaults();
        assert_eq!(defaults.len(), 5);
        assert_eq!(defaults.get_index(0).unwrap().0, "Difficulty");
        assert_eq!(defaults["ServerName"], "Default Palworld Server");
        assert_eq!(defaults["ExpRate"], "1.000000");
    }

    #[test]
    fn test_json_roundtrip_keeps_pattern_source() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let again = Catalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(
            catalog.get("ServerName").unwrap(),
            again.get("ServerName").unwrap()
        );
    }
}
