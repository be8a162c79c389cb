use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Aliases every checklist needs so the review extractor and story rules can find
/// their fields.
pub const REQUIRED_ALIASES: [&str; 3] = ["story_syntax", "acceptance_criteria", "account_code"];

/// One checklist entry as written in the Definition of Ready configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    /// Logical field name (`summary`, `parent`, an alias, or a description topic).
    #[serde(default)]
    pub field: Option<String>,
    /// Explicit tracker field identifier; wins over alias lookup.
    #[serde(default)]
    pub field_name: Option<String>,
    pub weight: f64,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub applies_to: Vec<String>,
    #[serde(default)]
    pub optional_for_non_stories: bool,
    #[serde(default)]
    pub check_in_description: bool,
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>, field: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            field: Some(field.into()),
            field_name: None,
            weight,
            optional: false,
            applies_to: Vec::new(),
            optional_for_non_stories: false,
            check_in_description: false,
        }
    }

    /// Validation message for a malformed definition, if any.
    pub(crate) fn problem(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("rule name must not be blank".to_string());
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Some(format!(
                "rule '{}' must have a positive weight (found {})",
                self.name, self.weight
            ));
        }
        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
        if blank(&self.field) && blank(&self.field_name) {
            return Some(format!(
                "rule '{}' must name a `field` or `field_name`",
                self.name
            ));
        }
        None
    }

    /// The field label carried on check results (logical name first).
    pub(crate) fn target(&self) -> Option<String> {
        self.field.clone().or_else(|| self.field_name.clone())
    }
}

/// Logical field name to tracker field identifier table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldAliases(BTreeMap<String, String>);

impl FieldAliases {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    pub fn resolve(&self, logical: &str) -> Option<&str> {
        self.0.get(logical).map(String::as_str)
    }

    pub fn story_syntax(&self) -> Option<&str> {
        self.resolve("story_syntax")
    }

    pub fn acceptance_criteria(&self) -> Option<&str> {
        self.resolve("acceptance_criteria")
    }

    pub fn sprint(&self) -> Option<&str> {
        self.resolve("sprint")
    }

    pub(crate) fn missing_required(&self) -> Option<&'static str> {
        REQUIRED_ALIASES
            .into_iter()
            .find(|alias| self.resolve(alias).map_or(true, |id| id.trim().is_empty()))
    }
}

impl FromIterator<(String, String)> for FieldAliases {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Rejects empty checklists, malformed rules, and missing required aliases.
pub(crate) fn validate_checklist(
    definitions: &[RuleDefinition],
    aliases: &FieldAliases,
) -> Result<(), ConfigError> {
    if definitions.is_empty() {
        return Err(ConfigError::EmptyChecklist);
    }

    if let Some((index, reason)) = definitions
        .iter()
        .enumerate()
        .find_map(|(index, definition)| definition.problem().map(|reason| (index, reason)))
    {
        return Err(ConfigError::InvalidRule { index, reason });
    }

    if let Some(alias) = aliases.missing_required() {
        return Err(ConfigError::MissingAlias(alias.to_string()));
    }

    Ok(())
}
