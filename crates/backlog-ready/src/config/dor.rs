use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::workflows::backlog::{CullThresholds, RefinementSettings, StalenessWeights};
use crate::workflows::readiness::{validate_checklist, FieldAliases, RuleDefinition};

/// Definition of Ready checklist plus the backlog hygiene knobs that ride along with it.
///
/// Loaded once at startup and validated eagerly; a value of this type is always
/// usable to build a [`crate::workflows::readiness::DorChecker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DorConfig {
    pub definition_of_ready: Vec<RuleDefinition>,
    #[serde(default)]
    pub custom_fields: FieldAliases,
    #[serde(default)]
    pub statuses: BTreeMap<String, String>,
    #[serde(default)]
    pub backlog_cull: CullThresholds,
    #[serde(default)]
    pub refinement_prep: RefinementSettings,
    #[serde(default)]
    pub staleness_weights: StalenessWeights,
}

impl DorConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_checklist(&self.definition_of_ready, &self.custom_fields)?;
        self.staleness_weights.validate()
    }

    pub fn field_aliases(&self) -> FieldAliases {
        self.custom_fields.clone()
    }

    /// Status name of issues still awaiting refinement (`statuses.not_ready`).
    pub fn not_ready_status(&self) -> Option<&str> {
        self.statuses
            .get("not_ready")
            .map(String::as_str)
            .filter(|status| !status.trim().is_empty())
    }

    /// Tracker field holding sprint membership, when configured.
    pub fn sprint_field(&self) -> Option<&str> {
        self.custom_fields.sprint()
    }
}
