use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::workflows::readiness::DorResult;
use crate::workflows::tracker::{parse_timestamp, Issue};

/// Point split and normalization horizons for the staleness metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessWeights {
    pub age_points: f64,
    pub inactivity_points: f64,
    pub refinement_points: f64,
    pub age_horizon_days: u32,
    pub inactivity_horizon_days: u32,
}

impl Default for StalenessWeights {
    fn default() -> Self {
        Self {
            age_points: 40.0,
            inactivity_points: 40.0,
            refinement_points: 20.0,
            age_horizon_days: 365,
            inactivity_horizon_days: 180,
        }
    }
}

impl StalenessWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let points = [
            ("age_points", self.age_points),
            ("inactivity_points", self.inactivity_points),
            ("refinement_points", self.refinement_points),
        ];
        if let Some((name, value)) = points
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::InvalidStalenessWeights(format!(
                "{name} must be a non-negative number (found {value})"
            )));
        }

        if self.age_horizon_days == 0 || self.inactivity_horizon_days == 0 {
            return Err(ConfigError::InvalidStalenessWeights(
                "horizons must be at least one day".to_string(),
            ));
        }

        Ok(())
    }

    pub fn max_points(&self) -> f64 {
        self.age_points + self.inactivity_points + self.refinement_points
    }
}

/// Thresholds deciding which old issues are proposed for culling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullThresholds {
    pub age_threshold_days: u32,
    pub no_activity_days: u32,
    pub min_refinement_score: f64,
}

impl Default for CullThresholds {
    fn default() -> Self {
        Self {
            age_threshold_days: 180,
            no_activity_days: 90,
            min_refinement_score: 30.0,
        }
    }
}

/// Per-run replacements for configured thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullOverrides {
    pub age_threshold_days: Option<u32>,
    pub no_activity_days: Option<u32>,
    pub min_refinement_score: Option<f64>,
}

impl CullOverrides {
    pub fn apply(&self, base: &CullThresholds) -> CullThresholds {
        CullThresholds {
            age_threshold_days: self.age_threshold_days.unwrap_or(base.age_threshold_days),
            no_activity_days: self.no_activity_days.unwrap_or(base.no_activity_days),
            min_refinement_score: self
                .min_refinement_score
                .unwrap_or(base.min_refinement_score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessLabel {
    VeryStale,
    Stale,
    ModeratelyStale,
}

impl StalenessLabel {
    pub fn from_score(staleness: f64) -> Self {
        if staleness >= 80.0 {
            Self::VeryStale
        } else if staleness >= 60.0 {
            Self::Stale
        } else {
            Self::ModeratelyStale
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryStale => "Very Stale",
            Self::Stale => "Stale",
            Self::ModeratelyStale => "Moderately Stale",
        }
    }
}

/// The three weighted contributions to a staleness score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StalenessFactors {
    pub age: f64,
    pub inactivity: f64,
    pub refinement: f64,
}

impl StalenessFactors {
    /// Each ratio is clamped to `[0, 1]`, so future timestamps or odd percentages
    /// never push the total outside `[0, max_points]`.
    pub fn compute(
        age_days: i64,
        days_since_update: i64,
        dor_percentage: f64,
        weights: &StalenessWeights,
    ) -> Self {
        let ratio = |days: i64, horizon: u32| (days as f64 / f64::from(horizon)).clamp(0.0, 1.0);
        let shortfall = ((100.0 - dor_percentage) / 100.0).clamp(0.0, 1.0);

        Self {
            age: ratio(age_days, weights.age_horizon_days) * weights.age_points,
            inactivity: ratio(days_since_update, weights.inactivity_horizon_days)
                * weights.inactivity_points,
            refinement: shortfall * weights.refinement_points,
        }
    }

    pub fn total(&self) -> f64 {
        self.age + self.inactivity + self.refinement
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StalenessResult {
    pub age_days: i64,
    pub days_since_update: i64,
    pub refinement: f64,
    pub factors: StalenessFactors,
    pub staleness: f64,
    pub is_candidate: bool,
    pub label: StalenessLabel,
}

#[derive(Debug, thiserror::Error)]
pub enum StalenessError {
    #[error("issue has no `{field}` timestamp")]
    MissingTimestamp { field: &'static str },
    #[error("`{field}` timestamp '{value}' is not a recognised date")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Scores how stale an issue is and whether it qualifies for culling.
pub fn compute_staleness(
    issue: &Issue,
    dor: &DorResult,
    thresholds: &CullThresholds,
    weights: &StalenessWeights,
    now: DateTime<Utc>,
) -> Result<StalenessResult, StalenessError> {
    let created = issue_timestamp(issue, TimestampField::Created)?;
    let updated = issue_timestamp(issue, TimestampField::Updated)?;

    let age_days = (now - created.with_timezone(&Utc)).num_days();
    let days_since_update = (now - updated.with_timezone(&Utc)).num_days();

    let factors = StalenessFactors::compute(age_days, days_since_update, dor.percentage, weights);
    let staleness = (factors.total() * 10.0).round() / 10.0;
    let is_candidate = days_since_update >= i64::from(thresholds.no_activity_days)
        && dor.percentage < thresholds.min_refinement_score;

    Ok(StalenessResult {
        age_days,
        days_since_update,
        refinement: dor.percentage,
        factors,
        staleness,
        is_candidate,
        label: StalenessLabel::from_score(staleness),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimestampField {
    Created,
    Updated,
}

impl TimestampField {
    const fn name(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

pub(crate) fn issue_timestamp(
    issue: &Issue,
    field: TimestampField,
) -> Result<DateTime<FixedOffset>, StalenessError> {
    let raw = match field {
        TimestampField::Created => issue.created.as_deref(),
        TimestampField::Updated => issue.updated.as_deref(),
    };
    let field = field.name();
    let raw = raw.ok_or(StalenessError::MissingTimestamp { field })?;
    parse_timestamp(raw).ok_or_else(|| StalenessError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    })
}
