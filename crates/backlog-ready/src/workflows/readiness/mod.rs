//! Definition of Ready scoring.
//!
//! A [`DorChecker`] is built once from configuration and then evaluates any number of
//! issues. Evaluation is a pure function of the issue and the resolved rules, so a
//! single checker can be shared across threads and batches.

mod config;
mod heuristics;
mod keywords;
mod recommendations;
mod review;
pub mod router;
mod rules;

#[cfg(test)]
mod tests;

pub use config::{FieldAliases, RuleDefinition, REQUIRED_ALIASES};
pub use heuristics::{has_meaningful_content, is_story_syntax_template};
pub use recommendations::ALL_CRITERIA_MET;
pub use review::ReviewItem;
pub use router::{readiness_router, EvaluationView};
pub use rules::{ChecklistRule, RuleKind};

pub(crate) use config::validate_checklist;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, DorConfig};
use crate::workflows::tracker::Issue;

/// Outcome of a single checklist rule for one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    /// Logical field the rule targets, as configured.
    pub field: Option<String>,
    pub passed: bool,
    pub optional: bool,
    pub weight: f64,
    pub score: f64,
    pub details: String,
}

/// Aggregate readiness score for one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DorResult {
    pub issue_key: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub checklist: Vec<CheckResult>,
    pub recommendations: Vec<String>,
}

impl DorResult {
    pub fn readiness_level(&self) -> ReadinessLevel {
        ReadinessLevel::from_percentage(self.percentage)
    }

    pub fn failed_required(&self) -> impl Iterator<Item = &CheckResult> {
        self.checklist
            .iter()
            .filter(|check| !check.passed && !check.optional)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    Ready,
    NearlyReady,
    PartiallyReady,
    NotReady,
}

impl ReadinessLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::Ready
        } else if percentage >= 70.0 {
            Self::NearlyReady
        } else if percentage >= 50.0 {
            Self::PartiallyReady
        } else {
            Self::NotReady
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::NearlyReady => "Nearly Ready",
            Self::PartiallyReady => "Partially Ready",
            Self::NotReady => "Not Ready",
        }
    }
}

/// Stateless evaluator holding the resolved checklist and field aliases.
#[derive(Debug, Clone)]
pub struct DorChecker {
    rules: Vec<ChecklistRule>,
    aliases: FieldAliases,
}

impl DorChecker {
    pub fn new(config: &DorConfig) -> Result<Self, ConfigError> {
        Self::from_parts(&config.definition_of_ready, config.field_aliases())
    }

    pub fn from_parts(
        definitions: &[RuleDefinition],
        aliases: FieldAliases,
    ) -> Result<Self, ConfigError> {
        validate_checklist(definitions, &aliases)?;

        let rules: Vec<ChecklistRule> = definitions
            .iter()
            .map(|definition| ChecklistRule::resolve(definition, &aliases))
            .collect();
        info!(rules = rules.len(), "definition of ready checklist loaded");

        Ok(Self { rules, aliases })
    }

    pub fn rules(&self) -> &[ChecklistRule] {
        &self.rules
    }

    pub fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    pub fn evaluate(&self, issue: &Issue) -> DorResult {
        let issue_type = issue.normalized_type();
        let mut checklist = Vec::with_capacity(self.rules.len());
        let mut score = 0.0;
        let mut max_score = 0.0;

        for rule in &self.rules {
            if !rule.applies_to_type(&issue_type) {
                continue;
            }

            max_score += rule.weight;
            let (passed, details) = rule.check(issue, &issue_type);
            let awarded = if passed { rule.weight } else { 0.0 };
            score += awarded;

            debug!(issue = %issue.key, rule = %rule.name, passed, "checklist rule evaluated");

            checklist.push(CheckResult {
                name: rule.name.clone(),
                field: rule.field.clone(),
                passed,
                optional: rule.optional,
                weight: rule.weight,
                score: awarded,
                details,
            });
        }

        let recommendations = recommendations::generate(&checklist);

        DorResult {
            issue_key: issue.key.clone(),
            summary: issue.summary.clone(),
            status: issue.status.clone(),
            score,
            max_score,
            percentage: percentage_of(score, max_score),
            checklist,
            recommendations,
        }
    }

    /// Scores every issue, preserving input order.
    pub fn evaluate_batch(&self, issues: &[Issue]) -> Vec<DorResult> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            issues.par_iter().map(|issue| self.evaluate(issue)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            issues.iter().map(|issue| self.evaluate(issue)).collect()
        }
    }

    /// Long-form content an external judge should assess for quality.
    pub fn collect_review_items(&self, issue: &Issue) -> Vec<ReviewItem> {
        review::collect_review_items(issue, &self.aliases)
    }
}

/// Percentage rounded to one decimal; zero when nothing applied.
fn percentage_of(score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        return 0.0;
    }

    let raw = (score / max_score * 100.0).clamp(0.0, 100.0);
    (raw * 10.0).round() / 10.0
}
