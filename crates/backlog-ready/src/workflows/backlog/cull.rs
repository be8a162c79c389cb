use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::staleness::{
    compute_staleness, issue_timestamp, CullOverrides, CullThresholds, StalenessResult,
    StalenessWeights, TimestampField,
};
use crate::config::DorConfig;
use crate::workflows::batch::BatchFailure;
use crate::workflows::readiness::DorChecker;
use crate::workflows::tracker::{Issue, ParsedBatch};

const UNASSIGNED: &str = "Unassigned";
const UNKNOWN: &str = "Unknown";

/// Everything a reviewer needs to decide whether to close a stale issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CullAnalysis {
    pub issue_key: String,
    pub summary: String,
    pub issue_type: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub comments: u32,
    pub watchers: u32,
    pub created: String,
    pub updated: String,
    #[serde(flatten)]
    pub staleness: StalenessResult,
}

impl CullAnalysis {
    pub fn is_unassigned(&self) -> bool {
        self.assignee == UNASSIGNED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CullSummary {
    pub candidates: usize,
    pub average_age_days: f64,
    pub average_staleness: f64,
    pub unassigned: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CullReport {
    pub thresholds: CullThresholds,
    pub examined: usize,
    pub skipped_recent: usize,
    pub analyses: Vec<CullAnalysis>,
    /// Candidates only, most stale first; ties keep input order.
    pub candidates: Vec<CullAnalysis>,
    pub failures: Vec<BatchFailure>,
    pub summary: Option<CullSummary>,
}

/// Finds old, inactive, poorly refined issues worth closing.
#[derive(Debug, Clone)]
pub struct BacklogCull {
    checker: Arc<DorChecker>,
    thresholds: CullThresholds,
    weights: StalenessWeights,
}

impl BacklogCull {
    pub fn new(checker: Arc<DorChecker>, thresholds: CullThresholds, weights: StalenessWeights) -> Self {
        Self {
            checker,
            thresholds,
            weights,
        }
    }

    pub fn from_config(checker: Arc<DorChecker>, config: &DorConfig) -> Self {
        Self::new(checker, config.backlog_cull, config.staleness_weights)
    }

    pub fn thresholds(&self) -> &CullThresholds {
        &self.thresholds
    }

    pub fn weights(&self) -> &StalenessWeights {
        &self.weights
    }

    pub fn analyze(&self, issues: &[Issue], now: DateTime<Utc>) -> CullReport {
        self.analyze_with(issues, now, &CullOverrides::default())
    }

    /// Runs the analysis over parsed issues, carrying parse failures into the report.
    pub fn analyze_batch(
        &self,
        batch: ParsedBatch,
        now: DateTime<Utc>,
        overrides: &CullOverrides,
    ) -> CullReport {
        let mut report = self.analyze_with(&batch.issues, now, overrides);
        let mut failures = batch.failures;
        failures.append(&mut report.failures);
        report.failures = failures;
        report
    }

    pub fn analyze_with(
        &self,
        issues: &[Issue],
        now: DateTime<Utc>,
        overrides: &CullOverrides,
    ) -> CullReport {
        let thresholds = overrides.apply(&self.thresholds);
        let age_cutoff = Duration::days(i64::from(thresholds.age_threshold_days));

        let mut skipped_recent = 0;
        let mut analyses = Vec::new();
        let mut failures = Vec::new();

        for issue in issues {
            match self.analyze_issue(issue, &thresholds, age_cutoff, now) {
                Ok(Some(analysis)) => analyses.push(analysis),
                Ok(None) => {
                    debug!(issue = %issue.key, "younger than the age threshold");
                    skipped_recent += 1;
                }
                Err(err) => failures.push(BatchFailure::record(issue.key.clone(), &err)),
            }
        }

        let mut candidates: Vec<CullAnalysis> = analyses
            .iter()
            .filter(|analysis| analysis.staleness.is_candidate)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| b.staleness.staleness.total_cmp(&a.staleness.staleness));

        let summary = summarize(&candidates);
        info!(
            examined = issues.len(),
            candidates = candidates.len(),
            failures = failures.len(),
            "backlog cull analysis finished"
        );

        CullReport {
            thresholds,
            examined: issues.len(),
            skipped_recent,
            analyses,
            candidates,
            failures,
            summary,
        }
    }

    /// `Ok(None)` for issues not yet old enough to be considered.
    fn analyze_issue(
        &self,
        issue: &Issue,
        thresholds: &CullThresholds,
        age_cutoff: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<CullAnalysis>, super::StalenessError> {
        let created = issue_timestamp(issue, TimestampField::Created)?;
        if now - created.with_timezone(&Utc) <= age_cutoff {
            return Ok(None);
        }

        let dor = self.checker.evaluate(issue);
        let staleness = compute_staleness(issue, &dor, thresholds, &self.weights, now)?;
        let updated = issue_timestamp(issue, TimestampField::Updated)?;

        Ok(Some(CullAnalysis {
            issue_key: issue.key.clone(),
            summary: issue.summary.clone().unwrap_or_else(|| "N/A".to_string()),
            issue_type: or_unknown(&issue.issue_type),
            status: or_unknown(&issue.status),
            priority: or_unknown(&issue.priority),
            assignee: issue
                .assignee
                .clone()
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            comments: issue.engagement.comments,
            watchers: issue.engagement.watchers,
            created: created.format("%Y-%m-%d").to_string(),
            updated: updated.format("%Y-%m-%d").to_string(),
            staleness,
        }))
    }
}

fn or_unknown(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

fn summarize(candidates: &[CullAnalysis]) -> Option<CullSummary> {
    if candidates.is_empty() {
        return None;
    }

    let count = candidates.len() as f64;
    let total_age: i64 = candidates.iter().map(|c| c.staleness.age_days).sum();
    let total_staleness: f64 = candidates.iter().map(|c| c.staleness.staleness).sum();

    Some(CullSummary {
        candidates: candidates.len(),
        average_age_days: total_age as f64 / count,
        average_staleness: total_staleness / count,
        unassigned: candidates.iter().filter(|c| c.is_unassigned()).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::readiness::{FieldAliases, RuleDefinition};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .expect("fixed instant")
            .with_timezone(&Utc)
    }

    fn checker() -> Arc<DorChecker> {
        let aliases: FieldAliases = [
            ("story_syntax", "customfield_12015"),
            ("acceptance_criteria", "customfield_12016"),
            ("account_code", "customfield_10500"),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id.to_string()))
        .collect();
        let rules = vec![
            RuleDefinition::new("Title completed", "summary", 50.0),
            RuleDefinition::new("Linked to epic", "parent", 50.0),
        ];
        Arc::new(DorChecker::from_parts(&rules, aliases).expect("valid checklist"))
    }

    fn issue(key: &str, created_days_ago: i64, updated_days_ago: i64) -> Issue {
        let mut issue = Issue::new(key);
        issue.created = Some((now() - Duration::days(created_days_ago)).to_rfc3339());
        issue.updated = Some((now() - Duration::days(updated_days_ago)).to_rfc3339());
        issue
    }

    fn cull() -> BacklogCull {
        BacklogCull::new(checker(), CullThresholds::default(), StalenessWeights::default())
    }

    #[test]
    fn bad_timestamp_is_reported_and_the_rest_still_analyzed() {
        let mut broken = issue("DD-2", 400, 200);
        broken.updated = Some("not a date".to_string());
        let issues = vec![issue("DD-1", 400, 200), broken, issue("DD-3", 300, 120)];

        let report = cull().analyze(&issues, now());
        let keys: Vec<&str> = report.analyses.iter().map(|a| a.issue_key.as_str()).collect();
        assert_eq!(keys, vec!["DD-1", "DD-3"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].issue_key, "DD-2");
        assert!(report.failures[0].reason.contains("not a date"));
    }

    #[test]
    fn recent_issues_are_skipped_before_scoring() {
        let issues = vec![issue("DD-1", 100, 100), issue("DD-2", 181, 181)];
        let report = cull().analyze(&issues, now());
        assert_eq!(report.skipped_recent, 1);
        assert_eq!(report.analyses.len(), 1);
        assert_eq!(report.analyses[0].issue_key, "DD-2");
    }

    #[test]
    fn candidates_sorted_by_staleness_with_stable_ties() {
        let mut refined = issue("DD-4", 400, 200);
        refined.summary = Some("Well described".to_string());
        refined.parent = Some("DD-100".to_string());

        let issues = vec![
            issue("DD-1", 200, 100),
            issue("DD-2", 400, 200),
            issue("DD-3", 400, 200),
            refined,
        ];
        let report = cull().analyze(&issues, now());

        let keys: Vec<&str> = report.candidates.iter().map(|c| c.issue_key.as_str()).collect();
        assert_eq!(keys, vec!["DD-2", "DD-3", "DD-1"]);
        assert_eq!(report.analyses.len(), 4);
        assert!(!report.analyses[3].staleness.is_candidate);
    }

    #[test]
    fn summary_covers_candidates_only() {
        let mut assigned = issue("DD-2", 400, 300);
        assigned.assignee = Some("Dana".to_string());
        let issues = vec![issue("DD-1", 500, 200), assigned];

        let summary = cull().analyze(&issues, now()).summary.expect("candidates exist");
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.average_age_days, 450.0);
        assert_eq!(summary.unassigned, 1);
        assert_eq!(summary.average_staleness, 100.0);
    }

    #[test]
    fn overrides_apply_for_a_single_run() {
        let issues = vec![issue("DD-1", 400, 40)];
        let engine = cull();

        assert!(engine.analyze(&issues, now()).candidates.is_empty());

        let overrides = CullOverrides {
            no_activity_days: Some(30),
            ..CullOverrides::default()
        };
        let report = engine.analyze_with(&issues, now(), &overrides);
        assert_eq!(report.thresholds.no_activity_days, 30);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(engine.thresholds().no_activity_days, 90);
    }

    #[test]
    fn nothing_to_report_without_candidates() {
        let report = cull().analyze(&[], now());
        assert_eq!(report.examined, 0);
        assert!(report.summary.is_none());
    }
}
