use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DorConfig;
use crate::workflows::batch::BatchFailure;
use crate::workflows::readiness::{CheckResult, DorChecker, DorResult, ReadinessLevel};
use crate::workflows::tracker::{Issue, ParsedBatch};

const NO_SPRINT: &str = "Backlog";
const SUBTASK_TYPES: [&str; 2] = ["sub-task", "subtask"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementSettings {
    pub backlog_top_items: usize,
    pub min_readiness_score: f64,
}

impl Default for RefinementSettings {
    fn default() -> Self {
        Self {
            backlog_top_items: 10,
            min_readiness_score: 70.0,
        }
    }
}

/// Checklist items a refinement session can fix without judgment calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeterministicField {
    Title,
    StorySyntax,
    AcceptanceCriteria,
    Account,
    StoryPoints,
}

impl DeterministicField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::StorySyntax => "Story Syntax",
            Self::AcceptanceCriteria => "Acceptance Criteria",
            Self::Account => "Account",
            Self::StoryPoints => "Story Points",
        }
    }

    /// Matches on the rule's logical field, then on the conventional rule names.
    pub fn from_check(check: &CheckResult) -> Option<Self> {
        let by_field = match check.field.as_deref() {
            Some("summary") => Some(Self::Title),
            Some("story_syntax") => Some(Self::StorySyntax),
            Some("acceptance_criteria") => Some(Self::AcceptanceCriteria),
            Some("account_code") => Some(Self::Account),
            Some("story_points") => Some(Self::StoryPoints),
            _ => None,
        };

        by_field.or(match check.name.as_str() {
            "Title completed" => Some(Self::Title),
            "Story syntax completed (As a... I Want... So that...)" => Some(Self::StorySyntax),
            "Acceptance Criteria in BDD/Gherkin syntax" => Some(Self::AcceptanceCriteria),
            "Account code set" => Some(Self::Account),
            "Points estimated/assigned" => Some(Self::StoryPoints),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementItem {
    /// 1-based position in board order.
    pub rank: usize,
    pub issue_key: String,
    pub summary: String,
    pub issue_type: String,
    pub sprint: String,
    pub percentage: f64,
    pub readiness_level: ReadinessLevel,
    pub missing_deterministic: Vec<DeterministicField>,
    pub dor: DorResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementSummary {
    pub analyzed: usize,
    pub average_percentage: f64,
    pub missing_deterministic: usize,
    pub ready: usize,
    pub min_readiness_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefinementReport {
    /// Issues left out because of their status or because they are sub-tasks.
    pub skipped_out_of_scope: usize,
    pub items: Vec<RefinementItem>,
    pub failures: Vec<BatchFailure>,
    pub summary: Option<RefinementSummary>,
}

/// Scores the top of the backlog ahead of a refinement meeting.
#[derive(Debug, Clone)]
pub struct RefinementPrep {
    checker: Arc<DorChecker>,
    settings: RefinementSettings,
    sprint_field: Option<String>,
    not_ready_status: Option<String>,
}

impl RefinementPrep {
    pub fn new(
        checker: Arc<DorChecker>,
        settings: RefinementSettings,
        sprint_field: Option<String>,
    ) -> Self {
        Self {
            checker,
            settings,
            sprint_field,
            not_ready_status: None,
        }
    }

    pub fn from_config(checker: Arc<DorChecker>, config: &DorConfig) -> Self {
        let prep = Self::new(
            checker,
            config.refinement_prep,
            config.sprint_field().map(str::to_string),
        );
        match config.not_ready_status() {
            Some(status) => prep.restrict_to_status(status),
            None => prep,
        }
    }

    /// Only issues whose status matches (or is unknown) are prepared.
    pub fn restrict_to_status(mut self, status: impl Into<String>) -> Self {
        self.not_ready_status = Some(status.into());
        self
    }

    pub fn settings(&self) -> &RefinementSettings {
        &self.settings
    }

    /// Issues are taken in the order given (board rank) and never re-sorted.
    /// Sub-tasks and issues in any other status than the not-ready one are skipped
    /// before the top of the backlog is taken.
    pub fn analyze(&self, issues: &[Issue]) -> RefinementReport {
        let (in_scope, out_of_scope): (Vec<&Issue>, Vec<&Issue>) =
            issues.iter().partition(|issue| self.in_scope(issue));
        for issue in &out_of_scope {
            debug!(issue = %issue.key, "outside the refinement scope");
        }

        let top: Vec<Issue> = in_scope
            .into_iter()
            .take(self.settings.backlog_top_items)
            .cloned()
            .collect();
        let results = self.checker.evaluate_batch(&top);

        let items: Vec<RefinementItem> = top
            .iter()
            .zip(results)
            .enumerate()
            .map(|(index, (issue, dor))| self.item(index + 1, issue, dor))
            .collect();

        let summary = self.summarize(&items);
        info!(
            analyzed = items.len(),
            ready = summary.as_ref().map_or(0, |s| s.ready),
            "refinement preparation finished"
        );

        RefinementReport {
            skipped_out_of_scope: out_of_scope.len(),
            items,
            failures: Vec::new(),
            summary,
        }
    }

    pub fn analyze_batch(&self, batch: ParsedBatch) -> RefinementReport {
        let mut report = self.analyze(&batch.issues);
        report.failures = batch.failures;
        report
    }

    fn in_scope(&self, issue: &Issue) -> bool {
        if SUBTASK_TYPES.contains(&issue.normalized_type().as_str()) {
            return false;
        }

        match (self.not_ready_status.as_deref(), issue.status.as_deref()) {
            (Some(wanted), Some(status)) => status.trim().eq_ignore_ascii_case(wanted.trim()),
            _ => true,
        }
    }

    fn item(&self, rank: usize, issue: &Issue, dor: DorResult) -> RefinementItem {
        let missing_deterministic = dor
            .failed_required()
            .filter_map(DeterministicField::from_check)
            .collect();
        let sprint = self
            .sprint_field
            .as_deref()
            .and_then(|field| issue.sprint_name(field))
            .unwrap_or_else(|| NO_SPRINT.to_string());

        RefinementItem {
            rank,
            issue_key: issue.key.clone(),
            summary: issue.summary.clone().unwrap_or_else(|| "N/A".to_string()),
            issue_type: issue
                .issue_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            sprint,
            percentage: dor.percentage,
            readiness_level: dor.readiness_level(),
            missing_deterministic,
            dor,
        }
    }

    fn summarize(&self, items: &[RefinementItem]) -> Option<RefinementSummary> {
        if items.is_empty() {
            return None;
        }

        let total: f64 = items.iter().map(|item| item.percentage).sum();
        let average = total / items.len() as f64;

        Some(RefinementSummary {
            analyzed: items.len(),
            average_percentage: (average * 10.0).round() / 10.0,
            missing_deterministic: items
                .iter()
                .filter(|item| !item.missing_deterministic.is_empty())
                .count(),
            ready: items
                .iter()
                .filter(|item| item.percentage >= self.settings.min_readiness_score)
                .count(),
            min_readiness_score: self.settings.min_readiness_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::readiness::{FieldAliases, RuleDefinition};
    use crate::workflows::tracker::{FieldValue, ReferenceObject};

    const SPRINT_FIELD: &str = "customfield_10201";

    fn checker() -> Arc<DorChecker> {
        let aliases: FieldAliases = [
            ("story_syntax", "customfield_12015"),
            ("acceptance_criteria", "customfield_12016"),
            ("account_code", "customfield_10500"),
            ("sprint", SPRINT_FIELD),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id.to_string()))
        .collect();

        let mut security = RuleDefinition::new("Security considered", "security", 25.0);
        security.check_in_description = true;
        let rules = vec![
            RuleDefinition::new("Title completed", "summary", 25.0),
            RuleDefinition::new("Account code set", "account_code", 25.0),
            RuleDefinition::new("Points estimated/assigned", "customfield_10016", 25.0),
            security,
        ];
        Arc::new(DorChecker::from_parts(&rules, aliases).expect("valid checklist"))
    }

    fn prep(top: usize) -> RefinementPrep {
        RefinementPrep::new(
            checker(),
            RefinementSettings {
                backlog_top_items: top,
                min_readiness_score: 70.0,
            },
            Some(SPRINT_FIELD.to_string()),
        )
    }

    fn issue(key: &str, summary: Option<&str>, points: Option<&str>) -> Issue {
        let mut issue = Issue::new(key);
        issue.issue_type = Some("Story".to_string());
        issue.summary = summary.map(str::to_string);
        if let Some(points) = points {
            issue
                .fields
                .insert("customfield_10016".to_string(), FieldValue::Scalar(points.to_string()));
        }
        issue
    }

    #[test]
    fn keeps_board_order_and_truncates() {
        let issues = vec![
            issue("DD-3", None, None),
            issue("DD-1", Some("Complete title"), Some("5")),
            issue("DD-2", Some("Another title"), None),
        ];

        let report = prep(2).analyze(&issues);
        let keys: Vec<&str> = report.items.iter().map(|item| item.issue_key.as_str()).collect();
        assert_eq!(keys, vec!["DD-3", "DD-1"]);
        assert_eq!(report.items[0].rank, 1);
        assert_eq!(report.items[1].rank, 2);
    }

    #[test]
    fn lists_only_deterministic_gaps() {
        let report = prep(10).analyze(&[issue("DD-1", None, None)]);
        let item = &report.items[0];
        assert_eq!(
            item.missing_deterministic,
            vec![
                DeterministicField::Title,
                DeterministicField::Account,
                DeterministicField::StoryPoints
            ]
        );
        assert_eq!(item.percentage, 0.0);
        assert_eq!(item.sprint, "Backlog");
    }

    #[test]
    fn sprint_name_comes_from_first_sprint() {
        let mut planned = issue("DD-5", Some("Planned work"), Some("3"));
        planned.fields.insert(
            SPRINT_FIELD.to_string(),
            FieldValue::List(vec![FieldValue::Reference(ReferenceObject {
                name: Some("Sprint 42".to_string()),
                ..ReferenceObject::default()
            })]),
        );

        let report = prep(10).analyze(&[planned]);
        assert_eq!(report.items[0].sprint, "Sprint 42");
    }

    #[test]
    fn summary_counts_ready_and_missing() {
        let mut ready = issue("DD-1", Some("Complete title"), Some("5"));
        ready.fields.insert(
            "customfield_10500".to_string(),
            FieldValue::Reference(ReferenceObject {
                value: Some("ACC-1".to_string()),
                ..ReferenceObject::default()
            }),
        );
        let issues = vec![ready, issue("DD-2", Some("Half done"), Some("8"))];

        let summary = prep(10).analyze(&issues).summary.expect("items analyzed");
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.average_percentage, 62.5);
        assert_eq!(summary.ready, 1);
        assert_eq!(summary.missing_deterministic, 1);
    }

    #[test]
    fn finished_work_and_subtasks_do_not_use_up_slots() {
        let mut done = issue("DD-1", Some("Shipped already"), Some("3"));
        done.status = Some("Done".to_string());
        let mut subtask = issue("DD-2", Some("Wire the button"), Some("1"));
        subtask.issue_type = Some("Sub-task".to_string());
        subtask.status = Some("Not Ready".to_string());
        let mut story = issue("DD-3", Some("Export invoices"), None);
        story.status = Some("not ready".to_string());
        let mut later = issue("DD-4", None, None);
        later.status = Some("Not Ready".to_string());

        let report = prep(1)
            .restrict_to_status("Not Ready")
            .analyze(&[done, subtask, story, later]);

        let keys: Vec<&str> = report.items.iter().map(|item| item.issue_key.as_str()).collect();
        assert_eq!(keys, vec!["DD-3"]);
        assert_eq!(report.items[0].rank, 1);
        assert_eq!(report.skipped_out_of_scope, 2);
    }

    #[test]
    fn without_a_status_filter_only_subtasks_are_skipped() {
        let mut done = issue("DD-1", Some("Shipped already"), Some("3"));
        done.status = Some("Done".to_string());
        let mut subtask = issue("DD-2", Some("Wire the button"), Some("1"));
        subtask.issue_type = Some("Subtask".to_string());

        let report = prep(10).analyze(&[done, subtask]);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].issue_key, "DD-1");
        assert_eq!(report.skipped_out_of_scope, 1);
    }

    #[test]
    fn parse_failures_ride_along() {
        let batch = ParsedBatch {
            issues: vec![issue("DD-1", Some("Complete title"), None)],
            failures: vec![BatchFailure {
                issue_key: "entry #2".to_string(),
                reason: "issue record is missing its key".to_string(),
            }],
        };
        let report = prep(10).analyze_batch(batch);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn mapping_falls_back_to_rule_names() {
        let check = CheckResult {
            name: "Points estimated/assigned".to_string(),
            field: Some("customfield_10016".to_string()),
            passed: false,
            optional: false,
            weight: 5.0,
            score: 0.0,
            details: String::new(),
        };
        assert_eq!(
            DeterministicField::from_check(&check),
            Some(DeterministicField::StoryPoints)
        );
        assert_eq!(DeterministicField::StoryPoints.label(), "Story Points");
    }
}
