use backlog_ready::workflows::backlog::{CullReport, RefinementReport, StalenessWeights};
use backlog_ready::workflows::batch::BatchFailure;
use backlog_ready::workflows::readiness::{DorResult, ReviewItem};

const RULE: &str = "============================================================";

pub(crate) fn render_checks(results: &[DorResult], failures: &[BatchFailure]) -> String {
    let mut lines = Vec::new();
    for result in results {
        render_check(result, &mut lines);
        lines.push(String::new());
    }
    render_failures(failures, &mut lines);
    finish(lines)
}

fn render_check(result: &DorResult, lines: &mut Vec<String>) {
    let level = result.readiness_level();
    lines.push(RULE.to_string());
    lines.push(format!(
        "{}: {}",
        result.issue_key,
        result.summary.as_deref().unwrap_or("N/A")
    ));
    lines.push(format!(
        "Status: {}",
        result.status.as_deref().unwrap_or("Unknown")
    ));
    lines.push(format!(
        "DoR score: {:.1}/{:.1} ({:.1}%) - {}",
        result.score,
        result.max_score,
        result.percentage,
        level.label()
    ));
    lines.push(RULE.to_string());

    for check in &result.checklist {
        let marker = if check.passed { "[x]" } else { "[ ]" };
        let optional = if check.optional { " (optional)" } else { "" };
        lines.push(format!(
            "{marker} {}{optional} [{:.1}/{:.1}]",
            check.name, check.score, check.weight
        ));
        if !check.passed {
            lines.push(format!("    {}", check.details));
        }
    }

    lines.push(String::new());
    lines.push("Recommendations:".to_string());
    for recommendation in &result.recommendations {
        lines.push(format!("  - {recommendation}"));
    }
}

pub(crate) fn render_review(issue_key: &str, items: &[ReviewItem]) -> String {
    let mut lines = vec![format!("{issue_key}: {} item(s) for review", items.len())];
    for item in items {
        lines.push(String::new());
        lines.push(format!("## {} ({})", item.criterion, item.field_name));
        lines.push(item.prompt.clone());
        lines.push("---".to_string());
        lines.push(item.content.clone());
    }
    finish(lines)
}

pub(crate) fn render_cull(report: &CullReport, weights: &StalenessWeights) -> String {
    let thresholds = &report.thresholds;
    let mut lines = vec![
        "Backlog cull analysis".to_string(),
        format!(
            "Thresholds: older than {} days, inactive for {}+ days, DoR below {:.1}%",
            thresholds.age_threshold_days,
            thresholds.no_activity_days,
            thresholds.min_refinement_score
        ),
        format!(
            "Examined {} issue(s); {} too recent; {} analyzed",
            report.examined,
            report.skipped_recent,
            report.analyses.len()
        ),
    ];

    if report.candidates.is_empty() {
        lines.push("No cull candidates found.".to_string());
    }

    for (index, candidate) in report.candidates.iter().enumerate() {
        let staleness = &candidate.staleness;
        lines.push(String::new());
        lines.push(format!(
            "{}. {}: {}",
            index + 1,
            candidate.issue_key,
            candidate.summary
        ));
        lines.push(format!(
            "   Staleness: {:.1}/{:.0} ({})",
            staleness.staleness,
            weights.max_points(),
            staleness.label.label()
        ));
        lines.push(format!(
            "   Age: {} days | Last update: {} days ago | DoR: {:.1}%",
            staleness.age_days, staleness.days_since_update, staleness.refinement
        ));
        lines.push(format!(
            "   {} | {} | {} | Assignee: {}",
            candidate.issue_type, candidate.status, candidate.priority, candidate.assignee
        ));
        lines.push(format!(
            "   Created: {} | Updated: {} | Comments: {} | Watchers: {}",
            candidate.created, candidate.updated, candidate.comments, candidate.watchers
        ));
    }

    if let Some(summary) = &report.summary {
        lines.push(String::new());
        lines.push(format!(
            "Summary: {} candidate(s), average age {:.0} days, average staleness {:.1}, {} unassigned",
            summary.candidates,
            summary.average_age_days,
            summary.average_staleness,
            summary.unassigned
        ));
    }

    render_failures(&report.failures, &mut lines);
    finish(lines)
}

pub(crate) fn render_refinement(report: &RefinementReport) -> String {
    let mut lines = vec!["Refinement preparation".to_string()];
    if report.skipped_out_of_scope > 0 {
        lines.push(format!(
            "{} issue(s) skipped (sub-tasks or not awaiting refinement)",
            report.skipped_out_of_scope
        ));
    }

    for item in &report.items {
        lines.push(String::new());
        lines.push(format!(
            "{}. {} [{}] {}: {}",
            item.rank, item.issue_key, item.sprint, item.issue_type, item.summary
        ));
        lines.push(format!(
            "   DoR: {:.1}% - {}",
            item.percentage,
            item.readiness_level.label()
        ));
        if !item.missing_deterministic.is_empty() {
            let missing: Vec<&str> = item
                .missing_deterministic
                .iter()
                .map(|field| field.label())
                .collect();
            lines.push(format!("   Missing: {}", missing.join(", ")));
        }
    }

    match &report.summary {
        Some(summary) => {
            lines.push(String::new());
            lines.push(format!(
                "Summary: {} analyzed, average DoR {:.1}%, {} at or above {:.1}%, {} missing deterministic fields",
                summary.analyzed,
                summary.average_percentage,
                summary.ready,
                summary.min_readiness_score,
                summary.missing_deterministic
            ));
        }
        None => lines.push("No backlog items to prepare.".to_string()),
    }

    render_failures(&report.failures, &mut lines);
    finish(lines)
}

fn render_failures(failures: &[BatchFailure], lines: &mut Vec<String>) {
    if failures.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("Skipped {} issue(s):", failures.len()));
    for failure in failures {
        lines.push(format!("  - {}: {}", failure.issue_key, failure.reason));
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut output = lines.join("\n");
    output.push('\n');
    output
}
