use super::CheckResult;

pub const ALL_CRITERIA_MET: &str = "✓ Issue meets all required Definition of Ready criteria!";

const STORY_SYNTAX_TIP: [&str; 4] = [
    "\n💡 Tip: Use the story syntax template:",
    "   As a [USER TYPE]",
    "   I want [FEATURE]",
    "   So that [BENEFIT]",
];

const GHERKIN_TIP: [&str; 4] = [
    "\n💡 Tip: Use BDD/Gherkin format:",
    "   Given [precondition]",
    "   When [action]",
    "   Then [expected outcome]",
];

/// Remediation guidance for failed required checks, in check order.
pub(crate) fn generate(checks: &[CheckResult]) -> Vec<String> {
    let failed: Vec<&CheckResult> = checks
        .iter()
        .filter(|check| !check.passed && !check.optional)
        .collect();

    if failed.is_empty() {
        return vec![ALL_CRITERIA_MET.to_string()];
    }

    let mut recommendations = vec![format!("Missing {} required item(s):", failed.len())];
    recommendations.extend(
        failed
            .iter()
            .map(|check| format!("  • {}: {}", check.name, check.details)),
    );

    let failed_named = |needle: &str| {
        failed
            .iter()
            .any(|check| check.name.to_lowercase().contains(needle))
    };

    if failed_named("story syntax") {
        recommendations.extend(STORY_SYNTAX_TIP.iter().map(|line| line.to_string()));
    }
    if failed_named("acceptance criteria") {
        recommendations.extend(GHERKIN_TIP.iter().map(|line| line.to_string()));
    }

    recommendations
}
