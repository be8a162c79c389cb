/// Description keywords that count as covering a checklist topic.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "environments",
        &["staging", "pre-prod", "pre-production", "production", "environment", "deploy"],
    ),
    (
        "security",
        &["security", "threat", "risk", "authentication", "authorization", "vulnerability"],
    ),
    (
        "documentation",
        &["documentation", "docs", "wiki", "readme", "confluence"],
    ),
    ("demo", &["demo", "demonstrate", "show", "presentation"]),
    ("cost", &["cost", "price", "budget", "expense", "billing", "$"]),
    (
        "telemetry",
        &[
            "telemetry",
            "metrics",
            "monitoring",
            "alert",
            "observability",
            "logging",
            "datadog",
            "grafana",
        ],
    ),
];

/// Keywords for a topic; unknown topics search for their own name.
pub(crate) fn keywords_for(topic: &str) -> Vec<&str> {
    TOPIC_KEYWORDS
        .iter()
        .find(|(name, _)| *name == topic)
        .map(|(_, keywords)| keywords.to_vec())
        .unwrap_or_else(|| vec![topic])
}
