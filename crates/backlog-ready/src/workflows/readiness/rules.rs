use tracing::warn;

use super::config::{FieldAliases, RuleDefinition};
use super::heuristics::{has_meaningful_content, is_story_syntax_template};
use super::keywords::keywords_for;
use crate::workflows::tracker::{FieldValue, Issue, ReferenceObject};

const CUSTOM_FIELD_PREFIX: &str = "customfield_";
const MIN_SUMMARY_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 50;

/// How a checklist rule is evaluated, decided once when the checker is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Summary,
    Parent,
    CustomField {
        field_id: String,
        waive_for_non_stories: bool,
    },
    DescriptionKeywords {
        topic: String,
    },
    /// The configured field could not be mapped to anything the checker can read.
    Unresolved,
}

/// Immutable, resolved form of a [`RuleDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistRule {
    pub name: String,
    pub field: Option<String>,
    pub weight: f64,
    pub optional: bool,
    pub applies_to: Vec<String>,
    pub kind: RuleKind,
}

impl ChecklistRule {
    pub fn resolve(definition: &RuleDefinition, aliases: &FieldAliases) -> Self {
        let kind = resolve_kind(definition, aliases);
        if kind == RuleKind::Unresolved {
            warn!(
                rule = %definition.name,
                field = ?definition.target(),
                "checklist rule field could not be resolved; it will always fail"
            );
        }

        Self {
            name: definition.name.clone(),
            field: definition.target(),
            weight: definition.weight,
            optional: definition.optional,
            applies_to: definition
                .applies_to
                .iter()
                .map(|kind| kind.trim().to_lowercase())
                .collect(),
            kind,
        }
    }

    /// Rules restricted to other issue types are skipped entirely.
    pub fn applies_to_type(&self, issue_type: &str) -> bool {
        self.applies_to.is_empty() || self.applies_to.iter().any(|kind| kind == issue_type)
    }

    /// Returns whether the rule passed and a human-readable explanation.
    pub fn check(&self, issue: &Issue, issue_type: &str) -> (bool, String) {
        match &self.kind {
            RuleKind::Summary => check_summary(issue),
            RuleKind::Parent => check_parent(issue, self.optional),
            RuleKind::CustomField {
                field_id,
                waive_for_non_stories,
            } => {
                let value = issue.field(field_id);
                if *waive_for_non_stories && !issue_type.is_empty() && issue_type != "story" {
                    if let Some(outcome) = check_waived(value) {
                        return outcome;
                    }
                }
                check_custom_value(&self.name, value)
            }
            RuleKind::DescriptionKeywords { topic } => check_description(issue, topic),
            RuleKind::Unresolved => (false, "Could not evaluate field".to_string()),
        }
    }
}

fn resolve_kind(definition: &RuleDefinition, aliases: &FieldAliases) -> RuleKind {
    let field = definition.field.as_deref().map(str::trim);

    match field {
        Some("summary") => return RuleKind::Summary,
        Some("parent") => return RuleKind::Parent,
        _ => {}
    }

    let explicit = definition
        .field_name
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let field_id = explicit
        .or_else(|| field.and_then(|name| aliases.resolve(name)))
        .or_else(|| field.filter(|name| looks_like_field_id(name)));

    if let Some(field_id) = field_id {
        return RuleKind::CustomField {
            field_id: field_id.to_string(),
            waive_for_non_stories: definition.optional_for_non_stories,
        };
    }

    match field {
        Some(topic) if definition.check_in_description && !topic.is_empty() => {
            RuleKind::DescriptionKeywords {
                topic: topic.to_string(),
            }
        }
        _ => RuleKind::Unresolved,
    }
}

fn looks_like_field_id(name: &str) -> bool {
    name.strip_prefix(CUSTOM_FIELD_PREFIX)
        .is_some_and(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
}

fn check_summary(issue: &Issue) -> (bool, String) {
    match issue.summary.as_deref() {
        Some(summary) if summary.trim().chars().count() > MIN_SUMMARY_CHARS => {
            (true, format!("Title: '{summary}'"))
        }
        _ => (false, "Title is missing or too short".to_string()),
    }
}

fn check_parent(issue: &Issue, optional: bool) -> (bool, String) {
    match issue.parent.as_deref() {
        Some(parent) => (true, format!("Linked to {parent}")),
        None if optional => (true, "Optional - No parent epic".to_string()),
        None => (false, "No parent epic linked".to_string()),
    }
}

/// Outcome for non-story issues, or `None` when the value should be judged normally.
fn check_waived(value: Option<&FieldValue>) -> Option<(bool, String)> {
    let Some(value) = value.filter(|value| !value.is_unset()) else {
        return Some((true, "N/A (not required for this issue type)".to_string()));
    };

    let text = value.text();
    if is_story_syntax_template(&text) {
        return Some((
            true,
            "N/A (template text, not required for this issue type)".to_string(),
        ));
    }

    if has_meaningful_content(&text) {
        return Some((
            true,
            format!("Optional but provided ({} chars)", text.chars().count()),
        ));
    }

    None
}

fn check_custom_value(rule_name: &str, value: Option<&FieldValue>) -> (bool, String) {
    match value {
        Some(FieldValue::RichDocument(document)) => {
            let text = document.extract_text();
            if has_meaningful_content(&text) {
                (
                    true,
                    format!("Field is populated ({} chars)", text.chars().count()),
                )
            } else {
                (false, "Field contains only template/default text".to_string())
            }
        }
        Some(FieldValue::Reference(ReferenceObject {
            value: Some(value), ..
        })) => (true, format!("Set to: {value}")),
        Some(FieldValue::Scalar(value)) if !value.trim().is_empty() => {
            (true, format!("Value: {value}"))
        }
        Some(FieldValue::List(items)) if !items.is_empty() => {
            (true, format!("Contains {} item(s)", items.len()))
        }
        _ => (false, format!("Field '{rule_name}' is not populated")),
    }
}

fn check_description(issue: &Issue, topic: &str) -> (bool, String) {
    let description = issue.description_text().to_lowercase();
    let keywords = keywords_for(topic);
    let found: Vec<&str> = keywords
        .iter()
        .copied()
        .filter(|keyword| description.contains(keyword))
        .collect();

    if !found.is_empty() && description.chars().count() > MIN_DESCRIPTION_CHARS {
        (
            true,
            format!("Mentioned in description: {}", found.join(", ")),
        )
    } else {
        let expected: Vec<&str> = keywords.iter().copied().take(3).collect();
        (
            false,
            format!(
                "Not mentioned in description (expected: {})",
                expected.join(", ")
            ),
        )
    }
}
