use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::richtext::RichNode;

/// Linked-entity or selection object as returned by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ReferenceObject {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.key.is_none() && self.name.is_none()
    }

    fn display(&self) -> &str {
        self.value
            .as_deref()
            .or(self.name.as_deref())
            .or(self.key.as_deref())
            .unwrap_or_default()
    }
}

/// Shape-resolved value of an issue field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(String),
    Reference(ReferenceObject),
    List(Vec<FieldValue>),
    RichDocument(RichNode),
}

impl FieldValue {
    /// True for values the tracker uses to mean "nothing entered".
    pub fn is_unset(&self) -> bool {
        match self {
            FieldValue::Scalar(value) => value.is_empty(),
            FieldValue::Reference(reference) => reference.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::RichDocument(_) => false,
        }
    }

    /// Plain-text rendition used by the heuristics and the review extractor.
    pub fn text(&self) -> String {
        match self {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::Reference(reference) => reference.display().to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::text)
                .collect::<Vec<_>>()
                .join(" "),
            FieldValue::RichDocument(document) => document.extract_text(),
        }
    }
}

/// Comment and watcher counts used as engagement indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub comments: u32,
    pub watchers: u32,
}

/// Normalized tracker issue. Read-only input to every analysis in the crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub issue_type: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<FieldValue>,
    pub parent: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    #[serde(default)]
    pub engagement: Engagement,
    pub created: Option<String>,
    pub updated: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Issue {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Lower-cased issue type, or an empty string when the tracker did not send one.
    pub fn normalized_type(&self) -> String {
        self.issue_type
            .as_deref()
            .map(|kind| kind.trim().to_lowercase())
            .unwrap_or_default()
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldValue> {
        self.fields.get(field_id)
    }

    pub fn description_text(&self) -> String {
        self.description
            .as_ref()
            .map(FieldValue::text)
            .unwrap_or_default()
    }

    /// Name of the first sprint listed in the given sprint field.
    pub fn sprint_name(&self, sprint_field: &str) -> Option<String> {
        match self.field(sprint_field)? {
            FieldValue::List(items) => items.first().and_then(|item| match item {
                FieldValue::Reference(reference) => reference.name.clone(),
                FieldValue::Scalar(value) if !value.is_empty() => Some(value.clone()),
                _ => None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_type_handles_missing_and_mixed_case() {
        let mut issue = Issue::new("DD-1");
        assert_eq!(issue.normalized_type(), "");
        issue.issue_type = Some(" Story ".to_string());
        assert_eq!(issue.normalized_type(), "story");
    }

    #[test]
    fn unset_values_follow_tracker_conventions() {
        assert!(FieldValue::Scalar(String::new()).is_unset());
        assert!(!FieldValue::Scalar("  ".to_string()).is_unset());
        assert!(FieldValue::List(Vec::new()).is_unset());
        assert!(FieldValue::Reference(ReferenceObject::default()).is_unset());
        assert!(!FieldValue::RichDocument(RichNode::default()).is_unset());
    }

    #[test]
    fn sprint_name_reads_first_entry() {
        let mut issue = Issue::new("DD-2");
        issue.fields.insert(
            "customfield_10201".to_string(),
            FieldValue::List(vec![
                FieldValue::Reference(ReferenceObject {
                    name: Some("Sprint 14".to_string()),
                    ..ReferenceObject::default()
                }),
                FieldValue::Reference(ReferenceObject {
                    name: Some("Sprint 15".to_string()),
                    ..ReferenceObject::default()
                }),
            ]),
        );

        assert_eq!(
            issue.sprint_name("customfield_10201").as_deref(),
            Some("Sprint 14")
        );
        assert_eq!(issue.sprint_name("customfield_99999"), None);
    }
}
