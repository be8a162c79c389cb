use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{Map, Value};

use super::domain::{Engagement, FieldValue, Issue, ReferenceObject};
use super::richtext::RichNode;
use super::IssueParseError;
use crate::workflows::batch::BatchFailure;

/// Fields lifted onto [`Issue`] itself rather than kept in the open-ended field map.
const STANDARD_FIELDS: &[&str] = &[
    "summary",
    "description",
    "issuetype",
    "status",
    "parent",
    "priority",
    "assignee",
    "comment",
    "watches",
    "created",
    "updated",
];

/// Issues parsed from a payload plus the entries that could not be parsed.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub issues: Vec<Issue>,
    pub failures: Vec<BatchFailure>,
}

pub fn parse_issue(raw: &Value) -> Result<Issue, IssueParseError> {
    let object = raw.as_object().ok_or(IssueParseError::NotAnObject)?;
    let key = object
        .get("key")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .ok_or(IssueParseError::MissingKey)?
        .to_string();

    let empty = Map::new();
    let fields = match object.get("fields") {
        Some(Value::Object(fields)) => fields,
        Some(Value::Null) | None => &empty,
        Some(_) => return Err(IssueParseError::InvalidFields { key }),
    };

    let mut custom = std::collections::BTreeMap::new();
    for (field_id, value) in fields {
        if STANDARD_FIELDS.contains(&field_id.as_str()) {
            continue;
        }
        if let Some(value) = classify_field(value) {
            custom.insert(field_id.clone(), value);
        }
    }

    Ok(Issue {
        key,
        issue_type: nested_str(fields, "issuetype", "name"),
        status: nested_str(fields, "status", "name"),
        summary: fields
            .get("summary")
            .and_then(Value::as_str)
            .map(str::to_string),
        description: fields.get("description").and_then(classify_field),
        parent: fields.get("parent").and_then(parent_key),
        priority: nested_str(fields, "priority", "name"),
        assignee: nested_str(fields, "assignee", "displayName"),
        engagement: Engagement {
            comments: nested_count(fields, "comment", "total"),
            watchers: nested_count(fields, "watches", "watchCount"),
        },
        created: fields
            .get("created")
            .and_then(Value::as_str)
            .map(str::to_string),
        updated: fields
            .get("updated")
            .and_then(Value::as_str)
            .map(str::to_string),
        fields: custom,
    })
}

/// Accepts a single issue, an array of issues, or a search response (`{"issues": [...]}`).
/// Entries that fail to parse are reported instead of aborting the batch.
pub fn parse_batch(raw: &Value) -> Result<ParsedBatch, IssueParseError> {
    let entries: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Object(object) => match object.get("issues") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(_) => return Err(IssueParseError::UnsupportedPayload),
            None => vec![raw],
        },
        _ => return Err(IssueParseError::UnsupportedPayload),
    };

    let mut batch = ParsedBatch::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match parse_issue(entry) {
            Ok(issue) => batch.issues.push(issue),
            Err(err) => {
                let label = entry
                    .get("key")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("entry #{}", index + 1));
                batch.failures.push(BatchFailure::record(label, &err));
            }
        }
    }

    Ok(batch)
}

/// Resolves a raw field into its tagged shape. `None` means the field is absent.
pub fn classify_field(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(FieldValue::Scalar(text.clone())),
        Value::Number(number) => Some(FieldValue::Scalar(number.to_string())),
        Value::Bool(flag) => Some(FieldValue::Scalar(flag.to_string())),
        Value::Array(items) => Some(FieldValue::List(
            items
                .iter()
                .map(|item| classify_field(item).unwrap_or(FieldValue::Scalar(String::new())))
                .collect(),
        )),
        Value::Object(object) if object.contains_key("content") => {
            Some(FieldValue::RichDocument(RichNode::from_json(value)))
        }
        Value::Object(object) => Some(FieldValue::Reference(ReferenceObject {
            value: object.get("value").and_then(scalar_text),
            key: object.get("key").and_then(scalar_text),
            name: object.get("name").and_then(scalar_text),
        })),
    }
}

/// Parses tracker timestamps (`2024-01-15T10:30:00.000+0000`), RFC 3339, or bare dates.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn nested_str(fields: &Map<String, Value>, field: &str, attribute: &str) -> Option<String> {
    fields
        .get(field)
        .and_then(|value| value.get(attribute))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn nested_count(fields: &Map<String, Value>, field: &str, attribute: &str) -> u32 {
    fields
        .get(field)
        .and_then(|value| value.get(attribute))
        .and_then(Value::as_u64)
        .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
        .unwrap_or_default()
}

fn parent_key(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.is_empty() {
        return None;
    }

    let key = object
        .get("key")
        .or_else(|| object.get("id"))
        .and_then(scalar_text)
        .unwrap_or_else(|| "(unknown)".to_string());
    Some(key)
}
