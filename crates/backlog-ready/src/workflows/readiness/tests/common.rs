use std::sync::Arc;

use serde_json::{json, Value};

use crate::workflows::readiness::{readiness_router, DorChecker, FieldAliases, RuleDefinition};
use crate::workflows::tracker::{FieldValue, Issue, RichNode};

pub(super) const STORY_SYNTAX_FIELD: &str = "customfield_12015";
pub(super) const ACCEPTANCE_FIELD: &str = "customfield_12016";
pub(super) const ACCOUNT_FIELD: &str = "customfield_10500";

pub(super) fn aliases() -> FieldAliases {
    [
        ("story_syntax", STORY_SYNTAX_FIELD),
        ("acceptance_criteria", ACCEPTANCE_FIELD),
        ("account_code", ACCOUNT_FIELD),
        ("story_points", "customfield_10016"),
    ]
    .into_iter()
    .map(|(name, id)| (name.to_string(), id.to_string()))
    .collect()
}

/// Five equally weighted rules covering every rule kind a story needs.
pub(super) fn story_rules() -> Vec<RuleDefinition> {
    let mut story_syntax =
        RuleDefinition::new("Story syntax completed (As a... I Want... So that...)", "story_syntax", 20.0);
    story_syntax.optional_for_non_stories = true;

    let mut acceptance =
        RuleDefinition::new("Acceptance Criteria in BDD/Gherkin syntax", "acceptance_criteria", 20.0);
    acceptance.optional_for_non_stories = true;

    vec![
        RuleDefinition::new("Title completed", "summary", 20.0),
        story_syntax,
        acceptance,
        RuleDefinition::new("Account code set", "account_code", 20.0),
        RuleDefinition::new("Linked to epic", "parent", 20.0),
    ]
}

pub(super) fn checker() -> DorChecker {
    DorChecker::from_parts(&story_rules(), aliases()).expect("fixture checklist is valid")
}

pub(super) fn checker_with(rules: Vec<RuleDefinition>) -> DorChecker {
    DorChecker::from_parts(&rules, aliases()).expect("fixture checklist is valid")
}

pub(super) fn ready_story() -> Issue {
    let mut issue = Issue::new("DD-100");
    issue.issue_type = Some("Story".to_string());
    issue.status = Some("Backlog".to_string());
    issue.summary = Some("Export monthly billing report".to_string());
    issue.parent = Some("DD-1".to_string());
    issue.fields.insert(
        STORY_SYNTAX_FIELD.to_string(),
        FieldValue::RichDocument(RichNode::from_plain_text(
            "As a data analyst\nI want to export monthly billing reports as CSV\nSo that finance can reconcile spend",
        )),
    );
    issue.fields.insert(
        ACCEPTANCE_FIELD.to_string(),
        FieldValue::RichDocument(RichNode::from_plain_text(
            "Given a signed-in analyst\nWhen they request the March report\nThen a CSV with every invoice downloads",
        )),
    );
    issue.fields.insert(
        ACCOUNT_FIELD.to_string(),
        FieldValue::Reference(crate::workflows::tracker::ReferenceObject {
            value: Some("ACC-42".to_string()),
            ..Default::default()
        }),
    );
    issue
}

pub(super) fn raw_story() -> Value {
    json!({
        "key": "DD-200",
        "fields": {
            "summary": "Export monthly billing report",
            "issuetype": { "name": "Story" },
            "status": { "name": "Backlog" },
            "parent": { "key": "DD-1" },
            "description": {
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [{
                        "type": "text",
                        "text": "Deploy to staging first, then production. Alert on failed exports."
                    }]
                }]
            },
            "customfield_12015": {
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [{
                        "type": "text",
                        "text": "As a data analyst I want CSV exports so that finance can reconcile"
                    }]
                }]
            },
            "customfield_12016": null,
            "customfield_10500": { "value": "ACC-42" }
        }
    })
}

pub(super) fn router() -> axum::Router {
    readiness_router(Arc::new(checker()))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
