use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Nesting limit for externally supplied documents. Subtrees below it are dropped.
pub const MAX_DOCUMENT_DEPTH: usize = 64;

/// One node of a tracker rich-text document (paragraphs, headings, text runs, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichNode {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<RichNode>,
}

impl RichNode {
    pub fn text_leaf(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            content: Vec::new(),
        }
    }

    pub fn container(kind: impl Into<String>, content: Vec<RichNode>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
            content,
        }
    }

    /// Builds a document from plain text: one paragraph per line, `##` lines become
    /// level-2 headings and blank lines become empty paragraphs.
    pub fn from_plain_text(text: &str) -> Self {
        let content = text
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    RichNode::container("paragraph", Vec::new())
                } else if line.starts_with("##") {
                    let heading = line.trim_start_matches('#').trim();
                    RichNode::container("heading", vec![RichNode::text_leaf(heading)])
                } else {
                    RichNode::container("paragraph", vec![RichNode::text_leaf(line)])
                }
            })
            .collect();

        RichNode::container("doc", content)
    }

    /// Converts loosely-shaped JSON into a node tree without failing. Non-object
    /// children are ignored, nested arrays are flattened into the parent.
    pub fn from_json(value: &Value) -> Self {
        node_from_json(value, 0).unwrap_or_default()
    }

    /// Depth-first concatenation of every `text` leaf, space separated.
    pub fn extract_text(&self) -> String {
        let mut fragments = Vec::new();
        collect_text(self, 0, &mut fragments);
        fragments.join(" ")
    }
}

fn node_from_json(value: &Value, depth: usize) -> Option<RichNode> {
    let object = value.as_object()?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let text = object
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut content = Vec::new();
    if let Some(children) = object.get("content") {
        if depth + 1 >= MAX_DOCUMENT_DEPTH {
            debug!(depth, "rich document exceeds nesting limit; truncating subtree");
        } else {
            push_children(children, depth + 1, &mut content);
        }
    }

    Some(RichNode {
        kind,
        text,
        content,
    })
}

fn push_children(value: &Value, depth: usize, out: &mut Vec<RichNode>) {
    match value {
        Value::Array(items) => {
            for item in items {
                if item.is_array() {
                    if depth + 1 < MAX_DOCUMENT_DEPTH {
                        push_children(item, depth + 1, out);
                    }
                } else if let Some(node) = node_from_json(item, depth) {
                    out.push(node);
                }
            }
        }
        Value::Object(_) => {
            if let Some(node) = node_from_json(value, depth) {
                out.push(node);
            }
        }
        _ => {}
    }
}

fn collect_text(node: &RichNode, depth: usize, fragments: &mut Vec<String>) {
    if depth >= MAX_DOCUMENT_DEPTH {
        return;
    }

    if node.kind == "text" {
        fragments.push(node.text.clone().unwrap_or_default());
    }

    for child in &node.content {
        collect_text(child, depth + 1, fragments);
    }
}
