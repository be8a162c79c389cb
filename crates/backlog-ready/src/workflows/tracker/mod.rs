//! Normalized issue model and the boundary that turns raw tracker records into it.
//!
//! Everything downstream (readiness scoring, backlog analyses) only ever sees the
//! types defined here, so shape-sniffing of loosely typed JSON happens exactly once.

pub mod domain;
mod normalizer;
pub mod parser;
pub mod richtext;

pub use domain::{Engagement, FieldValue, Issue, ReferenceObject};
pub use parser::{classify_field, parse_batch, parse_issue, parse_timestamp, ParsedBatch};
pub use richtext::{RichNode, MAX_DOCUMENT_DEPTH};

pub(crate) use normalizer::normalize_text;

/// Raised when a raw record cannot be turned into an [`Issue`].
#[derive(Debug, thiserror::Error)]
pub enum IssueParseError {
    #[error("issue record must be a JSON object")]
    NotAnObject,
    #[error("issue record is missing its key")]
    MissingKey,
    #[error("issue {key} has a non-object `fields` member")]
    InvalidFields { key: String },
    #[error("payload must be an issue, an array of issues, or a search response")]
    UnsupportedPayload,
}
