use std::fmt::Display;

use serde::Serialize;
use tracing::warn;

/// One issue that could not be processed as part of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub issue_key: String,
    pub reason: String,
}

impl BatchFailure {
    /// Logs the failure and captures it so the rest of the batch can continue.
    pub(crate) fn record(issue_key: impl Into<String>, error: &dyn Display) -> Self {
        let issue_key = issue_key.into();
        let reason = error.to_string();
        warn!(issue = %issue_key, %reason, "skipping issue that could not be analyzed");
        Self { issue_key, reason }
    }
}
