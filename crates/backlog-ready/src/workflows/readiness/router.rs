use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::{DorChecker, DorResult, ReadinessLevel, ReviewItem};
use crate::workflows::tracker::parse_issue;

/// Scored issue as returned over HTTP.
#[derive(Debug, Serialize)]
pub struct EvaluationView {
    #[serde(flatten)]
    pub result: DorResult,
    pub readiness_level: ReadinessLevel,
    pub readiness_label: &'static str,
}

impl From<DorResult> for EvaluationView {
    fn from(result: DorResult) -> Self {
        let level = result.readiness_level();
        Self {
            result,
            readiness_level: level,
            readiness_label: level.label(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReviewView {
    issue_key: String,
    items: Vec<ReviewItem>,
}

/// Router builder exposing Definition of Ready scoring and review extraction.
pub fn readiness_router(checker: Arc<DorChecker>) -> Router {
    Router::new()
        .route("/api/v1/dor/evaluate", post(evaluate_handler))
        .route("/api/v1/dor/review", post(review_handler))
        .with_state(checker)
}

pub(crate) async fn evaluate_handler(
    State(checker): State<Arc<DorChecker>>,
    axum::Json(raw): axum::Json<Value>,
) -> Response {
    match parse_issue(&raw) {
        Ok(issue) => {
            let view = EvaluationView::from(checker.evaluate(&issue));
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => bad_request(&error),
    }
}

pub(crate) async fn review_handler(
    State(checker): State<Arc<DorChecker>>,
    axum::Json(raw): axum::Json<Value>,
) -> Response {
    match parse_issue(&raw) {
        Ok(issue) => {
            let view = ReviewView {
                items: checker.collect_review_items(&issue),
                issue_key: issue.key,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => bad_request(&error),
    }
}

fn bad_request(error: &dyn std::fmt::Display) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}
