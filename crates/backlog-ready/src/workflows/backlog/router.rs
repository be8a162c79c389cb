use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{BacklogCull, CullOverrides, RefinementPrep};
use crate::workflows::tracker::{parse_batch, parse_timestamp};

#[derive(Clone)]
pub(crate) struct BacklogState {
    cull: Arc<BacklogCull>,
    refinement: Arc<RefinementPrep>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CullRequest {
    issues: Value,
    #[serde(default)]
    now: Option<String>,
    #[serde(default)]
    overrides: CullOverrides,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefinementRequest {
    issues: Value,
}

/// Router builder exposing the backlog cull and refinement analyses.
pub fn backlog_router(cull: Arc<BacklogCull>, refinement: Arc<RefinementPrep>) -> Router {
    Router::new()
        .route("/api/v1/backlog/cull", post(cull_handler))
        .route("/api/v1/backlog/refinement", post(refinement_handler))
        .with_state(BacklogState { cull, refinement })
}

pub(crate) async fn cull_handler(
    State(state): State<BacklogState>,
    axum::Json(request): axum::Json<CullRequest>,
) -> Response {
    let now = match request.now.as_deref() {
        None => Utc::now(),
        Some(raw) => match parse_timestamp(raw) {
            Some(instant) => instant.with_timezone(&Utc),
            None => return bad_request(&format!("`now` is not a recognised date: {raw}")),
        },
    };

    match parse_batch(&request.issues) {
        Ok(batch) => {
            let report = state.cull.analyze_batch(batch, now, &request.overrides);
            (StatusCode::OK, axum::Json(report)).into_response()
        }
        Err(error) => bad_request(&error),
    }
}

pub(crate) async fn refinement_handler(
    State(state): State<BacklogState>,
    axum::Json(request): axum::Json<RefinementRequest>,
) -> Response {
    match parse_batch(&request.issues) {
        Ok(batch) => {
            let report = state.refinement.analyze_batch(batch);
            (StatusCode::OK, axum::Json(report)).into_response()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::backlog::{CullThresholds, RefinementSettings, StalenessWeights};
    use crate::workflows::readiness::{DorChecker, FieldAliases, RuleDefinition};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn router() -> Router {
        let aliases: FieldAliases = [
            ("story_syntax", "customfield_12015"),
            ("acceptance_criteria", "customfield_12016"),
            ("account_code", "customfield_10500"),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id.to_string()))
        .collect();
        let rules = vec![
            RuleDefinition::new("Title completed", "summary", 50.0),
            RuleDefinition::new("Account code set", "account_code", 50.0),
        ];
        let checker = Arc::new(DorChecker::from_parts(&rules, aliases).expect("valid checklist"));

        backlog_router(
            Arc::new(BacklogCull::new(
                checker.clone(),
                CullThresholds::default(),
                StalenessWeights::default(),
            )),
            Arc::new(RefinementPrep::new(checker, RefinementSettings::default(), None)),
        )
    }

    fn post(path: &str, payload: Value) -> Request<axum::body::Body> {
        Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(payload.to_string()))
            .expect("build request")
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn raw_issue(key: &str, created: &str, updated: &str) -> Value {
        json!({
            "key": key,
            "fields": {
                "created": created,
                "updated": updated,
                "comment": { "total": 3 },
                "watches": { "watchCount": 2 }
            }
        })
    }

    #[tokio::test]
    async fn cull_route_reports_candidates_and_failures() {
        let payload = json!({
            "now": "2024-06-01T00:00:00.000+0000",
            "issues": {
                "issues": [
                    raw_issue("DD-1", "2023-01-01T00:00:00.000+0000", "2023-10-01T00:00:00.000+0000"),
                    raw_issue("DD-2", "2023-01-01", "yesterday-ish"),
                    { "fields": {} }
                ]
            }
        });

        let response = router()
            .oneshot(post("/api/v1/backlog/cull", payload))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let report = read_json_body(response).await;
        let candidates = report["candidates"].as_array().expect("candidates");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["issue_key"], json!("DD-1"));
        assert_eq!(candidates[0]["comments"], json!(3));
        assert_eq!(candidates[0]["label"], json!("very_stale"));
        assert_eq!(report["failures"].as_array().map(Vec::len), Some(2));
        assert_eq!(report["failures"][0]["issue_key"], json!("entry #3"));
    }

    #[tokio::test]
    async fn cull_route_applies_overrides() {
        let payload = json!({
            "now": "2024-06-01",
            "overrides": { "age_threshold_days": 1000 },
            "issues": [raw_issue("DD-1", "2023-01-01", "2023-02-01")]
        });

        let response = router()
            .oneshot(post("/api/v1/backlog/cull", payload))
            .await
            .expect("route executes");
        let report = read_json_body(response).await;
        assert_eq!(report["skipped_recent"], json!(1));
        assert_eq!(report["thresholds"]["age_threshold_days"], json!(1000));
    }

    #[tokio::test]
    async fn cull_route_rejects_unparseable_now() {
        let payload = json!({ "now": "soon", "issues": [] });
        let response = router()
            .oneshot(post("/api/v1/backlog/cull", payload))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refinement_route_keeps_order() {
        let payload = json!({
            "issues": [
                { "key": "DD-9", "fields": { "summary": "Second in rank?" } },
                { "key": "DD-4", "fields": {} }
            ]
        });

        let response = router()
            .oneshot(post("/api/v1/backlog/refinement", payload))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let report = read_json_body(response).await;
        assert_eq!(report["items"][0]["issue_key"], json!("DD-9"));
        assert_eq!(report["items"][1]["issue_key"], json!("DD-4"));
        assert_eq!(
            report["items"][1]["missing_deterministic"],
            json!(["title", "account"])
        );
        assert_eq!(report["summary"]["average_percentage"], json!(25.0));
    }

    #[tokio::test]
    async fn refinement_route_rejects_scalars() {
        let response = router()
            .oneshot(post("/api/v1/backlog/refinement", json!({ "issues": 42 })))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
