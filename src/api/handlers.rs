//! HTTP request handlers for the payroll batch API.
//!
//! This module contains the handler functions for all `/batch` endpoints.
//! Each handler is a thin translation layer over [`BatchService`]; the
//! guards and state changes live in the service.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::service::BatchService;

use super::request::{
    AdvanceRequest, CompleteRequest, ExecuteRequest, ResolveRequest, ValidateRequest,
};
use super::response::{
    AdvanceResponse, ApiError, ApiErrorResponse, CancelResponse, ExceptionListResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    Router::new()
        .route("/batch/validate", post(validate_handler))
        .route("/batch/exceptions/resolve", post(resolve_handler))
        .route("/batch/workflow/advance", post(advance_handler))
        .route("/batch/execute", post(execute_handler))
        .route("/batch/cancel", post(cancel_handler))
        .route("/batch/complete", post(complete_handler))
        .route("/batch/state", get(state_handler))
        .with_state(state)
}

/// Unwraps a JSON payload or produces a 400 response.
fn parse_json<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
                    ApiError::malformed_json(format!("Invalid JSON syntax: {err}"))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err((
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response())
        }
    }
}

fn ok_response<T: Serialize>(body: &T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: crate::error::EngineError, correlation_id: Uuid) -> Response {
    warn!(correlation_id = %correlation_id, error = %error, "Request rejected");
    let api_error: ApiErrorResponse = error.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

fn exception_list(service: &BatchService<crate::execution::SimulatedProvider>) -> ExceptionListResponse {
    ExceptionListResponse {
        exceptions: service.exceptions().to_vec(),
        can_submit: service.can_submit(),
    }
}

/// Handler for POST /batch/validate.
async fn validate_handler(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing validation request");

    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let mut service = state.write().await;
    match service.run_validation(as_of) {
        Ok(exceptions) => {
            info!(
                correlation_id = %correlation_id,
                exceptions = exceptions.len(),
                "Validation completed"
            );
            ok_response(&exception_list(&service))
        }
        Err(error) => error_response(error, correlation_id),
    }
}

/// Handler for POST /batch/exceptions/resolve.
async fn resolve_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing resolution request");

    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut service = state.write().await;
    let result = match request.into_parts() {
        Ok((exception_id, action)) => service
            .resolve_exception(exception_id, action)
            .map(|_| ()),
        Err(worker_id) => service.undo_snooze(&worker_id),
    };

    match result {
        Ok(()) => ok_response(&exception_list(&service)),
        Err(error) => error_response(error, correlation_id),
    }
}

/// Handler for POST /batch/workflow/advance.
async fn advance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing workflow advance");

    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut service = state.write().await;
    match service.advance_step(request.target) {
        Ok(step) => {
            info!(correlation_id = %correlation_id, %step, "Workflow advanced");
            ok_response(&AdvanceResponse { step })
        }
        Err(error) => error_response(error, correlation_id),
    }
}

/// Handler for POST /batch/execute.
async fn execute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing execution request");

    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    // The service stays unlocked while payments are in flight so
    // /batch/cancel can reach it mid-run.
    let prepared = {
        let mut service = state.write().await;
        match service.begin_execution(request.cohort) {
            Ok(prepared) => prepared,
            Err(error) => return error_response(error, correlation_id),
        }
    };
    let log = prepared.run().await;

    let mut service = state.write().await;
    service.record_execution(log.clone());
    info!(
        correlation_id = %correlation_id,
        run_id = %log.run_id,
        processed = log.entries.len(),
        failed = log.failed_entries().count(),
        cancelled = log.cancelled,
        "Execution completed"
    );
    ok_response(&log)
}

/// Handler for POST /batch/cancel.
///
/// Sets the cancellation flag for the in-flight run; workers already being
/// processed run to completion. Idempotent when no run is in flight.
async fn cancel_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing cancellation request");

    let service = state.read().await;
    service.cancel_execution();
    ok_response(&CancelResponse {
        cancellation_requested: true,
    })
}

/// Handler for POST /batch/complete.
async fn complete_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompleteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing completion request");

    let request = match parse_json(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut service = state.write().await;
    match service.mark_complete(request.force, request.justification.as_deref()) {
        Ok(outcome) => ok_response(&outcome),
        Err(error) => error_response(error, correlation_id),
    }
}

/// Handler for GET /batch/state.
async fn state_handler(State(state): State<AppState>) -> Response {
    let service = state.read().await;
    ok_response(&service.state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountrySettingsLoader;
    use crate::execution::{ExecutionEngine, SimulatedProvider};
    use crate::models::{BatchCycle, PayPeriod};
    use crate::registry::WorkerRegistry;
    use crate::validation::test_util::{active_worker, ph_settings};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let settings = Arc::new(CountrySettingsLoader::from_settings([ph_settings()]));
        let registry = WorkerRegistry::from_parts(vec![active_worker()], vec![]);
        let engine =
            ExecutionEngine::new(Arc::new(SimulatedProvider::reliable()), settings.clone());
        let cycle = BatchCycle::new(
            "February 2026",
            PayPeriod {
                start_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
            },
        );
        AppState::new(BatchService::new(registry, cycle, settings, engine))
    }

    async fn post(router: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validate_returns_exception_list() {
        let router = create_router(create_test_state());
        let (status, body) = post(router, "/batch/validate", r#"{"as_of": "2026-02-10"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body["exceptions"].as_array().unwrap().is_empty());
        assert_eq!(body["can_submit"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let (status, body) = post(router, "/batch/validate", "{invalid json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_execute_blocked_returns_409() {
        let state = create_test_state();
        let router = create_router(state.clone());
        let (status, _) = post(
            router.clone(),
            "/batch/validate",
            r#"{"as_of": "2026-02-10"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post(router, "/batch/execute", r#"{"cohort": "all"}"#).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "SUBMISSION_BLOCKED");
    }

    #[tokio::test]
    async fn test_cancel_without_run_in_flight_is_acknowledged() {
        let router = create_router(create_test_state());
        let (status, body) = post(router, "/batch/cancel", "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cancellation_requested"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_resolve_unknown_exception_returns_404() {
        let router = create_router(create_test_state());
        let body = r#"{
            "action": "resolve",
            "exception_id": "00000000-0000-0000-0000-000000000001"
        }"#;
        let (status, body) = post(router, "/batch/exceptions/resolve", body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_advance_skip_returns_409() {
        let router = create_router(create_test_state());
        let (status, body) = post(
            router,
            "/batch/workflow/advance",
            r#"{"target": "submit"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "TRANSITION_BLOCKED");
    }

    #[tokio::test]
    async fn test_state_snapshot_round_trip() {
        let state = create_test_state();
        let router = create_router(state);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/batch/state")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["cycle"]["step"], "review");
        assert_eq!(body["workers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_without_force_reports_unresolved() {
        let state = create_test_state();
        let router = create_router(state.clone());
        post(
            router.clone(),
            "/batch/validate",
            r#"{"as_of": "2026-02-10"}"#,
        )
        .await;

        let (status, body) = post(router, "/batch/complete", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "unresolved");
        assert_eq!(body["redirect_to"], "resolve");
    }

    #[tokio::test]
    async fn test_forced_complete_without_justification_returns_400() {
        let state = create_test_state();
        let router = create_router(state.clone());
        post(
            router.clone(),
            "/batch/validate",
            r#"{"as_of": "2026-02-10"}"#,
        )
        .await;

        let (status, body) = post(router, "/batch/complete", r#"{"force": true}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMPTY_JUSTIFICATION");
    }
}
