//! End-to-end tests for the payroll batch API.
//!
//! This suite drives the full cycle lifecycle through the HTTP surface:
//! validation, exception resolution, workflow navigation, execution, and
//! completion, using the country settings shipped under `config/countries`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payrun_engine::api::{AppState, create_router};
use payrun_engine::config::CountrySettingsLoader;
use payrun_engine::execution::{ExecutionEngine, SimulatedProvider};
use payrun_engine::models::{
    BatchCycle, Compensation, EmploymentType, PayPeriod, Worker, WorkerStatus,
};
use payrun_engine::registry::WorkerRegistry;
use payrun_engine::service::BatchService;

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ph_ids() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("tin".to_string(), "123-456-789".to_string()),
        ("sss".to_string(), "34-9876543-2".to_string()),
    ])
}

/// A PH employee that passes every shipped PH rule.
fn clean_employee(id: &str, name: &str) -> Worker {
    Worker {
        id: id.to_string(),
        name: name.to_string(),
        country: "PH".to_string(),
        currency: "PHP".to_string(),
        employment_type: EmploymentType::Employee,
        status: WorkerStatus::Active,
        compensation: Compensation::Monthly {
            base_salary: dec("45000"),
        },
        start_date: NaiveDate::from_ymd_opt(2023, 4, 1),
        end_date: None,
        government_ids: ph_ids(),
        employee_contribution: Some(dec("1800")),
        employer_contribution: Some(dec("3600")),
        withholding_rate: Some(dec("0.15")),
        pay_components: ["thirteenth_month".to_string()].into(),
        adjustments: vec![],
        deductions: vec![],
    }
}

/// A PH employee whose only finding is a missing `tin` government ID.
fn employee_missing_tin(id: &str, name: &str) -> Worker {
    let mut worker = clean_employee(id, name);
    worker.government_ids.remove("tin");
    worker
}

/// A PH hourly contractor that passes every shipped PH rule.
fn clean_contractor(id: &str, name: &str) -> Worker {
    Worker {
        id: id.to_string(),
        name: name.to_string(),
        country: "PH".to_string(),
        currency: "PHP".to_string(),
        employment_type: EmploymentType::Contractor,
        status: WorkerStatus::Active,
        compensation: Compensation::Hourly {
            rate: dec("850"),
            hours: Some(dec("160")),
        },
        start_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        end_date: None,
        government_ids: ph_ids(),
        employee_contribution: None,
        employer_contribution: None,
        withholding_rate: None,
        pay_components: Default::default(),
        adjustments: vec![],
        deductions: vec![],
    }
}

fn create_state(workers: Vec<Worker>) -> AppState {
    create_state_with_provider(workers, SimulatedProvider::reliable())
}

fn create_state_with_provider(workers: Vec<Worker>, provider: SimulatedProvider) -> AppState {
    let settings = Arc::new(
        CountrySettingsLoader::load("./config/countries").expect("Failed to load config"),
    );
    let registry = WorkerRegistry::from_parts(workers, vec![]);
    let engine = ExecutionEngine::new(Arc::new(provider), settings.clone());
    let cycle = BatchCycle::new(
        "February 2026",
        PayPeriod {
            start_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        },
    );
    AppState::new(BatchService::new(registry, cycle, settings, engine))
}

fn default_workers() -> Vec<Worker> {
    vec![
        clean_employee("wkr_001", "Maria Santos"),
        employee_missing_tin("wkr_002", "Jose Ramos"),
        clean_contractor("wkr_003", "Lena Cruz"),
    ]
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
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
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    (status, json)
}

async fn get_state(router: Router) -> (StatusCode, Value) {
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

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    (status, json)
}

async fn validate(router: Router) -> Value {
    let (status, body) = post(router, "/batch/validate", json!({"as_of": "2026-02-10"})).await;
    assert_eq!(status, StatusCode::OK);
    body
}

fn active_exception_ids(body: &Value, kind: &str) -> Vec<String> {
    body["exceptions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["kind"] == kind && e["status"]["status"] == "active")
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// SECTION 1: Validation
// =============================================================================

#[tokio::test]
async fn test_validate_flags_missing_government_id() {
    let state = create_state(default_workers());
    let body = validate(create_router(state)).await;

    let ids = active_exception_ids(&body, "missing-government-id");
    assert_eq!(ids.len(), 1);
    assert_eq!(body["can_submit"], json!(false));

    let exception = body["exceptions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["kind"] == "missing-government-id")
        .unwrap();
    assert_eq!(exception["worker_id"], "wkr_002");
    assert!(exception["message"].as_str().unwrap().contains("tin"));
}

#[tokio::test]
async fn test_validate_clean_batch_can_submit() {
    let state = create_state(vec![
        clean_employee("wkr_001", "Maria Santos"),
        clean_contractor("wkr_003", "Lena Cruz"),
    ]);
    let body = validate(create_router(state)).await;

    assert!(body["exceptions"].as_array().unwrap().is_empty());
    assert_eq!(body["can_submit"], json!(true));
}

#[tokio::test]
async fn test_revalidation_is_idempotent() {
    let state = create_state(default_workers());
    let router = create_router(state);

    let first = validate(router.clone()).await;
    let second = validate(router).await;

    assert_eq!(
        first["exceptions"].as_array().unwrap().len(),
        second["exceptions"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn test_validation_auto_resolves_fixed_finding() {
    let state = create_state(default_workers());
    let router = create_router(state.clone());
    validate(router.clone()).await;

    // Fix the worker record, then re-validate.
    {
        let mut service = state.write().await;
        service
            .upsert_worker(clean_employee("wkr_002", "Jose Ramos"))
            .unwrap();
    }
    let body = validate(router).await;

    let exception = body["exceptions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["kind"] == "missing-government-id")
        .unwrap();
    assert_eq!(exception["status"]["status"], "resolved");
    assert_eq!(body["can_submit"], json!(true));
}

// =============================================================================
// SECTION 2: Resolution
// =============================================================================

#[tokio::test]
async fn test_override_blocking_exception_opens_guard() {
    let state = create_state(default_workers());
    let router = create_router(state);
    let body = validate(router.clone()).await;
    let id = active_exception_ids(&body, "missing-government-id")
        .pop()
        .unwrap();

    let (status, body) = post(
        router,
        "/batch/exceptions/resolve",
        json!({
            "action": "override",
            "exception_id": id,
            "justification": "ID sighted, registry update pending",
            "actor": "ops_lead"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_submit"], json!(true));
    let overridden = body["exceptions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == json!(id))
        .unwrap();
    assert_eq!(overridden["status"]["status"], "overridden");
    assert_eq!(overridden["status"]["actor"], "ops_lead");
}

#[tokio::test]
async fn test_blocking_exception_cannot_be_ignored() {
    let state = create_state(default_workers());
    let router = create_router(state);
    let body = validate(router.clone()).await;
    let id = active_exception_ids(&body, "missing-government-id")
        .pop()
        .unwrap();

    let (status, body) = post(
        router,
        "/batch/exceptions/resolve",
        json!({"action": "ignore", "exception_id": id}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ACTION");
}

#[tokio::test]
async fn test_override_without_justification_rejected() {
    let state = create_state(default_workers());
    let router = create_router(state);
    let body = validate(router.clone()).await;
    let id = active_exception_ids(&body, "missing-government-id")
        .pop()
        .unwrap();

    let (status, body) = post(
        router,
        "/batch/exceptions/resolve",
        json!({
            "action": "override",
            "exception_id": id,
            "justification": "   ",
            "actor": "ops_lead"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_JUSTIFICATION");
}

#[tokio::test]
async fn test_snooze_and_undo_snooze_round_trip() {
    let state = create_state(default_workers());
    let router = create_router(state);
    let body = validate(router.clone()).await;
    let id = active_exception_ids(&body, "missing-government-id")
        .pop()
        .unwrap();

    let (status, body) = post(
        router.clone(),
        "/batch/exceptions/resolve",
        json!({"action": "snooze", "exception_id": id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Snoozing takes the worker (and its blocking finding) out of play.
    assert_eq!(body["can_submit"], json!(true));

    let (_, snapshot) = get_state(router.clone()).await;
    assert_eq!(snapshot["snoozed_workers"], json!(["wkr_002"]));

    let (status, body) = post(
        router,
        "/batch/exceptions/resolve",
        json!({"action": "undo_snooze", "worker_id": "wkr_002"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_submit"], json!(false));
}

// =============================================================================
// SECTION 3: Workflow and execution
// =============================================================================

#[tokio::test]
async fn test_full_lifecycle_to_completion() {
    let state = create_state(default_workers());
    let router = create_router(state);

    let body = validate(router.clone()).await;
    let id = active_exception_ids(&body, "missing-government-id")
        .pop()
        .unwrap();
    let (status, _) = post(
        router.clone(),
        "/batch/exceptions/resolve",
        json!({
            "action": "override",
            "exception_id": id,
            "justification": "ID sighted, registry update pending",
            "actor": "ops_lead"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for target in ["resolve", "submit"] {
        let (status, body) = post(
            router.clone(),
            "/batch/workflow/advance",
            json!({"target": target}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], target);
    }

    let (status, log) = post(router.clone(), "/batch/execute", json!({"cohort": "all"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["employee_count"], 2);
    assert_eq!(log["contractor_count"], 1);
    assert_eq!(log["cancelled"], json!(false));
    assert_eq!(log["entries"].as_array().unwrap().len(), 3);

    let (status, body) = post(
        router.clone(),
        "/batch/workflow/advance",
        json!({"target": "track"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "track");

    let (status, body) = post(router.clone(), "/batch/complete", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "completed");
    assert_eq!(body["status"], "completed");

    // The completed cycle is read-only.
    let (status, body) = post(router, "/batch/validate", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CYCLE_COMPLETED");
}

#[tokio::test]
async fn test_contractor_cohort_counts() {
    let state = create_state(vec![
        clean_employee("wkr_001", "Maria Santos"),
        clean_contractor("wkr_003", "Lena Cruz"),
        clean_contractor("wkr_004", "Paolo Diaz"),
    ]);
    let router = create_router(state);
    validate(router.clone()).await;

    let (status, log) = post(
        router,
        "/batch/execute",
        json!({"cohort": "contractors"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["employee_count"], 0);
    assert_eq!(log["contractor_count"], 2);
    let entries = log["entries"].as_array().unwrap();
    assert!(
        entries
            .iter()
            .all(|e| e["employment_type"] == "contractor" && e["outcome"] == "success")
    );
}

#[tokio::test]
async fn test_execute_blocked_by_active_blocking_exception() {
    let state = create_state(default_workers());
    let router = create_router(state);
    validate(router.clone()).await;

    let (status, body) = post(router, "/batch/execute", json!({"cohort": "all"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SUBMISSION_BLOCKED");
}

#[tokio::test]
async fn test_step_skip_rejected() {
    let state = create_state(default_workers());
    let router = create_router(state);

    let (status, body) = post(
        router,
        "/batch/workflow/advance",
        json!({"target": "track"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "TRANSITION_BLOCKED");
}

#[tokio::test]
async fn test_snoozed_worker_skipped_in_execution() {
    let state = create_state(default_workers());
    let router = create_router(state);
    let body = validate(router.clone()).await;
    let id = active_exception_ids(&body, "missing-government-id")
        .pop()
        .unwrap();

    post(
        router.clone(),
        "/batch/exceptions/resolve",
        json!({"action": "snooze", "exception_id": id}),
    )
    .await;

    let (status, log) = post(router, "/batch/execute", json!({"cohort": "all"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["entries"].as_array().unwrap().len(), 2);
    assert!(
        log["entries"]
            .as_array()
            .unwrap()
            .iter()
            .all(|e| e["worker_id"] != "wkr_002")
    );
}

#[tokio::test]
async fn test_cancel_endpoint_stops_run_mid_flight() {
    let workers: Vec<Worker> = (1..=6)
        .map(|i| clean_employee(&format!("wkr_{i:03}"), &format!("Worker {i}")))
        .collect();
    let state = create_state_with_provider(
        workers,
        SimulatedProvider::new(Duration::from_millis(200), 0.0),
    );
    let router = create_router(state);
    validate(router.clone()).await;

    let execute = tokio::spawn(post(
        router.clone(),
        "/batch/execute",
        json!({"cohort": "all"}),
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = post(router.clone(), "/batch/cancel", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancellation_requested"], json!(true));

    let (status, log) = execute.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["cancelled"], json!(true));
    assert!(log["entries"].as_array().unwrap().len() < 6);

    let (_, snapshot) = get_state(router).await;
    assert_eq!(snapshot["execution_log"]["cancelled"], json!(true));
}

// =============================================================================
// SECTION 4: Completion
// =============================================================================

#[tokio::test]
async fn test_completion_report_directs_to_resolve() {
    let state = create_state(default_workers());
    let router = create_router(state);
    validate(router.clone()).await;

    let (status, body) = post(router, "/batch/complete", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "unresolved");
    assert_eq!(body["blocking_exceptions"], 1);
    assert_eq!(body["redirect_to"], "resolve");
}

#[tokio::test]
async fn test_forced_completion_records_note() {
    let state = create_state(default_workers());
    let router = create_router(state);
    validate(router.clone()).await;

    let (status, body) = post(
        router.clone(),
        "/batch/complete",
        json!({"force": true, "justification": "quarter close deadline"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "completed");
    assert_eq!(body["completion_note"], "quarter close deadline");

    let (_, snapshot) = get_state(router).await;
    assert_eq!(snapshot["cycle"]["status"], "completed");
    assert_eq!(snapshot["cycle"]["step"], "track");
}

// =============================================================================
// SECTION 5: Error handling
// =============================================================================

#[tokio::test]
async fn test_error_malformed_json() {
    let state = create_state(default_workers());
    let router = create_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/batch/validate")
                .header("Content-Type", "application/json")
                .body(Body::from("{invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_error_unknown_exception_id() {
    let state = create_state(default_workers());
    let router = create_router(state);

    let (status, body) = post(
        router,
        "/batch/exceptions/resolve",
        json!({
            "action": "resolve",
            "exception_id": "00000000-0000-0000-0000-000000000042"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_error_missing_target_field() {
    let state = create_state(default_workers());
    let router = create_router(state);

    let (status, body) = post(router, "/batch/workflow/advance", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("missing field"));
}
