//! Response types for the payroll batch API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP statuses, and the success envelopes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{PayrollException, WorkflowStep};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::CountryNotConfigured { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::CalculationError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
            EngineError::ExceptionNotFound { .. } | EngineError::WorkerNotSnoozed { .. } => {
                ApiErrorResponse {
                    status: StatusCode::NOT_FOUND,
                    error: ApiError::new("NOT_FOUND", message),
                }
            }
            EngineError::NotActionable { .. }
            | EngineError::IgnoreNotAllowed { .. }
            | EngineError::OverrideNotAllowed { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVALID_ACTION", message),
            },
            EngineError::EmptyJustification => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("EMPTY_JUSTIFICATION", message),
            },
            EngineError::TransitionBlocked { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("TRANSITION_BLOCKED", message),
            },
            EngineError::SubmissionBlocked { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("SUBMISSION_BLOCKED", message),
            },
            EngineError::CycleCompleted => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("CYCLE_COMPLETED", message),
            },
        }
    }
}

/// Response body carrying the exception list and the submission guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionListResponse {
    /// The current exception list with statuses.
    pub exceptions: Vec<PayrollException>,
    /// True when no blocking exception is Active.
    pub can_submit: bool,
}

/// Response body for a workflow advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceResponse {
    /// The step the workflow landed on.
    pub step: WorkflowStep,
}

/// Response body for an execution cancellation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    /// True once the flag is set; the in-flight run winds down cooperatively.
    pub cancellation_requested: bool,
}
