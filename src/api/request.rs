//! Request types for the payroll batch API.
//!
//! This module defines the JSON request structures for the `/batch`
//! endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Cohort, WorkflowStep};
use crate::resolution::ResolutionAction;

/// Request body for the `/batch/validate` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateRequest {
    /// The date validation runs against; defaults to today.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Request body for the `/batch/exceptions/resolve` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolveRequest {
    /// Confirm a fix for an exception.
    Resolve {
        /// The exception to resolve.
        exception_id: Uuid,
    },
    /// Snooze an exception, excluding its worker from the cycle.
    Snooze {
        /// The exception to snooze.
        exception_id: Uuid,
    },
    /// Ignore a non-blocking, non-high exception.
    Ignore {
        /// The exception to ignore.
        exception_id: Uuid,
    },
    /// Override a blocking exception with justification.
    Override {
        /// The exception to override.
        exception_id: Uuid,
        /// Why the finding is safe to bypass.
        justification: String,
        /// Who authorized the bypass.
        actor: String,
    },
    /// Return a snoozed worker to the active batch.
    UndoSnooze {
        /// The worker to bring back.
        worker_id: String,
    },
}

/// Request body for the `/batch/workflow/advance` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    /// The step to move to.
    pub target: WorkflowStep,
}

/// Request body for the `/batch/execute` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// The subset of workers to execute.
    pub cohort: Cohort,
}

/// Request body for the `/batch/complete` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteRequest {
    /// Complete despite unresolved issues.
    #[serde(default)]
    pub force: bool,
    /// Required when `force` is set.
    #[serde(default)]
    pub justification: Option<String>,
}

impl ResolveRequest {
    /// Splits the request into the exception id and the domain action, or
    /// the worker id for an undo-snooze.
    pub fn into_parts(self) -> Result<(Uuid, ResolutionAction), String> {
        match self {
            ResolveRequest::Resolve { exception_id } => {
                Ok((exception_id, ResolutionAction::Resolve))
            }
            ResolveRequest::Snooze { exception_id } => Ok((exception_id, ResolutionAction::Snooze)),
            ResolveRequest::Ignore { exception_id } => Ok((exception_id, ResolutionAction::Ignore)),
            ResolveRequest::Override {
                exception_id,
                justification,
                actor,
            } => Ok((
                exception_id,
                ResolutionAction::Override {
                    justification,
                    actor,
                },
            )),
            ResolveRequest::UndoSnooze { worker_id } => Err(worker_id),
        }
    }
}
