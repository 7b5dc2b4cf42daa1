//! Exception resolution manager.
//!
//! Owns the exception lifecycle: every status change starts from Active and
//! goes through [`ResolutionManager::resolve`], which rejects invalid
//! combinations outright. The manager also tracks snoozed workers and
//! exposes the submission guard the workflow depends on.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ExceptionKind, ExceptionStatus, ExecutionLogData, PayrollException, Severity,
};
use crate::validation;

/// An operator action on an Active exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionAction {
    /// Confirm a fix was applied.
    Resolve,
    /// Exclude the exception and its worker from the current cycle.
    Snooze,
    /// Dismiss a non-blocking, non-high finding.
    Ignore,
    /// Bypass a blocking finding with recorded justification.
    Override {
        /// Why the finding is safe to bypass.
        justification: String,
        /// Who authorized the bypass.
        actor: String,
    },
}

/// Owns the exception list and the snoozed-worker set for a batch.
#[derive(Debug, Clone, Default)]
pub struct ResolutionManager {
    exceptions: Vec<PayrollException>,
    snoozed_workers: BTreeSet<String>,
}

impl ResolutionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current exception list.
    pub fn exceptions(&self) -> &[PayrollException] {
        &self.exceptions
    }

    /// Returns the ids of currently snoozed workers.
    pub fn snoozed_workers(&self) -> &BTreeSet<String> {
        &self.snoozed_workers
    }

    /// Merges a fresh validation run into the list, preserving statuses.
    pub fn absorb_findings(&mut self, fresh: Vec<PayrollException>) {
        let existing = std::mem::take(&mut self.exceptions);
        self.exceptions = validation::merge_findings(existing, fresh);
    }

    /// Applies an operator action to an Active exception.
    ///
    /// # Errors
    ///
    /// - `ExceptionNotFound` when no exception has the given id.
    /// - `NotActionable` when the exception is not Active.
    /// - `IgnoreNotAllowed` for blocking or high-severity findings.
    /// - `OverrideNotAllowed` for non-blocking findings.
    /// - `EmptyJustification` when an override justification is blank.
    pub fn resolve(
        &mut self,
        id: Uuid,
        action: ResolutionAction,
        now: DateTime<Utc>,
    ) -> EngineResult<&PayrollException> {
        let exception = self
            .exceptions
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EngineError::ExceptionNotFound { id })?;

        if !exception.is_active() {
            return Err(EngineError::NotActionable {
                id,
                message: format!(
                    "{} has status {:?}, only Active exceptions accept actions",
                    exception.kind, exception.status
                ),
            });
        }

        match action {
            ResolutionAction::Resolve => {
                exception.status = ExceptionStatus::Resolved;
            }
            ResolutionAction::Snooze => {
                exception.status = ExceptionStatus::Snoozed;
                self.snoozed_workers.insert(exception.worker_id.clone());
            }
            ResolutionAction::Ignore => {
                if exception.is_blocking() || exception.severity() == Severity::High {
                    return Err(EngineError::IgnoreNotAllowed {
                        id,
                        severity: exception.severity(),
                        blocking: exception.is_blocking(),
                    });
                }
                exception.status = ExceptionStatus::Ignored;
            }
            ResolutionAction::Override {
                justification,
                actor,
            } => {
                if !exception.is_blocking() {
                    return Err(EngineError::OverrideNotAllowed { id });
                }
                if justification.trim().is_empty() {
                    return Err(EngineError::EmptyJustification);
                }
                exception.status = ExceptionStatus::Overridden {
                    justification,
                    actor,
                    timestamp: now,
                };
            }
        }

        info!(
            exception_id = %id,
            worker_id = %exception.worker_id,
            status = ?exception.status,
            "Exception resolved"
        );
        Ok(&*exception)
    }

    /// Returns a snoozed worker to the active batch.
    ///
    /// The worker's Snoozed exceptions return to Active; all other
    /// exceptions on the worker are untouched.
    ///
    /// # Errors
    ///
    /// Returns `WorkerNotSnoozed` when the worker is not in the snoozed set.
    pub fn undo_snooze(&mut self, worker_id: &str) -> EngineResult<()> {
        if !self.snoozed_workers.remove(worker_id) {
            return Err(EngineError::WorkerNotSnoozed {
                worker_id: worker_id.to_string(),
            });
        }

        for exception in &mut self.exceptions {
            if exception.worker_id == worker_id && exception.status == ExceptionStatus::Snoozed {
                exception.status = ExceptionStatus::Active;
            }
        }
        Ok(())
    }

    /// The submission guard: true when no blocking exception is Active.
    pub fn can_submit(&self) -> bool {
        self.active_blocking_count() == 0
    }

    /// Returns the number of blocking exceptions still Active.
    pub fn active_blocking_count(&self) -> usize {
        self.exceptions
            .iter()
            .filter(|e| e.is_blocking() && e.is_active())
            .count()
    }

    /// Surfaces failed execution entries as new blocking exceptions.
    ///
    /// Skips workers that already carry an Active execution-failure
    /// exception so repeated runs do not pile up duplicates.
    pub fn record_execution_failures(&mut self, log: &ExecutionLogData) {
        let fresh: Vec<PayrollException> = log
            .failed_entries()
            .filter(|entry| {
                !self.exceptions.iter().any(|e| {
                    e.worker_id == entry.worker_id
                        && e.kind == ExceptionKind::ExecutionFailed
                        && e.is_active()
                })
            })
            .map(|entry| {
                PayrollException::new(
                    &entry.worker_id,
                    ExceptionKind::ExecutionFailed,
                    entry
                        .error
                        .clone()
                        .unwrap_or_else(|| "Payment execution failed".to_string()),
                )
            })
            .collect();
        self.exceptions.extend(fresh);
    }
}
