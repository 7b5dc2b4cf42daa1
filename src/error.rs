//! Error types for the payroll batch engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Validation findings and per-worker execution failures are deliberately
//! *not* errors: they are data the operator acts on. Errors here cover
//! configuration problems, guard violations, and rejected operator input.

use uuid::Uuid;

use thiserror::Error;

use crate::models::{Severity, WorkflowStep};

/// The main error type for the payroll batch engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payrun_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/countries".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration directory not found: /missing/countries");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Country settings directory was not found at the specified path.
    #[error("Configuration directory not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A country settings file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No country settings are configured for the given country code.
    #[error("Country not configured: {country}")]
    CountryNotConfigured {
        /// The country code that was not found.
        country: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// No exception exists with the given id.
    #[error("Exception not found: {id}")]
    ExceptionNotFound {
        /// The exception id that was not found.
        id: Uuid,
    },

    /// A resolution action was applied to an exception in the wrong state.
    #[error("Exception {id} is not actionable: {message}")]
    NotActionable {
        /// The exception id.
        id: Uuid,
        /// Why the action was rejected.
        message: String,
    },

    /// Ignore was requested for an exception that may not be ignored.
    #[error("Exception {id} cannot be ignored (severity {severity}, blocking: {blocking})")]
    IgnoreNotAllowed {
        /// The exception id.
        id: Uuid,
        /// The severity of the exception.
        severity: Severity,
        /// Whether the exception blocks submission.
        blocking: bool,
    },

    /// Override was requested for a non-blocking exception.
    #[error("Exception {id} cannot be overridden: only blocking exceptions accept overrides")]
    OverrideNotAllowed {
        /// The exception id.
        id: Uuid,
    },

    /// An override or forced completion was submitted without justification.
    #[error("A non-empty justification is required")]
    EmptyJustification,

    /// A workflow transition was requested that the state machine forbids.
    #[error("Cannot move from {from} to {to}: {message}")]
    TransitionBlocked {
        /// The current workflow step.
        from: WorkflowStep,
        /// The requested workflow step.
        to: WorkflowStep,
        /// Why the transition was refused.
        message: String,
    },

    /// Submission or execution was attempted while blocking exceptions remain.
    #[error("Batch cannot be submitted: {blocking_active} blocking exception(s) still active")]
    SubmissionBlocked {
        /// Number of blocking exceptions still in the Active status.
        blocking_active: usize,
    },

    /// A mutation was attempted on a completed (read-only) cycle.
    #[error("Batch cycle is completed and read-only")]
    CycleCompleted,

    /// Undo-snooze was requested for a worker that is not snoozed.
    #[error("Worker {worker_id} is not snoozed")]
    WorkerNotSnoozed {
        /// The worker id.
        worker_id: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
