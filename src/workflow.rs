//! Batch workflow state machine.
//!
//! Four steps — Review, Resolve, Submit, Track — with operator-driven,
//! bidirectional navigation. Back-navigation is always allowed; forward
//! movement is one step at a time and two transitions are guarded: entering
//! Submit requires the submission guard, entering Track requires a finished
//! execution run. Cycle status changes force the step from outside.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{BatchCycle, CycleStatus, WorkflowStep};

/// The guard inputs a transition decision needs.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    /// True when no blocking exception is Active.
    pub can_submit: bool,
    /// True when the latest execution run reached a terminal state for
    /// every targeted worker.
    pub execution_finished: bool,
}

/// Decides an operator-driven step transition.
///
/// Staying put and moving backward always succeed. Forward movement is one
/// step at a time; Resolve → Submit requires `can_submit` and
/// Submit → Track requires a finished execution run.
///
/// # Errors
///
/// Returns `TransitionBlocked` describing why the move was refused.
pub fn advance_step(
    current: WorkflowStep,
    target: WorkflowStep,
    ctx: TransitionContext,
) -> EngineResult<WorkflowStep> {
    if target.index() <= current.index() {
        return Ok(target);
    }

    if target.index() > current.index() + 1 {
        warn!(%current, %target, "Refused workflow skip");
        return Err(EngineError::TransitionBlocked {
            from: current,
            to: target,
            message: "steps advance one at a time".to_string(),
        });
    }

    match target {
        WorkflowStep::Submit if !ctx.can_submit => Err(EngineError::TransitionBlocked {
            from: current,
            to: target,
            message: "blocking exceptions are still active".to_string(),
        }),
        WorkflowStep::Track if !ctx.execution_finished => Err(EngineError::TransitionBlocked {
            from: current,
            to: target,
            message: "no finished execution run for this batch".to_string(),
        }),
        _ => Ok(target),
    }
}

/// Applies an external cycle status change to the workflow step.
///
/// A completed cycle is forced to Track. A cycle flipping back to active
/// while sitting at Track resets to Review for the new period.
pub fn apply_cycle_status(cycle: &mut BatchCycle, status: CycleStatus) {
    cycle.status = status;
    match status {
        CycleStatus::Completed => cycle.step = WorkflowStep::Track,
        CycleStatus::Active if cycle.step == WorkflowStep::Track => {
            cycle.step = WorkflowStep::Review;
        }
        _ => {}
    }
}

/// Counts of unresolved issues that prevented a non-forced completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedIssuesReport {
    /// Blocking exceptions still Active.
    pub blocking_exceptions: usize,
    /// Failed executions for employees.
    pub failed_employees: usize,
    /// Failed executions for contractors.
    pub failed_contractors: usize,
    /// Where the operator should go next: Resolve while blocking
    /// exceptions remain, otherwise Submit for the execution failures.
    pub redirect_to: WorkflowStep,
}

/// The result of a mark-complete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The cycle was completed and is now read-only.
    Completed(BatchCycle),
    /// Unresolved issues remain and `force` was not set.
    Unresolved(UnresolvedIssuesReport),
}

/// Attempts to mark the cycle complete.
///
/// With unresolved issues and `force` unset, returns an
/// [`UnresolvedIssuesReport`] directing the operator back into the flow.
/// With `force` set, a non-empty justification is required and the cycle is
/// completed regardless of the issue counts.
///
/// # Errors
///
/// - `CycleCompleted` when the cycle is already completed.
/// - `EmptyJustification` for a forced completion without justification.
pub fn mark_complete(
    cycle: &BatchCycle,
    force: bool,
    justification: Option<&str>,
    blocking_exceptions: usize,
    failed_employees: usize,
    failed_contractors: usize,
) -> EngineResult<CompletionOutcome> {
    if cycle.is_completed() {
        return Err(EngineError::CycleCompleted);
    }

    let has_issues = blocking_exceptions + failed_employees + failed_contractors > 0;
    if has_issues && !force {
        let redirect_to = if blocking_exceptions > 0 {
            WorkflowStep::Resolve
        } else {
            WorkflowStep::Submit
        };
        warn!(
            blocking_exceptions,
            failed_employees, failed_contractors, "Completion refused; unresolved issues remain"
        );
        return Ok(CompletionOutcome::Unresolved(UnresolvedIssuesReport {
            blocking_exceptions,
            failed_employees,
            failed_contractors,
            redirect_to,
        }));
    }

    let completion_note = if force {
        let text = justification.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(EngineError::EmptyJustification);
        }
        Some(text.to_string())
    } else {
        None
    };

    let mut completed = cycle.clone();
    completed.status = CycleStatus::Completed;
    completed.step = WorkflowStep::Track;
    completed.completion_note = completion_note;
    Ok(CompletionOutcome::Completed(completed))
}
