//! Batch orchestration service.
//!
//! [`BatchService`] owns the worker registry, the resolution manager, the
//! workflow state, and the execution engine, and is the single entry point
//! the API layer talks to. Every mutation publishes a fresh [`BatchState`]
//! snapshot over a watch channel so observers always see a consistent view.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::info;
use uuid::Uuid;

use crate::config::CountrySettingsLoader;
use crate::error::{EngineError, EngineResult};
use crate::execution::{ExecutionEngine, ExecutionEvent, PaymentProvider};
use crate::models::{
    BatchCycle, Cohort, CycleStatus, EmploymentType, ExecutionLogData, LeaveRecord,
    PayrollException, Worker, WorkflowStep,
};
use crate::registry::WorkerRegistry;
use crate::resolution::{ResolutionAction, ResolutionManager};
use crate::validation;
use crate::workflow::{self, CompletionOutcome, TransitionContext};

/// A consistent snapshot of the batch, published after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchState {
    /// The cycle with its status and workflow step.
    pub cycle: BatchCycle,
    /// All workers in the batch.
    pub workers: Vec<Worker>,
    /// The current exception list with statuses.
    pub exceptions: Vec<PayrollException>,
    /// Ids of workers excluded from the current cycle.
    pub snoozed_workers: BTreeSet<String>,
    /// The latest execution run, if one happened.
    pub execution_log: Option<ExecutionLogData>,
}

/// Owns all batch state and serializes mutations to it.
pub struct BatchService<P> {
    registry: WorkerRegistry,
    resolution: ResolutionManager,
    cycle: BatchCycle,
    settings: Arc<CountrySettingsLoader>,
    engine: ExecutionEngine<P>,
    execution_log: Option<ExecutionLogData>,
    state_tx: watch::Sender<BatchState>,
    cancel_tx: watch::Sender<bool>,
}

impl<P: PaymentProvider + 'static> BatchService<P> {
    /// Creates a service for one batch cycle.
    pub fn new(
        registry: WorkerRegistry,
        cycle: BatchCycle,
        settings: Arc<CountrySettingsLoader>,
        engine: ExecutionEngine<P>,
    ) -> Self {
        let initial = BatchState {
            cycle: cycle.clone(),
            workers: registry.workers().to_vec(),
            exceptions: Vec::new(),
            snoozed_workers: BTreeSet::new(),
            execution_log: None,
        };
        let (state_tx, _) = watch::channel(initial);
        let (cancel_tx, _) = watch::channel(false);
        Self {
            registry,
            resolution: ResolutionManager::new(),
            cycle,
            settings,
            engine,
            execution_log: None,
            state_tx,
            cancel_tx,
        }
    }

    /// Subscribes to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<BatchState> {
        self.state_tx.subscribe()
    }

    /// Returns the current state snapshot.
    pub fn state(&self) -> BatchState {
        self.state_tx.borrow().clone()
    }

    /// Returns the current exception list.
    pub fn exceptions(&self) -> &[PayrollException] {
        self.resolution.exceptions()
    }

    /// Returns the current cycle.
    pub fn cycle(&self) -> &BatchCycle {
        &self.cycle
    }

    /// Returns true when no blocking exception is Active.
    pub fn can_submit(&self) -> bool {
        self.resolution.can_submit()
    }

    fn guard_mutable(&self) -> EngineResult<()> {
        if self.cycle.is_completed() {
            return Err(EngineError::CycleCompleted);
        }
        Ok(())
    }

    fn publish(&self) {
        self.state_tx.send_replace(BatchState {
            cycle: self.cycle.clone(),
            workers: self.registry.workers().to_vec(),
            exceptions: self.resolution.exceptions().to_vec(),
            snoozed_workers: self.resolution.snoozed_workers().clone(),
            execution_log: self.execution_log.clone(),
        });
    }

    /// Inserts or replaces a worker record.
    pub fn upsert_worker(&mut self, worker: Worker) -> EngineResult<()> {
        self.guard_mutable()?;
        self.registry.upsert_worker(worker);
        self.publish();
        Ok(())
    }

    /// Records leave for a worker.
    pub fn record_leave(&mut self, record: LeaveRecord) -> EngineResult<()> {
        self.guard_mutable()?;
        self.registry.record_leave(record);
        self.publish();
        Ok(())
    }

    /// Runs validation over the whole registry and merges the findings into
    /// the existing exception list, preserving statuses.
    pub fn run_validation(&mut self, today: NaiveDate) -> EngineResult<&[PayrollException]> {
        self.guard_mutable()?;
        let fresh = validation::validate(
            self.registry.workers(),
            self.registry.leave_records(),
            &self.settings,
            &self.cycle.period,
            today,
        )?;
        self.resolution.absorb_findings(fresh);
        self.publish();
        Ok(self.resolution.exceptions())
    }

    /// Applies an operator action to an exception.
    pub fn resolve_exception(
        &mut self,
        id: Uuid,
        action: ResolutionAction,
    ) -> EngineResult<PayrollException> {
        self.guard_mutable()?;
        let resolved = self.resolution.resolve(id, action, Utc::now())?.clone();
        self.publish();
        Ok(resolved)
    }

    /// Returns a snoozed worker to the active batch.
    pub fn undo_snooze(&mut self, worker_id: &str) -> EngineResult<()> {
        self.guard_mutable()?;
        self.resolution.undo_snooze(worker_id)?;
        self.publish();
        Ok(())
    }

    /// Moves the workflow to the target step, enforcing the guards.
    pub fn advance_step(&mut self, target: WorkflowStep) -> EngineResult<WorkflowStep> {
        self.guard_mutable()?;
        let ctx = TransitionContext {
            can_submit: self.resolution.can_submit(),
            execution_finished: self.execution_finished(),
        };
        self.cycle.step = workflow::advance_step(self.cycle.step, target, ctx)?;
        self.publish();
        Ok(self.cycle.step)
    }

    fn execution_finished(&self) -> bool {
        self.execution_log.as_ref().is_some_and(|log| !log.cancelled)
    }

    /// Executes the batch for a cohort, discarding progress events.
    pub async fn execute_batch(&mut self, cohort: Cohort) -> EngineResult<ExecutionLogData> {
        let run = self.begin_execution(cohort)?;
        let log = run.run().await;
        self.record_execution(log.clone());
        Ok(log)
    }

    /// Executes the batch for a cohort, streaming progress events to the
    /// given channel.
    ///
    /// # Errors
    ///
    /// - `CycleCompleted` when the cycle is read-only.
    /// - `SubmissionBlocked` while blocking exceptions are still Active.
    pub async fn execute_batch_with_events(
        &mut self,
        cohort: Cohort,
        events: mpsc::Sender<ExecutionEvent>,
    ) -> EngineResult<ExecutionLogData> {
        let run = self.begin_execution(cohort)?;
        let log = run.run_with_events(events).await;
        self.record_execution(log.clone());
        Ok(log)
    }

    /// Prepares an execution run that proceeds without borrowing the service.
    ///
    /// Callers that serialize access to the service (the API layer) release
    /// it for the duration of the run, so [`BatchService::cancel_execution`]
    /// stays reachable while payments are in flight. Hand the finished log
    /// back through [`BatchService::record_execution`].
    ///
    /// # Errors
    ///
    /// - `CycleCompleted` when the cycle is read-only.
    /// - `SubmissionBlocked` while blocking exceptions are still Active.
    pub fn begin_execution(&mut self, cohort: Cohort) -> EngineResult<PreparedExecution<P>> {
        self.guard_mutable()?;
        if !self.resolution.can_submit() {
            return Err(EngineError::SubmissionBlocked {
                blocking_active: self.resolution.active_blocking_count(),
            });
        }

        self.cancel_tx.send_replace(false);
        Ok(PreparedExecution {
            engine: self.engine.clone(),
            cohort,
            workers: self.registry.workers().to_vec(),
            leave: self.registry.leave_records().clone(),
            snoozed: self.resolution.snoozed_workers().clone(),
            cancel: self.cancel_tx.subscribe(),
        })
    }

    /// Records a finished execution run.
    ///
    /// The run replaces any previous execution log. Failed workers are
    /// recorded as execution-failure exceptions so they surface in the
    /// resolution flow.
    pub fn record_execution(&mut self, log: ExecutionLogData) {
        self.resolution.record_execution_failures(&log);
        self.execution_log = Some(log);
        self.publish();
    }

    /// Requests cancellation of the in-flight execution run.
    ///
    /// Workers already being processed run to completion; pending workers
    /// are skipped and the run's log is marked cancelled.
    pub fn cancel_execution(&self) {
        info!("Execution cancellation requested");
        self.cancel_tx.send_replace(true);
    }

    /// Attempts to mark the cycle complete.
    ///
    /// Unresolved blocking exceptions or execution failures produce an
    /// [`CompletionOutcome::Unresolved`] report unless `force` is set with a
    /// justification.
    pub fn mark_complete(
        &mut self,
        force: bool,
        justification: Option<&str>,
    ) -> EngineResult<CompletionOutcome> {
        let blocking = self.resolution.active_blocking_count();
        let (failed_employees, failed_contractors) = match &self.execution_log {
            Some(log) => (
                log.failed_count(EmploymentType::Employee),
                log.failed_count(EmploymentType::Contractor),
            ),
            None => (0, 0),
        };

        let outcome = workflow::mark_complete(
            &self.cycle,
            force,
            justification,
            blocking,
            failed_employees,
            failed_contractors,
        )?;
        if let CompletionOutcome::Completed(completed) = &outcome {
            self.cycle = completed.clone();
            self.publish();
            info!(label = %self.cycle.label, "Batch cycle completed");
        }
        Ok(outcome)
    }

    /// Applies an external cycle status change (e.g. a period opening or
    /// closing upstream).
    pub fn set_cycle_status(&mut self, status: CycleStatus) {
        workflow::apply_cycle_status(&mut self.cycle, status);
        self.publish();
    }
}

/// A detached execution run produced by [`BatchService::begin_execution`].
///
/// Owns everything the engine needs, so the service can be unlocked while
/// the run is in flight. The cancel receiver is wired to the same channel
/// [`BatchService::cancel_execution`] signals on.
pub struct PreparedExecution<P> {
    engine: ExecutionEngine<P>,
    cohort: Cohort,
    workers: Vec<Worker>,
    leave: HashMap<String, LeaveRecord>,
    snoozed: BTreeSet<String>,
    cancel: watch::Receiver<bool>,
}

impl<P: PaymentProvider + 'static> PreparedExecution<P> {
    /// Runs the execution, discarding progress events.
    pub async fn run(self) -> ExecutionLogData {
        let (events_tx, _) = mpsc::channel(1);
        self.run_with_events(events_tx).await
    }

    /// Runs the execution, streaming progress events to the given channel.
    pub async fn run_with_events(self, events: mpsc::Sender<ExecutionEvent>) -> ExecutionLogData {
        self.engine
            .execute(
                self.cohort,
                &self.workers,
                &self.leave,
                &self.snoozed,
                events,
                self.cancel,
            )
            .await
    }
}
