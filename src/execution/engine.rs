//! Concurrent batch execution.
//!
//! The engine fans a cohort of workers out over a bounded pool of tasks,
//! posts one payment per worker through the [`PaymentProvider`], and folds
//! the outcomes into an [`ExecutionLogData`]. Progress is streamed over an
//! mpsc channel; a watch channel carries the cancellation flag. Workers
//! already being processed when cancellation lands run to completion, so
//! every entry in the log is terminal.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation;
use crate::config::CountrySettingsLoader;
use crate::models::{
    Cohort, EmploymentType, ExecutionLogData, ExecutionLogEntry, ExecutionOutcome, LeaveRecord,
    Worker,
};

use super::provider::PaymentProvider;

/// Default number of workers processed at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default per-worker timeout for a single payment.
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(30);

/// Live status of one worker during an execution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerExecutionStatus {
    /// Targeted but not yet picked up.
    Pending,
    /// Payment in flight.
    Processing,
    /// Payment posted.
    Complete,
    /// Payment failed or timed out.
    Failed,
}

/// A progress event emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// The worker the event is about.
    pub worker_id: String,
    /// The worker's new status.
    pub status: WorkerExecutionStatus,
}

/// Runs execution batches against a payment provider.
#[derive(Debug)]
pub struct ExecutionEngine<P> {
    provider: Arc<P>,
    settings: Arc<CountrySettingsLoader>,
    concurrency: usize,
    worker_timeout: Duration,
}

// Manual impl: cloning copies the Arc handles, so P need not be Clone.
impl<P> Clone for ExecutionEngine<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            settings: Arc::clone(&self.settings),
            concurrency: self.concurrency,
            worker_timeout: self.worker_timeout,
        }
    }
}

impl<P: PaymentProvider + 'static> ExecutionEngine<P> {
    /// Creates an engine with the default concurrency and timeout.
    pub fn new(provider: Arc<P>, settings: Arc<CountrySettingsLoader>) -> Self {
        Self {
            provider,
            settings,
            concurrency: DEFAULT_CONCURRENCY,
            worker_timeout: DEFAULT_WORKER_TIMEOUT,
        }
    }

    /// Overrides the number of concurrently processed workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Overrides the per-worker payment timeout.
    pub fn with_worker_timeout(mut self, timeout: Duration) -> Self {
        self.worker_timeout = timeout;
        self
    }

    /// Executes the batch for the given cohort.
    ///
    /// Snoozed workers are excluded from the run. Each targeted worker gets
    /// a Pending event up front, then Processing when picked up and a
    /// terminal Complete or Failed event. The returned log holds one entry
    /// per worker that reached a terminal state; `cancelled` is set when
    /// cancellation skipped any target.
    pub async fn execute(
        &self,
        cohort: Cohort,
        workers: &[Worker],
        leave: &HashMap<String, LeaveRecord>,
        snoozed: &BTreeSet<String>,
        events: mpsc::Sender<ExecutionEvent>,
        cancel: watch::Receiver<bool>,
    ) -> ExecutionLogData {
        let run_id = Uuid::new_v4();
        let timestamp = Utc::now();

        let targets: Vec<Worker> = workers
            .iter()
            .filter(|w| cohort.includes(w.employment_type))
            .filter(|w| !snoozed.contains(&w.id))
            .cloned()
            .collect();
        let target_count = targets.len();
        info!(%run_id, ?cohort, targets = target_count, "Starting execution run");

        for worker in &targets {
            let _ = events
                .send(ExecutionEvent {
                    worker_id: worker.id.clone(),
                    status: WorkerExecutionStatus::Pending,
                })
                .await;
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for (index, worker) in targets.into_iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let settings = Arc::clone(&self.settings);
            let semaphore = Arc::clone(&semaphore);
            let events = events.clone();
            let cancel = cancel.clone();
            let leave = leave.get(&worker.id).cloned();
            let worker_timeout = self.worker_timeout;

            tasks.spawn(async move {
                if *cancel.borrow() {
                    return None;
                }
                let Ok(_permit) = semaphore.acquire().await else {
                    return None;
                };
                if *cancel.borrow() {
                    return None;
                }

                let _ = events
                    .send(ExecutionEvent {
                        worker_id: worker.id.clone(),
                        status: WorkerExecutionStatus::Processing,
                    })
                    .await;

                let entry =
                    process_worker(&*provider, &settings, &worker, leave.as_ref(), worker_timeout)
                        .await;
                let status = match entry.outcome {
                    ExecutionOutcome::Success => WorkerExecutionStatus::Complete,
                    ExecutionOutcome::Failed => WorkerExecutionStatus::Failed,
                };
                let _ = events
                    .send(ExecutionEvent {
                        worker_id: worker.id.clone(),
                        status,
                    })
                    .await;
                Some((index, entry))
            });
        }

        let mut indexed: Vec<(usize, ExecutionLogEntry)> = Vec::with_capacity(target_count);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(pair)) => indexed.push(pair),
                Ok(None) => {}
                Err(e) => warn!(%run_id, error = %e, "Execution task panicked"),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        let entries: Vec<ExecutionLogEntry> = indexed.into_iter().map(|(_, e)| e).collect();

        let cancelled = entries.len() != target_count;
        let employee_count = entries
            .iter()
            .filter(|e| e.employment_type == EmploymentType::Employee)
            .count() as u32;
        let contractor_count = entries
            .iter()
            .filter(|e| e.employment_type == EmploymentType::Contractor)
            .count() as u32;

        let failed = entries
            .iter()
            .filter(|e| e.outcome == ExecutionOutcome::Failed)
            .count();
        info!(
            %run_id,
            processed = entries.len(),
            failed,
            cancelled,
            "Execution run finished"
        );

        ExecutionLogData {
            run_id,
            timestamp,
            cohort,
            employee_count,
            contractor_count,
            entries,
            cancelled,
        }
    }
}

/// Computes net pay and posts the payment for one worker, returning a
/// terminal log entry either way.
async fn process_worker<P: PaymentProvider>(
    provider: &P,
    settings: &CountrySettingsLoader,
    worker: &Worker,
    leave: Option<&LeaveRecord>,
    worker_timeout: Duration,
) -> ExecutionLogEntry {
    let net = match settings
        .get(&worker.country)
        .and_then(|country| calculation::net_pay(worker, leave, country))
    {
        Ok(net) => net,
        Err(e) => return ExecutionLogEntry::failed(worker, e.to_string()),
    };

    match tokio::time::timeout(worker_timeout, provider.post_payment(worker, net)).await {
        Ok(Ok(())) => ExecutionLogEntry::success(worker),
        Ok(Err(e)) => ExecutionLogEntry::failed(worker, e.to_string()),
        Err(_) => ExecutionLogEntry::failed(worker, "Payment timed out"),
    }
}
