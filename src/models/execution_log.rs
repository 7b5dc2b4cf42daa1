//! Execution log models.
//!
//! This module contains the immutable record of an execution run: one
//! [`ExecutionLogEntry`] per processed worker, aggregated into
//! [`ExecutionLogData`]. Only the latest run's log is retained by the batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::worker::{EmploymentType, Worker};

/// The subset of workers targeted by an execution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    /// Every worker in the batch.
    All,
    /// Employees only.
    Employees,
    /// Contractors only.
    Contractors,
}

impl Cohort {
    /// Returns true if a worker of the given employment type is in this cohort.
    pub fn includes(&self, employment_type: EmploymentType) -> bool {
        match self {
            Cohort::All => true,
            Cohort::Employees => employment_type == EmploymentType::Employee,
            Cohort::Contractors => employment_type == EmploymentType::Contractor,
        }
    }
}

/// Terminal outcome of a single worker's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Payment posted successfully.
    Success,
    /// Payment failed; the entry carries an error message.
    Failed,
}

/// The outcome of one worker's execution, immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    /// The worker the entry is for.
    pub worker_id: String,
    /// The worker's display name at execution time.
    pub name: String,
    /// The worker's employment type at execution time.
    pub employment_type: EmploymentType,
    /// The country the worker was paid in.
    pub country: String,
    /// The terminal outcome.
    pub outcome: ExecutionOutcome,
    /// Error detail when the outcome is Failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionLogEntry {
    /// Creates a successful entry for a worker.
    pub fn success(worker: &Worker) -> Self {
        Self {
            worker_id: worker.id.clone(),
            name: worker.name.clone(),
            employment_type: worker.employment_type,
            country: worker.country.clone(),
            outcome: ExecutionOutcome::Success,
            error: None,
        }
    }

    /// Creates a failed entry for a worker with an error message.
    pub fn failed(worker: &Worker, error: impl Into<String>) -> Self {
        Self {
            worker_id: worker.id.clone(),
            name: worker.name.clone(),
            employment_type: worker.employment_type,
            country: worker.country.clone(),
            outcome: ExecutionOutcome::Failed,
            error: Some(error.into()),
        }
    }
}

/// The aggregate record of one execution run.
///
/// A new run replaces the previous run's log; only the latest is retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLogData {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run started.
    pub timestamp: DateTime<Utc>,
    /// The cohort filter used for the run.
    pub cohort: Cohort,
    /// Number of employees in the entries.
    pub employee_count: u32,
    /// Number of contractors in the entries.
    pub contractor_count: u32,
    /// Ordered per-worker entries, one per processed worker.
    pub entries: Vec<ExecutionLogEntry>,
    /// True when the run was cancelled before processing every target.
    pub cancelled: bool,
}

impl ExecutionLogData {
    /// Returns the entries whose outcome is Failed.
    pub fn failed_entries(&self) -> impl Iterator<Item = &ExecutionLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.outcome == ExecutionOutcome::Failed)
    }

    /// Returns true if every processed worker succeeded and none were skipped.
    pub fn is_fully_successful(&self) -> bool {
        !self.cancelled && self.failed_entries().count() == 0
    }

    /// Returns the number of failed entries for the given employment type.
    pub fn failed_count(&self, employment_type: EmploymentType) -> usize {
        self.failed_entries()
            .filter(|e| e.employment_type == employment_type)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Compensation, WorkerStatus};
    use rust_decimal::Decimal;

    fn worker(id: &str, employment_type: EmploymentType) -> Worker {
        Worker {
            id: id.to_string(),
            name: format!("Worker {id}"),
            country: "PH".to_string(),
            currency: "PHP".to_string(),
            employment_type,
            status: WorkerStatus::Active,
            compensation: Compensation::Monthly {
                base_salary: Decimal::new(45_000, 0),
            },
            start_date: None,
            end_date: None,
            government_ids: Default::default(),
            employee_contribution: None,
            employer_contribution: None,
            withholding_rate: None,
            pay_components: Default::default(),
            adjustments: vec![],
            deductions: vec![],
        }
    }

    #[test]
    fn test_cohort_includes() {
        assert!(Cohort::All.includes(EmploymentType::Employee));
        assert!(Cohort::All.includes(EmploymentType::Contractor));
        assert!(Cohort::Employees.includes(EmploymentType::Employee));
        assert!(!Cohort::Employees.includes(EmploymentType::Contractor));
        assert!(Cohort::Contractors.includes(EmploymentType::Contractor));
        assert!(!Cohort::Contractors.includes(EmploymentType::Employee));
    }

    #[test]
    fn test_success_entry_has_no_error() {
        let entry = ExecutionLogEntry::success(&worker("wkr_001", EmploymentType::Employee));
        assert_eq!(entry.outcome, ExecutionOutcome::Success);
        assert!(entry.error.is_none());

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_failed_entry_carries_message() {
        let entry = ExecutionLogEntry::failed(
            &worker("wkr_002", EmploymentType::Contractor),
            "provider rejected payment",
        );
        assert_eq!(entry.outcome, ExecutionOutcome::Failed);
        assert_eq!(entry.error.as_deref(), Some("provider rejected payment"));
    }

    #[test]
    fn test_failed_count_splits_by_employment_type() {
        let log = ExecutionLogData {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            cohort: Cohort::All,
            employee_count: 2,
            contractor_count: 1,
            entries: vec![
                ExecutionLogEntry::success(&worker("wkr_001", EmploymentType::Employee)),
                ExecutionLogEntry::failed(
                    &worker("wkr_002", EmploymentType::Employee),
                    "timeout",
                ),
                ExecutionLogEntry::failed(
                    &worker("wkr_003", EmploymentType::Contractor),
                    "rejected",
                ),
            ],
            cancelled: false,
        };

        assert_eq!(log.failed_count(EmploymentType::Employee), 1);
        assert_eq!(log.failed_count(EmploymentType::Contractor), 1);
        assert!(!log.is_fully_successful());
    }

    #[test]
    fn test_cancelled_run_is_not_fully_successful() {
        let log = ExecutionLogData {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            cohort: Cohort::Employees,
            employee_count: 1,
            contractor_count: 0,
            entries: vec![ExecutionLogEntry::success(&worker(
                "wkr_001",
                EmploymentType::Employee,
            ))],
            cancelled: true,
        };
        assert!(!log.is_fully_successful());
    }
}
