//! Batch cycle and workflow step models.
//!
//! A [`BatchCycle`] is one payroll period's full lifecycle. The workflow
//! transition rules themselves live in the `workflow` module; this module
//! only defines the data.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One payroll period, inclusive of both dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Returns true if the given date falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Lifecycle status of a batch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Not yet opened for processing.
    Upcoming,
    /// Open for processing.
    Active,
    /// Locked and read-only; terminal.
    Completed,
}

/// The four steps of the batch workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Review detected exceptions and batch composition.
    Review,
    /// Act on exceptions until the submission guard clears.
    Resolve,
    /// Submit the batch for execution.
    Submit,
    /// Track execution outcomes.
    Track,
}

impl WorkflowStep {
    /// Returns the position of the step in the linear flow, starting at 0.
    pub fn index(&self) -> usize {
        match self {
            WorkflowStep::Review => 0,
            WorkflowStep::Resolve => 1,
            WorkflowStep::Submit => 2,
            WorkflowStep::Track => 3,
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStep::Review => "review",
            WorkflowStep::Resolve => "resolve",
            WorkflowStep::Submit => "submit",
            WorkflowStep::Track => "track",
        };
        f.write_str(s)
    }
}

/// One payroll period's full lifecycle: upcoming → active → completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCycle {
    /// Human-readable period label (e.g. "February 2026").
    pub label: String,
    /// The pay period the cycle covers.
    pub period: PayPeriod,
    /// Lifecycle status; Completed is terminal.
    pub status: CycleStatus,
    /// The current workflow step.
    pub step: WorkflowStep,
    /// Justification recorded when the cycle was force-completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_note: Option<String>,
}

impl BatchCycle {
    /// Creates a new active cycle at the Review step.
    pub fn new(label: impl Into<String>, period: PayPeriod) -> Self {
        Self {
            label: label.into(),
            period,
            status: CycleStatus::Active,
            step: WorkflowStep::Review,
            completion_note: None,
        }
    }

    /// Returns true if the cycle is completed and therefore read-only.
    pub fn is_completed(&self) -> bool {
        self.status == CycleStatus::Completed
    }
}
