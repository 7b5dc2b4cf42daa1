//! Core data models for the payroll batch engine.
//!
//! This module contains all the domain models used throughout the engine.

mod batch_cycle;
mod exception;
mod execution_log;
mod worker;

pub use batch_cycle::{BatchCycle, CycleStatus, PayPeriod, WorkflowStep};
pub use exception::{ExceptionKind, ExceptionStatus, PayrollException, Severity};
pub use execution_log::{Cohort, ExecutionLogData, ExecutionLogEntry, ExecutionOutcome};
pub use worker::{
    AdjustmentLine, Compensation, DeductionLine, EmploymentType, LeaveRecord, Worker, WorkerStatus,
};
