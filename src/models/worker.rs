//! Worker model and related types.
//!
//! This module defines the Worker struct and its supporting enums for
//! representing the pay records a batch operates on, plus the LeaveRecord
//! referenced by the proration calculator.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the type of engagement a worker has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Employed directly, subject to statutory contributions and withholding.
    Employee,
    /// Engaged under a contract for services.
    Contractor,
}

/// Lifecycle status of a worker within the payroll system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Actively engaged and expected in the batch.
    Active,
    /// Employment has been terminated.
    Terminated,
    /// A contractor whose contract has ended.
    ContractEnded,
    /// Temporarily excluded from payroll processing.
    OnHold,
}

/// How a worker is compensated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Compensation {
    /// A fixed monthly salary, subject to leave proration.
    Monthly {
        /// The monthly base salary.
        base_salary: Decimal,
    },
    /// An hourly rate multiplied by hours worked; leave proration does not apply.
    Hourly {
        /// The hourly rate.
        rate: Decimal,
        /// Hours worked in the period, if reported.
        hours: Option<Decimal>,
    },
}

/// A single adjustment line item added on top of base pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// Label identifying the adjustment (e.g. "meal_allowance").
    pub label: String,
    /// The adjustment amount.
    pub amount: Decimal,
    /// Whether the adjustment is taxable.
    pub taxable: bool,
}

/// A single deduction line item subtracted from gross pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// Label identifying the deduction (e.g. "salary_loan").
    pub label: String,
    /// The deduction amount.
    pub amount: Decimal,
}

/// Represents a worker's pay record within a batch.
///
/// Workers are owned by the batch: admin edits mutate them, but they are
/// never deleted mid-cycle, only excluded via snoozing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier for the worker.
    pub id: String,
    /// The worker's display name.
    pub name: String,
    /// ISO country code the worker is paid in.
    pub country: String,
    /// Currency the worker is paid in.
    pub currency: String,
    /// The type of engagement.
    pub employment_type: EmploymentType,
    /// Lifecycle status within the payroll system.
    pub status: WorkerStatus,
    /// How the worker is compensated.
    pub compensation: Compensation,
    /// The date the engagement started, if recorded.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// The date the engagement ends, if any.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Government-issued identifiers keyed by id type (e.g. "tin").
    #[serde(default)]
    pub government_ids: BTreeMap<String, String>,
    /// Employee-side statutory contribution amount, if configured.
    #[serde(default)]
    pub employee_contribution: Option<Decimal>,
    /// Employer-side statutory contribution amount, if configured.
    #[serde(default)]
    pub employer_contribution: Option<Decimal>,
    /// Withholding tax rate, if configured.
    #[serde(default)]
    pub withholding_rate: Option<Decimal>,
    /// Pay components granted to this worker (e.g. "thirteenth_month").
    #[serde(default)]
    pub pay_components: BTreeSet<String>,
    /// Adjustment line items added on top of base pay.
    #[serde(default)]
    pub adjustments: Vec<AdjustmentLine>,
    /// Deduction line items subtracted from gross pay.
    #[serde(default)]
    pub deductions: Vec<DeductionLine>,
}

impl Worker {
    /// Returns true if the worker is a contractor.
    pub fn is_contractor(&self) -> bool {
        self.employment_type == EmploymentType::Contractor
    }

    /// Returns true if the worker is compensated hourly.
    pub fn is_hourly(&self) -> bool {
        matches!(self.compensation, Compensation::Hourly { .. })
    }

    /// Returns the sum of all deduction line items.
    pub fn total_deductions(&self) -> Decimal {
        self.deductions.iter().map(|d| d.amount).sum()
    }

    /// Returns the sum of all non-taxable adjustment line items.
    pub fn non_taxable_adjustments(&self) -> Decimal {
        self.adjustments
            .iter()
            .filter(|a| !a.taxable)
            .map(|a| a.amount)
            .sum()
    }
}

/// Leave taken by a worker within the current period.
///
/// Created on first leave entry and updated by admin edits; the proration
/// calculator references but does not own these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// The worker this record belongs to.
    pub worker_id: String,
    /// Total leave days taken in the period.
    pub leave_days: Decimal,
    /// The working-days basis the leave was reported against.
    pub working_days_basis: Decimal,
    /// Whether the leave has been approved.
    pub approved: bool,
    /// Whether the leave has been reported to payroll.
    pub reported: bool,
    /// Optional breakdown of leave days by leave type.
    #[serde(default)]
    pub breakdown: BTreeMap<String, Decimal>,
}
