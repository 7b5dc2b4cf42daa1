//! Payroll exception model.
//!
//! This module defines the closed taxonomy of validation findings
//! ([`ExceptionKind`]), their single mutually-exclusive lifecycle status
//! ([`ExceptionStatus`]), and the [`PayrollException`] record itself.
//! Severity, blocking behaviour, and in-app fixability are carried by the
//! kind, so every consumer gets exhaustive compile-time handling instead of
//! string matching.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How serious a finding is for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; can usually wait.
    Low,
    /// Should be looked at before submission.
    Medium,
    /// Needs attention; most high findings block submission.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

/// The closed taxonomy of payroll exception kinds.
///
/// Each kind statically determines its severity, whether it blocks batch
/// submission, and whether it can be fixed inside the payroll system or
/// requires an external system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExceptionKind {
    /// Derived daily rate is below the country minimum wage floor.
    BelowMinimumWage,
    /// Non-taxable allowances exceed the country cap.
    AllowanceCapExceeded,
    /// One or more mandatory government IDs are missing.
    MissingGovernmentId,
    /// Recorded contribution does not match the salary bracket.
    ContributionTierMismatch,
    /// A mandatory pay component for the country is missing.
    MissingPayComponent,
    /// Employee-side contribution present but employer side missing.
    MissingEmployerContribution,
    /// Withholding tax configuration is missing for an employee.
    MissingWithholding,
    /// A non-Active worker is included in the batch.
    StatusMismatch,
    /// Worker's end date falls inside the current period.
    EmploymentEndingThisPeriod,
    /// Worker's end date is before the period start.
    EndDateBeforePeriod,
    /// Worker's end date falls within 30 days after the period end.
    UpcomingEmploymentEnd,
    /// Hourly worker has no hours reported.
    MissingHours,
    /// Worker has no recorded start date.
    MissingStartDate,
    /// End date has passed but the worker is still Active.
    EndDatePassed,
    /// Total deductions exceed gross pay.
    DeductionsExceedGross,
    /// The mandatory tax/contribution field bundle is incomplete.
    MissingTaxFields,
    /// An adjustment line item exceeds its configured cap.
    AdjustmentCapExceeded,
    /// Contribution table appears unconfigured for the current year.
    ContributionTableUnconfigured,
    /// A payment execution run failed for this worker.
    ExecutionFailed,
}

impl ExceptionKind {
    /// Returns the fixed severity of this kind.
    pub fn severity(&self) -> Severity {
        use ExceptionKind::*;
        match self {
            BelowMinimumWage | MissingGovernmentId | MissingPayComponent
            | MissingEmployerContribution | StatusMismatch | EndDateBeforePeriod
            | MissingHours | MissingStartDate | EndDatePassed | DeductionsExceedGross
            | MissingTaxFields | ExecutionFailed => Severity::High,
            AllowanceCapExceeded | ContributionTierMismatch | MissingWithholding
            | EmploymentEndingThisPeriod | AdjustmentCapExceeded
            | ContributionTableUnconfigured => Severity::Medium,
            UpcomingEmploymentEnd => Severity::Low,
        }
    }

    /// Returns true if this kind prevents submission unless overridden.
    pub fn is_blocking(&self) -> bool {
        use ExceptionKind::*;
        matches!(
            self,
            BelowMinimumWage
                | MissingGovernmentId
                | MissingPayComponent
                | MissingEmployerContribution
                | MissingHours
                | MissingStartDate
                | DeductionsExceedGross
                | MissingTaxFields
                | ExecutionFailed
        )
    }

    /// Returns true if the finding can be fixed inside the payroll system.
    ///
    /// Findings that require an external system (HRIS records, government
    /// portals, the payment provider) return false.
    pub fn can_fix_in_payroll(&self) -> bool {
        use ExceptionKind::*;
        !matches!(
            self,
            MissingGovernmentId
                | UpcomingEmploymentEnd
                | MissingStartDate
                | ContributionTableUnconfigured
                | ExecutionFailed
        )
    }

    /// Returns a short human-readable label for this kind.
    pub fn label(&self) -> &'static str {
        use ExceptionKind::*;
        match self {
            BelowMinimumWage => "Below minimum wage",
            AllowanceCapExceeded => "Allowance cap exceeded",
            MissingGovernmentId => "Missing government ID",
            ContributionTierMismatch => "Contribution tier mismatch",
            MissingPayComponent => "Missing mandatory pay component",
            MissingEmployerContribution => "Missing employer contribution",
            MissingWithholding => "Missing withholding configuration",
            StatusMismatch => "Worker status mismatch",
            EmploymentEndingThisPeriod => "Employment ending this period",
            EndDateBeforePeriod => "End date before period",
            UpcomingEmploymentEnd => "Upcoming employment end",
            MissingHours => "Missing hours",
            MissingStartDate => "Missing start date",
            EndDatePassed => "End date passed",
            DeductionsExceedGross => "Deductions exceed gross pay",
            MissingTaxFields => "Missing tax fields",
            AdjustmentCapExceeded => "Adjustment exceeds cap",
            ContributionTableUnconfigured => "Contribution table unconfigured",
            ExecutionFailed => "Payment execution failed",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single, mutually exclusive lifecycle status of an exception.
///
/// An exception can never be simultaneously Ignored and Overridden; the
/// transition rules in the resolution manager enforce that every change
/// starts from [`ExceptionStatus::Active`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExceptionStatus {
    /// Newly detected and awaiting operator action.
    Active,
    /// Confirmed fixed, manually or by re-validation.
    Resolved,
    /// Excluded from the current cycle along with its worker; reversible.
    Snoozed,
    /// Acknowledged and dismissed; only allowed for non-blocking findings.
    Ignored,
    /// Bypassed with recorded justification; counts as resolved for guards.
    Overridden {
        /// The operator's justification for the override.
        justification: String,
        /// Who performed the override.
        actor: String,
        /// When the override was recorded.
        timestamp: DateTime<Utc>,
    },
}

/// A validation finding attached to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollException {
    /// Unique identifier for this exception.
    pub id: Uuid,
    /// The worker the finding applies to.
    pub worker_id: String,
    /// The kind of finding.
    pub kind: ExceptionKind,
    /// Human-readable detail for the operator.
    pub message: String,
    /// Current lifecycle status.
    pub status: ExceptionStatus,
}

impl PayrollException {
    /// Creates a new Active exception for a worker.
    pub fn new(worker_id: impl Into<String>, kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id: worker_id.into(),
            kind,
            message: message.into(),
            status: ExceptionStatus::Active,
        }
    }

    /// Returns the severity carried by this exception's kind.
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Returns true if this exception blocks submission while Active.
    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }

    /// Returns true if the finding can be fixed inside the payroll system.
    pub fn can_fix_in_payroll(&self) -> bool {
        self.kind.can_fix_in_payroll()
    }

    /// Returns true if the exception is still awaiting operator action.
    pub fn is_active(&self) -> bool {
        self.status == ExceptionStatus::Active
    }

    /// Returns true if the exception counts as resolved for guard purposes.
    ///
    /// Overridden exceptions count as resolved: the operator has explicitly
    /// accepted responsibility for the finding.
    pub fn counts_as_resolved(&self) -> bool {
        matches!(
            self.status,
            ExceptionStatus::Resolved | ExceptionStatus::Overridden { .. }
        )
    }
}
