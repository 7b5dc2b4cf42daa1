//! Statutory contribution validation rules.
//!
//! Three rules share the country contribution table: the tier mismatch
//! check, the missing employer-side check, and the unconfigured-table
//! inference. Bracket lookups apply to monthly-salaried workers only.

use rust_decimal::Decimal;

use crate::config::CountrySettings;
use crate::models::{Compensation, ExceptionKind, PayrollException, Worker};

fn monthly_salary(worker: &Worker) -> Option<Decimal> {
    match worker.compensation {
        Compensation::Monthly { base_salary } => Some(base_salary),
        Compensation::Hourly { .. } => None,
    }
}

/// Checks the recorded employee contribution against the salary bracket.
///
/// Only fires when a contribution is recorded and non-zero; absent or zero
/// contributions are the unconfigured-table rule's territory.
pub fn check_contribution_tier(
    worker: &Worker,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let salary = monthly_salary(worker)?;
    let bracket = settings.bracket_for(salary)?;
    let recorded = worker.employee_contribution.filter(|c| !c.is_zero())?;

    if recorded == bracket.employee_amount {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::ContributionTierMismatch,
        format!(
            "Recorded contribution {recorded} does not match the bracket amount {} for salary {salary}",
            bracket.employee_amount
        ),
    ))
}

/// Checks for a missing employer-side contribution when the employee side
/// is present.
pub fn check_employer_contribution(worker: &Worker) -> Option<PayrollException> {
    let employee_side = worker.employee_contribution.filter(|c| !c.is_zero())?;
    if worker.employer_contribution.filter(|c| !c.is_zero()).is_some() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingEmployerContribution,
        format!(
            "Employee contribution {employee_side} is recorded but the employer side is missing"
        ),
    ))
}

/// Infers a possibly-unconfigured contribution table for the current year.
///
/// When the bracket expects a contribution but the worker's recorded value
/// is zero or missing, the country table likely has not been rolled over.
pub fn check_contribution_table(
    worker: &Worker,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let salary = monthly_salary(worker)?;
    let bracket = settings.bracket_for(salary)?;
    if bracket.employee_amount.is_zero() {
        return None;
    }
    if worker.employee_contribution.filter(|c| !c.is_zero()).is_some() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::ContributionTableUnconfigured,
        format!(
            "No contribution recorded for salary {salary}; the {} table may not be configured for the current year",
            settings.country
        ),
    ))
}
