//! Leave proration and pay calculation.
//!
//! This module provides the pure functions computing adjusted pay from leave
//! and hours. The days-per-month divisor always comes from country settings,
//! never a hardcoded constant.

use rust_decimal::Decimal;

use crate::config::CountrySettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{Compensation, LeaveRecord, Worker};

/// The result of prorating a monthly salary for leave taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proration {
    /// Base salary divided by the country divisor.
    pub daily_rate: Decimal,
    /// Days actually paid: divisor minus leave days, floored at zero.
    pub pay_days: Decimal,
    /// Daily rate multiplied by pay days.
    pub prorated_pay: Decimal,
    /// Base salary minus prorated pay.
    pub difference: Decimal,
}

/// Prorates a monthly salary for leave days taken.
///
/// With no leave the prorated pay is the base salary exactly, avoiding the
/// rounding drift of a divide-then-multiply round trip. Leave days beyond
/// the divisor floor the pay days at zero.
///
/// # Errors
///
/// Returns `CalculationError` when `days_per_month` is zero or negative, or
/// when `leave_days` is negative.
///
/// # Examples
///
/// ```
/// use payrun_engine::calculation::prorate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = prorate(
///     Decimal::from_str("1000").unwrap(),
///     Decimal::from_str("2").unwrap(),
///     Decimal::from_str("22").unwrap(),
/// )
/// .unwrap();
/// assert_eq!(result.prorated_pay.round_dp(2), Decimal::from_str("909.09").unwrap());
/// ```
pub fn prorate(
    base_salary: Decimal,
    leave_days: Decimal,
    days_per_month: Decimal,
) -> EngineResult<Proration> {
    if days_per_month <= Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!("days_per_month must be positive, got {days_per_month}"),
        });
    }
    if leave_days < Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!("leave_days cannot be negative, got {leave_days}"),
        });
    }

    let daily_rate = base_salary / days_per_month;
    let pay_days = (days_per_month - leave_days).max(Decimal::ZERO);

    // Exact salary when no leave was taken; avoids divide/multiply drift.
    let prorated_pay = if leave_days.is_zero() {
        base_salary
    } else {
        daily_rate * pay_days
    };

    Ok(Proration {
        daily_rate,
        pay_days,
        prorated_pay,
        difference: base_salary - prorated_pay,
    })
}

/// Computes a worker's base pay before adjustments and deductions.
///
/// Monthly compensation is prorated for leave; hourly compensation is
/// rate times hours and leave proration does not apply.
///
/// # Errors
///
/// Returns `CalculationError` for hourly workers with no reported hours and
/// propagates proration errors for monthly workers.
pub fn base_pay(
    worker: &Worker,
    leave: Option<&LeaveRecord>,
    settings: &CountrySettings,
) -> EngineResult<Decimal> {
    match &worker.compensation {
        Compensation::Monthly { base_salary } => {
            let leave_days = leave.map(|l| l.leave_days).unwrap_or(Decimal::ZERO);
            Ok(prorate(*base_salary, leave_days, settings.days_per_month)?.prorated_pay)
        }
        Compensation::Hourly { rate, hours } => {
            let hours = hours.ok_or_else(|| EngineError::CalculationError {
                message: format!("worker {} has no reported hours", worker.id),
            })?;
            Ok(*rate * hours)
        }
    }
}

/// Computes gross pay: prorated-or-hourly base plus all adjustment line items.
pub fn gross_pay(
    worker: &Worker,
    leave: Option<&LeaveRecord>,
    settings: &CountrySettings,
) -> EngineResult<Decimal> {
    let adjustments: Decimal = worker.adjustments.iter().map(|a| a.amount).sum();
    Ok(base_pay(worker, leave, settings)? + adjustments)
}

/// Computes net pay: gross pay minus all deduction line items.
pub fn net_pay(
    worker: &Worker,
    leave: Option<&LeaveRecord>,
    settings: &CountrySettings,
) -> EngineResult<Decimal> {
    Ok(gross_pay(worker, leave, settings)? - worker.total_deductions())
}
