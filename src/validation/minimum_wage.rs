//! Minimum wage validation rule.
//!
//! Flags monthly-salaried workers whose derived daily rate falls below the
//! country's statutory floor.

use rust_decimal::Decimal;

use crate::config::CountrySettings;
use crate::models::{Compensation, ExceptionKind, PayrollException, Worker};

/// Checks a worker's derived daily rate against the country minimum wage.
///
/// The daily rate is the monthly base salary divided by the country's
/// days-per-month divisor. Hourly workers are not covered by this rule.
pub fn check_minimum_wage(worker: &Worker, settings: &CountrySettings) -> Option<PayrollException> {
    let Compensation::Monthly { base_salary } = worker.compensation else {
        return None;
    };
    if settings.days_per_month <= Decimal::ZERO {
        return None;
    }

    let daily_rate = base_salary / settings.days_per_month;
    if daily_rate >= settings.minimum_daily_wage {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::BelowMinimumWage,
        format!(
            "Daily rate {} is below the {} minimum wage of {}",
            daily_rate.round_dp(2),
            settings.country,
            settings.minimum_daily_wage
        ),
    ))
}
