//! Hours reporting and deduction validation rules.

use rust_decimal::Decimal;

use crate::calculation;
use crate::config::CountrySettings;
use crate::models::{Compensation, ExceptionKind, LeaveRecord, PayrollException, Worker};

/// Flags hourly workers with no (or zero) reported hours.
pub fn check_missing_hours(worker: &Worker) -> Option<PayrollException> {
    let Compensation::Hourly { hours, .. } = &worker.compensation else {
        return None;
    };
    if hours.is_some_and(|h| h > Decimal::ZERO) {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingHours,
        "Hourly worker has no hours reported for the period",
    ))
}

/// Flags workers whose total deductions exceed their gross pay.
///
/// Gross pay is computed through the proration calculator. Workers whose
/// gross cannot be computed (e.g. hourly with no hours) are skipped here;
/// the missing-hours rule covers them.
pub fn check_deductions(
    worker: &Worker,
    leave: Option<&LeaveRecord>,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let gross = calculation::gross_pay(worker, leave, settings).ok()?;
    let deductions = worker.total_deductions();
    if deductions <= gross {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::DeductionsExceedGross,
        format!("Total deductions {deductions} exceed gross pay {gross}"),
    ))
}
