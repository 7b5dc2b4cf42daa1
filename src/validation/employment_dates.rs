//! Worker status and employment date validation rules.
//!
//! The three end-date window outcomes are mutually exclusive: at most one of
//! ending-this-period, end-date-before-period, or upcoming-end fires per
//! worker.

use chrono::{Days, NaiveDate};

use crate::models::{ExceptionKind, PayPeriod, PayrollException, Worker, WorkerStatus};

/// Days after the period end within which an end date counts as upcoming.
const UPCOMING_END_WINDOW_DAYS: u64 = 30;

/// Flags non-Active workers included in the batch.
///
/// Informational: high severity but non-blocking, so an operator can still
/// submit a batch that knowingly includes a terminated worker's final pay.
pub fn check_status_mismatch(worker: &Worker) -> Option<PayrollException> {
    if worker.status == WorkerStatus::Active {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::StatusMismatch,
        format!("Worker status is {:?} but the worker is included in the batch", worker.status),
    ))
}

/// Classifies the worker's end date against the pay period.
///
/// Exactly one of three outcomes fires when an end date is set:
/// inside the period, before the period start, or within 30 days after the
/// period end. End dates further out produce nothing.
pub fn check_end_date_window(worker: &Worker, period: &PayPeriod) -> Option<PayrollException> {
    let end_date = worker.end_date?;

    if end_date < period.start_date {
        return Some(PayrollException::new(
            &worker.id,
            ExceptionKind::EndDateBeforePeriod,
            format!("End date {end_date} is before the period start {}", period.start_date),
        ));
    }

    if period.contains(end_date) {
        return Some(PayrollException::new(
            &worker.id,
            ExceptionKind::EmploymentEndingThisPeriod,
            format!("Employment ends {end_date}, inside the current period"),
        ));
    }

    let upcoming_cutoff = period
        .end_date
        .checked_add_days(Days::new(UPCOMING_END_WINDOW_DAYS))?;
    if end_date <= upcoming_cutoff {
        return Some(PayrollException::new(
            &worker.id,
            ExceptionKind::UpcomingEmploymentEnd,
            format!("Employment ends {end_date}, within 30 days of the period end"),
        ));
    }

    None
}

/// Flags workers whose end date has passed while their status is still Active.
pub fn check_end_date_passed(worker: &Worker, today: NaiveDate) -> Option<PayrollException> {
    let end_date = worker.end_date?;
    if worker.status != WorkerStatus::Active || end_date >= today {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::EndDatePassed,
        format!("End date {end_date} has passed but the worker is still Active"),
    ))
}

/// Flags workers with no recorded start date.
pub fn check_missing_start_date(worker: &Worker) -> Option<PayrollException> {
    if worker.start_date.is_some() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingStartDate,
        "Worker has no recorded start date",
    ))
}
