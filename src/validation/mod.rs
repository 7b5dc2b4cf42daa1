//! The exception rule engine.
//!
//! This module contains the validation rules that turn worker records into
//! typed [`PayrollException`]s: minimum wage, allowance and adjustment caps,
//! government IDs and tax field bundles, statutory contributions, mandatory
//! pay components and withholding, status and employment date checks, and
//! hours/deduction checks. Rules inspect one worker each, never
//! short-circuit one another, and are pure: same inputs, same findings.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::config::CountrySettingsLoader;
use crate::error::EngineResult;
use crate::models::{
    ExceptionKind, ExceptionStatus, LeaveRecord, PayPeriod, PayrollException, Worker,
};

mod allowances;
mod contributions;
mod employment_dates;
mod hours_and_deductions;
mod identity_fields;
mod minimum_wage;
mod pay_components;

pub use allowances::{check_adjustment_caps, check_allowance_cap};
pub use contributions::{
    check_contribution_table, check_contribution_tier, check_employer_contribution,
};
pub use employment_dates::{
    check_end_date_passed, check_end_date_window, check_missing_start_date, check_status_mismatch,
};
pub use hours_and_deductions::{check_deductions, check_missing_hours};
pub use identity_fields::{check_government_ids, check_tax_field_bundle};
pub use minimum_wage::check_minimum_wage;
pub use pay_components::{check_mandatory_components, check_withholding};

/// Runs every validation rule over every worker and collects the findings.
///
/// Pure and deterministic apart from finding ids: same inputs produce the
/// same set of (worker, kind, message) findings in the same order. Status
/// preservation across runs is the caller's job via [`merge_findings`].
///
/// # Errors
///
/// Returns `CountryNotConfigured` when a worker's country has no settings.
pub fn validate(
    workers: &[Worker],
    leave_records: &HashMap<String, LeaveRecord>,
    settings: &CountrySettingsLoader,
    period: &PayPeriod,
    today: NaiveDate,
) -> EngineResult<Vec<PayrollException>> {
    let mut findings = Vec::new();

    for worker in workers {
        let country = settings.get(&worker.country)?;
        let leave = leave_records.get(&worker.id);

        findings.extend(check_minimum_wage(worker, country));
        findings.extend(check_allowance_cap(worker, country));
        findings.extend(check_government_ids(worker, country));
        findings.extend(check_contribution_tier(worker, country));
        findings.extend(check_mandatory_components(worker, country));
        findings.extend(check_employer_contribution(worker));
        findings.extend(check_withholding(worker, country));
        findings.extend(check_status_mismatch(worker));
        findings.extend(check_end_date_window(worker, period));
        findings.extend(check_missing_hours(worker));
        findings.extend(check_missing_start_date(worker));
        findings.extend(check_end_date_passed(worker, today));
        findings.extend(check_deductions(worker, leave, country));
        findings.extend(check_tax_field_bundle(worker, country));
        findings.extend(check_adjustment_caps(worker, country));
        findings.extend(check_contribution_table(worker, country));
    }

    Ok(findings)
}

/// Merges a fresh validation run into the existing exception list.
///
/// Operator decisions are never reset: every existing exception is kept
/// with its status. Fresh findings are appended only for (worker, kind)
/// pairs not already represented. Existing Active exceptions whose
/// condition no longer appears in the fresh run are marked Resolved —
/// re-validation confirmed the correction. Execution failures are not
/// re-derivable by rules and are left untouched.
pub fn merge_findings(
    existing: Vec<PayrollException>,
    fresh: Vec<PayrollException>,
) -> Vec<PayrollException> {
    let fresh_keys: HashSet<(&str, ExceptionKind)> = fresh
        .iter()
        .map(|e| (e.worker_id.as_str(), e.kind))
        .collect();
    let existing_keys: HashSet<(String, ExceptionKind)> = existing
        .iter()
        .map(|e| (e.worker_id.clone(), e.kind))
        .collect();

    let mut merged = existing;
    for exception in &mut merged {
        let still_detected = fresh_keys.contains(&(exception.worker_id.as_str(), exception.kind));
        if exception.is_active() && !still_detected && exception.kind != ExceptionKind::ExecutionFailed
        {
            exception.status = ExceptionStatus::Resolved;
        }
    }

    merged.extend(
        fresh
            .into_iter()
            .filter(|e| !existing_keys.contains(&(e.worker_id.clone(), e.kind))),
    );
    merged
}
