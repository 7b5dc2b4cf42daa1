//! Mandatory pay component and withholding validation rules.

use crate::config::CountrySettings;
use crate::models::{EmploymentType, ExceptionKind, PayrollException, Worker};

/// Checks that the worker carries every pay component the country mandates
/// for their employment type (e.g. 13th-month pay).
pub fn check_mandatory_components(
    worker: &Worker,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let missing: Vec<&str> = settings
        .mandatory_pay_components
        .iter()
        .filter(|mandatory| mandatory.applies_to.covers(worker.employment_type))
        .filter(|mandatory| !worker.pay_components.contains(&mandatory.component))
        .map(|mandatory| mandatory.component.as_str())
        .collect();

    if missing.is_empty() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingPayComponent,
        format!(
            "Missing mandatory {} pay component(s): {}",
            settings.country,
            missing.join(", ")
        ),
    ))
}

/// Checks that employees have a withholding tax configuration where the
/// country requires one. Contractors are out of scope for withholding.
pub fn check_withholding(worker: &Worker, settings: &CountrySettings) -> Option<PayrollException> {
    if !settings.withholding_required
        || worker.employment_type != EmploymentType::Employee
        || worker.withholding_rate.is_some()
    {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingWithholding,
        format!(
            "No withholding tax configuration for employee in {}",
            settings.country
        ),
    ))
}
