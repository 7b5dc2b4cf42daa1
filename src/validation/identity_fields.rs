//! Government ID and tax field bundle validation rules.
//!
//! Both rules check the worker record against country requirements; missing
//! government IDs cannot be fixed inside the payroll system and must be
//! corrected in the HR record first.

use crate::config::{CountrySettings, TaxFieldKind};
use crate::models::{ExceptionKind, PayrollException, Worker};

/// Checks that every mandatory government ID for the country is present.
///
/// All missing ID types are reported together in a single finding.
pub fn check_government_ids(
    worker: &Worker,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let missing: Vec<&str> = settings
        .required_government_ids
        .iter()
        .filter(|id_type| {
            worker
                .government_ids
                .get(id_type.as_str())
                .is_none_or(|v| v.trim().is_empty())
        })
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingGovernmentId,
        format!(
            "Missing mandatory {} government ID(s): {}",
            settings.country,
            missing.join(", ")
        ),
    ))
}

/// Checks the mandatory tax/contribution field bundle for the worker's
/// country and employment type.
pub fn check_tax_field_bundle(
    worker: &Worker,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let missing: Vec<&str> = settings
        .required_tax_fields
        .iter()
        .filter(|required| required.applies_to.covers(worker.employment_type))
        .filter(|required| match required.field {
            TaxFieldKind::EmployeeContribution => worker.employee_contribution.is_none(),
            TaxFieldKind::EmployerContribution => worker.employer_contribution.is_none(),
            TaxFieldKind::WithholdingRate => worker.withholding_rate.is_none(),
        })
        .map(|required| required.field.field_name())
        .collect();

    if missing.is_empty() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::MissingTaxFields,
        format!(
            "Missing required tax fields for {}: {}",
            settings.country,
            missing.join(", ")
        ),
    ))
}
