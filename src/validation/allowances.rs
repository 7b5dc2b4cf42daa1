//! Allowance and adjustment cap validation rules.

use crate::config::CountrySettings;
use crate::models::{ExceptionKind, PayrollException, Worker};

/// Checks the sum of non-taxable adjustments against the country cap.
///
/// Countries without a configured cap are never flagged.
pub fn check_allowance_cap(worker: &Worker, settings: &CountrySettings) -> Option<PayrollException> {
    let cap = settings.non_taxable_allowance_cap?;
    let total = worker.non_taxable_adjustments();
    if total <= cap {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::AllowanceCapExceeded,
        format!(
            "Non-taxable allowances total {total} exceeds the {} cap of {cap}",
            settings.country
        ),
    ))
}

/// Checks each adjustment line item against its configured per-label cap.
///
/// Offending lines are reported together in a single finding so repeated
/// validation runs merge cleanly per worker.
pub fn check_adjustment_caps(
    worker: &Worker,
    settings: &CountrySettings,
) -> Option<PayrollException> {
    let over_cap: Vec<String> = worker
        .adjustments
        .iter()
        .filter_map(|line| {
            let cap = settings.adjustment_caps.get(&line.label)?;
            (line.amount > *cap).then(|| format!("{} ({} > {cap})", line.label, line.amount))
        })
        .collect();

    if over_cap.is_empty() {
        return None;
    }

    Some(PayrollException::new(
        &worker.id,
        ExceptionKind::AdjustmentCapExceeded,
        format!("Adjustments exceed their caps: {}", over_cap.join(", ")),
    ))
}
