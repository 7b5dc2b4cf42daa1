//! Country settings types.
//!
//! This module contains the strongly-typed per-country configuration that
//! validation rules and the proration calculator consume. Settings are
//! deserialized from YAML files, one per country.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::EmploymentType;

/// Which employment types a configuration entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    /// Applies to every worker.
    All,
    /// Applies only to employees.
    Employees,
    /// Applies only to contractors.
    Contractors,
}

impl AppliesTo {
    /// Returns true if a worker of the given employment type is covered.
    pub fn covers(&self, employment_type: EmploymentType) -> bool {
        match self {
            AppliesTo::All => true,
            AppliesTo::Employees => employment_type == EmploymentType::Employee,
            AppliesTo::Contractors => employment_type == EmploymentType::Contractor,
        }
    }
}

/// One salary bracket in the statutory contribution table.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionBracket {
    /// Lower salary bound, inclusive.
    pub salary_from: Decimal,
    /// Upper salary bound, inclusive; open-ended when absent.
    pub salary_to: Option<Decimal>,
    /// The expected employee-side contribution for this bracket.
    pub employee_amount: Decimal,
}

impl ContributionBracket {
    /// Returns true if the given monthly salary falls inside this bracket.
    pub fn matches(&self, salary: Decimal) -> bool {
        salary >= self.salary_from && self.salary_to.is_none_or(|to| salary <= to)
    }
}

/// A pay component the country mandates for qualifying workers.
#[derive(Debug, Clone, Deserialize)]
pub struct MandatoryComponent {
    /// The component key (e.g. "thirteenth_month").
    pub component: String,
    /// Which employment types must carry the component.
    pub applies_to: AppliesTo,
}

/// A tax/contribution field the country requires on the worker record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxFieldKind {
    /// The employee-side contribution amount.
    EmployeeContribution,
    /// The employer-side contribution amount.
    EmployerContribution,
    /// The withholding tax rate.
    WithholdingRate,
}

impl TaxFieldKind {
    /// Returns the field name as it appears on the worker record.
    pub fn field_name(&self) -> &'static str {
        match self {
            TaxFieldKind::EmployeeContribution => "employee_contribution",
            TaxFieldKind::EmployerContribution => "employer_contribution",
            TaxFieldKind::WithholdingRate => "withholding_rate",
        }
    }
}

/// A required tax field together with the workers it applies to.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredTaxField {
    /// The required field.
    pub field: TaxFieldKind,
    /// Which employment types must carry it.
    pub applies_to: AppliesTo,
}

/// Per-country payroll configuration.
///
/// One `CountrySettings` is loaded per country file; the loader keys them by
/// country code.
#[derive(Debug, Clone, Deserialize)]
pub struct CountrySettings {
    /// ISO country code.
    pub country: String,
    /// Currency the country pays in.
    pub currency: String,
    /// Working-days divisor used for daily rates and proration.
    pub days_per_month: Decimal,
    /// Statutory minimum daily wage.
    pub minimum_daily_wage: Decimal,
    /// Cap on total non-taxable allowances, if the country has one.
    #[serde(default)]
    pub non_taxable_allowance_cap: Option<Decimal>,
    /// Government ID types every worker must carry.
    #[serde(default)]
    pub required_government_ids: Vec<String>,
    /// Statutory contribution table keyed by salary bracket.
    #[serde(default)]
    pub contribution_brackets: Vec<ContributionBracket>,
    /// Pay components the country mandates.
    #[serde(default)]
    pub mandatory_pay_components: Vec<MandatoryComponent>,
    /// Whether employees require a withholding tax configuration.
    #[serde(default)]
    pub withholding_required: bool,
    /// Per-label caps on adjustment line items.
    #[serde(default)]
    pub adjustment_caps: HashMap<String, Decimal>,
    /// Tax/contribution fields required on the worker record.
    #[serde(default)]
    pub required_tax_fields: Vec<RequiredTaxField>,
}

impl CountrySettings {
    /// Returns the contribution bracket matching the given monthly salary.
    pub fn bracket_for(&self, salary: Decimal) -> Option<&ContributionBracket> {
        self.contribution_brackets.iter().find(|b| b.matches(salary))
    }
}
