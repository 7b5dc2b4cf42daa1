//! Country settings configuration for the payroll batch engine.
//!
//! The Country Settings provider is an external collaborator of the core:
//! validation rules and the proration calculator look up divisors, wage
//! floors, and statutory tables here.

mod loader;
mod types;

pub use loader::CountrySettingsLoader;
pub use types::{
    AppliesTo, ContributionBracket, CountrySettings, MandatoryComponent, RequiredTaxField,
    TaxFieldKind,
};
