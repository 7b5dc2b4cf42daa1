//! Calculation logic for the payroll batch engine.
//!
//! This module contains the proration calculator and the gross/net pay
//! helpers built on top of it.

mod proration;

pub use proration::{Proration, base_pay, gross_pay, net_pay, prorate};
