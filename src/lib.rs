//! Payroll batch exception and execution engine.
//!
//! This crate detects payroll exceptions against per-country rules, walks a
//! guarded review/resolve/submit/track workflow for a batch cycle, and
//! executes payments through a provider port with bounded concurrency.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod registry;
pub mod resolution;
pub mod service;
pub mod validation;
pub mod workflow;
