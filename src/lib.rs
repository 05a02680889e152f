//! Payroll engine for Angolan salaries
//!
//! This crate computes progressive IRT withholding from a bracket table,
//! employee and employer INSS contributions, net salary and total employer
//! cost for a single pay period.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
