//! Calculation logic for the payroll engine.
//!
//! This module contains the progressive IRT bracket evaluator, INSS
//! contribution calculation, whole-kwanza rounding and the payroll composer
//! that combines them into a payslip.

mod bracket_tax;
mod inss;
mod payroll;
mod rounding;

pub use bracket_tax::{BracketTaxResult, evaluate, evaluate_bracket, find_bracket};
pub use inss::{InssContributionResult, InssParty, calculate_inss, inss_amount};
pub use payroll::{
    ENGINE_VERSION, PayrollComputation, calculate_payroll, compute, compute_with_audit,
    preview_payroll,
};
pub use rounding::{round_kz, to_kz};
