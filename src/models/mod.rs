//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod payroll_input;
mod payroll_result;
mod tax_bracket;

pub use payroll_input::{
    InssRates, IrtBaseMode, PayrollInput, PayrollOptions, default_employee_inss_rate,
    default_employer_inss_rate,
};
pub use payroll_result::{
    AuditStep, AuditTrace, AuditWarning, PayrollCalculation, PayrollResult,
};
pub use tax_bracket::{BracketTable, Discontinuity, TaxBracket};
