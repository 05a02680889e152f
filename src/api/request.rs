//! Request types for the payroll engine API.
//!
//! This module defines the JSON request body shared by the
//! `/payroll/preview` and `/payroll/calculate` endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{InssRates, IrtBaseMode, PayrollInput, PayrollOptions};

/// Request body for the payroll endpoints.
///
/// Only `gross_salary` is required. Allowances and deductions default to
/// zero and the IRT base mode defaults to `gross_minus_inss`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// Base salary.
    pub gross_salary: Decimal,
    /// Taxable allowances.
    #[serde(default)]
    pub taxable_allowances: Decimal,
    /// Non-taxable allowances.
    #[serde(default)]
    pub non_taxable_allowances: Decimal,
    /// Other deductions.
    #[serde(default)]
    pub other_deductions: Decimal,
    /// The IRT base policy.
    #[serde(default)]
    pub irt_base_mode: IrtBaseMode,
}

impl PayrollRequest {
    /// Returns the optional parameters of the request.
    pub fn options(&self) -> PayrollOptions {
        PayrollOptions {
            taxable_allowances: self.taxable_allowances,
            non_taxable_allowances: self.non_taxable_allowances,
            other_deductions: self.other_deductions,
            irt_base_mode: self.irt_base_mode,
        }
    }

    /// Builds a validated payroll input using the configured INSS rates.
    pub fn into_input(self, inss: &InssRates) -> EngineResult<PayrollInput> {
        PayrollInput::new(self.gross_salary, self.options(), inss.clone())
    }
}
