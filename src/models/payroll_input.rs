//! Payroll input model and its configuration records.
//!
//! This module defines [`PayrollInput`], the value object consumed by the
//! payroll composer, together with the named-default records it is built
//! from: [`PayrollOptions`] and [`InssRates`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Returns the default employee INSS rate (3%).
pub fn default_employee_inss_rate() -> Decimal {
    Decimal::new(3, 2)
}

/// Returns the default employer INSS rate (8%).
pub fn default_employer_inss_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Selects the income the IRT brackets are applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrtBaseMode {
    /// IRT on taxable gross (salary plus taxable allowances).
    Gross,
    /// IRT on taxable gross minus the employee INSS contribution.
    #[default]
    GrossMinusInss,
}

impl IrtBaseMode {
    /// Returns the wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            IrtBaseMode::Gross => "gross",
            IrtBaseMode::GrossMinusInss => "gross_minus_inss",
        }
    }
}

/// INSS contribution rates and optional contribution ceilings.
///
/// Defaults to 3% for the employee, 8% for the employer and no caps.
///
/// # Example
///
/// ```
/// use payroll_engine::models::InssRates;
/// use rust_decimal::Decimal;
///
/// let rates = InssRates::default();
/// assert_eq!(rates.employee_rate, Decimal::new(3, 2));
/// assert_eq!(rates.employer_rate, Decimal::new(8, 2));
/// assert!(rates.employee_cap.is_none());
/// assert!(rates.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InssRates {
    /// Fraction of taxable gross withheld from the employee.
    #[serde(default = "default_employee_inss_rate")]
    pub employee_rate: Decimal,
    /// Fraction of taxable gross paid by the employer.
    #[serde(default = "default_employer_inss_rate")]
    pub employer_rate: Decimal,
    /// Maximum employee contribution, if any.
    #[serde(default)]
    pub employee_cap: Option<Decimal>,
    /// Maximum employer contribution, if any.
    #[serde(default)]
    pub employer_cap: Option<Decimal>,
}

impl Default for InssRates {
    fn default() -> Self {
        Self {
            employee_rate: default_employee_inss_rate(),
            employer_rate: default_employer_inss_rate(),
            employee_cap: None,
            employer_cap: None,
        }
    }
}

impl InssRates {
    /// Checks that both rates lie in `[0, 1]` and that caps are not negative.
    pub fn validate(&self) -> EngineResult<()> {
        check_fraction("employee_inss_rate", self.employee_rate)?;
        check_fraction("employer_inss_rate", self.employer_rate)?;
        if let Some(cap) = self.employee_cap {
            check_non_negative("inss_employee_cap", cap)?;
        }
        if let Some(cap) = self.employer_cap {
            check_non_negative("inss_employer_cap", cap)?;
        }
        Ok(())
    }
}

/// Optional payroll parameters with their documented defaults.
///
/// All amounts default to zero and the IRT base mode defaults to
/// [`IrtBaseMode::GrossMinusInss`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollOptions {
    /// Taxable allowances (bonuses and similar).
    pub taxable_allowances: Decimal,
    /// Allowances exempt from IRT and INSS (meal allowance and similar).
    pub non_taxable_allowances: Decimal,
    /// Other deductions (advances, absences).
    pub other_deductions: Decimal,
    /// The IRT base policy.
    pub irt_base_mode: IrtBaseMode,
}

/// Input to a single payroll computation.
///
/// Build it with [`PayrollInput::new`], which validates every field once.
/// The fields stay public so callers can inspect them; the composer
/// re-validates before computing.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{InssRates, PayrollInput, PayrollOptions};
/// use rust_decimal::Decimal;
///
/// let input = PayrollInput::new(
///     Decimal::new(200_000, 0),
///     PayrollOptions::default(),
///     InssRates::default(),
/// )?;
/// assert_eq!(input.taxable_gross()?, Decimal::new(200_000, 0));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInput {
    /// Base salary.
    pub gross_salary: Decimal,
    /// Taxable allowances.
    pub taxable_allowances: Decimal,
    /// Non-taxable allowances.
    pub non_taxable_allowances: Decimal,
    /// Other deductions.
    pub other_deductions: Decimal,
    /// The IRT base policy.
    pub irt_base_mode: IrtBaseMode,
    /// INSS rates and caps.
    pub inss: InssRates,
}

impl PayrollInput {
    /// Creates a validated payroll input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the offending field if any amount is
    /// negative, a rate is outside `[0, 1]` or a cap is negative.
    pub fn new(gross_salary: Decimal, options: PayrollOptions, inss: InssRates) -> EngineResult<Self> {
        let input = Self {
            gross_salary,
            taxable_allowances: options.taxable_allowances,
            non_taxable_allowances: options.non_taxable_allowances,
            other_deductions: options.other_deductions,
            irt_base_mode: options.irt_base_mode,
            inss,
        };
        input.validate()?;
        Ok(input)
    }

    /// Checks every field against its domain.
    pub fn validate(&self) -> EngineResult<()> {
        check_non_negative("gross_salary", self.gross_salary)?;
        check_non_negative("taxable_allowances", self.taxable_allowances)?;
        check_non_negative("non_taxable_allowances", self.non_taxable_allowances)?;
        check_non_negative("other_deductions", self.other_deductions)?;
        self.inss.validate()
    }

    /// Base salary plus taxable allowances.
    ///
    /// Returns `CalculationError` if the sum leaves the decimal range.
    pub fn taxable_gross(&self) -> EngineResult<Decimal> {
        self.gross_salary
            .checked_add(self.taxable_allowances)
            .ok_or_else(|| EngineError::overflow("taxable_gross"))
    }
}

fn check_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

fn check_fraction(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(EngineError::invalid_input(
            field,
            format!("must be between 0 and 1, got {}", value),
        ));
    }
    Ok(())
}
