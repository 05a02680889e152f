//! Payroll composition.
//!
//! This module turns a [`PayrollInput`] and an IRT bracket table into a
//! [`PayrollResult`]: taxable gross, employee and employer INSS, the IRT base
//! and IRT, net salary and total employer cost.
//!
//! All intermediate values are kept un-rounded; each output field is rounded
//! once to whole kwanza when the result is assembled.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, IrtBaseMode, PayrollCalculation, PayrollInput,
    PayrollOptions, PayrollResult, TaxBracket,
};

use super::bracket_tax::evaluate_bracket;
use super::inss::{InssParty, calculate_inss};
use super::rounding::{round_kz, to_kz};

/// The engine version stamped on every [`PayrollCalculation`].
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A payroll result together with the audit records that produced it.
#[derive(Debug, Clone)]
pub struct PayrollComputation {
    /// The computed figures.
    pub result: PayrollResult,
    /// Ordered calculation steps.
    pub steps: Vec<AuditStep>,
    /// Warnings the caller should surface.
    pub warnings: Vec<AuditWarning>,
}

/// Computes a payroll.
///
/// This is a pure function of `input` and `brackets`: identical arguments
/// always give identical results.
///
/// # Errors
///
/// - `InvalidInput` if a money field is negative, a rate lies outside
///   `[0, 1]` or a cap is negative
/// - `ConfigurationError` if no bracket covers the IRT base
/// - `CalculationError` if an amount leaves the decimal range or an output
///   does not fit in an `i64`
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute;
/// use payroll_engine::models::{BracketTable, InssRates, PayrollInput, PayrollOptions};
/// use rust_decimal::Decimal;
///
/// let input = PayrollInput::new(
///     Decimal::new(200_000, 0),
///     PayrollOptions::default(),
///     InssRates::default(),
/// )?;
/// let result = compute(&input, &BracketTable::angola_default())?;
///
/// assert_eq!(result.inss_employee, 6_000);
/// assert_eq!(result.irt, 19_540);
/// assert_eq!(result.net_salary, 174_460);
/// assert_eq!(result.total_cost_employer, 216_000);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn compute(input: &PayrollInput, brackets: &[TaxBracket]) -> EngineResult<PayrollResult> {
    compute_with_audit(input, brackets).map(|computation| computation.result)
}

/// Computes a payroll and records every step of the derivation.
///
/// A negative net salary is returned as-is and flagged with a
/// `NEGATIVE_NET_SALARY` warning. A contribution reduced by its cap is
/// flagged with `INSS_CAP_APPLIED`.
pub fn compute_with_audit(
    input: &PayrollInput,
    brackets: &[TaxBracket],
) -> EngineResult<PayrollComputation> {
    input.validate()?;

    let mut steps = Vec::with_capacity(7);
    let mut warnings = Vec::new();
    let mut step_number: u32 = 1;

    let taxable_gross = input.taxable_gross()?;
    steps.push(AuditStep {
        step_number,
        rule_id: "taxable_gross".to_string(),
        rule_name: "Taxable Gross".to_string(),
        input: serde_json::json!({
            "gross_salary": input.gross_salary.normalize().to_string(),
            "taxable_allowances": input.taxable_allowances.normalize().to_string()
        }),
        output: serde_json::json!({
            "taxable_gross": taxable_gross.normalize().to_string()
        }),
        reasoning: format!(
            "{} + {} = {}",
            input.gross_salary.normalize(),
            input.taxable_allowances.normalize(),
            taxable_gross.normalize()
        ),
    });
    step_number += 1;

    let inss_employee = calculate_inss(
        InssParty::Employee,
        taxable_gross,
        input.inss.employee_rate,
        input.inss.employee_cap,
        step_number,
    )?;
    steps.push(inss_employee.audit_step.clone());
    step_number += 1;

    let inss_employer = calculate_inss(
        InssParty::Employer,
        taxable_gross,
        input.inss.employer_rate,
        input.inss.employer_cap,
        step_number,
    )?;
    steps.push(inss_employer.audit_step.clone());
    step_number += 1;

    for (label, contribution) in [("employee", &inss_employee), ("employer", &inss_employer)] {
        if contribution.capped {
            warnings.push(AuditWarning {
                code: "INSS_CAP_APPLIED".to_string(),
                message: format!(
                    "INSS {} contribution limited to {}",
                    label,
                    contribution.amount.normalize()
                ),
                severity: "low".to_string(),
            });
        }
    }

    let unclamped_base = match input.irt_base_mode {
        IrtBaseMode::Gross => taxable_gross,
        IrtBaseMode::GrossMinusInss => taxable_gross - inss_employee.amount,
    };
    let irt_base = unclamped_base.max(Decimal::ZERO);
    steps.push(AuditStep {
        step_number,
        rule_id: "irt_base".to_string(),
        rule_name: "IRT Base".to_string(),
        input: serde_json::json!({
            "irt_base_mode": input.irt_base_mode.as_str(),
            "taxable_gross": taxable_gross.normalize().to_string(),
            "inss_employee": inss_employee.amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "irt_base": irt_base.normalize().to_string(),
            "clamped": unclamped_base < Decimal::ZERO
        }),
        reasoning: match input.irt_base_mode {
            IrtBaseMode::Gross => format!("IRT on taxable gross: {}", irt_base.normalize()),
            IrtBaseMode::GrossMinusInss => format!(
                "max(0, {} - {}) = {}",
                taxable_gross.normalize(),
                inss_employee.amount.normalize(),
                irt_base.normalize()
            ),
        },
    });
    step_number += 1;

    let irt = evaluate_bracket(brackets, irt_base, step_number)?;
    steps.push(irt.audit_step.clone());
    step_number += 1;

    let total_pay = taxable_gross
        .checked_add(input.non_taxable_allowances)
        .ok_or_else(|| EngineError::overflow("total_pay"))?;
    let net_salary = total_pay
        .checked_sub(inss_employee.amount)
        .and_then(|v| v.checked_sub(irt.tax))
        .and_then(|v| v.checked_sub(input.other_deductions))
        .ok_or_else(|| EngineError::overflow("net_salary"))?;

    let mut net_reasoning = format!(
        "{} - {} - {} - {} = {}",
        total_pay.normalize(),
        inss_employee.amount.normalize(),
        irt.tax.normalize(),
        input.other_deductions.normalize(),
        net_salary.normalize()
    );
    // Net comes from the exact amounts, so it can differ by 1 Kz from the
    // rounded payslip lines.
    let rounded_net = round_kz(net_salary);
    if let Some(from_rounded) = net_from_rounded_lines(
        total_pay,
        inss_employee.amount,
        irt.tax,
        input.other_deductions,
    )
    .filter(|from_rounded| *from_rounded != rounded_net)
    {
        net_reasoning.push_str(&format!(
            "; rounds to {}, while the rounded lines give {}",
            rounded_net, from_rounded
        ));
    }
    steps.push(AuditStep {
        step_number,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "total_pay": total_pay.normalize().to_string(),
            "inss_employee": inss_employee.amount.normalize().to_string(),
            "irt": irt.tax.normalize().to_string(),
            "other_deductions": input.other_deductions.normalize().to_string()
        }),
        output: serde_json::json!({
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: net_reasoning,
    });
    step_number += 1;

    let total_cost_employer = total_pay
        .checked_add(inss_employer.amount)
        .ok_or_else(|| EngineError::overflow("total_cost_employer"))?;
    steps.push(AuditStep {
        step_number,
        rule_id: "employer_cost".to_string(),
        rule_name: "Total Employer Cost".to_string(),
        input: serde_json::json!({
            "total_pay": total_pay.normalize().to_string(),
            "inss_employer": inss_employer.amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_cost_employer": total_cost_employer.normalize().to_string()
        }),
        reasoning: format!(
            "{} + {} = {}",
            total_pay.normalize(),
            inss_employer.amount.normalize(),
            total_cost_employer.normalize()
        ),
    });

    let result = PayrollResult {
        gross_salary: to_kz("gross_salary", input.gross_salary)?,
        taxable_allowances: to_kz("taxable_allowances", input.taxable_allowances)?,
        non_taxable_allowances: to_kz("non_taxable_allowances", input.non_taxable_allowances)?,
        taxable_gross: to_kz("taxable_gross", taxable_gross)?,
        inss_employee: to_kz("inss_employee", inss_employee.amount)?,
        inss_employer: to_kz("inss_employer", inss_employer.amount)?,
        irt_base: to_kz("irt_base", irt_base)?,
        irt: to_kz("irt", irt.tax)?,
        other_deductions: to_kz("other_deductions", input.other_deductions)?,
        total_cost_employer: to_kz("total_cost_employer", total_cost_employer)?,
        net_salary: to_kz("net_salary", net_salary)?,
    };

    if result.net_salary < 0 {
        warn!(
            net_salary = result.net_salary,
            other_deductions = result.other_deductions,
            "Net salary is negative"
        );
        warnings.push(AuditWarning {
            code: "NEGATIVE_NET_SALARY".to_string(),
            message: format!(
                "Net salary is {}: deductions exceed pay",
                result.net_salary
            ),
            severity: "high".to_string(),
        });
    }

    Ok(PayrollComputation {
        result,
        steps,
        warnings,
    })
}

/// Net salary recomputed from the whole-kwanza payslip lines.
fn net_from_rounded_lines(
    total_pay: Decimal,
    inss_employee: Decimal,
    irt: Decimal,
    other_deductions: Decimal,
) -> Option<Decimal> {
    round_kz(total_pay)
        .checked_sub(round_kz(inss_employee))?
        .checked_sub(round_kz(irt))?
        .checked_sub(round_kz(other_deductions))
}

/// Computes a payroll with the configured brackets and INSS rates and
/// returns it as a field name to amount mapping.
///
/// Optional parameters take their defaults from [`PayrollOptions`].
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::preview_payroll;
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::PayrollOptions;
/// use rust_decimal::Decimal;
///
/// let config = PayrollConfig::angola_default();
/// let preview = preview_payroll(&config, Decimal::new(50_000, 0), PayrollOptions::default())?;
///
/// assert_eq!(preview["inss_employee"], 1_500);
/// assert_eq!(preview["irt"], 0);
/// assert_eq!(preview["net_salary"], 48_500);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn preview_payroll(
    config: &PayrollConfig,
    gross_salary: Decimal,
    options: PayrollOptions,
) -> EngineResult<BTreeMap<String, i64>> {
    let input = PayrollInput::new(gross_salary, options, config.inss().clone())?;
    compute(&input, config.brackets()).map(|result| result.to_map())
}

/// Computes a payroll and stamps it with an identifier, timestamp, engine
/// version and audit trace.
pub fn calculate_payroll(
    config: &PayrollConfig,
    input: &PayrollInput,
) -> EngineResult<PayrollCalculation> {
    let start_time = Instant::now();
    let computation = compute_with_audit(input, config.brackets())?;
    let duration_us = start_time.elapsed().as_micros() as u64;

    let calculation = PayrollCalculation {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        schedule: config.schedule().code.clone(),
        result: computation.result,
        audit_trace: AuditTrace {
            steps: computation.steps,
            warnings: computation.warnings,
            duration_us,
        },
    };

    info!(
        calculation_id = %calculation.calculation_id,
        schedule = %calculation.schedule,
        irt = calculation.result.irt,
        net_salary = calculation.result.net_salary,
        duration_us,
        "Payroll calculated"
    );

    Ok(calculation)
}
