//! Payroll result models.
//!
//! This module contains the [`PayrollResult`] produced by the composer and the
//! audit structures that record how each figure was reached.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome of one payroll computation, in whole kwanza.
///
/// Every field is rounded independently, half away from zero, from the
/// un-rounded intermediate values. `net_salary` may be negative: large other
/// deductions can legitimately exceed pay.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollResult;
///
/// let result = PayrollResult {
///     gross_salary: 50_000,
///     taxable_allowances: 0,
///     non_taxable_allowances: 0,
///     taxable_gross: 50_000,
///     inss_employee: 1_500,
///     inss_employer: 4_000,
///     irt_base: 48_500,
///     irt: 0,
///     other_deductions: 0,
///     total_cost_employer: 54_000,
///     net_salary: 48_500,
/// };
/// assert_eq!(result.to_map()["net_salary"], 48_500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Base salary.
    pub gross_salary: i64,
    /// Taxable allowances.
    pub taxable_allowances: i64,
    /// Non-taxable allowances.
    pub non_taxable_allowances: i64,
    /// Base salary plus taxable allowances.
    pub taxable_gross: i64,
    /// Employee INSS contribution.
    pub inss_employee: i64,
    /// Employer INSS contribution.
    pub inss_employer: i64,
    /// Income the IRT brackets were applied to.
    pub irt_base: i64,
    /// IRT withheld.
    pub irt: i64,
    /// Other deductions.
    pub other_deductions: i64,
    /// Total cost to the employer.
    pub total_cost_employer: i64,
    /// Net pay to the employee.
    pub net_salary: i64,
}

impl PayrollResult {
    /// Flattens the result into a field name to amount mapping.
    pub fn to_map(&self) -> BTreeMap<String, i64> {
        [
            ("gross_salary", self.gross_salary),
            ("taxable_allowances", self.taxable_allowances),
            ("non_taxable_allowances", self.non_taxable_allowances),
            ("taxable_gross", self.taxable_gross),
            ("inss_employee", self.inss_employee),
            ("inss_employer", self.inss_employer),
            ("irt_base", self.irt_base),
            ("irt", self.irt),
            ("other_deductions", self.other_deductions),
            ("total_cost_employer", self.total_cost_employer),
            ("net_salary", self.net_salary),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag results the caller must look at but that are not errors,
/// such as a negative net salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// A payroll result stamped for auditability.
///
/// Wraps a [`PayrollResult`] with an identifier, a timestamp, the engine
/// version and the schedule used, plus the full audit trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Code of the tax schedule the calculation used.
    pub schedule: String,
    /// The computed figures.
    pub result: PayrollResult,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
