//! Progressive bracket tax evaluation.
//!
//! This module implements the IRT evaluator: given an ordered bracket table
//! and an income, it selects the single bracket owning the income and applies
//! that bracket's fixed amount and marginal rate.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, TaxBracket};

/// The result of evaluating an income against a bracket table.
#[derive(Debug, Clone)]
pub struct BracketTaxResult {
    /// The tax owed, un-rounded.
    pub tax: Decimal,
    /// Index of the bracket that owned the income.
    pub bracket_index: usize,
    /// The audit step recording this evaluation.
    pub audit_step: AuditStep,
}

/// Finds the index of the bracket owning `income`.
///
/// A bracket owns `income` when `lower < income <= upper`, so a value sitting
/// exactly on a threshold belongs to the lower bracket. The first bracket also
/// owns its own lower bound, which places an income of zero in it.
///
/// # Errors
///
/// - `InvalidInput` if `income` is negative
/// - `ConfigurationError` if no bracket owns `income` (gap or empty table)
pub fn find_bracket(brackets: &[TaxBracket], income: Decimal) -> EngineResult<usize> {
    if income < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "income",
            format!("must not be negative, got {}", income),
        ));
    }

    brackets
        .iter()
        .enumerate()
        .find(|(i, bracket)| bracket.contains(income) || (*i == 0 && income == bracket.lower))
        .map(|(i, _)| i)
        .ok_or_else(|| {
            EngineError::configuration(format!("no tax bracket covers income {}", income))
        })
}

/// Computes the tax owed on `income`.
///
/// Returns `fixed + rate * max(0, income - lower)` for the bracket owning
/// `income`. The value is not rounded.
///
/// # Errors
///
/// Those of [`find_bracket`], plus `CalculationError` if the tax leaves the
/// decimal range.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::evaluate;
/// use payroll_engine::models::BracketTable;
/// use rust_decimal::Decimal;
///
/// let table = BracketTable::angola_default();
/// let tax = evaluate(&table, Decimal::new(194_000, 0))?;
/// assert_eq!(tax, Decimal::new(19_540, 0));
///
/// assert_eq!(evaluate(&table, Decimal::ZERO)?, Decimal::ZERO);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn evaluate(brackets: &[TaxBracket], income: Decimal) -> EngineResult<Decimal> {
    let index = find_bracket(brackets, income)?;
    brackets[index].tax_at(income)
}

/// Computes the tax owed on `income` and records an audit step.
pub fn evaluate_bracket(
    brackets: &[TaxBracket],
    income: Decimal,
    step_number: u32,
) -> EngineResult<BracketTaxResult> {
    let bracket_index = find_bracket(brackets, income)?;
    let bracket = &brackets[bracket_index];
    let excess = (income - bracket.lower).max(Decimal::ZERO);
    let tax = bracket.tax_at(income)?;

    let upper = bracket
        .upper
        .map(|u| u.normalize().to_string())
        .unwrap_or_else(|| "unbounded".to_string());

    let audit_step = AuditStep {
        step_number,
        rule_id: "irt_bracket".to_string(),
        rule_name: "IRT Bracket".to_string(),
        input: serde_json::json!({
            "irt_base": income.normalize().to_string()
        }),
        output: serde_json::json!({
            "bracket_index": bracket_index,
            "lower": bracket.lower.normalize().to_string(),
            "upper": upper,
            "rate": bracket.rate.normalize().to_string(),
            "fixed": bracket.fixed.normalize().to_string(),
            "tax": tax.normalize().to_string()
        }),
        reasoning: format!(
            "{} + {} x ({} - {}) = {}",
            bracket.fixed.normalize(),
            bracket.rate.normalize(),
            income.normalize(),
            bracket.lower.normalize(),
            tax.normalize()
        ),
    };

    tracing::debug!(
        irt_base = %income,
        bracket_index,
        excess = %excess,
        tax = %tax,
        "Evaluated IRT bracket"
    );

    Ok(BracketTaxResult {
        tax,
        bracket_index,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BracketTable;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn continuous_table() -> BracketTable {
        BracketTable::from_marginal_rates(
            &[
                dec("100000"),
                dec("150000"),
                dec("200000"),
                dec("300000"),
                dec("500000"),
                dec("1000000"),
            ],
            &[
                dec("0"),
                dec("0.13"),
                dec("0.16"),
                dec("0.18"),
                dec("0.19"),
                dec("0.21"),
                dec("0.25"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_zero_income_is_untaxed_under_default_table() {
        let table = BracketTable::angola_default();

        assert_eq!(find_bracket(&table, Decimal::ZERO).unwrap(), 0);
        assert_eq!(evaluate(&table, Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_income_in_first_bracket_is_untaxed() {
        let table = BracketTable::angola_default();
        assert_eq!(evaluate(&table, dec("48500")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_boundary_belongs_to_lower_bracket() {
        let table = BracketTable::angola_default();

        assert_eq!(find_bracket(&table, dec("100000")).unwrap(), 0);
        assert_eq!(find_bracket(&table, dec("100000.01")).unwrap(), 1);
        assert_eq!(find_bracket(&table, dec("150000")).unwrap(), 1);
        assert_eq!(evaluate(&table, dec("150000")).unwrap(), dec("6500"));
    }

    #[test]
    fn test_reference_bracket_computation() {
        let table = BracketTable::angola_default();

        assert_eq!(find_bracket(&table, dec("194000")).unwrap(), 2);
        assert_eq!(evaluate(&table, dec("194000")).unwrap(), dec("19540"));
    }

    #[test]
    fn test_top_bracket_is_unbounded() {
        let table = BracketTable::angola_default();

        assert_eq!(find_bracket(&table, dec("12000000")).unwrap(), 11);
        assert_eq!(
            evaluate(&table, dec("12000000")).unwrap(),
            dec("2342248") + dec("0.25") * dec("2000000")
        );
    }

    #[test]
    fn test_tax_is_not_rounded() {
        let table = BracketTable::angola_default();
        assert_eq!(evaluate(&table, dec("100001")).unwrap(), dec("0.13"));
    }

    #[test]
    fn test_negative_income_is_invalid_input() {
        let table = BracketTable::angola_default();

        match evaluate(&table, dec("-1")) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "income"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_gap_in_unvalidated_slice_is_configuration_error() {
        let brackets = vec![
            TaxBracket::new(dec("0"), Some(dec("100")), dec("0"), dec("0")),
            TaxBracket::new(dec("200"), None, dec("0.1"), dec("0")),
        ];

        assert!(matches!(
            evaluate(&brackets, dec("150")),
            Err(EngineError::ConfigurationError { .. })
        ));
        assert_eq!(evaluate(&brackets, dec("250")).unwrap(), dec("5"));
    }

    #[test]
    fn test_empty_slice_is_configuration_error() {
        assert!(matches!(
            evaluate(&[], dec("10")),
            Err(EngineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_tax_past_decimal_max_is_calculation_error() {
        let brackets = vec![
            TaxBracket::new(dec("0"), Some(dec("100")), dec("0"), dec("0")),
            TaxBracket::new(dec("100"), None, dec("0.5"), Decimal::MAX),
        ];

        assert!(matches!(
            evaluate(&brackets, dec("200")),
            Err(EngineError::CalculationError { .. })
        ));
        assert!(matches!(
            evaluate_bracket(&brackets, dec("200"), 5),
            Err(EngineError::CalculationError { .. })
        ));
    }

    #[test]
    fn test_evaluate_bracket_records_audit_step() {
        let table = BracketTable::angola_default();
        let result = evaluate_bracket(&table, dec("194000"), 5).unwrap();

        assert_eq!(result.tax, dec("19540"));
        assert_eq!(result.bracket_index, 2);
        assert_eq!(result.audit_step.step_number, 5);
        assert_eq!(result.audit_step.rule_id, "irt_bracket");
        assert_eq!(result.audit_step.input["irt_base"], "194000");
        assert_eq!(result.audit_step.output["rate"], "0.16");
        assert_eq!(result.audit_step.output["upper"], "200000");
        assert_eq!(result.audit_step.output["tax"], "19540");
        assert_eq!(
            result.audit_step.reasoning,
            "12500 + 0.16 x (194000 - 150000) = 19540"
        );
    }

    #[test]
    fn test_evaluate_bracket_marks_unbounded_upper() {
        let table = BracketTable::angola_default();
        let result = evaluate_bracket(&table, dec("20000000"), 1).unwrap();

        assert_eq!(result.audit_step.output["upper"], "unbounded");
    }

    #[test]
    fn test_continuous_table_matches_next_fixed_at_every_boundary() {
        let table = continuous_table();

        for pair in table.windows(2) {
            let boundary = pair[0].upper.unwrap();
            let at_boundary = evaluate(&table, boundary).unwrap();
            assert_eq!(at_boundary, pair[0].fixed + pair[0].rate * (boundary - pair[0].lower));
            assert_eq!(at_boundary, pair[1].fixed);
        }
    }

    #[test]
    fn test_default_table_drops_above_ten_million() {
        // The statutory fixed amount of the top bracket is lower than the tax
        // reached at the end of the previous bracket.
        let table = BracketTable::angola_default();
        let at_boundary = evaluate(&table, dec("10000000")).unwrap();
        let just_above = evaluate(&table, dec("10000001")).unwrap();

        assert_eq!(at_boundary, dec("3192249"));
        assert!(just_above < at_boundary);
    }

    proptest! {
        #[test]
        fn prop_tax_is_monotonic_on_continuous_table(
            a in 0i64..200_000_000,
            b in 0i64..200_000_000,
        ) {
            let table = continuous_table();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low = Decimal::new(low, 2);
            let high = Decimal::new(high, 2);

            prop_assert!(evaluate(&table, high).unwrap() >= evaluate(&table, low).unwrap());
        }

        #[test]
        fn prop_tax_is_monotonic_on_default_table_below_top_bracket(
            a in 0i64..1_000_000_000,
            b in 0i64..1_000_000_000,
        ) {
            let table = BracketTable::angola_default();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low = Decimal::new(low, 2);
            let high = Decimal::new(high, 2);

            prop_assert!(evaluate(&table, high).unwrap() >= evaluate(&table, low).unwrap());
        }

        #[test]
        fn prop_tax_never_exceeds_income_nor_goes_negative(cents in 0i64..200_000_000) {
            let table = continuous_table();
            let income = Decimal::new(cents, 2);
            let tax = evaluate(&table, income).unwrap();

            prop_assert!(tax >= Decimal::ZERO);
            prop_assert!(tax <= income);
        }

        #[test]
        fn prop_exactly_one_bracket_owns_positive_income(cents in 1i64..2_000_000_000) {
            let table = BracketTable::angola_default();
            let income = Decimal::new(cents, 2);
            let owners = table.iter().filter(|b| b.contains(income)).count();

            prop_assert_eq!(owners, 1);
        }
    }
}
