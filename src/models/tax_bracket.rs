//! Income tax brackets and validated bracket tables.
//!
//! A [`BracketTable`] is the immutable, ordered schedule the IRT evaluator
//! scans. Tables are data: jurisdictions and years vary the rows, never the
//! evaluator.

use std::ops::Deref;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A single progressive income bracket.
///
/// Income `v` belongs to the bracket when `lower < v <= upper`. An `upper` of
/// `None` means the bracket is unbounded. `fixed` is the precomputed tax owed
/// at the bracket's `lower` threshold.
///
/// # Example
///
/// ```
/// use payroll_engine::models::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let bracket = TaxBracket::new(
///     Decimal::new(150_000, 0),
///     Some(Decimal::new(200_000, 0)),
///     Decimal::new(16, 2),
///     Decimal::new(12_500, 0),
/// );
/// assert!(bracket.contains(Decimal::new(194_000, 0)));
/// assert_eq!(bracket.tax_at(Decimal::new(194_000, 0))?, Decimal::new(19_540, 0));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Exclusive lower bound of the bracket.
    pub lower: Decimal,
    /// Inclusive upper bound, or `None` for the top bracket.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// Marginal rate applied to income above `lower`.
    pub rate: Decimal,
    /// Cumulative tax owed at `lower`.
    #[serde(default)]
    pub fixed: Decimal,
}

impl TaxBracket {
    /// Creates a new bracket.
    pub fn new(lower: Decimal, upper: Option<Decimal>, rate: Decimal, fixed: Decimal) -> Self {
        Self {
            lower,
            upper,
            rate,
            fixed,
        }
    }

    /// Returns true if `income` falls in `(lower, upper]`.
    pub fn contains(&self, income: Decimal) -> bool {
        self.lower < income && self.upper.is_none_or(|upper| income <= upper)
    }

    /// Returns true if the bracket has no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.upper.is_none()
    }

    /// Tax owed on `income` under this bracket: `fixed + rate * max(0, income - lower)`.
    ///
    /// Membership is not checked. Returns `CalculationError` if the tax
    /// leaves the decimal range.
    pub fn tax_at(&self, income: Decimal) -> EngineResult<Decimal> {
        let excess = income
            .checked_sub(self.lower)
            .map(|excess| excess.max(Decimal::ZERO))
            .ok_or_else(|| EngineError::overflow("irt"))?;
        self.rate
            .checked_mul(excess)
            .and_then(|marginal| self.fixed.checked_add(marginal))
            .ok_or_else(|| EngineError::overflow("irt"))
    }
}

/// A boundary where a table's `fixed` column jumps.
///
/// `expected_fixed` is the tax computed through the lower bracket at
/// `boundary`; `actual_fixed` is what the next bracket declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discontinuity {
    /// Index of the bracket whose `fixed` disagrees.
    pub bracket_index: usize,
    /// The threshold between the two brackets.
    pub boundary: Decimal,
    /// Tax at the boundary evaluated through the lower bracket.
    pub expected_fixed: Decimal,
    /// The `fixed` amount declared by the upper bracket.
    pub actual_fixed: Decimal,
}

/// A validated, immutable IRT bracket schedule.
///
/// Construction checks the structural invariants: the table is non-empty,
/// starts at zero, is contiguous and ascending, and ends with a single
/// unbounded bracket. Rates must lie in `[0, 1]` and fixed amounts must not be
/// negative.
///
/// The table dereferences to `[TaxBracket]`, so it can be passed wherever a
/// bracket slice is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates `brackets` and wraps them in a table.
    pub fn new(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        validate_brackets(&brackets)?;
        Ok(Self { brackets })
    }

    /// Builds a table from marginal rates, precomputing each bracket's `fixed`.
    ///
    /// `thresholds` are the upper bounds of every bracket but the last, in
    /// ascending order. `rates` holds one rate per bracket, so it must be one
    /// element longer than `thresholds`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::BracketTable;
    /// use rust_decimal::Decimal;
    ///
    /// let table = BracketTable::from_marginal_rates(
    ///     &[Decimal::new(1_000, 0)],
    ///     &[Decimal::ZERO, Decimal::new(10, 2)],
    /// )?;
    /// assert_eq!(table.len(), 2);
    /// assert!(table.discontinuities().is_empty());
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn from_marginal_rates(thresholds: &[Decimal], rates: &[Decimal]) -> EngineResult<Self> {
        if rates.len() != thresholds.len() + 1 {
            return Err(EngineError::configuration(format!(
                "expected {} rates for {} thresholds, got {}",
                thresholds.len() + 1,
                thresholds.len(),
                rates.len()
            )));
        }

        let mut brackets = Vec::with_capacity(rates.len());
        let mut lower = Decimal::ZERO;
        let mut fixed = Decimal::ZERO;

        for (i, rate) in rates.iter().enumerate() {
            let upper = thresholds.get(i).copied();
            brackets.push(TaxBracket::new(lower, upper, *rate, fixed));
            if let Some(upper) = upper {
                fixed = brackets[i].tax_at(upper).map_err(|_| {
                    EngineError::configuration(format!(
                        "cumulative tax at threshold {} overflows",
                        upper
                    ))
                })?;
                lower = upper;
            }
        }

        Self::new(brackets)
    }

    /// The statutory Angolan IRT schedule (12 brackets, 0% to 25%).
    pub fn angola_default() -> Self {
        // (lower, upper, rate in percent, fixed)
        const ROWS: [(i64, Option<i64>, i64, i64); 12] = [
            (0, Some(100_000), 0, 0),
            (100_000, Some(150_000), 13, 0),
            (150_000, Some(200_000), 16, 12_500),
            (200_000, Some(300_000), 18, 31_250),
            (300_000, Some(500_000), 19, 49_250),
            (500_000, Some(1_000_000), 21, 187_249),
            (1_000_000, Some(1_500_000), 22, 292_249),
            (1_500_000, Some(2_000_000), 23, 402_249),
            (2_000_000, Some(2_500_000), 24, 517_249),
            (2_500_000, Some(5_000_000), 25, 1_117_249),
            (5_000_000, Some(10_000_000), 25, 1_942_249),
            (10_000_000, None, 25, 2_342_248),
        ];

        let brackets = ROWS
            .iter()
            .map(|&(lower, upper, rate, fixed)| {
                TaxBracket::new(
                    Decimal::from(lower),
                    upper.map(Decimal::from),
                    Decimal::new(rate, 2),
                    Decimal::from(fixed),
                )
            })
            .collect();

        Self { brackets }
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Lists every boundary where the next bracket's `fixed` differs from the
    /// tax evaluated through the lower bracket.
    ///
    /// Tables built with [`BracketTable::from_marginal_rates`] never have any.
    pub fn discontinuities(&self) -> Vec<Discontinuity> {
        self.brackets
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| {
                let (below, above) = (&pair[0], &pair[1]);
                let boundary = below.upper?;
                let expected_fixed = below.tax_at(boundary).ok()?;
                (expected_fixed != above.fixed).then(|| Discontinuity {
                    bracket_index: i + 1,
                    boundary,
                    expected_fixed,
                    actual_fixed: above.fixed,
                })
            })
            .collect()
    }
}

impl Deref for BracketTable {
    type Target = [TaxBracket];

    fn deref(&self) -> &Self::Target {
        &self.brackets
    }
}

impl AsRef<[TaxBracket]> for BracketTable {
    fn as_ref(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

fn validate_brackets(brackets: &[TaxBracket]) -> EngineResult<()> {
    let first = brackets
        .first()
        .ok_or_else(|| EngineError::configuration("bracket table is empty"))?;

    if first.lower != Decimal::ZERO {
        return Err(EngineError::configuration(format!(
            "first bracket must start at 0, starts at {}",
            first.lower
        )));
    }

    let last_index = brackets.len() - 1;
    for (i, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(EngineError::configuration(format!(
                "bracket {} has rate {} outside [0, 1]",
                i, bracket.rate
            )));
        }
        if bracket.fixed < Decimal::ZERO {
            return Err(EngineError::configuration(format!(
                "bracket {} has negative fixed amount {}",
                i, bracket.fixed
            )));
        }

        match bracket.upper {
            Some(upper) if upper <= bracket.lower => {
                return Err(EngineError::configuration(format!(
                    "bracket {} has upper bound {} not above lower bound {}",
                    i, upper, bracket.lower
                )));
            }
            Some(upper) if i == last_index => {
                return Err(EngineError::configuration(format!(
                    "last bracket must be unbounded, ends at {}",
                    upper
                )));
            }
            Some(upper) => {
                let next = &brackets[i + 1];
                if next.lower != upper {
                    return Err(EngineError::configuration(format!(
                        "bracket {} starts at {} but bracket {} ends at {}",
                        i + 1,
                        next.lower,
                        i,
                        upper
                    )));
                }
            }
            None if i != last_index => {
                return Err(EngineError::configuration(format!(
                    "bracket {} is unbounded but is not the last bracket",
                    i
                )));
            }
            None => {}
        }
    }

    Ok(())
}
