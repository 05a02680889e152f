//! Rounding to whole kwanza.
//!
//! Payslips carry whole kwanza. Each output field is rounded once, half away
//! from zero, from its un-rounded value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

/// Rounds a value to the nearest whole kwanza, half away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_kz;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_kz(Decimal::from_str("1234.49").unwrap()), Decimal::from(1234));
/// assert_eq!(round_kz(Decimal::from_str("1234.5").unwrap()), Decimal::from(1235));
/// assert_eq!(round_kz(Decimal::from_str("-1234.5").unwrap()), Decimal::from(-1235));
/// ```
pub fn round_kz(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds `value` to whole kwanza and converts it to an integer.
///
/// `field` names the output field in the error if the amount does not fit
/// in an `i64`.
pub fn to_kz(field: &str, value: Decimal) -> EngineResult<i64> {
    round_kz(value)
        .to_i64()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("{} = {} does not fit in a 64-bit amount", field, value),
        })
}
