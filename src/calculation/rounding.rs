//! Currency rounding.
//!
//! Payroll amounts are settled in whole pesos. Retención en la fuente is
//! rounded to the nearest thousand pesos, as DIAN tables are published.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to whole pesos, half away from zero.
///
/// # Examples
///
/// ```
/// use nomina_engine::calculation::round_pesos;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_pesos(Decimal::from_str("66666.67").unwrap()), Decimal::from(66667));
/// assert_eq!(round_pesos(Decimal::from_str("0.5").unwrap()), Decimal::ONE);
/// ```
pub fn round_pesos(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an amount to the nearest thousand pesos, half away from zero.
pub fn round_to_thousand(value: Decimal) -> Decimal {
    let thousand = Decimal::from(1000);
    (value / thousand).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) * thousand
}

/// Rounds a rate for display on a pay line.
pub(crate) fn display_rate(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
