use crate::CURRENCY_PRECISION;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum CurrencyError {
    #[error("amount cannot be expressed as a whole number of cents")]
    CentsOutOfRange,
}

/// Rounds a monetary amount half-up to whole cents.
///
/// The result carries exactly two decimal places, so amounts render as
/// `"33.30"` rather than `"33.3"` wherever they serialize.
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut cents =
        amount.round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(CURRENCY_PRECISION);
    cents
}

/// Truncates a monetary amount to whole cents.
///
/// Equal splits use this so that the rounding shortfall accumulates in one
/// place and can be collected by the final period, keeping the schedule total
/// equal to the principal.
pub fn floor_cents(amount: Decimal) -> Decimal {
    let mut cents = amount.round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::ToZero);
    cents.rescale(CURRENCY_PRECISION);
    cents
}

/// Converts a monetary amount to an integer number of cents.
///
/// The amount is rounded half-up to cents first. Integer cents aggregate
/// safely where repeated decimal addition would need re-rounding.
pub fn to_cents(amount: Decimal) -> Result<i64, CurrencyError> {
    round_cents(amount)
        .checked_mul(Decimal::from(100))
        .and_then(|cents| cents.to_i64())
        .ok_or(CurrencyError::CentsOutOfRange)
}

/// Returns `percent`% of `base`.
pub fn amount_from_percent(base: Decimal, percent: Decimal) -> Decimal {
    base * percent / Decimal::from(100)
}

/// Returns `amount` as a percentage of `base`.
///
/// A zero or negative base yields 0 rather than a division failure; the form
/// layer renders that as an empty percentage field.
pub fn percent_from_amount(base: Decimal, amount: Decimal) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    amount / base * Decimal::from(100)
}
