//! Exact decimal handling for monetary and quantity fields.
//!
//! Amounts never pass through native floats; anything that cannot be read as
//! a non-negative decimal is a hard error for the computation at hand rather
//! than a silent zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// A monetary or quantity field that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("could not parse '{value}' as a decimal {field}")]
    Unparseable { field: &'static str, value: String },
    #[error("{field} must not be negative (found {value})")]
    Negative { field: &'static str, value: Decimal },
}

/// Parse a field captured from a document in textual form.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, AmountError> {
    let value: Decimal = raw.trim().parse().map_err(|_| AmountError::Unparseable {
        field,
        value: raw.to_string(),
    })?;
    non_negative(field, value)
}

/// Reject negative values on fields that represent quantities or prices.
pub fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, AmountError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative { field, value });
    }
    Ok(value)
}

/// Round to two decimal places for presentation. Internal arithmetic stays
/// unrounded so sums balance exactly.
pub fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
