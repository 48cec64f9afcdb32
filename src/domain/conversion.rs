use crate::error::PaymentError;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

/// Convenience fee charged on top of every converted amount.
pub const FEE_RATE: Decimal = dec!(0.02);

static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*\.?[0-9]{0,4}$").expect("static pattern is valid"));

/// Checks whether `text` is acceptable as amount input.
///
/// Partial input such as `"12."` or `"."` is accepted so the field can be typed
/// character by character; at most four fractional digits are allowed.
pub fn is_valid_amount_text(text: &str) -> bool {
    text.is_empty() || AMOUNT_PATTERN.is_match(text)
}

/// Checks amount input before it is stored in a draft.
///
/// Besides the pattern, the number must fit in a `Decimal`; blank and
/// incomplete input such as `"."` passes.
pub fn validate_amount_text(text: &str) -> Result<(), PaymentError> {
    if !is_valid_amount_text(text) {
        return Err(PaymentError::validation(format!("Invalid amount: {text}")));
    }
    if text.chars().any(|c| c.is_ascii_digit()) && parse_amount(text).is_none() {
        return Err(PaymentError::validation("Amount is too large"));
    }
    Ok(())
}

/// Parses accepted amount text into a decimal.
///
/// Returns `None` for blank or incomplete input that does not denote a number,
/// and for numbers too large to represent.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    if !is_valid_amount_text(text) {
        return None;
    }
    let trimmed = text.strip_suffix('.').unwrap_or(text);
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.starts_with('.') {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    };
    Decimal::from_str(&normalized).ok()
}

/// Parses amount text and keeps it only if strictly positive.
pub fn positive_amount(text: &str) -> Option<Decimal> {
    parse_amount(text).filter(|amount| *amount > Decimal::ZERO)
}

/// The INR breakdown shown before a payment is charged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionResult {
    pub converted_amount: Decimal,
    pub fee_amount: Decimal,
    pub total_amount: Decimal,
}

impl ConversionResult {
    pub const ZERO: Self = Self {
        converted_amount: Decimal::ZERO,
        fee_amount: Decimal::ZERO,
        total_amount: Decimal::ZERO,
    };

    /// Computes the breakdown for `amount` at `rate`.
    ///
    /// The fee is 2% of the converted amount rounded to four places, and the
    /// total is rounded to two. Non-positive amounts yield [`ConversionResult::ZERO`].
    /// A product or total beyond `Decimal::MAX` is a `ConversionError`.
    pub fn compute(amount: Decimal, rate: Decimal) -> Result<Self, PaymentError> {
        if amount <= Decimal::ZERO {
            return Ok(Self::ZERO);
        }
        let overflow = || {
            PaymentError::ConversionError(format!("Amount {amount} is too large to convert"))
        };
        let converted = amount.checked_mul(rate).ok_or_else(overflow)?;
        let fee = round_half_up(converted.checked_mul(FEE_RATE).ok_or_else(overflow)?, 4);
        let total = converted.checked_add(fee).ok_or_else(overflow)?;
        Ok(Self {
            converted_amount: round_half_up(converted, 4),
            fee_amount: fee,
            total_amount: round_half_up(total, 2),
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// A rate quoted by the backend: INR per one unit of the selected currency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Rate(Decimal);

impl Rate {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ConversionError(format!(
                "Rate must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
