use crate::domain::currency::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
struct CurrencyRef {
    code: String,
}

/// Reads `currency: {code}`. Codes outside the catalog are dropped.
fn known_currency<'de, D>(deserializer: D) -> Result<Option<CurrencyCode>, D::Error>
where
    D: Deserializer<'de>,
{
    let currency = Option::<CurrencyRef>::deserialize(deserializer)?;
    Ok(currency.and_then(|currency| currency.code.parse().ok()))
}

/// The user's forex card as reported by the backend.
///
/// Read-only on the client; the backend owns the balance and updates it after
/// a successful charge.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub id: u64,
    pub card_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(default, deserialize_with = "known_currency")]
    pub currency: Option<CurrencyCode>,
}

impl CardSnapshot {
    /// The card's denomination. Cards without one are treated as INR.
    pub fn currency_code(&self) -> CurrencyCode {
        self.currency.unwrap_or(CurrencyCode::Inr)
    }

    /// Card number with everything but the last four digits hidden.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(|c| !c.is_whitespace()).collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("•••• •••• •••• {tail}")
    }
}
