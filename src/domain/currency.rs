use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The currencies a payment can be entered in.
///
/// The set is fixed; the backend quotes each of them against INR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Inr,
    Aud,
    Cad,
    Chf,
    Cny,
    Sgd,
    Nzd,
    Zar,
    Aed,
    Sar,
    Hkd,
    Sek,
    Nok,
    Dkk,
    Krw,
    Thb,
    Mxn,
    Brl,
    Rub,
    Try,
    Idr,
    Myr,
    Php,
    Pln,
    Twd,
    Vnd,
}

impl CurrencyCode {
    /// All selectable codes, in display order.
    pub const ALL: [CurrencyCode; 30] = [
        Self::Usd,
        Self::Eur,
        Self::Gbp,
        Self::Jpy,
        Self::Inr,
        Self::Aud,
        Self::Cad,
        Self::Chf,
        Self::Cny,
        Self::Sgd,
        Self::Nzd,
        Self::Zar,
        Self::Aed,
        Self::Sar,
        Self::Hkd,
        Self::Sek,
        Self::Nok,
        Self::Dkk,
        Self::Krw,
        Self::Thb,
        Self::Mxn,
        Self::Brl,
        Self::Rub,
        Self::Try,
        Self::Idr,
        Self::Myr,
        Self::Php,
        Self::Pln,
        Self::Twd,
        Self::Vnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Inr => "INR",
            Self::Aud => "AUD",
            Self::Cad => "CAD",
            Self::Chf => "CHF",
            Self::Cny => "CNY",
            Self::Sgd => "SGD",
            Self::Nzd => "NZD",
            Self::Zar => "ZAR",
            Self::Aed => "AED",
            Self::Sar => "SAR",
            Self::Hkd => "HKD",
            Self::Sek => "SEK",
            Self::Nok => "NOK",
            Self::Dkk => "DKK",
            Self::Krw => "KRW",
            Self::Thb => "THB",
            Self::Mxn => "MXN",
            Self::Brl => "BRL",
            Self::Rub => "RUB",
            Self::Try => "TRY",
            Self::Idr => "IDR",
            Self::Myr => "MYR",
            Self::Php => "PHP",
            Self::Pln => "PLN",
            Self::Twd => "TWD",
            Self::Vnd => "VND",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Usd => "United States Dollar",
            Self::Eur => "Euro",
            Self::Gbp => "British Pound Sterling",
            Self::Jpy => "Japanese Yen",
            Self::Inr => "Indian Rupee",
            Self::Aud => "Australian Dollar",
            Self::Cad => "Canadian Dollar",
            Self::Chf => "Swiss Franc",
            Self::Cny => "Chinese Yuan",
            Self::Sgd => "Singapore Dollar",
            Self::Nzd => "New Zealand Dollar",
            Self::Zar => "South African Rand",
            Self::Aed => "United Arab Emirates Dirham",
            Self::Sar => "Saudi Riyal",
            Self::Hkd => "Hong Kong Dollar",
            Self::Sek => "Swedish Krona",
            Self::Nok => "Norwegian Krone",
            Self::Dkk => "Danish Krone",
            Self::Krw => "South Korean Won",
            Self::Thb => "Thai Baht",
            Self::Mxn => "Mexican Peso",
            Self::Brl => "Brazilian Real",
            Self::Rub => "Russian Ruble",
            Self::Try => "Turkish Lira",
            Self::Idr => "Indonesian Rupiah",
            Self::Myr => "Malaysian Ringgit",
            Self::Php => "Philippine Peso",
            Self::Pln => "Polish Zloty",
            Self::Twd => "New Taiwan Dollar",
            Self::Vnd => "Vietnamese Dong",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Jpy | Self::Cny => "¥",
            Self::Inr => "₹",
            Self::Aud => "A$",
            Self::Cad => "C$",
            Self::Chf => "CHF",
            Self::Sgd => "S$",
            Self::Nzd => "NZ$",
            Self::Zar => "R",
            Self::Aed => "د.إ",
            Self::Sar => "﷼",
            Self::Hkd => "HK$",
            Self::Sek | Self::Nok | Self::Dkk => "kr",
            Self::Krw => "₩",
            Self::Thb => "฿",
            Self::Mxn => "MX$",
            Self::Brl => "R$",
            Self::Rub => "₽",
            Self::Try => "₺",
            Self::Idr => "Rp",
            Self::Myr => "RM",
            Self::Php => "₱",
            Self::Pln => "zł",
            Self::Twd => "NT$",
            Self::Vnd => "₫",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PaymentError::validation(format!("Unsupported currency: {wanted}")))
    }
}
