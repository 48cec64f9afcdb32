use crate::domain::currency::CurrencyCode;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A charge handed to the payment processor.
#[derive(Debug, PartialEq, Clone)]
pub struct PaymentRequest {
    pub card_id: u64,
    pub pin: String,
    pub amount: Decimal,
    pub merchant: String,
    pub currency_code: CurrencyCode,
    pub user_id: String,
}

/// What the processor returned for an accepted charge.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ProcessingReceipt {
    /// Identifier assigned by the backend, when the response carried one.
    pub reference: Option<String>,
}

/// Reference shown to the user after a successful payment.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TransactionRef {
    /// Issued by the backend; can be quoted to support.
    Backend(String),
    /// Generated locally for display only. It identifies nothing server-side.
    DisplayOnly(String),
}

impl TransactionRef {
    pub fn from_receipt(receipt: &ProcessingReceipt) -> Self {
        match &receipt.reference {
            Some(reference) => Self::Backend(reference.clone()),
            None => Self::display_only(),
        }
    }

    pub fn display_only() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        Self::DisplayOnly(token.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Backend(reference) | Self::DisplayOnly(reference) => reference,
        }
    }

    pub fn is_backend_issued(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the last submission.
#[derive(Debug, PartialEq, Clone)]
pub enum PaymentOutcome {
    Success {
        transaction_ref: TransactionRef,
        timestamp: DateTime<Local>,
        merchant: String,
        total_amount: Decimal,
    },
    Failure {
        reason: String,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Success,
    Failed,
    #[serde(other)]
    Other,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Other => "OTHER",
        }
    }
}

/// One row of the user's transaction history.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: u64,
    pub date: String,
    pub merchant: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
}

impl TransactionRecord {
    /// Parses the backend's date, which is either an ISO date-time or a bare date.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.date.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_only_reference_shape() {
        let reference = TransactionRef::display_only();
        assert!(!reference.is_backend_issued());
        assert_eq!(reference.as_str().len(), 8);
        assert!(
            reference
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_reference_prefers_backend_id() {
        let receipt = ProcessingReceipt {
            reference: Some("TXN-991".to_string()),
        };
        assert_eq!(
            TransactionRef::from_receipt(&receipt),
            TransactionRef::Backend("TXN-991".to_string())
        );
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"{"id": 3, "date": "2025-04-02T10:15:00", "merchant": "Netflix",
            "amount": 649.0, "status": "SUCCESS", "currentBalance": 9351.0}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, TransactionStatus::Success);
        assert_eq!(record.current_balance, dec!(9351));
        assert!(record.timestamp().is_some());
    }

    #[test]
    fn test_unknown_status_is_other() {
        let json = r#"{"id": 3, "date": "2025-04-02", "merchant": "X",
            "amount": 1, "status": "PENDING", "currentBalance": 0}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, TransactionStatus::Other);
    }

    #[test]
    fn test_timestamp_formats() {
        let mut record = TransactionRecord {
            id: 1,
            date: "2025-04-02".to_string(),
            merchant: "X".to_string(),
            amount: dec!(1),
            status: TransactionStatus::Success,
            current_balance: dec!(0),
        };
        assert!(record.timestamp().is_some());
        record.date = "2025-04-02 08:00:00".to_string();
        assert!(record.timestamp().is_some());
        record.date = "yesterday".to_string();
        assert!(record.timestamp().is_none());
    }
}
