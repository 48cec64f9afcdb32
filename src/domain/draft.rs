use crate::domain::currency::CurrencyCode;

/// The user's uncommitted payment input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentDraft {
    pub amount_text: String,
    pub currency_code: CurrencyCode,
    pub merchant: String,
    pub pin: String,
}

impl PaymentDraft {
    /// Clears the entered fields. The selected currency is kept.
    pub fn reset(&mut self) {
        self.amount_text.clear();
        self.merchant.clear();
        self.pin.clear();
    }

    /// Names the first required field that is still empty.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.pin.is_empty() {
            Some("pin")
        } else if self.amount_text.is_empty() {
            Some("amount")
        } else if self.merchant.trim().is_empty() {
            Some("merchant")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_currency() {
        let mut draft = PaymentDraft {
            amount_text: "10".to_string(),
            currency_code: CurrencyCode::Eur,
            merchant: "Amazon".to_string(),
            pin: "1234".to_string(),
        };
        draft.reset();
        assert!(draft.amount_text.is_empty());
        assert!(draft.merchant.is_empty());
        assert!(draft.pin.is_empty());
        assert_eq!(draft.currency_code, CurrencyCode::Eur);
    }

    #[test]
    fn test_missing_field() {
        let mut draft = PaymentDraft::default();
        assert_eq!(draft.missing_field(), Some("pin"));
        draft.pin = "1234".to_string();
        draft.amount_text = "5".to_string();
        assert_eq!(draft.missing_field(), Some("merchant"));
        draft.merchant = "   ".to_string();
        assert_eq!(draft.missing_field(), Some("merchant"));
        draft.merchant = "Netflix".to_string();
        assert_eq!(draft.missing_field(), None);
    }
}
