use crate::domain::card::CardSnapshot;
use crate::domain::currency::CurrencyCode;
use crate::domain::enrollment::{
    Applicant, ApplicationStatus, CardApplication, ReviewDecision, SalarySlip,
};
use crate::domain::ports::{
    ApplicationReview, CardApplications, CardLookup, PaymentProcessor, RateLookup,
    TransactionHistory,
};
use crate::domain::transaction::{PaymentRequest, ProcessingReceipt, TransactionRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cards keyed by user id.
///
/// Uses `Arc<RwLock<HashMap<String, CardSnapshot>>>` so clones share the same data.
#[derive(Default, Clone)]
pub struct InMemoryCardLookup {
    cards: Arc<RwLock<HashMap<String, CardSnapshot>>>,
}

impl InMemoryCardLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: &str, card: CardSnapshot) {
        self.cards.write().await.insert(user_id.to_string(), card);
    }
}

#[async_trait]
impl CardLookup for InMemoryCardLookup {
    async fn card(&self, user_id: &str) -> Result<CardSnapshot> {
        let cards = self.cards.read().await;
        cards
            .get(user_id)
            .cloned()
            .ok_or_else(|| PaymentError::CardError(format!("No card for user {user_id}")))
    }
}

/// Fixed rates keyed by currency. Unknown currencies fail the lookup.
#[derive(Default, Clone)]
pub struct InMemoryRateLookup {
    rates: Arc<RwLock<HashMap<CurrencyCode, Decimal>>>,
}

impl InMemoryRateLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_rate(&self, code: CurrencyCode, rate: Decimal) {
        self.rates.write().await.insert(code, rate);
    }
}

#[async_trait]
impl RateLookup for InMemoryRateLookup {
    async fn rate(&self, code: CurrencyCode) -> Result<Decimal> {
        let rates = self.rates.read().await;
        rates
            .get(&code)
            .copied()
            .ok_or_else(|| PaymentError::ConversionError(format!("No rate for {code}")))
    }
}

#[derive(Default)]
struct ProcessorState {
    requests: Vec<PaymentRequest>,
    rejections: VecDeque<String>,
    reference: Option<String>,
}

/// Records every charge and accepts it unless a rejection has been queued.
#[derive(Default, Clone)]
pub struct InMemoryPaymentProcessor {
    state: Arc<RwLock<ProcessorState>>,
}

impl InMemoryPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next charge fail with `message`. An empty message stands for
    /// a backend error without a body.
    pub async fn reject_next(&self, message: &str) {
        self.state
            .write()
            .await
            .rejections
            .push_back(message.to_string());
    }

    /// Reference returned with every accepted charge.
    pub async fn set_reference(&self, reference: &str) {
        self.state.write().await.reference = Some(reference.to_string());
    }

    pub async fn requests(&self) -> Vec<PaymentRequest> {
        self.state.read().await.requests.clone()
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryPaymentProcessor {
    async fn process(&self, request: &PaymentRequest) -> Result<ProcessingReceipt> {
        let mut state = self.state.write().await;
        state.requests.push(request.clone());
        match state.rejections.pop_front() {
            Some(message) => Err(PaymentError::ProcessingError(message)),
            None => Ok(ProcessingReceipt {
                reference: state.reference.clone(),
            }),
        }
    }
}

/// Transaction history keyed by user id, in insertion order.
#[derive(Default, Clone)]
pub struct InMemoryTransactionHistory {
    records: Arc<RwLock<HashMap<String, Vec<TransactionRecord>>>>,
}

impl InMemoryTransactionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, user_id: &str, record: TransactionRecord) {
        self.records
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(record);
    }
}

#[async_trait]
impl TransactionHistory for InMemoryTransactionHistory {
    async fn transactions(&self, user_id: &str) -> Result<Vec<TransactionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(user_id).cloned().unwrap_or_default())
    }

    async fn transactions_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TransactionRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|record| {
                record
                    .timestamp()
                    .map(|ts| ts.date() >= from && ts.date() <= to)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct ApplicationsState {
    submitted: Vec<(String, CardApplication, SalarySlip)>,
    rejections: VecDeque<String>,
}

/// Accepts card applications and keeps them for inspection.
#[derive(Default, Clone)]
pub struct InMemoryCardApplications {
    state: Arc<RwLock<ApplicationsState>>,
}

impl InMemoryCardApplications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next application fail with `message`.
    pub async fn reject_next(&self, message: &str) {
        self.state
            .write()
            .await
            .rejections
            .push_back(message.to_string());
    }

    pub async fn submitted(&self) -> Vec<(String, CardApplication, SalarySlip)> {
        self.state.read().await.submitted.clone()
    }
}

#[async_trait]
impl CardApplications for InMemoryCardApplications {
    async fn apply(
        &self,
        user_id: &str,
        application: &CardApplication,
        salary_slip: &SalarySlip,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(message) = state.rejections.pop_front() {
            return Err(PaymentError::ApplicationError(message));
        }
        state.submitted.push((
            user_id.to_string(),
            application.clone(),
            salary_slip.clone(),
        ));
        Ok(())
    }
}

#[derive(Default)]
struct ReviewState {
    applicants: HashMap<u64, (ApplicationStatus, Applicant)>,
    slips: HashMap<u64, Vec<u8>>,
    unavailable: Vec<ApplicationStatus>,
}

/// Applicants keyed by id, each with its review status.
///
/// Deciding on an applicant moves it out of `Pending`, as the backend does.
#[derive(Default, Clone)]
pub struct InMemoryApplicationReview {
    state: Arc<RwLock<ReviewState>>,
}

impl InMemoryApplicationReview {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, status: ApplicationStatus, applicant: Applicant) {
        self.state
            .write()
            .await
            .applicants
            .insert(applicant.id, (status, applicant));
    }

    pub async fn attach_slip(&self, applicant_id: u64, bytes: Vec<u8>) {
        self.state.write().await.slips.insert(applicant_id, bytes);
    }

    /// Makes listings for `status` fail.
    pub async fn make_unavailable(&self, status: ApplicationStatus) {
        self.state.write().await.unavailable.push(status);
    }

    pub async fn status_of(&self, applicant_id: u64) -> Option<ApplicationStatus> {
        self.state
            .read()
            .await
            .applicants
            .get(&applicant_id)
            .map(|(status, _)| *status)
    }
}

#[async_trait]
impl ApplicationReview for InMemoryApplicationReview {
    async fn applicants(&self, status: ApplicationStatus) -> Result<Vec<Applicant>> {
        let state = self.state.read().await;
        if state.unavailable.contains(&status) {
            return Err(PaymentError::ApplicationError(format!(
                "Listing {status} applicants failed"
            )));
        }
        let mut applicants: Vec<Applicant> = state
            .applicants
            .values()
            .filter(|(current, _)| *current == status)
            .map(|(_, applicant)| applicant.clone())
            .collect();
        applicants.sort_by_key(|applicant| applicant.id);
        Ok(applicants)
    }

    async fn decide(&self, applicant_id: u64, decision: ReviewDecision) -> Result<()> {
        let mut state = self.state.write().await;
        let Some((status, _)) = state.applicants.get_mut(&applicant_id) else {
            return Err(PaymentError::ApplicationError(format!(
                "No applicant {applicant_id}"
            )));
        };
        *status = match decision {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        };
        Ok(())
    }

    async fn salary_slip(&self, applicant_id: u64) -> Result<Vec<u8>> {
        let state = self.state.read().await;
        state.slips.get(&applicant_id).cloned().ok_or_else(|| {
            PaymentError::ApplicationError("Document not available for this user.".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionStatus;
    use rust_decimal_macros::dec;

    fn record(id: u64, date: &str) -> TransactionRecord {
        TransactionRecord {
            id,
            date: date.to_string(),
            merchant: "Store".to_string(),
            amount: dec!(10),
            status: TransactionStatus::Success,
            current_balance: dec!(100),
        }
    }

    #[tokio::test]
    async fn test_in_memory_card_lookup() {
        let cards = InMemoryCardLookup::new();
        let card = CardSnapshot {
            id: 1,
            card_number: "1111222233334444".to_string(),
            balance: dec!(10),
            currency: None,
        };
        cards.insert("u1", card.clone()).await;

        assert_eq!(cards.card("u1").await.unwrap(), card);
        assert!(matches!(
            cards.card("u2").await,
            Err(PaymentError::CardError(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_rate_lookup() {
        let rates = InMemoryRateLookup::new();
        rates.set_rate(CurrencyCode::Gbp, dec!(105.2)).await;

        assert_eq!(rates.rate(CurrencyCode::Gbp).await.unwrap(), dec!(105.2));
        assert!(matches!(
            rates.rate(CurrencyCode::Jpy).await,
            Err(PaymentError::ConversionError(_))
        ));
    }

    #[tokio::test]
    async fn test_processor_rejections_are_consumed_in_order() {
        let processor = InMemoryPaymentProcessor::new();
        processor.reject_next("first").await;
        let request = PaymentRequest {
            card_id: 1,
            pin: "1234".to_string(),
            amount: dec!(5),
            merchant: "Shop".to_string(),
            currency_code: CurrencyCode::Usd,
            user_id: "u1".to_string(),
        };

        assert!(matches!(
            processor.process(&request).await,
            Err(PaymentError::ProcessingError(ref m)) if m == "first"
        ));
        assert!(processor.process(&request).await.is_ok());
        assert_eq!(processor.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_history_between_dates() {
        let history = InMemoryTransactionHistory::new();
        history.push("u1", record(1, "2025-01-10")).await;
        history.push("u1", record(2, "2025-02-10T09:00:00")).await;
        history.push("u1", record(3, "2025-03-10")).await;

        let from = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let found = history.transactions_between("u1", from, to).await.unwrap();

        assert_eq!(found.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3]);
        assert!(history.transactions("u2").await.unwrap().is_empty());
    }
}
