use super::card::CardSnapshot;
use super::currency::CurrencyCode;
use super::enrollment::{Applicant, ApplicationStatus, CardApplication, ReviewDecision, SalarySlip};
use super::transaction::{PaymentRequest, ProcessingReceipt, TransactionRecord};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

#[async_trait]
pub trait CardLookup: Send + Sync {
    async fn card(&self, user_id: &str) -> Result<CardSnapshot>;
}

#[async_trait]
pub trait RateLookup: Send + Sync {
    /// INR value of one unit of `code`.
    async fn rate(&self, code: CurrencyCode) -> Result<Decimal>;
}

/// Charges the card.
///
/// A rejected charge is reported as `PaymentError::ProcessingError` carrying the
/// message the user should see.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn process(&self, request: &PaymentRequest) -> Result<ProcessingReceipt>;
}

#[async_trait]
pub trait TransactionHistory: Send + Sync {
    async fn transactions(&self, user_id: &str) -> Result<Vec<TransactionRecord>>;
    async fn transactions_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TransactionRecord>>;
}

/// Submits forex card applications on behalf of a user.
#[async_trait]
pub trait CardApplications: Send + Sync {
    async fn apply(
        &self,
        user_id: &str,
        application: &CardApplication,
        salary_slip: &SalarySlip,
    ) -> Result<()>;
}

/// Administrator view of card applications.
#[async_trait]
pub trait ApplicationReview: Send + Sync {
    async fn applicants(&self, status: ApplicationStatus) -> Result<Vec<Applicant>>;
    async fn decide(&self, applicant_id: u64, decision: ReviewDecision) -> Result<()>;
    async fn salary_slip(&self, applicant_id: u64) -> Result<Vec<u8>>;
}

pub type CardLookupRef = Arc<dyn CardLookup>;
pub type RateLookupRef = Arc<dyn RateLookup>;
pub type PaymentProcessorRef = Arc<dyn PaymentProcessor>;
pub type TransactionHistoryRef = Arc<dyn TransactionHistory>;
pub type CardApplicationsRef = Arc<dyn CardApplications>;
pub type ApplicationReviewRef = Arc<dyn ApplicationReview>;
