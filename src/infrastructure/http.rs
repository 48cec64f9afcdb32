use crate::config::Config;
use crate::domain::card::CardSnapshot;
use crate::domain::currency::CurrencyCode;
use crate::domain::enrollment::{
    Applicant, ApplicationStatus, CardApplication, ReviewDecision, SalarySlip,
};
use crate::domain::ports::{
    ApplicationReview, CardApplications, CardLookup, PaymentProcessor, RateLookup,
    TransactionHistory,
};
use crate::domain::session::SessionContext;
use crate::domain::transaction::{PaymentRequest, ProcessingReceipt, TransactionRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";
const APPLICATION_SERVER_ERROR: &str = "Internal server error. Please try again later.";
const APPLICATION_FAILED: &str = "An error occurred while submitting your application.";
const DOCUMENT_UNAVAILABLE: &str = "Document not available for this user.";

#[derive(Serialize)]
struct CardRef<'a> {
    id: u64,
    pin: &'a str,
}

#[derive(Serialize)]
struct CurrencyBody {
    code: CurrencyCode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessPaymentBody<'a> {
    forex_card: CardRef<'a>,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    merchant: &'a str,
    currency: CurrencyBody,
}

impl<'a> From<&'a PaymentRequest> for ProcessPaymentBody<'a> {
    fn from(request: &'a PaymentRequest) -> Self {
        Self {
            forex_card: CardRef {
                id: request.card_id,
                pin: &request.pin,
            },
            amount: request.amount,
            merchant: &request.merchant,
            currency: CurrencyBody {
                code: request.currency_code,
            },
        }
    }
}

/// Client for the forex-card backend.
///
/// Implements every collaborator port over HTTP. The session's bearer token,
/// when present, is attached to every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config, session: &SessionContext) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(bearer) = session.bearer() {
            let value = HeaderValue::from_str(&bearer)
                .map_err(|_| PaymentError::validation("Auth token contains invalid characters"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(concat!("forexpay/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GETs `path` and decodes a success body as `T`.
    ///
    /// The outer error is transport or decoding; the inner one is the
    /// backend's message for a non-success status.
    async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<std::result::Result<T, String>>
    where
        T: DeserializeOwned,
    {
        debug!(method = "GET", path, "request");
        let response = self.client.get(self.url(path)).query(query).send().await?;
        let status = response.status();
        debug!(path, %status, "response");

        if status.is_success() {
            Ok(Ok(response.json::<T>().await?))
        } else {
            Ok(Err(error_message(response)
                .await
                .unwrap_or_else(|| format!("HTTP {status}"))))
        }
    }
}

/// Pulls a user-facing message out of an error response.
///
/// The backend answers either with `{"message": ...}`, a JSON string, or plain
/// text. Anything else yields `None`.
async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    message_from_body(&body)
}

fn message_from_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string),
        Ok(Value::String(message)) if !message.trim().is_empty() => Some(message),
        Ok(_) => None,
        Err(_) => Some(body.to_string()),
    }
}

/// Backend-assigned identifier of a processed transaction, if the success
/// body carries one.
fn reference_from_body(body: &str) -> Option<String> {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return None;
    };
    ["transactionId", "id"]
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
}

#[async_trait]
impl CardLookup for ApiClient {
    async fn card(&self, user_id: &str) -> Result<CardSnapshot> {
        self.get_json(&format!("/card/{user_id}"), &[])
            .await?
            .map_err(PaymentError::CardError)
    }
}

#[async_trait]
impl RateLookup for ApiClient {
    async fn rate(&self, code: CurrencyCode) -> Result<Decimal> {
        self.get_json(&format!("/currency/{code}"), &[])
            .await?
            .map_err(PaymentError::ConversionError)
    }
}

#[async_trait]
impl PaymentProcessor for ApiClient {
    async fn process(&self, request: &PaymentRequest) -> Result<ProcessingReceipt> {
        let path = "/transaction/process";
        debug!(method = "POST", path, merchant = %request.merchant, "request");

        let response = self
            .client
            .post(self.url(path))
            .query(&[("userId", request.user_id.as_str())])
            .json(&ProcessPaymentBody::from(request))
            .send()
            .await?;
        let status = response.status();
        debug!(path, %status, "response");

        match status {
            StatusCode::NO_CONTENT => Ok(ProcessingReceipt::default()),
            status if status.is_success() => {
                let body = response.text().await?;
                Ok(ProcessingReceipt {
                    reference: reference_from_body(&body),
                })
            }
            _ => {
                // An empty message makes the caller fall back to its generic text.
                let message = error_message(response).await.unwrap_or_default();
                Err(PaymentError::ProcessingError(message))
            }
        }
    }
}

#[async_trait]
impl TransactionHistory for ApiClient {
    async fn transactions(&self, user_id: &str) -> Result<Vec<TransactionRecord>> {
        self.get_json(&format!("/transaction/{user_id}"), &[])
            .await?
            .map_err(PaymentError::validation)
    }

    async fn transactions_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TransactionRecord>> {
        let query = [
            ("userId", user_id.to_string()),
            ("startDate", from.format(DATE_FORMAT).to_string()),
            ("endDate", to.format(DATE_FORMAT).to_string()),
        ];
        self.get_json("/transaction/transactionsByDate", &query)
            .await?
            .map_err(PaymentError::validation)
    }
}

fn listing_path(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "/admin/pending",
        ApplicationStatus::Approved => "/user/approved",
        ApplicationStatus::Rejected => "/user/rejected",
    }
}

fn decision_path(applicant_id: u64, decision: ReviewDecision) -> String {
    match decision {
        ReviewDecision::Approve => format!("/admin/approve/{applicant_id}"),
        ReviewDecision::Reject => format!("/admin/reject/{applicant_id}"),
    }
}

#[async_trait]
impl CardApplications for ApiClient {
    async fn apply(
        &self,
        user_id: &str,
        application: &CardApplication,
        salary_slip: &SalarySlip,
    ) -> Result<()> {
        let path = format!("/apply/{user_id}");
        let details = serde_json::to_string(application)
            .map_err(|err| PaymentError::validation(format!("Invalid application: {err}")))?;
        let form = Form::new()
            .part("userDetails", Part::text(details).mime_str("application/json")?)
            .part(
                "salarySlip",
                Part::bytes(salary_slip.bytes.clone())
                    .file_name(salary_slip.file_name.clone())
                    .mime_str("application/pdf")?,
            );

        debug!(method = "PUT", path = %path, "request");
        let response = self.client.put(self.url(&path)).multipart(form).send().await?;
        let status = response.status();
        debug!(path = %path, %status, "response");

        match status {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => {
                let message = error_message(response)
                    .await
                    .unwrap_or_else(|| APPLICATION_FAILED.to_string());
                Err(PaymentError::ApplicationError(message))
            }
            StatusCode::INTERNAL_SERVER_ERROR => Err(PaymentError::ApplicationError(
                APPLICATION_SERVER_ERROR.to_string(),
            )),
            _ => Err(PaymentError::ApplicationError(APPLICATION_FAILED.to_string())),
        }
    }
}

#[async_trait]
impl ApplicationReview for ApiClient {
    async fn applicants(&self, status: ApplicationStatus) -> Result<Vec<Applicant>> {
        self.get_json(listing_path(status), &[])
            .await?
            .map_err(PaymentError::ApplicationError)
    }

    async fn decide(&self, applicant_id: u64, decision: ReviewDecision) -> Result<()> {
        let path = decision_path(applicant_id, decision);
        debug!(method = "PUT", path = %path, "request");
        let response = self.client.put(self.url(&path)).send().await?;
        let status = response.status();
        debug!(path = %path, %status, "response");

        if status.is_success() {
            return Ok(());
        }
        let verb = match decision {
            ReviewDecision::Approve => "approve",
            ReviewDecision::Reject => "reject",
        };
        let message = error_message(response)
            .await
            .unwrap_or_else(|| format!("Failed to {verb} user."));
        Err(PaymentError::ApplicationError(message))
    }

    async fn salary_slip(&self, applicant_id: u64) -> Result<Vec<u8>> {
        let path = format!("/card/document/{applicant_id}");
        debug!(method = "GET", path = %path, "request");
        let response = self
            .client
            .get(self.url(&path))
            .header(ACCEPT, "application/pdf")
            .send()
            .await?;
        let status = response.status();
        debug!(path = %path, %status, "response");

        if !status.is_success() {
            return Err(PaymentError::ApplicationError(DOCUMENT_UNAVAILABLE.to_string()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_message_from_json_object() {
        assert_eq!(
            message_from_body(r#"{"message": "Invalid PIN", "status": 400}"#).as_deref(),
            Some("Invalid PIN")
        );
        assert_eq!(message_from_body(r#"{"status": 500}"#), None);
        assert_eq!(message_from_body(r#"{"message": "  "}"#), None);
    }

    #[test]
    fn test_message_from_plain_text() {
        assert_eq!(
            message_from_body("Insufficient balance\n").as_deref(),
            Some("Insufficient balance")
        );
        assert_eq!(
            message_from_body(r#""Card blocked""#).as_deref(),
            Some("Card blocked")
        );
        assert_eq!(message_from_body("   "), None);
        assert_eq!(message_from_body("42"), None);
    }

    #[test]
    fn test_reference_from_body() {
        assert_eq!(
            reference_from_body(r#"{"transactionId": "TXN-1", "id": 9}"#).as_deref(),
            Some("TXN-1")
        );
        assert_eq!(reference_from_body(r#"{"id": 9}"#).as_deref(), Some("9"));
        assert_eq!(reference_from_body("Payment successful"), None);
        assert_eq!(reference_from_body(""), None);
    }

    #[test]
    fn test_review_paths() {
        assert_eq!(listing_path(ApplicationStatus::Pending), "/admin/pending");
        assert_eq!(listing_path(ApplicationStatus::Rejected), "/user/rejected");
        assert_eq!(decision_path(4, ReviewDecision::Approve), "/admin/approve/4");
        assert_eq!(decision_path(4, ReviewDecision::Reject), "/admin/reject/4");
    }

    #[test]
    fn test_process_body_shape() {
        let request = PaymentRequest {
            card_id: 5,
            pin: "1234".to_string(),
            amount: dec!(12.5),
            merchant: "Netflix".to_string(),
            currency_code: CurrencyCode::Eur,
            user_id: "9".to_string(),
        };
        let body = serde_json::to_value(ProcessPaymentBody::from(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "forexCard": {"id": 5, "pin": "1234"},
                "amount": 12.5,
                "merchant": "Netflix",
                "currency": {"code": "EUR"}
            })
        );
    }
}
