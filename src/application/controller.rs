use crate::application::progress::ProgressTicker;
use crate::config::Config;
use crate::domain::card::CardSnapshot;
use crate::domain::conversion::{ConversionResult, Rate, positive_amount, validate_amount_text};
use crate::domain::currency::CurrencyCode;
use crate::domain::draft::PaymentDraft;
use crate::domain::ports::{CardLookupRef, PaymentProcessorRef, RateLookup, RateLookupRef};
use crate::domain::session::SessionContext;
use crate::domain::transaction::{PaymentOutcome, PaymentRequest, TransactionRef};
use crate::error::{PaymentError, Result};
use chrono::Local;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const GENERIC_FAILURE_MESSAGE: &str = "Payment failed. Please try again.";
pub const CARD_FETCH_FAILED_MESSAGE: &str = "Error fetching card info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Converting,
    ReadyToPay,
    Processing,
    Succeeded,
    Failed,
}

/// Looks up the rate for `code` and prices `amount` in INR.
///
/// A missing or non-positive amount short-circuits to [`ConversionResult::ZERO`]
/// without touching the rate service.
pub async fn convert(
    rates: &dyn RateLookup,
    amount: Option<Decimal>,
    code: CurrencyCode,
) -> Result<ConversionResult> {
    let Some(amount) = amount.filter(|amount| *amount > Decimal::ZERO) else {
        return Ok(ConversionResult::ZERO);
    };
    let rate = Rate::try_from(rates.rate(code).await?)?;
    ConversionResult::compute(amount, rate.value())
}

/// A rate lookup issued for one (amount, currency) pair.
///
/// Requests can be resolved on any task. Only the response to the most
/// recently issued request is applied by the controller.
pub struct ConversionRequest {
    id: u64,
    amount: Decimal,
    code: CurrencyCode,
    rates: RateLookupRef,
}

impl ConversionRequest {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn code(&self) -> CurrencyCode {
        self.code
    }

    pub async fn resolve(self) -> ConversionResponse {
        let result = convert(self.rates.as_ref(), Some(self.amount), self.code).await;
        ConversionResponse {
            id: self.id,
            result,
        }
    }
}

pub struct ConversionResponse {
    id: u64,
    result: Result<ConversionResult>,
}

impl ConversionResponse {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Drives the payment form: keeps the draft, the derived INR conversion and
/// the submission lifecycle in one place.
///
/// `PaymentFormController` owns all of its state. Collaborators are injected at
/// construction together with the session, so nothing is read from ambient
/// storage.
pub struct PaymentFormController {
    session: SessionContext,
    config: Config,
    cards: CardLookupRef,
    rates: RateLookupRef,
    processor: PaymentProcessorRef,
    state: FormState,
    draft: PaymentDraft,
    card: Option<CardSnapshot>,
    conversion: ConversionResult,
    conversion_error: Option<String>,
    latest_request: u64,
    message: Option<String>,
    outcome: Option<PaymentOutcome>,
    progress: watch::Sender<u8>,
}

impl PaymentFormController {
    /// Creates a new controller in the `Idle` state.
    ///
    /// # Arguments
    ///
    /// * `session` - The signed-in user.
    /// * `config` - Timing settings for the processing phase.
    /// * `cards` - Source of the user's card.
    /// * `rates` - Currency rate service.
    /// * `processor` - Service that charges the card.
    pub fn new(
        session: SessionContext,
        config: Config,
        cards: CardLookupRef,
        rates: RateLookupRef,
        processor: PaymentProcessorRef,
    ) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            session,
            config,
            cards,
            rates,
            processor,
            state: FormState::Idle,
            draft: PaymentDraft::default(),
            card: None,
            conversion: ConversionResult::ZERO,
            conversion_error: None,
            latest_request: 0,
            message: None,
            outcome: None,
            progress,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn draft(&self) -> &PaymentDraft {
        &self.draft
    }

    pub fn conversion(&self) -> &ConversionResult {
        &self.conversion
    }

    /// Why the current conversion is zero despite a positive amount, if the
    /// rate lookup failed.
    pub fn conversion_error(&self) -> Option<&str> {
        self.conversion_error.as_deref()
    }

    pub fn card(&self) -> Option<&CardSnapshot> {
        self.card.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn outcome(&self) -> Option<&PaymentOutcome> {
        self.outcome.as_ref()
    }

    /// Percentage shown by the processing indicator.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Fetches the user's card. The card is fetched once and cached.
    pub async fn load_card(&mut self) -> Result<&CardSnapshot> {
        if self.card.is_none() {
            let fetched = self.cards.card(&self.session.user_id).await;
            match fetched {
                Ok(card) => {
                    debug!(card_id = card.id, "card loaded");
                    self.card = Some(card);
                }
                Err(err) => {
                    warn!(user_id = %self.session.user_id, error = %err, "card lookup failed");
                    self.message = Some(CARD_FETCH_FAILED_MESSAGE.to_string());
                    return Err(PaymentError::CardError(err.to_string()));
                }
            }
        }
        self.card
            .as_ref()
            .ok_or_else(|| PaymentError::CardError(CARD_FETCH_FAILED_MESSAGE.to_string()))
    }

    /// Replaces the amount text.
    ///
    /// Text not matching the amount pattern, or too large to represent, is
    /// rejected and nothing changes.
    /// Otherwise returns the rate lookup to run, or `None` when the amount is
    /// blank or not positive and the conversion was cleared instead.
    pub fn set_amount(&mut self, text: &str) -> Result<Option<ConversionRequest>> {
        validate_amount_text(text)?;
        self.draft.amount_text = text.to_string();
        Ok(self.request_conversion())
    }

    /// Selects the payment currency and returns the rate lookup to run, if any.
    pub fn set_currency(&mut self, code: CurrencyCode) -> Option<ConversionRequest> {
        self.draft.currency_code = code;
        self.request_conversion()
    }

    pub fn set_merchant(&mut self, merchant: &str) {
        self.draft.merchant = merchant.to_string();
    }

    /// Sets the card PIN: up to four digits.
    pub fn set_pin(&mut self, pin: &str) -> Result<()> {
        if pin.len() > 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::validation("PIN must be up to 4 digits"));
        }
        self.draft.pin = pin.to_string();
        Ok(())
    }

    /// Sets the amount and waits for the resulting conversion.
    pub async fn update_amount(&mut self, text: &str) -> Result<()> {
        if let Some(request) = self.set_amount(text)? {
            let response = request.resolve().await;
            self.apply_conversion(response);
        }
        Ok(())
    }

    /// Sets the currency and waits for the resulting conversion.
    pub async fn update_currency(&mut self, code: CurrencyCode) {
        if let Some(request) = self.set_currency(code) {
            let response = request.resolve().await;
            self.apply_conversion(response);
        }
    }

    fn request_conversion(&mut self) -> Option<ConversionRequest> {
        // Every edit supersedes whatever lookup is still in flight.
        self.latest_request += 1;

        match positive_amount(&self.draft.amount_text) {
            Some(amount) => {
                debug!(
                    request = self.latest_request,
                    %amount,
                    currency = %self.draft.currency_code,
                    "conversion requested"
                );
                self.transition(FormState::Converting);
                Some(ConversionRequest {
                    id: self.latest_request,
                    amount,
                    code: self.draft.currency_code,
                    rates: self.rates.clone(),
                })
            }
            None => {
                self.conversion = ConversionResult::ZERO;
                self.conversion_error = None;
                self.transition(FormState::Idle);
                None
            }
        }
    }

    /// Applies a resolved rate lookup.
    ///
    /// Returns `false`, leaving the form untouched, when a newer request has
    /// been issued since. A failed lookup zeroes the conversion and keeps the
    /// form usable.
    pub fn apply_conversion(&mut self, response: ConversionResponse) -> bool {
        if response.id != self.latest_request {
            debug!(
                request = response.id,
                latest = self.latest_request,
                "discarding stale conversion"
            );
            return false;
        }

        match response.result {
            Ok(conversion) => {
                self.conversion = conversion;
                self.conversion_error = None;
            }
            Err(err) => {
                warn!(currency = %self.draft.currency_code, error = %err, "conversion failed");
                self.conversion = ConversionResult::ZERO;
                self.conversion_error = Some(err.to_string());
            }
        }
        self.transition(FormState::ReadyToPay);
        true
    }

    /// Whether the pay action should be enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.state, FormState::ReadyToPay | FormState::Failed)
            && self.card.is_some()
            && self.draft.missing_field().is_none()
            && positive_amount(&self.draft.amount_text).is_some()
    }

    /// Submits the draft for payment.
    ///
    /// Incomplete input is rejected with a `ValidationError` before any network
    /// call. An accepted submission waits out the configured processing delay,
    /// then charges the card. On success the draft is cleared; on failure the
    /// amount and merchant are kept for a retry and the PIN is cleared.
    pub async fn submit(&mut self) -> Result<PaymentOutcome> {
        let request = self.validated_request()?;

        self.transition(FormState::Processing);
        self.message = None;
        self.outcome = None;

        let result = {
            let _ticker = ProgressTicker::start(self.progress.clone(), self.config.progress_interval);
            tokio::time::sleep(self.config.processing_delay).await;
            self.processor.process(&request).await
        };

        match result {
            Ok(receipt) => {
                let transaction_ref = TransactionRef::from_receipt(&receipt);
                info!(
                    merchant = %request.merchant,
                    reference = %transaction_ref,
                    backend_reference = transaction_ref.is_backend_issued(),
                    "payment succeeded"
                );
                let outcome = PaymentOutcome::Success {
                    transaction_ref,
                    timestamp: Local::now(),
                    merchant: request.merchant,
                    total_amount: self.conversion.total_amount,
                };
                self.draft.reset();
                self.conversion = ConversionResult::ZERO;
                self.conversion_error = None;
                self.latest_request += 1;
                self.outcome = Some(outcome.clone());
                self.transition(FormState::Succeeded);
                Ok(outcome)
            }
            Err(err) => {
                let reason = failure_message(err);
                warn!(merchant = %request.merchant, %reason, "payment failed");
                self.draft.pin.clear();
                self.message = Some(reason.clone());
                self.outcome = Some(PaymentOutcome::Failure {
                    reason: reason.clone(),
                });
                self.transition(FormState::Failed);
                Err(PaymentError::ProcessingError(reason))
            }
        }
    }

    /// Re-submits the preserved draft after a failure with a freshly entered PIN.
    pub async fn retry(&mut self, pin: &str) -> Result<PaymentOutcome> {
        if self.state != FormState::Failed {
            return Err(PaymentError::validation("There is no failed payment to retry"));
        }
        self.set_pin(pin)?;
        self.submit().await
    }

    /// Closes the result of the last submission.
    pub fn dismiss(&mut self) {
        match self.state {
            FormState::Succeeded => {
                self.outcome = None;
                self.transition(FormState::Idle);
            }
            FormState::Failed => {
                self.outcome = None;
                self.transition(FormState::ReadyToPay);
            }
            _ => {}
        }
    }

    fn validated_request(&mut self) -> Result<PaymentRequest> {
        let Some(card_id) = self.card.as_ref().map(|card| card.id) else {
            return Err(self.reject("Card not loaded yet"));
        };
        if let Some(field) = self.draft.missing_field() {
            debug!(field, "submission missing field");
            return Err(self.reject("Please fill all fields"));
        }
        let Some(amount) = positive_amount(&self.draft.amount_text) else {
            return Err(self.reject("Amount must be greater than 0"));
        };
        match self.state {
            FormState::ReadyToPay | FormState::Failed => {}
            FormState::Processing => {
                return Err(self.reject("A payment is already being processed"));
            }
            FormState::Converting => {
                return Err(self.reject("Currency conversion is still in progress"));
            }
            FormState::Idle | FormState::Succeeded => {
                return Err(self.reject("Please enter an amount"));
            }
        }

        Ok(PaymentRequest {
            card_id,
            pin: self.draft.pin.clone(),
            amount,
            merchant: self.draft.merchant.clone(),
            currency_code: self.draft.currency_code,
            user_id: self.session.user_id.clone(),
        })
    }

    fn reject(&mut self, message: &str) -> PaymentError {
        self.message = Some(message.to_string());
        PaymentError::validation(message)
    }

    fn transition(&mut self, next: FormState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "form state changed");
            self.state = next;
        }
    }
}

/// The message shown for a rejected payment: the backend's own text when it
/// sent one, the generic fallback otherwise.
fn failure_message(err: PaymentError) -> String {
    match err {
        PaymentError::ProcessingError(message) if !message.trim().is_empty() => message,
        other => {
            debug!(error = %other, "payment error without backend message");
            GENERIC_FAILURE_MESSAGE.to_string()
        }
    }
}
