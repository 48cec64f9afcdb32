use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const STEP: u8 = 10;
const COMPLETE: u8 = 100;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Stage of a payment as shown in the processing indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStep {
    Starting,
    VerifyingDetails,
    ProcessingPayment,
    ConfirmingTransaction,
}

impl ProcessingStep {
    pub fn from_progress(percent: u8) -> Self {
        match percent {
            p if p > 80 => Self::ConfirmingTransaction,
            p if p > 50 => Self::ProcessingPayment,
            p if p > 20 => Self::VerifyingDetails,
            _ => Self::Starting,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Starting => "Starting",
            Self::VerifyingDetails => "Verifying details",
            Self::ProcessingPayment => "Processing payment",
            Self::ConfirmingTransaction => "Confirming transaction",
        }
    }
}

/// Simulated progress for an in-flight payment.
///
/// Advances the shared percentage by ten every `interval` until it reaches 100.
/// The ticking task is aborted and the percentage reset to zero when the ticker
/// is dropped, so it never outlives the submission that started it.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
    progress: watch::Sender<u8>,
}

impl ProgressTicker {
    pub fn start(progress: watch::Sender<u8>, interval: Duration) -> Self {
        progress.send_replace(0);
        let tx = progress.clone();
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval.max(MIN_INTERVAL));
            // First tick completes immediately.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let mut done = false;
                tx.send_modify(|percent| {
                    *percent = percent.saturating_add(STEP).min(COMPLETE);
                    done = *percent >= COMPLETE;
                });
                if done {
                    break;
                }
            }
        });
        Self { handle, progress }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
        self.progress.send_replace(0);
    }
}
