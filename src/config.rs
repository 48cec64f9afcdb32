use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(300);

/// Runtime settings for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the backend API, without a trailing slash.
    pub api_url: String,
    /// Minimum time a submission stays in `Processing` before the charge is sent.
    pub processing_delay: Duration,
    /// How often the progress indicator advances while processing.
    pub progress_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            processing_delay: DEFAULT_PROCESSING_DELAY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Config {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
