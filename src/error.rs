use thiserror::Error;

/// Every failure the alert pipeline can run into. None of them end the
/// process; callers log and fall back to the "do not alert" path.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("ActivityWatch request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid ActivityWatch server URL: {url}")]
    InvalidServerUrl { url: String },

    #[error("ActivityWatch client unavailable: {0}")]
    TrackerUnavailable(String),

    #[error("Could not find '{prefix}' bucket")]
    NoAfkBucket { prefix: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid snooze options '{input}': {reason}")]
    InvalidSnoozeOptions { input: String, reason: String },

    #[error("Monitor enumeration failed: {0}")]
    Monitors(String),

    #[error("Could not open alert window: {0}")]
    Display(String),
}
