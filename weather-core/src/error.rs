use thiserror::Error;

/// Failure of a single location fetch.
///
/// These are captured per location and returned inside the batch outcome
/// list; they never abort sibling fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Location identifier must not be empty")]
    InvalidLocation,

    #[error("Request to weather provider failed")]
    Transport(#[source] reqwest::Error),

    #[error("Weather provider responded with status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to decode weather provider response")]
    Decode(#[source] serde_json::Error),

    #[error("Batch deadline elapsed before the fetch completed")]
    DeadlineExceeded,

    #[error("Fetch task did not complete: {0}")]
    TaskFailed(String),
}

/// Copyable classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidLocation,
    Transport,
    Provider,
    Decode,
    DeadlineExceeded,
    TaskFailed,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::InvalidLocation => FailureKind::InvalidLocation,
            FetchError::Transport(_) => FailureKind::Transport,
            FetchError::Provider { .. } => FailureKind::Provider,
            FetchError::Decode(_) => FailureKind::Decode,
            FetchError::DeadlineExceeded => FailureKind::DeadlineExceeded,
            FetchError::TaskFailed(_) => FailureKind::TaskFailed,
        }
    }

    /// Whether the request timed out at the transport layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_timeout())
    }
}

/// Configuration problems. Any of these is fatal to a whole batch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No API key configured.\n\
         Hint: run `weather configure` or set WEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("Invalid provider endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("`{0}` must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_body_cuts_long_bodies_on_char_boundary() {
        let body = "é".repeat(250);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn provider_error_reports_status() {
        let err = FetchError::Provider { status: 404, message: "city not found".into() };
        assert_eq!(err.kind(), FailureKind::Provider);
        assert!(err.to_string().contains("404"));
        assert!(!err.is_timeout());
    }
}
