use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedError>;

/// Failures a feed tick can run into.
///
/// None of these ever leave a timer loop: the tick runner logs them and the
/// feed is rescheduled at its normal interval.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Missing credentials, failed token exchange or a rejected bearer token
    #[error("auth error: {0}")]
    Auth(String),

    /// Network failure, timeout or non-2xx response from an upstream
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Upstream payload did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Element-set catalog refresh failed; the previous catalog stays in place
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl FeedError {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Auth(_) => "auth",
            FeedError::Fetch(_) => "fetch",
            FeedError::Parse(_) => "parse",
            FeedError::Catalog(_) => "catalog",
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Fetch(format!("request timed out: {}", e))
        } else if e.is_decode() {
            FeedError::Parse(e.to_string())
        } else {
            FeedError::Fetch(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Parse(e.to_string())
    }
}
