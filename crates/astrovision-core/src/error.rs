//! Error types for AstroVision feeds, the chat relay, and configuration.

use thiserror::Error;

/// Result alias for feed fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// A feed fetch failed: bad status, broken transport, or a payload we could not unwrap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{feed}: upstream returned HTTP {status}")]
    Status { feed: &'static str, status: u16 },

    #[error("{feed}: request failed: {message}")]
    Transport { feed: &'static str, message: String },

    #[error("{feed}: unexpected payload: {message}")]
    Decode { feed: &'static str, message: String },
}

impl FetchError {
    /// Name of the feed that failed.
    pub fn feed(&self) -> &'static str {
        match self {
            FetchError::Status { feed, .. }
            | FetchError::Transport { feed, .. }
            | FetchError::Decode { feed, .. } => feed,
        }
    }

    pub(crate) fn decode(feed: &'static str, message: impl Into<String>) -> Self {
        FetchError::Decode {
            feed,
            message: message.into(),
        }
    }
}

/// A request was rejected before reaching any upstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("unknown sort option `{0}`")]
    UnknownSort(String),
}

/// Completion API failures, as seen by the relay endpoint.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion API key is not configured")]
    MissingApiKey,

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion API error {0}: {1}")]
    Status(u16, String),

    #[error("completion response parse failed: {0}")]
    Decode(String),

    #[error("completion response contained no choices")]
    EmptyChoice,
}

/// The chat client could not get a decodable answer from the relay endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Transport(String),

    #[error("relay response parse failed: {0}")]
    Decode(String),
}

/// Config file could not be read or parsed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
