//! Error types for motel-map

use thiserror::Error;

/// Main error type for motel-map operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unresolvable client address: {0}")]
    UnresolvableIdentity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type alias for motel-map operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single outbound provider call
///
/// Each variant is a distinct failure kind so callers can decide per kind
/// whether to fall back, degrade, or surface the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("response has no usable coordinates")]
    MissingCoordinates,

    #[error("coordinates out of range: {0}")]
    InvalidCoordinates(String),

    #[error("provider reported an error: {0}")]
    Upstream(String),

    #[error("missing API key for {0}")]
    MissingKey(&'static str),
}

impl ProviderError {
    /// Whether a secondary provider is worth trying after this failure
    pub fn is_fallback_eligible(&self) -> bool {
        !matches!(self, Self::MissingKey(_))
    }

    /// Short machine-readable label, used in logs and JSON error codes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::MissingCoordinates => "missing_coordinates",
            Self::InvalidCoordinates(_) => "invalid_coordinates",
            Self::Upstream(_) => "upstream",
            Self::MissingKey(_) => "missing_key",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
