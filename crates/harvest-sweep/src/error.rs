use harvest_core::HarvestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("bootstrap call to {url} failed: {reason}")]
    Bootstrap { url: String, reason: String },

    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("invalid parameter space: {0}")]
    InvalidSpace(String),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Signing input rejected before any request is made.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("invalid value for header {header}: {reason}")]
    InvalidHeaderValue {
        header: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),
}

impl From<SweepError> for HarvestError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::Bootstrap { .. } => HarvestError::Bootstrap(err.to_string()),
            SweepError::InvalidEndpoint { .. } | SweepError::InvalidSpace(_) => {
                HarvestError::Validation(err.to_string())
            }
            SweepError::Auth(e) => HarvestError::Auth(e.to_string()),
            SweepError::Transport(e) => HarvestError::Network(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
