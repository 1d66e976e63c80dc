//! Core error types for the catalog sweep.
//!
//! [`HarvestError`] is what a run can fail with; [`ConfigError`] covers
//! loading and validating `config.toml`.

use thiserror::Error;

/// Central error type for all harvest operations.
///
/// Per-combination fetch failures never surface here: they are contained by
/// the fetcher and reported as terminations. Only run-level failures do.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Config could not be loaded or failed validation
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Session bootstrap failed; the run cannot start
    #[error("session bootstrap failed: {0}")]
    Bootstrap(String),

    /// Request signing errors (bad secret, bad header value)
    #[error("authentication error: {0}")]
    Auth(String),

    /// HTTP client could not be built or a request outside a fetch failed
    #[error("transport: {0}")]
    Network(String),

    /// Export errors (projection, writing)
    #[error("export error: {0}")]
    Export(String),

    /// Endpoint or parameter space rejected before the sweep started
    #[error("invalid input: {0}")]
    Validation(String),

    /// Filesystem failure
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory, so no user config location
    #[error("no user config directory on this system")]
    NoConfigDir,

    /// An explicitly requested config file does not exist
    #[error("no config file at {path}")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// File is not valid TOML for [`crate::AppConfig`]
    #[error("malformed config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("cannot render config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Reading or writing the file failed
    #[error("config i/o: {0}")]
    Io(#[from] std::io::Error),

    /// A value the sweep cannot run with
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using `HarvestError`.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result of loading, saving or validating config.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
