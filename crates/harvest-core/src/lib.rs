//! Harvest Core - Foundation crate for the catalog sweep.
//!
//! This crate provides shared types, error handling and configuration
//! management that the sweep engine, the exporter and the CLI depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared types (`FilterValue`, `RecordId`, `Record`)
//!
//! # Example
//!
//! ```rust
//! use harvest_core::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//! assert_eq!(config.sweep.page_size, 30);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    ApiConfig, AppConfig, DimensionConfig, ExportConfig, ExportFormat, SpaceConfig, SweepConfig,
};
pub use error::{ConfigError, ConfigResult, HarvestError, Result};
pub use types::{FilterValue, Record, RecordId, RECORD_ID_FIELD};
