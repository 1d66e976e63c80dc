//! Harvest Export - turns a harvested collection into an output file.
//!
//! Records are flattened, projected onto a configured column list and
//! written in collection order, as CSV with a header row (the default) or
//! as JSON Lines.
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_export::{project, write_projection};
//!
//! let projection = project(&report.records, &config.export.columns);
//! write_projection(&config.export.output_path, config.export.format, &projection)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
#[allow(missing_docs)]
pub mod projection;
pub mod writer;

pub use error::{ExportError, Result};
pub use projection::{flatten, project, Projection};
pub use writer::{write_csv, write_json_lines, write_projection};
