//! Harvest Sweep - concurrent sweep of a paginated, signed catalog API.
//!
//! This crate enumerates a space of filter combinations, walks the pages of
//! each combination with per-request signed headers, and merges the results
//! into one deduplicated collection, stopping once a target size is reached.
//!
//! # Features
//!
//! - Lazy, restartable cartesian-product enumeration of filter dimensions
//! - Stateless request signing (`v1:` + md5 hex digest) and one-time session bootstrap
//! - Offset pagination with per-combination failure containment, no retries
//! - Bounded parallelism, completion-order merging with first-seen-wins dedup
//! - Early stop on a soft cap, with in-flight fetches detached or aborted
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_sweep::{
//!     parse_endpoint, HttpTransport, PageFetcher, ParameterSpace, RequestAuthenticator,
//!     SweepOrchestrator,
//! };
//! use std::sync::Arc;
//!
//! let transport = Arc::new(HttpTransport::new(timeout)?);
//! let auth = Arc::new(RequestAuthenticator::from_config(&config.api)?);
//! auth.bootstrap(transport.as_ref(), &bootstrap_urls).await?;
//!
//! let fetcher = PageFetcher::new(transport, auth, parse_endpoint(&config.api.offers_url)?);
//! let report = SweepOrchestrator::from_config(fetcher, &config.sweep)
//!     .run(&ParameterSpace::from_config(&config.space)?)
//!     .await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod aggregator;
#[allow(missing_docs)]
pub mod auth;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod events;
#[allow(missing_docs)]
pub mod fetcher;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod pagination;
#[allow(missing_docs)]
pub mod space;
#[allow(missing_docs)]
pub mod transport;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use auth::{parse_endpoint, RequestAuthenticator, SignedHeaders};
pub use error::{AuthError, Result, SweepError, TransportError};
pub use events::{FetchEvent, FetchObserver, RecordingObserver, TracingObserver};
pub use fetcher::{FetchOutcome, PageFetcher};
pub use orchestrator::{CapPolicy, HarvestReport, SweepOrchestrator};
pub use pagination::{PageCursor, PageOutcome, Step, Termination};
pub use space::{Dimension, ParameterSet, ParameterSpace};
pub use transport::{CatalogTransport, HttpReply, HttpTransport, SignedRequest};
