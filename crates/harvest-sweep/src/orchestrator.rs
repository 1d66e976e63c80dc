//! Sweep orchestrator for fetching a whole parameter space.
//!
//! This module provides the `SweepOrchestrator`, which runs one
//! [`PageFetcher`] walk per parameter set with bounded parallelism and merges
//! completed batches, in completion order, into a single [`Aggregator`] until
//! the cap is reached or the space is exhausted.

use crate::aggregator::Aggregator;
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::space::ParameterSpace;
use futures::stream::{FuturesUnordered, StreamExt};
use harvest_core::{Record, SweepConfig};
use std::collections::BTreeMap;
use tokio::task::JoinHandle;

/// Default number of parameter sets fetched in parallel.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// What happens to fetches still running when the cap is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapPolicy {
    /// Let them finish in the background and discard their results.
    #[default]
    Detach,
    /// Abort them.
    Abort,
}

/// Outcome of a sweep.
#[derive(Debug)]
pub struct HarvestReport {
    /// Deduplicated records in first-seen order
    pub records: Vec<Record>,
    /// Parameter sets in the space
    pub combinations_total: usize,
    /// Parameter sets whose fetch was started
    pub combinations_dispatched: usize,
    /// Parameter sets whose batch was merged
    pub combinations_completed: usize,
    /// Fetch tasks that panicked
    pub combinations_panicked: usize,
    /// Fetches still running when the sweep returned
    pub in_flight_at_stop: usize,
    /// Records dropped because their id had been seen
    pub duplicates: usize,
    /// Whether the sweep stopped because of the cap
    pub cap_reached: bool,
    /// Merged parameter sets per termination kind
    pub terminations: BTreeMap<&'static str, usize>,
}

/// Orchestrates fetching across the whole parameter space.
pub struct SweepOrchestrator {
    /// Fetcher cloned into every task
    fetcher: PageFetcher,
    /// Maximum concurrent fetches
    max_concurrent_fetches: usize,
    /// Target collection size
    cap: usize,
    /// In-flight handling once the cap is reached
    cap_policy: CapPolicy,
}

impl SweepOrchestrator {
    /// Create a new orchestrator with an unbounded cap.
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            max_concurrent_fetches: DEFAULT_CONCURRENCY,
            cap: usize::MAX,
            cap_policy: CapPolicy::default(),
        }
    }

    /// Create an orchestrator configured from the `[sweep]` section.
    #[must_use]
    pub fn from_config(fetcher: PageFetcher, config: &SweepConfig) -> Self {
        let policy = if config.abort_in_flight {
            CapPolicy::Abort
        } else {
            CapPolicy::Detach
        };

        Self::new(fetcher.with_page_size(config.page_size))
            .with_max_concurrent_fetches(config.concurrency)
            .with_cap(config.cap)
            .with_cap_policy(policy)
    }

    /// Set the maximum number of concurrent fetches. Zero is raised to one.
    #[must_use]
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Set the collection size at which the sweep stops.
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Set what happens to in-flight fetches once the cap is reached.
    #[must_use]
    pub fn with_cap_policy(mut self, policy: CapPolicy) -> Self {
        self.cap_policy = policy;
        self
    }

    /// Sweep `space`.
    ///
    /// Per-combination failures are contained by the fetcher and only show up
    /// in `terminations`; the sweep itself cannot fail.
    pub async fn run(&self, space: &ParameterSpace) -> HarvestReport {
        let mut in_flight: FuturesUnordered<JoinHandle<FetchOutcome>> = FuturesUnordered::new();
        let mut aggregator = Aggregator::new(self.cap);
        let mut combinations = space.iter();

        let mut dispatched = 0;
        let mut completed = 0;
        let mut panicked = 0;
        let mut terminations: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut cap_reached = aggregator.is_full();

        tracing::info!(
            combinations = space.len(),
            concurrency = self.max_concurrent_fetches,
            cap = self.cap,
            "starting sweep"
        );

        while !cap_reached {
            // Respect concurrency limit
            while in_flight.len() < self.max_concurrent_fetches {
                let Some(params) = combinations.next() else {
                    break;
                };
                let fetcher = self.fetcher.clone();
                in_flight.push(tokio::spawn(async move { fetcher.fetch_all(params).await }));
                dispatched += 1;
            }

            let Some(joined) = in_flight.next().await else {
                break;
            };

            match joined {
                Ok(outcome) => {
                    completed += 1;
                    *terminations.entry(outcome.termination.kind()).or_default() += 1;

                    let batch = outcome.records.len();
                    let inserted = aggregator.merge(outcome.records);
                    tracing::debug!(
                        params = %outcome.params,
                        batch,
                        inserted,
                        total = aggregator.len(),
                        "merged batch"
                    );

                    cap_reached = aggregator.is_full();
                }
                Err(e) => {
                    panicked += 1;
                    tracing::error!("Fetch task failed: {}", e);
                }
            }
        }

        let in_flight_at_stop = in_flight.len();
        if cap_reached {
            tracing::info!(
                records = aggregator.len(),
                cap = aggregator.cap(),
                in_flight = in_flight_at_stop,
                policy = ?self.cap_policy,
                "cap reached, stopping sweep"
            );
        }

        // Dropping a handle detaches its task; the result is never read.
        if self.cap_policy == CapPolicy::Abort {
            for handle in &in_flight {
                handle.abort();
            }
        }
        drop(in_flight);

        let duplicates = aggregator.duplicates();
        HarvestReport {
            records: aggregator.into_records(),
            combinations_total: space.len(),
            combinations_dispatched: dispatched,
            combinations_completed: completed,
            combinations_panicked: panicked,
            in_flight_at_stop,
            duplicates,
            cap_reached,
            terminations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{parse_endpoint, RequestAuthenticator};
    use crate::error::TransportError;
    use crate::transport::{CatalogTransport, HttpReply, SignedRequest};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogTransport for EmptyCatalog {
        async fn get(&self, _request: &SignedRequest) -> Result<HttpReply, TransportError> {
            Ok(HttpReply::new(200, r#"{"success": true, "result": {"items": []}}"#))
        }
    }

    fn orchestrator() -> SweepOrchestrator {
        let auth = RequestAuthenticator::new("salt", "agent").expect("valid authenticator");
        let endpoint = parse_endpoint("https://offers.example.test/").expect("valid url");
        SweepOrchestrator::new(PageFetcher::new(
            Arc::new(EmptyCatalog),
            Arc::new(auth),
            endpoint,
        ))
    }

    #[test]
    fn test_defaults() {
        let orchestrator = orchestrator();
        assert_eq!(orchestrator.max_concurrent_fetches, DEFAULT_CONCURRENCY);
        assert_eq!(orchestrator.cap_policy, CapPolicy::Detach);
        assert_eq!(
            orchestrator.with_max_concurrent_fetches(0).max_concurrent_fetches,
            1
        );
    }

    #[test]
    fn test_from_config() {
        let config = SweepConfig {
            page_size: 15,
            concurrency: 3,
            cap: 99,
            abort_in_flight: true,
        };
        let auth = RequestAuthenticator::new("salt", "agent").expect("valid authenticator");
        let endpoint = parse_endpoint("https://offers.example.test/").expect("valid url");
        let fetcher = PageFetcher::new(Arc::new(EmptyCatalog), Arc::new(auth), endpoint);

        let orchestrator = SweepOrchestrator::from_config(fetcher, &config);
        assert_eq!(orchestrator.fetcher.page_size(), 15);
        assert_eq!(orchestrator.max_concurrent_fetches, 3);
        assert_eq!(orchestrator.cap, 99);
        assert_eq!(orchestrator.cap_policy, CapPolicy::Abort);
    }

    #[tokio::test]
    async fn test_empty_catalog_exhausts_space() {
        let space = ParameterSpace::from_config(&harvest_core::SpaceConfig::default())
            .expect("default space");
        let report = orchestrator().with_cap(10).run(&space).await;

        assert!(report.records.is_empty());
        assert!(!report.cap_reached);
        assert_eq!(report.combinations_total, 300);
        assert_eq!(report.combinations_dispatched, 300);
        assert_eq!(report.combinations_completed, 300);
        assert_eq!(report.in_flight_at_stop, 0);
        assert_eq!(report.terminations.get("exhausted"), Some(&300));
    }

    #[tokio::test]
    async fn test_zero_cap_returns_without_fetching() {
        let space = ParameterSpace::new(vec![]).expect("empty space");
        let report = orchestrator().with_cap(0).run(&space).await;

        assert!(report.cap_reached);
        assert_eq!(report.combinations_dispatched, 0);
    }
}
