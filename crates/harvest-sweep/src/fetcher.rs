//! Pagination driver for a single parameter set.

use crate::auth::RequestAuthenticator;
use crate::events::{FetchEvent, FetchObserver, TracingObserver};
use crate::pagination::{parse_page, PageCursor, PageOutcome, Step, Termination, DEFAULT_PAGE_SIZE};
use crate::space::ParameterSet;
use crate::transport::CatalogTransport;
use harvest_core::Record;
use std::sync::Arc;
use url::Url;

/// Everything one parameter set produced.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub params: ParameterSet,
    pub records: Vec<Record>,
    /// Requests issued, including the terminating one
    pub calls: u32,
    /// Items dropped for lacking a usable `id`
    pub malformed: usize,
    pub termination: Termination,
}

/// Walks the pages of one parameter set until an empty page or a failure.
///
/// Failures are contained: they end this walk and are reported to the
/// observer, never returned as errors. Nothing is retried.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn CatalogTransport>,
    auth: Arc<RequestAuthenticator>,
    observer: Arc<dyn FetchObserver>,
    endpoint: Url,
    page_size: u32,
}

impl PageFetcher {
    #[must_use]
    pub fn new(
        transport: Arc<dyn CatalogTransport>,
        auth: Arc<RequestAuthenticator>,
        endpoint: Url,
    ) -> Self {
        Self {
            transport,
            auth,
            observer: Arc::new(TracingObserver),
            endpoint,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size. Zero is raised to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Canonical URL for one page: filter pairs, then `offset`, then `limit`.
    #[must_use]
    pub fn page_url(&self, params: &ParameterSet, offset: u64) -> Url {
        let mut pairs = params.query_pairs();
        pairs.push(("offset".to_string(), offset.to_string()));
        pairs.push(("limit".to_string(), self.page_size.to_string()));
        RequestAuthenticator::canonical_url(&self.endpoint, &pairs)
    }

    /// Fetch every page of `params`.
    pub async fn fetch_all(&self, params: ParameterSet) -> FetchOutcome {
        let mut cursor = PageCursor::new(self.page_size);

        let termination = loop {
            let Some(offset) = cursor.next_offset() else {
                break Termination::Exhausted;
            };

            // signed per request: the timestamp is part of the hash
            let request = self.auth.request(self.page_url(&params, offset));
            let outcome = match self.transport.get(&request).await {
                Ok(reply) => parse_page(&reply.body),
                Err(e) => PageOutcome::TransportFailed(e.to_string()),
            };

            match cursor.apply(outcome) {
                Step::Continue {
                    accepted,
                    malformed,
                } => {
                    self.observer.on_event(&FetchEvent::PageFetched {
                        params: params.clone(),
                        offset,
                        accepted,
                        malformed,
                    });
                }
                Step::Done(termination) => {
                    self.report_failure(&params, offset, &termination);
                    break termination;
                }
            }
        };

        let calls = cursor.calls();
        let malformed = cursor.malformed();
        let records = cursor.into_records();

        self.observer.on_event(&FetchEvent::Terminated {
            params: params.clone(),
            calls,
            records: records.len(),
            termination: termination.clone(),
        });

        FetchOutcome {
            params,
            records,
            calls,
            malformed,
            termination,
        }
    }

    fn report_failure(&self, params: &ParameterSet, offset: u64, termination: &Termination) {
        let event = match termination {
            Termination::Exhausted => return,
            Termination::ApiError { errors } => FetchEvent::ApiError {
                params: params.clone(),
                offset,
                errors: errors.clone(),
            },
            Termination::ProtocolError { detail } => FetchEvent::ProtocolError {
                params: params.clone(),
                offset,
                detail: detail.clone(),
            },
            Termination::Transport { detail } => FetchEvent::TransportError {
                params: params.clone(),
                offset,
                detail: detail.clone(),
            },
        };
        self.observer.on_event(&event);
    }
}
