//! Observability port for the fetch loop.
//!
//! The fetcher reports what happens as [`FetchEvent`]s instead of logging
//! inline. [`TracingObserver`] is the default sink; [`RecordingObserver`]
//! keeps events in memory for inspection.

use crate::pagination::Termination;
use crate::space::ParameterSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Something that happened while walking one parameter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    PageFetched {
        params: ParameterSet,
        offset: u64,
        accepted: usize,
        malformed: usize,
    },
    ApiError {
        params: ParameterSet,
        offset: u64,
        errors: Vec<String>,
    },
    ProtocolError {
        params: ParameterSet,
        offset: u64,
        detail: String,
    },
    TransportError {
        params: ParameterSet,
        offset: u64,
        detail: String,
    },
    Terminated {
        params: ParameterSet,
        calls: u32,
        records: usize,
        termination: Termination,
    },
}

impl FetchEvent {
    #[must_use]
    pub fn params(&self) -> &ParameterSet {
        match self {
            Self::PageFetched { params, .. }
            | Self::ApiError { params, .. }
            | Self::ProtocolError { params, .. }
            | Self::TransportError { params, .. }
            | Self::Terminated { params, .. } => params,
        }
    }
}

/// Receives fetch events. Called from many tasks at once.
pub trait FetchObserver: Send + Sync {
    fn on_event(&self, event: &FetchEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn on_event(&self, event: &FetchEvent) {
        match event {
            FetchEvent::PageFetched {
                params,
                offset,
                accepted,
                malformed,
            } => {
                tracing::debug!(%params, offset, accepted, malformed, "page fetched");
                if *malformed > 0 {
                    tracing::warn!(%params, offset, malformed, "dropped items without a usable id");
                }
            }
            FetchEvent::ApiError {
                params,
                offset,
                errors,
            } => {
                tracing::warn!(%params, offset, ?errors, "catalog API reported an error");
            }
            FetchEvent::ProtocolError {
                params,
                offset,
                detail,
            } => {
                tracing::warn!(%params, offset, %detail, "could not decode catalog response");
            }
            FetchEvent::TransportError {
                params,
                offset,
                detail,
            } => {
                tracing::warn!(%params, offset, %detail, "catalog request failed");
            }
            FetchEvent::Terminated {
                params,
                calls,
                records,
                termination,
            } => {
                tracing::info!(
                    %params,
                    calls,
                    records,
                    termination = termination.kind(),
                    "loaded {} offers",
                    records
                );
            }
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<FetchEvent>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    ///
    /// A lock poisoned by a panicking recorder still yields its events.
    #[must_use]
    pub fn events(&self) -> Vec<FetchEvent> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FetchEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FetchObserver for RecordingObserver {
    fn on_event(&self, event: &FetchEvent) {
        self.lock().push(event.clone());
    }
}
