//! Session state exposed to the host.

use super::clock::millis_since;
use crate::dataset::{PreparedDataset, PreparedRecord};
use crate::search::{CompiledQuery, Hit, MatchMode, Page, page};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Identifies one search session of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SearchState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Ordered hits of a completed search, resolvable against the dataset.
#[derive(Debug, Clone)]
pub struct SearchResults {
    dataset: Arc<PreparedDataset>,
    hits: Arc<[Hit]>,
}

impl SearchResults {
    pub(crate) fn new(dataset: Arc<PreparedDataset>, hits: Vec<Hit>) -> Self {
        Self {
            dataset,
            hits: hits.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits in reporting order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// The record a hit refers to.
    pub fn record(&self, hit: &Hit) -> &PreparedRecord {
        &self.dataset.records()[hit.index]
    }

    /// Records with their similarity, in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (&PreparedRecord, f64)> + '_ {
        self.hits
            .iter()
            .map(|hit| (self.record(hit), hit.similarity))
    }

    pub fn records(&self) -> Vec<&PreparedRecord> {
        self.iter().map(|(record, _)| record).collect()
    }

    /// One page of hits; see [`crate::search::page`].
    pub fn page(&self, page_size: usize, page_number: usize) -> Page<'_, Hit> {
        page(&self.hits, page_size, page_number)
    }
}

/// Snapshot of a session as observed by the host.
#[derive(Debug, Clone)]
pub struct SearchStatus {
    pub handle: SessionHandle,
    pub state: SearchState,
    /// Wall-clock time since the search started, sampled on the clock cadence
    /// while running and fixed once the session ends.
    pub elapsed_ms: u64,
    pub mode: Option<MatchMode>,
    pub query: Option<String>,
    /// Present only for [`SearchState::Completed`].
    pub results: Option<SearchResults>,
    /// Present only for [`SearchState::Failed`].
    pub fault: Option<String>,
}

impl SearchStatus {
    /// Status of a handle with no live session behind it.
    pub(crate) const fn idle(handle: SessionHandle) -> Self {
        Self {
            handle,
            state: SearchState::Idle,
            elapsed_ms: 0,
            mode: None,
            query: None,
            results: None,
            fault: None,
        }
    }
}

/// Engine-owned state of the current search.
pub(crate) struct QuerySession {
    pub(crate) handle: SessionHandle,
    pub(crate) query: Arc<CompiledQuery>,
    pub(crate) started_at: Instant,
    /// Stops the scan at its next chunk boundary and the elapsed clock.
    pub(crate) cancel: CancellationToken,
    /// Written by the clock task while running.
    pub(crate) elapsed_ms: Arc<AtomicU64>,
    state: SearchState,
    final_elapsed_ms: Option<u64>,
    results: Option<SearchResults>,
    fault: Option<String>,
}

impl QuerySession {
    pub(crate) fn new(handle: SessionHandle, query: Arc<CompiledQuery>) -> Self {
        Self {
            handle,
            query,
            started_at: Instant::now(),
            cancel: CancellationToken::new(),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            state: SearchState::Running,
            final_elapsed_ms: None,
            results: None,
            fault: None,
        }
    }

    pub(crate) const fn state(&self) -> SearchState {
        self.state
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == SearchState::Running
    }

    /// Move to a terminal state, freezing the clock.
    pub(crate) fn finish(
        &mut self,
        state: SearchState,
        results: Option<SearchResults>,
        fault: Option<String>,
    ) {
        debug_assert!(state.is_terminal());
        self.cancel.cancel();
        self.final_elapsed_ms = Some(millis_since(self.started_at));
        self.state = state;
        self.results = results;
        self.fault = fault;
    }

    pub(crate) fn status(&self) -> SearchStatus {
        SearchStatus {
            handle: self.handle,
            state: self.state,
            elapsed_ms: self
                .final_elapsed_ms
                .unwrap_or_else(|| self.elapsed_ms.load(Ordering::Relaxed)),
            mode: Some(self.query.mode()),
            query: Some(self.query.raw().to_owned()),
            results: self.results.clone(),
            fault: self.fault.clone(),
        }
    }
}
