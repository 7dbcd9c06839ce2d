//! Search execution engine.
//!
//! The engine owns at most one query session at a time. Starting a search
//! compiles the query, supersedes whatever was running, and drives the scan on
//! the configured substrate:
//!
//! - **Cooperative**: the scan runs as a task on the current runtime, in chunks,
//!   yielding between them and honouring cancellation at each boundary.
//! - **Isolated**: the whole scan is handed to the engine's worker thread,
//!   which replies once. Cancelling does not stop the worker; its late reply is
//!   discarded.
//!
//! Every session carries a generation number. Results are applied only while
//! their session is still current and running, so a superseded or cancelled
//! search can never publish.

mod clock;
mod scan;
mod session;


pub(crate) use scan::Scanner;
pub use session::{SearchResults, SearchState, SearchStatus, SessionHandle};

use crate::config::{Config, EngineConfig, SearchConfig, Substrate};
use crate::dataset::PreparedDataset;
use crate::error::SearchError;
use crate::search::{CompiledQuery, order_hits, scan_all};
use scan::{IsolatedWorker, ScanOutcome, ScanRequest};
use session::QuerySession;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Current session slot plus the generation counter that names sessions.
#[derive(Default)]
struct Slot {
    generation: u64,
    current: Option<QuerySession>,
}

struct Inner {
    dataset: Arc<PreparedDataset>,
    search: SearchConfig,
    engine: EngineConfig,
    worker: IsolatedWorker,
    slot: Mutex<Slot>,
    /// Bumped on every state transition so waiters can re-check.
    transitions: watch::Sender<u64>,
}

/// Runs searches over one prepared dataset.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SearchEngine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("SearchEngine")
            .field("records", &self.inner.dataset.len())
            .field("substrate", &self.inner.engine.substrate)
            .field("generation", &slot.generation)
            .field("state", &slot.current.as_ref().map(QuerySession::state))
            .finish()
    }
}

impl SearchEngine {
    pub fn new(dataset: Arc<PreparedDataset>, config: &Config) -> Self {
        Self::with_scanner(dataset, config, scan_all)
    }

    /// Use `scanner` for isolated scans instead of the standard full evaluation.
    pub(crate) fn with_scanner(
        dataset: Arc<PreparedDataset>,
        config: &Config,
        scanner: Scanner,
    ) -> Self {
        let (transitions, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                dataset,
                search: config.search.clone(),
                engine: config.engine.clone(),
                worker: IsolatedWorker::new(scanner),
                slot: Mutex::new(Slot::default()),
                transitions,
            }),
        }
    }

    pub fn dataset(&self) -> &Arc<PreparedDataset> {
        &self.inner.dataset
    }

    /// Handle of the session the engine currently holds, if any.
    pub fn current(&self) -> Option<SessionHandle> {
        self.lock().current.as_ref().map(|session| session.handle)
    }

    /// Validate `raw_query` and begin scanning for it.
    ///
    /// A query that fails validation creates no session and leaves any running
    /// search untouched. Otherwise a running search is cancelled and replaced,
    /// and a finished one is discarded.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_search(&self, raw_query: &str) -> Result<SessionHandle, SearchError> {
        let query = Arc::new(CompiledQuery::compile(raw_query, &self.inner.search)?);
        let runtime = Handle::try_current()
            .map_err(|e| SearchError::EngineFault(format!("no async runtime available: {}", e)))?;

        let (handle, cancel, started_at, elapsed_ms) = {
            let mut slot = self.lock();
            if let Some(previous) = slot.current.as_mut() {
                if previous.is_running() {
                    previous.finish(SearchState::Cancelled, None, None);
                    debug!("Search {} superseded", previous.handle);
                }
            }

            slot.generation += 1;
            let handle = SessionHandle::new(slot.generation);
            let session = QuerySession::new(handle, Arc::clone(&query));
            let parts = (
                handle,
                session.cancel.clone(),
                session.started_at,
                Arc::clone(&session.elapsed_ms),
            );
            slot.current = Some(session);
            parts
        };
        self.publish();

        info!(
            "Search {} started: {:?} as {:?} on {:?} substrate",
            handle,
            query.raw(),
            query.mode(),
            self.inner.engine.substrate
        );

        clock::spawn(
            &runtime,
            started_at,
            elapsed_ms,
            self.inner.engine.clock_interval(),
            cancel.clone(),
        );

        let request = ScanRequest {
            dataset: Arc::clone(&self.inner.dataset),
            query,
        };
        let engine = self.clone();
        match self.inner.engine.substrate {
            Substrate::Cooperative => {
                let chunk_size = self.inner.engine.chunk_size();
                let scan = runtime.spawn(scan::cooperative(request, chunk_size, cancel));
                runtime.spawn(async move {
                    let outcome = match scan.await {
                        Ok(outcome) => outcome,
                        Err(e) => ScanOutcome::Fault(format!("search task failed: {}", e)),
                    };
                    engine.finish(handle, outcome);
                });
            }
            Substrate::Isolated => {
                runtime.spawn(async move {
                    let outcome = engine.inner.worker.run(request, cancel).await;
                    engine.finish(handle, outcome);
                });
            }
        }

        Ok(handle)
    }

    /// Stop a running search. Partial results are discarded.
    ///
    /// Returns `false` when `handle` is not the current session or it has
    /// already finished.
    pub fn cancel(&self, handle: SessionHandle) -> bool {
        let cancelled = {
            let mut slot = self.lock();
            match slot.current.as_mut() {
                Some(session) if session.handle == handle && session.is_running() => {
                    session.finish(SearchState::Cancelled, None, None);
                    true
                }
                _ => false,
            }
        };

        if cancelled {
            info!("Search {} cancelled", handle);
            self.publish();
        }
        cancelled
    }

    /// Drop the session behind `handle`, cancelling it first if it is running.
    ///
    /// Afterwards the handle reports [`SearchState::Idle`]. Returns `false` when
    /// `handle` is not the current session.
    pub fn reset(&self, handle: SessionHandle) -> bool {
        let reset = {
            let mut slot = self.lock();
            match slot.current.take() {
                Some(mut session) if session.handle == handle => {
                    if session.is_running() {
                        session.finish(SearchState::Cancelled, None, None);
                    }
                    true
                }
                other => {
                    slot.current = other;
                    false
                }
            }
        };

        if reset {
            debug!("Search {} reset", handle);
            self.publish();
        }
        reset
    }

    /// Snapshot of the session behind `handle`.
    ///
    /// Handles that are no longer current report [`SearchState::Idle`].
    pub fn status(&self, handle: SessionHandle) -> SearchStatus {
        self.lock()
            .current
            .as_ref()
            .filter(|session| session.handle == handle)
            .map_or_else(|| SearchStatus::idle(handle), QuerySession::status)
    }

    /// Wait until the session behind `handle` is no longer running.
    pub async fn wait(&self, handle: SessionHandle) -> SearchStatus {
        let mut transitions = self.inner.transitions.subscribe();
        loop {
            let status = self.status(handle);
            if status.state != SearchState::Running {
                return status;
            }
            if transitions.changed().await.is_err() {
                return self.status(handle);
            }
        }
    }

    /// Apply a scan outcome if its session is still current and running.
    fn finish(&self, handle: SessionHandle, outcome: ScanOutcome) {
        {
            let mut slot = self.lock();
            let Some(session) = slot
                .current
                .as_mut()
                .filter(|session| session.handle == handle)
            else {
                debug!("Discarding stale result of search {}", handle);
                return;
            };
            if !session.is_running() {
                debug!(
                    "Discarding late result of {} search {}",
                    session.state(),
                    handle
                );
                return;
            }

            match outcome {
                ScanOutcome::Completed(mut hits) => {
                    order_hits(session.query.mode(), &mut hits);
                    info!("Search {} completed with {} results", handle, hits.len());
                    let results = SearchResults::new(Arc::clone(&self.inner.dataset), hits);
                    session.finish(SearchState::Completed, Some(results), None);
                }
                ScanOutcome::Aborted => {
                    session.finish(SearchState::Cancelled, None, None);
                }
                ScanOutcome::Fault(message) => {
                    warn!("Search {} failed: {}", handle, message);
                    session.finish(SearchState::Failed, None, Some(message));
                }
            }
        }
        self.publish();
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        self.inner
            .transitions
            .send_modify(|revision| *revision = revision.wrapping_add(1));
    }
}
