//! Execution substrates for a scan over the prepared dataset.

use crate::dataset::PreparedDataset;
use crate::search::{CompiledQuery, Hit, scan_range};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Full evaluation of a query, run on the isolated worker.
pub type Scanner = fn(&PreparedDataset, &CompiledQuery) -> Vec<Hit>;

/// How a scan ended.
#[derive(Debug)]
pub(crate) enum ScanOutcome {
    Completed(Vec<Hit>),
    /// Cancellation was observed at a chunk boundary.
    Aborted,
    /// The execution context died before producing a result.
    Fault(String),
}

/// The single message handed to an isolated worker.
pub(crate) struct ScanRequest {
    pub(crate) dataset: Arc<PreparedDataset>,
    pub(crate) query: Arc<CompiledQuery>,
}

/// Scan in chunks of `chunk_size` records, yielding to the runtime after each.
///
/// Cancellation is checked at every chunk boundary; once observed, the
/// partial hits are dropped.
pub(crate) async fn cooperative(
    request: ScanRequest,
    chunk_size: usize,
    cancel: CancellationToken,
) -> ScanOutcome {
    let ScanRequest { dataset, query } = request;
    let mut hits = Vec::new();

    for (chunk_index, chunk) in dataset.records().chunks(chunk_size).enumerate() {
        if cancel.is_cancelled() {
            return ScanOutcome::Aborted;
        }
        scan_range(chunk, chunk_index * chunk_size, &query, &mut hits);
        tokio::task::yield_now().await;
    }

    if cancel.is_cancelled() {
        ScanOutcome::Aborted
    } else {
        ScanOutcome::Completed(hits)
    }
}

/// Work item for the isolated worker.
struct Job {
    request: ScanRequest,
    cancel: CancellationToken,
    reply: oneshot::Sender<Reply>,
}

enum Reply {
    Hits(Vec<Hit>),
    /// The session was cancelled or superseded before the scan began.
    Skipped,
    /// The scanner panicked; the worker survives.
    Crashed,
}

/// One long-lived worker thread per engine, fed one job at a time.
///
/// A job whose session was cancelled while queued is skipped without
/// scanning. A job already scanning runs to completion; callers decide
/// whether its reply still applies. The thread is started on first use and
/// restarted if it has gone away.
pub(crate) struct IsolatedWorker {
    scanner: Scanner,
    jobs: Mutex<Option<Sender<Job>>>,
}

impl IsolatedWorker {
    pub(crate) const fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            jobs: Mutex::new(None),
        }
    }

    /// Hand the whole scan to the worker and await its single reply.
    pub(crate) async fn run(&self, request: ScanRequest, cancel: CancellationToken) -> ScanOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            request,
            cancel,
            reply: reply_tx,
        };
        if let Err(message) = self.submit(job) {
            return ScanOutcome::Fault(message);
        }

        match reply_rx.await {
            Ok(Reply::Hits(hits)) => ScanOutcome::Completed(hits),
            Ok(Reply::Skipped) => ScanOutcome::Aborted,
            Ok(Reply::Crashed) => {
                ScanOutcome::Fault("search worker crashed while scanning".to_owned())
            }
            Err(_) => ScanOutcome::Fault("search worker terminated before replying".to_owned()),
        }
    }

    fn submit(&self, job: Job) -> Result<(), String> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);

        let job = match jobs.as_ref() {
            Some(sender) => match sender.send(job) {
                Ok(()) => return Ok(()),
                Err(SendError(job)) => job,
            },
            None => job,
        };

        let sender = spawn_worker(self.scanner)
            .map_err(|e| format!("failed to start search worker: {}", e))?;
        sender
            .send(job)
            .map_err(|_| "search worker exited before accepting the scan".to_owned())?;
        *jobs = Some(sender);
        Ok(())
    }
}

fn spawn_worker(scanner: Scanner) -> std::io::Result<Sender<Job>> {
    let (job_tx, job_rx) = mpsc::channel();
    thread::Builder::new()
        .name("search-worker".into())
        .spawn(move || worker_loop(&job_rx, scanner))?;
    tracing::debug!("Search worker started");
    Ok(job_tx)
}

/// Runs until every sender, and so the owning engine, is gone.
fn worker_loop(jobs: &Receiver<Job>, scanner: Scanner) {
    while let Ok(Job {
        request,
        cancel,
        reply,
    }) = jobs.recv()
    {
        if cancel.is_cancelled() {
            let _ = reply.send(Reply::Skipped);
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            scanner(&request.dataset, &request.query)
        }));
        let message = match result {
            Ok(hits) => Reply::Hits(hits),
            Err(_) => {
                tracing::error!("Search worker panicked during a scan");
                Reply::Crashed
            }
        };
        // The engine may have stopped listening after a cancel.
        let _ = reply.send(message);
    }
    tracing::debug!("Search worker stopped");
}
