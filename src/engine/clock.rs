//! Elapsed-time sampling for running sessions.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Milliseconds since `start`, saturating.
pub(crate) fn millis_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Spawn a task that stores the elapsed time into `elapsed_ms` every `cadence`
/// until `stop` is cancelled.
///
/// Runs independently of the scan, so the counter advances even while a chunk
/// or an isolated worker is busy.
pub(crate) fn spawn(
    runtime: &Handle,
    started_at: Instant,
    elapsed_ms: Arc<AtomicU64>,
    cadence: Duration,
    stop: CancellationToken,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut ticker = interval(cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = stop.cancelled() => break,
                _ = ticker.tick() => {
                    elapsed_ms.store(millis_since(started_at), Ordering::Relaxed);
                }
            }
        }
    })
}
