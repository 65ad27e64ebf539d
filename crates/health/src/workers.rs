//! The probing worker pool: a set of concurrent tasks that pull due probes
//! off a request channel, run the configured monitor, and push results back
//! to the tracker. See spec §4.3.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gslb_domain::config::MonitorSpec;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::monitors;

/// How often the cleanup task checks for excess idle workers.
pub const CLEANUP_INTERVAL_SECS: u64 = 30;
/// Workers beyond `max_busy_observed + EXCESSIVE_THRESHOLD` are culled at
/// each cleanup tick.
pub const EXCESSIVE_THRESHOLD: usize = 4;

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub pool_id: usize,
    pub member_id: usize,
    pub destination: Ipv4Addr,
    pub monitor: MonitorSpec,
}

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub pool_id: usize,
    pub member_id: usize,
    pub success: bool,
    pub reason: String,
}

enum WorkItem {
    Probe(ProbeRequest),
    Poison,
}

/// A dynamically-sized pool of probe workers sharing one request queue.
/// Workers are plain Tokio tasks reading from an `Arc<Mutex<Receiver>>` —
/// the multi-consumer emulation spec §4.3 calls for when a single
/// `mpsc::Receiver` needs more than one puller.
pub struct WorkerPool {
    request_tx: mpsc::Sender<WorkItem>,
    request_rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    response_tx: mpsc::Sender<ProbeResponse>,
    shutdown: CancellationToken,
    busy: Arc<AtomicUsize>,
    workers: Arc<AtomicUsize>,
    max_busy_observed: Arc<AtomicUsize>,
    max_workers: usize,
}

impl WorkerPool {
    pub fn spawn(
        initial_workers: usize,
        max_workers: usize,
        response_tx: mpsc::Sender<ProbeResponse>,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        let (request_tx, request_rx) = mpsc::channel(initial_workers.max(1) * 8);

        let pool = Arc::new(WorkerPool {
            request_tx,
            request_rx: Arc::new(Mutex::new(request_rx)),
            response_tx,
            shutdown,
            busy: Arc::new(AtomicUsize::new(0)),
            workers: Arc::new(AtomicUsize::new(0)),
            max_busy_observed: Arc::new(AtomicUsize::new(0)),
            max_workers: max_workers.max(initial_workers).max(1),
        });

        for _ in 0..initial_workers {
            pool.spawn_worker();
        }
        pool.clone().spawn_cleanup_task();

        pool
    }

    /// Submits a due probe. Grows the pool by one worker, up to
    /// `max_workers`, if every existing worker currently appears busy.
    pub async fn submit(&self, request: ProbeRequest) {
        let workers = self.workers.load(Ordering::SeqCst);
        let busy = self.busy.load(Ordering::SeqCst);
        if busy >= workers && workers < self.max_workers {
            info!(workers = workers + 1, "spawning additional probe worker");
            self.spawn_worker();
        }
        if self.request_tx.send(WorkItem::Probe(request)).await.is_err() {
            warn!("probe worker pool request channel closed");
        }
    }

    fn spawn_worker(&self) {
        self.workers.fetch_add(1, Ordering::SeqCst);

        let request_rx = self.request_rx.clone();
        let response_tx = self.response_tx.clone();
        let shutdown = self.shutdown.clone();
        let busy = self.busy.clone();
        let max_busy_observed = self.max_busy_observed.clone();
        let workers = self.workers.clone();

        tokio::spawn(async move {
            loop {
                let item = {
                    let mut rx = request_rx.lock().await;
                    tokio::select! {
                        _ = shutdown.cancelled() => None,
                        item = rx.recv() => item,
                    }
                };
                let request = match item {
                    Some(WorkItem::Probe(r)) => r,
                    Some(WorkItem::Poison) | None => break,
                };

                let observed = busy.fetch_add(1, Ordering::SeqCst) + 1;
                max_busy_observed.fetch_max(observed, Ordering::SeqCst);

                let (success, reason) =
                    run_monitor(request.destination, request.monitor.clone()).await;

                busy.fetch_sub(1, Ordering::SeqCst);

                let response = ProbeResponse {
                    pool_id: request.pool_id,
                    member_id: request.member_id,
                    success,
                    reason,
                };
                if response_tx.send(response).await.is_err() {
                    break;
                }
            }
            workers.fetch_sub(1, Ordering::SeqCst);
        });
    }

    fn spawn_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => return,
                    _ = ticker.tick() => {
                        let current_workers = self.workers.load(Ordering::SeqCst);
                        let current_busy = self.busy.load(Ordering::SeqCst);
                        let observed = self.max_busy_observed.swap(current_busy, Ordering::SeqCst);
                        if current_workers.saturating_sub(observed) >= EXCESSIVE_THRESHOLD {
                            let excess = current_workers - observed;
                            debug!(excess, workers = current_workers, observed, "culling excess probe workers");
                            for _ in 0..excess {
                                if self.request_tx.send(WorkItem::Poison).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });
    }
}

/// Runs the monitor on its own task so a panic inside it becomes a
/// `JoinError` rather than taking the worker down with it (spec §4.3: "any
/// unexpected panic is caught by the worker and translated into a failed
/// result").
async fn run_monitor(destination: Ipv4Addr, monitor: MonitorSpec) -> (bool, String) {
    match tokio::spawn(async move { monitors::run(destination, &monitor).await }).await {
        Ok(result) => result,
        Err(join_err) => (false, format!("monitor task panicked: {}", join_err)),
    }
}
