//! The health process: tracker, probing worker pool, monitors and state
//! publisher, wired together behind one shared [`State`] mutex. See spec
//! §4.1-§4.3 and §2's "health process" description.

pub mod control;
pub mod errors;
pub mod heartbeat;
pub mod monitors;
pub mod publisher;
pub mod tracker;
pub mod workers;

use std::sync::Arc;
use std::time::Instant;

use gslb_domain::config::Config;
use gslb_domain::State;
use gslb_kv::KvClient;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use errors::HealthError;

/// Hard ceiling on dynamically-spawned probe workers (spec §4.3
/// "MAX_WORKERS").
pub const MAX_WORKERS: usize = 256;
/// Depth of the worker-pool response channel; generous enough that a slow
/// tracker iteration never backpressures a worker mid-probe.
const RESPONSE_CHANNEL_CAPACITY: usize = 1024;

/// Builds [`State`] from `config`, seeds its probe schedule, and runs the
/// tracker, worker pool, publisher, heartbeat and control socket until
/// `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), HealthError> {
    let mut state = State::from_config(&config)?;

    let mut rng = fastrand::Rng::new();
    state.seed_schedule(Instant::now(), &mut rng);

    let state = Arc::new(Mutex::new(state));

    let kv = KvClient::from_config(&config.base.kv);

    let (response_tx, response_rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
    let initial_workers = config.base.server.num_probers.max(1);
    let pool = workers::WorkerPool::spawn(initial_workers, MAX_WORKERS, response_tx, shutdown.clone());

    let publisher = publisher::StatePublisher::new(state.clone(), kv.clone(), config.base.kv.clone());

    let control_socket_path = config.base.server.control_socket_path();

    info!(
        pools = state_pool_count(&state).await,
        workers = initial_workers,
        "health process starting"
    );

    tokio::spawn(tracker::run(state.clone(), pool, response_rx, shutdown.clone()));
    tokio::spawn(publisher.run(shutdown.clone()));
    tokio::spawn(heartbeat::run(
        kv.clone(),
        config.base.kv.clone(),
        std::process::id(),
        shutdown.clone(),
    ));
    let control_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = control::run(&control_socket_path, control_shutdown).await {
            tracing::warn!(error = %e, "control socket failed to start");
        }
    });

    shutdown.cancelled().await;
    info!("health process shutting down");
    Ok(())
}

async fn state_pool_count(state: &Arc<Mutex<State>>) -> usize {
    state.lock().await.pools.len()
}
