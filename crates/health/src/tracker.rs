//! The health tracker: schedules due probes off [`State`]'s priority queue,
//! dispatches them to the worker pool, and applies returned results. See
//! spec §4.1.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use gslb_domain::{MemberTransition, ProbeResult, State};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::workers::{ProbeRequest, ProbeResponse, WorkerPool};

/// How long the tracker sleeps when neither a response was waiting nor a
/// probe was due, to avoid busy-looping (spec §4.1 step 3).
const IDLE_SLEEP: Duration = Duration::from_millis(50);

pub async fn run(
    state: Arc<Mutex<State>>,
    pool: Arc<WorkerPool>,
    mut response_rx: mpsc::Receiver<ProbeResponse>,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }

        let mut did_work = false;

        if let Ok(response) = response_rx.try_recv() {
            did_work = true;
            let mut state = state.lock().await;
            let result = ProbeResult {
                pool_id: response.pool_id,
                member_id: response.member_id,
                success: response.success,
                reason: response.reason,
            };
            if let Some(transition) = state.apply_probe_result(result, unix_now()) {
                log_transition(&transition);
            }
        }

        let due_request = {
            let mut state = state.lock().await;
            let now = Instant::now();
            state.pop_due(now).map(|item| {
                let pool_ref = &state.pools[item.pool_id];
                let member = &pool_ref.members[item.member_id];
                ProbeRequest {
                    pool_id: item.pool_id,
                    member_id: item.member_id,
                    destination: member.probe_destination(),
                    monitor: pool_ref.monitor.clone(),
                }
            })
        };

        if let Some(request) = due_request {
            did_work = true;
            pool.submit(request).await;
        }

        if !did_work {
            tokio::time::sleep(IDLE_SLEEP).await;
        }
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

fn log_transition(transition: &MemberTransition) {
    info!(
        pool = %transition.pool_name,
        member_ip = %transition.member_ip,
        member_name = %transition.member_name,
        monitor_ip = %transition.monitor_ip,
        status = %transition.new_status,
        reason = %transition.reason,
        "member status transition"
    );
    if let Some(pool_up) = transition.pool_status_changed {
        info!(pool = %transition.pool_name, up = pool_up, "pool status transition");
    }
}
