//! Polls the shared KV store for new published state and hot-swaps it in.
//! See spec §4.6.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use gslb_domain::config::KvConfig;
use gslb_domain::DistributionForm;
use gslb_kv::KvClient;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::state::DistSnapshot;

/// Poll cadence; spec §4.6 specifies "≈ 500 ms".
pub const POLL_INTERVAL_MS: u64 = 500;

pub async fn run(
    kv: KvClient,
    kv_config: KvConfig,
    snapshot: Arc<ArcSwap<DistSnapshot>>,
    shutdown: CancellationToken,
) {
    let mut last_seen: Option<String> = None;
    let mut ticker = interval(Duration::from_millis(POLL_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                poll_once(&kv, &kv_config, &snapshot, &mut last_seen).await;
            }
        }
    }
}

/// One polling cycle, broken out and made public so integration tests can
/// drive the subscriber deterministically instead of waiting on `run`'s
/// ticker.
pub async fn poll_once(
    kv: &KvClient,
    kv_config: &KvConfig,
    snapshot: &Arc<ArcSwap<DistSnapshot>>,
    last_seen: &mut Option<String>,
) {
    let timestamp_bytes = match kv.get(&kv_config.state_timestamp_key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "failed to poll state timestamp, keeping prior snapshot");
            return;
        }
    };
    let timestamp_str = String::from_utf8_lossy(&timestamp_bytes).trim().to_string();
    if last_seen.as_deref() == Some(timestamp_str.as_str()) {
        return;
    }

    let dist_bytes = match kv.get(&kv_config.ppdns_state_key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "failed to fetch distribution form, keeping prior snapshot");
            return;
        }
    };

    let form: DistributionForm = match serde_json::from_slice(&dist_bytes) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "failed to parse distribution form, keeping prior snapshot");
            return;
        }
    };

    let state_timestamp: f64 = timestamp_str.parse().unwrap_or(0.0);
    let previous = snapshot.load();
    let new_snapshot = DistSnapshot::from_wire(&form, state_timestamp, Some(&previous));
    snapshot.store(Arc::new(new_snapshot));
    *last_seen = Some(timestamp_str);
    debug!(state_timestamp, "swapped distribution snapshot");
}
