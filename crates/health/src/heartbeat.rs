//! Periodic liveness object written to `polaris_health:heartbeat`, grounded
//! on `guardian/__init__.py`'s control loop in `original_source`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use gslb_domain::config::KvConfig;
use gslb_domain::wire::Heartbeat;
use gslb_kv::KvClient;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub const HEARTBEAT_INTERVAL_SECS: u64 = 1;

pub async fn run(kv: KvClient, kv_config: KvConfig, pid: u32, shutdown: CancellationToken) {
    let mut ticker = interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                let heartbeat = Heartbeat { timestamp: unix_now(), pid };
                match serde_json::to_vec(&heartbeat) {
                    Ok(bytes) => {
                        let ttl = (HEARTBEAT_INTERVAL_SECS + 4) as u32;
                        if let Err(e) = kv.set(&kv_config.heartbeat_key, &bytes, ttl).await {
                            warn!(error = %e, "failed to write heartbeat to kv store");
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to serialize heartbeat"),
                }
            }
        }
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
