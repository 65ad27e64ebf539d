//! Serialises [`State`] into its two wire projections and writes them to the
//! shared KV store on a fixed cadence, gated on convergence. See spec §4.2.

use std::sync::Arc;
use std::time::Duration;

use gslb_domain::config::KvConfig;
use gslb_domain::State;
use gslb_kv::KvClient;
use tokio::sync::Mutex;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Publish cadence; spec §4.2 specifies "≈ 500 ms".
pub const PUBLISH_INTERVAL_MS: u64 = 500;

pub struct StatePublisher {
    state: Arc<Mutex<State>>,
    kv: KvClient,
    kv_config: KvConfig,
    last_pushed_timestamp: f64,
}

impl StatePublisher {
    pub fn new(state: Arc<Mutex<State>>, kv: KvClient, kv_config: KvConfig) -> Self {
        StatePublisher {
            state,
            kv,
            kv_config,
            last_pushed_timestamp: f64::NEG_INFINITY,
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = interval(Duration::from_millis(PUBLISH_INTERVAL_MS));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("state publisher shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.try_publish().await;
                }
            }
        }
    }

    /// Does nothing unless the state has converged and advanced since the
    /// last successful publish (spec §4.2: "MUST NOT publish before
    /// convergence"). Public so integration tests can drive a single publish
    /// cycle deterministically instead of waiting on `run`'s ticker.
    pub async fn try_publish(&mut self) {
        let (timestamp, distribution, generic) = {
            let state = self.state.lock().await;
            if !state.health_converged {
                return;
            }
            if state.state_timestamp <= self.last_pushed_timestamp {
                return;
            }
            let mut rng = fastrand::Rng::with_seed(state.state_timestamp.to_bits());
            let distribution = state.to_distribution_form(&mut rng);
            let generic = state.to_generic_form();
            (state.state_timestamp, distribution, generic)
        };

        let dist_bytes = match serde_json::to_vec(&distribution) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed to serialize distribution form, skipping publish");
                return;
            }
        };
        let generic_bytes = match serde_json::to_vec(&generic) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed to serialize generic form, skipping publish");
                return;
            }
        };
        let timestamp_bytes = timestamp.to_string().into_bytes();

        // Writes in this exact order — timestamp last — so a subscriber
        // never observes a timestamp newer than the data it indexes.
        if let Err(e) = self
            .kv
            .set(&self.kv_config.ppdns_state_key, &dist_bytes, 0)
            .await
        {
            warn!(error = %e, "failed to publish distribution form, retrying next cycle");
            return;
        }
        if let Err(e) = self
            .kv
            .set(&self.kv_config.generic_state_key, &generic_bytes, 0)
            .await
        {
            warn!(error = %e, "failed to publish generic form, retrying next cycle");
            return;
        }
        if let Err(e) = self
            .kv
            .set(&self.kv_config.state_timestamp_key, &timestamp_bytes, 0)
            .await
        {
            warn!(error = %e, "failed to publish state timestamp, retrying next cycle");
            return;
        }

        self.last_pushed_timestamp = timestamp;
        debug!(timestamp, "published state to kv store");
    }
}
