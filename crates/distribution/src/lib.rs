//! The distribution process: the state subscriber and the DNS remote-backend
//! query loop, sharing one hot-swapped [`state::DistSnapshot`]. See spec
//! §4.5-§4.6 and §2's "distribution process" description.

pub mod errors;
pub mod protocol;
pub mod query;
pub mod soa;
pub mod state;
pub mod subscriber;

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::Config;
use gslb_domain::{GlobalName, TopologyMap};
use gslb_kv::KvClient;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use errors::DistributionError;
pub use state::DistSnapshot;

/// Loads the static (globalname/topology/SOA) context from `config`, then
/// runs the subscriber and query loop concurrently until `shutdown` is
/// cancelled or the query loop observes EOF/an empty request line.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), DistributionError> {
    let topology = TopologyMap::from_config(&config.topology)?;

    let mut globalnames = HashMap::with_capacity(config.lb.globalnames.len());
    for (fqdn, gn_config) in &config.lb.globalnames {
        let globalname = GlobalName::from_config(fqdn, gn_config);
        globalnames.insert(globalname.name.clone(), globalname);
    }

    let snapshot = Arc::new(ArcSwap::from_pointee(DistSnapshot::default()));

    let kv = KvClient::from_config(&config.base.kv);

    let ctx = Arc::new(query::Context {
        globalnames,
        topology,
        soa: config.base.soa.clone(),
        snapshot: snapshot.clone(),
    });

    info!(
        globalnames = ctx.globalnames.len(),
        "distribution process starting"
    );

    let subscriber_shutdown = shutdown.clone();
    tokio::spawn(subscriber::run(
        kv,
        config.base.kv.clone(),
        snapshot,
        subscriber_shutdown,
    ));

    let query_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = query::run(ctx) => {
                info!("query loop exited, requesting process shutdown");
                query_shutdown.cancel();
            }
            _ = query_shutdown.cancelled() => {}
        }
    });

    shutdown.cancelled().await;
    info!("distribution process shutting down");
    Ok(())
}
