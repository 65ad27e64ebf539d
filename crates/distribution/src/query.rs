//! The DNS remote-backend query loop: newline-delimited JSON on stdin,
//! newline-delimited JSON on stdout. Runs on a dedicated blocking thread
//! (`tokio::task::spawn_blocking`) so the subscriber task keeps polling
//! concurrently on the same runtime. See spec §4.5 and §6.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::net::Ipv4Addr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::{Fallback, SoaConfig};
use gslb_domain::{normalize_qname, GlobalName, TopologyMap};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::protocol::{Parameters, Request};
use crate::soa;
use crate::state::{DistPool, DistSnapshot};

/// Everything the query loop needs besides the hot-swapped snapshot: the
/// globalname table, topology map and SOA config, all static for the
/// lifetime of the process (loaded once at startup, spec §1's "no dynamic
/// reconfiguration without restart").
pub struct Context {
    pub globalnames: HashMap<String, GlobalName>,
    pub topology: TopologyMap,
    pub soa: SoaConfig,
    pub snapshot: Arc<ArcSwap<DistSnapshot>>,
}

/// Runs the blocking stdin/stdout loop to completion (EOF or an empty
/// request line) on a blocking-pool thread.
pub async fn run(ctx: Arc<Context>) {
    let result = tokio::task::spawn_blocking(move || run_blocking(&ctx)).await;
    if let Err(e) = result {
        warn!(error = %e, "query loop thread panicked");
    }
}

fn run_blocking(ctx: &Context) {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();

    loop {
        line.clear();
        let read = stdin.lock().read_line(&mut line);
        let bytes_read = match read {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "stdin read error, exiting query loop");
                return;
            }
        };

        if bytes_read == 0 || line.trim().is_empty() {
            info!("empty request line received, exiting query loop");
            return;
        }

        let response = handle_line(ctx, &line);
        let mut out = response.to_string();
        out.push('\n');
        if stdout.write_all(out.as_bytes()).is_err() || stdout.flush().is_err() {
            warn!("stdout write error, exiting query loop");
            return;
        }
    }
}

fn handle_line(ctx: &Context, line: &str) -> Value {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "malformed remote-backend request");
            return false_result();
        }
    };

    match request.method.as_str() {
        "initialize" => json!({"result": true}),
        "lookup" => handle_lookup(ctx, &request.parameters),
        "getDomainMetadata" => false_result(),
        other => {
            warn!(method = other, "unsupported remote-backend method");
            false_result()
        }
    }
}

/// Resolves one `lookup` request's parameters to a response. Exposed
/// (rather than kept private to the query loop) so integration tests can
/// drive record selection without going through stdin/stdout framing.
pub fn handle_lookup(ctx: &Context, params: &Parameters) -> Value {
    let Some(qname_raw) = params.qname.as_deref() else {
        return false_result();
    };
    let qname_norm = normalize_qname(qname_raw);

    let Some(globalname) = ctx.globalnames.get(&qname_norm) else {
        return false_result();
    };

    let snapshot = ctx.snapshot.load();
    let Some(pool) = snapshot.pools.get(&globalname.pool_name) else {
        return false_result();
    };

    if !pool.status_up && pool.fallback == Fallback::Refuse {
        return false_result();
    }

    match params.qtype.as_deref() {
        Some("SOA") => soa::synthesize(&ctx.soa, qname_raw, snapshot.state_timestamp),
        Some("A") | Some("ANY") => select_records(ctx, pool, params, globalname, qname_raw),
        _ => false_result(),
    }
}

/// Appends `N` records from the chosen table, each advancing the rotation
/// cursor. See spec §4.5 steps 3-4.
fn select_records(
    ctx: &Context,
    pool: &DistPool,
    params: &Parameters,
    globalname: &GlobalName,
    qname_raw: &str,
) -> Value {
    let region = params
        .remote
        .as_deref()
        .and_then(|ip| ip.parse::<Ipv4Addr>().ok())
        .and_then(|ip| ctx.topology.get_region(&ip));

    let Some(table) = pool.table_for(region.as_deref()) else {
        return false_result();
    };

    let n = (pool.max_addrs_returned as usize).min(table.num_unique_addrs);
    if n == 0 {
        return false_result();
    }

    let mut records = Vec::with_capacity(n);
    for _ in 0..n {
        match table.next_ip() {
            Some(ip) => records.push(json!({
                "qtype": "A",
                "qname": qname_raw,
                "content": ip.to_string(),
                "ttl": globalname.ttl,
            })),
            None => return false_result(),
        }
    }

    json!({"result": records})
}

fn false_result() -> Value {
    json!({"result": false})
}
