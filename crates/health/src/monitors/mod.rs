//! Protocol-level health checks. Each monitor shares the contract described
//! in spec §4.4: `run(dst_ip) -> success | failure(reason)`, enforcing its
//! own `timeout` wall-clock budget.

pub mod budget;
pub mod external;
pub mod forced;
pub mod http;
pub mod tcp_connect;
pub mod tcp_content;

use std::net::Ipv4Addr;

use gslb_domain::config::MonitorSpec;

/// Dispatches to the monitor implementation named by `spec`. Returns
/// `(success, reason)`; `reason` is always populated, even on success, for
/// use as `PoolMember::status_reason`.
pub async fn run(destination: Ipv4Addr, spec: &MonitorSpec) -> (bool, String) {
    match spec {
        MonitorSpec::TcpConnect(p) => tcp_connect::check(destination, p).await,
        MonitorSpec::TcpContent(p) => tcp_content::check(destination, p).await,
        MonitorSpec::Http(p) => http::check(destination, p).await,
        MonitorSpec::Forced(p) => forced::check(p),
        MonitorSpec::External(p) => external::check(destination, p).await,
    }
}
