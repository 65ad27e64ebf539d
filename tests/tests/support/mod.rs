//! Shared config-building helpers for the scenario tests in this crate.
//! Builds `Config` values in-memory rather than on-disk YAML, since these
//! tests exercise the health/distribution pipeline, not the YAML loader
//! (already covered by `gslb-domain`'s own config tests).

use std::collections::BTreeMap;

use gslb_domain::config::{
    BaseConfig, Config, Fallback, GlobalNameConfig, LbConfig, LbMethod, MonitorConfig,
    PoolConfig, PoolMemberConfig, TopologyConfig,
};

pub struct MemberSpec {
    pub ip: &'static str,
    pub name: &'static str,
    pub weight: u8,
    pub region: Option<&'static str>,
}

pub fn member(ip: &'static str, name: &'static str, weight: u8) -> MemberSpec {
    MemberSpec {
        ip,
        name,
        weight,
        region: None,
    }
}

pub fn member_in(ip: &'static str, name: &'static str, weight: u8, region: &'static str) -> MemberSpec {
    MemberSpec {
        ip,
        name,
        weight,
        region: Some(region),
    }
}

fn tcp_connect_monitor() -> MonitorConfig {
    let mut params = serde_yaml::Mapping::new();
    params.insert("port".into(), 80.into());
    MonitorConfig {
        monitor: "tcp_connect".to_string(),
        monitor_params: params,
    }
}

pub fn pool_config(members: Vec<MemberSpec>, lb_method: LbMethod, fallback: Fallback, max_addrs_returned: u8) -> PoolConfig {
    let mut member_map = BTreeMap::new();
    for m in members {
        member_map.insert(
            m.ip.to_string(),
            PoolMemberConfig {
                name: m.name.to_string(),
                weight: m.weight,
                monitor_ip: None,
            },
        );
    }
    PoolConfig {
        monitor: tcp_connect_monitor(),
        lb_method,
        fallback,
        max_addrs_returned,
        members: member_map,
    }
}

pub fn config_with(
    pools: Vec<(&str, PoolConfig)>,
    globalnames: Vec<(&str, &str, u32)>,
    topology: Vec<(&str, Vec<&str>)>,
) -> Config {
    let mut pool_map = BTreeMap::new();
    for (name, cfg) in pools {
        pool_map.insert(name.to_string(), cfg);
    }

    let mut gn_map = BTreeMap::new();
    for (fqdn, pool, ttl) in globalnames {
        gn_map.insert(
            fqdn.to_string(),
            GlobalNameConfig {
                pool: pool.to_string(),
                ttl,
                nsrecord: false,
            },
        );
    }

    let mut topo_map = BTreeMap::new();
    for (region, cidrs) in topology {
        topo_map.insert(region.to_string(), cidrs.into_iter().map(String::from).collect());
    }

    Config {
        base: BaseConfig::default(),
        lb: LbConfig {
            pools: pool_map,
            globalnames: gn_map,
        },
        topology: TopologyConfig(topo_map),
    }
}

/// Brings every member of every pool in `state` UP, by feeding a successful
/// probe result for each `(pool_id, member_id)`. Convenience for scenarios
/// that don't care about the convergence path itself.
pub fn bring_all_up(state: &mut gslb_domain::State) {
    for pool_id in 0..state.pools.len() {
        for member_id in 0..state.pools[pool_id].members.len() {
            state.apply_probe_result(
                gslb_domain::ProbeResult {
                    pool_id,
                    member_id,
                    success: true,
                    reason: "ok".to_string(),
                },
                1.0,
            );
        }
    }
}
