use std::net::Ipv4Addr;
use std::time::Instant;

use crate::config::{Fallback, LbMethod, MonitorSpec, PoolConfig};
use crate::status::Status;
use crate::DomainError;

pub const MAX_MEMBER_NAME_LEN: usize = 256;
pub const MAX_MEMBER_WEIGHT: u8 = 99;
pub const MAX_POOL_NAME_LEN: usize = 256;
pub const MAX_REGION_LEN: usize = 256;

/// A single backend server, member of a [`Pool`].
#[derive(Debug, Clone)]
pub struct PoolMember {
    pub ip: Ipv4Addr,
    pub name: String,
    pub weight: u8,
    pub region: Option<String>,
    pub monitor_ip: Option<Ipv4Addr>,

    pub status: Status,
    pub status_reason: String,
    /// Reset to the parent pool's `monitor.retries` on UP and on initial
    /// schedule; decremented on each consecutive failure.
    pub retries_left: u16,
    pub last_probe_issued: Option<Instant>,
}

impl PoolMember {
    pub fn new(
        ip: Ipv4Addr,
        name: String,
        weight: u8,
        region: Option<String>,
        monitor_ip: Option<Ipv4Addr>,
        initial_retries: u16,
    ) -> Result<Self, DomainError> {
        if name.len() > MAX_MEMBER_NAME_LEN {
            return Err(DomainError::InvalidMemberName(format!(
                "\"{}\" exceeds {} chars",
                name, MAX_MEMBER_NAME_LEN
            )));
        }
        if weight > MAX_MEMBER_WEIGHT {
            return Err(DomainError::InvalidWeight(format!(
                "member \"{}\" weight {} exceeds {}",
                name, weight, MAX_MEMBER_WEIGHT
            )));
        }
        if let Some(ref r) = region {
            if r.len() > MAX_REGION_LEN {
                return Err(DomainError::InvalidRegion(format!(
                    "member \"{}\" region \"{}\" exceeds {} chars",
                    name, r, MAX_REGION_LEN
                )));
            }
        }

        Ok(Self {
            ip,
            name,
            weight,
            region,
            monitor_ip,
            status: Status::Unknown,
            status_reason: String::new(),
            retries_left: initial_retries,
            last_probe_issued: None,
        })
    }

    /// The IP actually dialed by probing workers: `monitor_ip` if set, else `ip`.
    pub fn probe_destination(&self) -> Ipv4Addr {
        self.monitor_ip.unwrap_or(self.ip)
    }
}

/// A named set of member addresses behind a global name, all probed by the
/// same monitor.
#[derive(Debug, Clone)]
pub struct Pool {
    pub name: String,
    pub monitor: MonitorSpec,
    pub members: Vec<PoolMember>,
    pub lb_method: LbMethod,
    pub fallback: Fallback,
    pub max_addrs_returned: u8,
    /// Last pool-level status observed, used only to detect and log
    /// pool-level UP/DOWN transitions.
    pub last_status: Option<bool>,
}

impl Pool {
    /// `true` iff any weighted member is UP.
    pub fn status(&self) -> bool {
        self.members
            .iter()
            .any(|m| m.weight > 0 && m.status == Status::Up)
    }

    pub fn from_config(
        name: &str,
        cfg: &PoolConfig,
        topology_map: &crate::topology::TopologyMap,
    ) -> Result<Self, DomainError> {
        if name.len() > MAX_POOL_NAME_LEN {
            return Err(DomainError::InvalidPool(format!(
                "pool name \"{}\" exceeds {} chars",
                name, MAX_POOL_NAME_LEN
            )));
        }

        let monitor = MonitorSpec::from_config(&cfg.monitor)?;
        let retries = monitor.retries();

        let mut members = Vec::with_capacity(cfg.members.len());
        for (ip_str, member_cfg) in &cfg.members {
            let ip: Ipv4Addr = ip_str
                .parse()
                .map_err(|_| DomainError::InvalidIpAddress(ip_str.clone()))?;

            let monitor_ip = member_cfg
                .monitor_ip
                .as_ref()
                .map(|s| {
                    s.parse::<Ipv4Addr>()
                        .map_err(|_| DomainError::InvalidIpAddress(s.clone()))
                })
                .transpose()?;

            let region = if cfg.lb_method == LbMethod::Twrr {
                let region = topology_map.get_region(&ip);
                Some(region.ok_or_else(|| DomainError::UnresolvedRegion {
                    pool: name.to_string(),
                    member: member_cfg.name.clone(),
                })?)
            } else {
                None
            };

            members.push(PoolMember::new(
                ip,
                member_cfg.name.clone(),
                member_cfg.weight,
                region,
                monitor_ip,
                retries,
            )?);
        }

        if members.is_empty() {
            return Err(DomainError::InvalidPool(format!(
                "pool \"{}\" has no members",
                name
            )));
        }

        if !(1..=100).contains(&cfg.max_addrs_returned) {
            return Err(DomainError::InvalidPool(format!(
                "pool \"{}\" max_addrs_returned must be 1..100",
                name
            )));
        }

        Ok(Pool {
            name: name.to_string(),
            monitor,
            members,
            lb_method: cfg.lb_method,
            fallback: cfg.fallback,
            max_addrs_returned: cfg.max_addrs_returned,
            last_status: None,
        })
    }
}
