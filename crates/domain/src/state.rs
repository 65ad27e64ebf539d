use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::dist::build_dist_tables;
use crate::globalname::{normalize_qname, GlobalName};
use crate::pool::Pool;
use crate::status::Status;
use crate::topology::TopologyMap;
use crate::wire::{DistributionForm, GenericForm, GenericMemberForm, GenericPoolForm, PoolDistributionForm};
use crate::DomainError;

/// How widely initial probe due-times are dispersed on startup, to avoid a
/// thundering herd of simultaneous probes.
pub const DISPERSION_WINDOW_MS: u64 = 2_000;

/// Probe correlator: indexes directly into `State.pools[pool_id].members[member_id]`.
/// This collapses the reference implementation's separate `pool_by_id` /
/// `member_by_id` lookup tables into direct `Vec` indexing — still O(1),
/// with one fewer layer of indirection; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PqItem {
    pub pool_id: usize,
    pub member_id: usize,
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub pool_id: usize,
    pub member_id: usize,
    pub success: bool,
    pub reason: String,
}

/// Describes an observed member (and possibly pool) status transition, for
/// the caller to log. `State` itself never logs — it has no I/O dependency.
#[derive(Debug, Clone)]
pub struct MemberTransition {
    pub pool_name: String,
    pub member_ip: Ipv4Addr,
    pub member_name: String,
    pub monitor_ip: Ipv4Addr,
    pub new_status: Status,
    pub reason: String,
    /// `Some(new_pool_status)` if this member transition also flipped the
    /// parent pool's derived status.
    pub pool_status_changed: Option<bool>,
}

/// The root aggregate: authoritative in-memory load-balancing state for one
/// health process. Built once at startup from [`Config`] and mutated
/// in-place thereafter; it is never rebuilt while running.
pub struct State {
    pub pools: Vec<Pool>,
    pub pool_index: HashMap<String, usize>,
    pub globalnames: HashMap<String, GlobalName>,
    pub topology: TopologyMap,
    pub pq: BinaryHeap<Reverse<(Instant, PqItem)>>,
    /// Count of members still in `Status::Unknown`. Reaching zero flips
    /// `health_converged` to true, permanently (see invariant in spec §4.1).
    undetermined_count: usize,
    pub health_converged: bool,
    /// Unix-epoch seconds of the last member status change; bumped on every
    /// transition, read by the publisher to decide whether to push a new
    /// snapshot.
    pub state_timestamp: f64,
}

impl State {
    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        let topology = TopologyMap::from_config(&config.topology)?;

        let mut pools = Vec::with_capacity(config.lb.pools.len());
        let mut pool_index = HashMap::with_capacity(config.lb.pools.len());
        let mut undetermined_count = 0usize;

        for (name, pool_cfg) in &config.lb.pools {
            let pool = Pool::from_config(name, pool_cfg, &topology)?;
            undetermined_count += pool.members.len();
            pool_index.insert(name.clone(), pools.len());
            pools.push(pool);
        }

        let mut globalnames = HashMap::with_capacity(config.lb.globalnames.len());
        for (fqdn, gn_cfg) in &config.lb.globalnames {
            if !pool_index.contains_key(&gn_cfg.pool) {
                return Err(DomainError::UnknownPool(gn_cfg.pool.clone()));
            }
            let gn = GlobalName::from_config(fqdn, gn_cfg);
            globalnames.insert(gn.name.clone(), gn);
        }

        Ok(State {
            pools,
            pool_index,
            globalnames,
            topology,
            pq: BinaryHeap::new(),
            undetermined_count,
            health_converged: undetermined_count == 0,
            state_timestamp: 0.0,
        })
    }

    /// Seeds the priority queue with one entry per member, due at
    /// `now + uniform(0, DISPERSION_WINDOW_MS)`.
    pub fn seed_schedule(&mut self, now: Instant, rng: &mut fastrand::Rng) {
        for pool_id in 0..self.pools.len() {
            for member_id in 0..self.pools[pool_id].members.len() {
                let jitter = Duration::from_millis(rng.u64(0..=DISPERSION_WINDOW_MS));
                self.pq.push(Reverse((
                    now + jitter,
                    PqItem { pool_id, member_id },
                )));
            }
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pq.peek().map(|Reverse((due, _))| *due)
    }

    /// If the PQ head is due, pops it, reschedules the same (pool, member)
    /// at `now + monitor.interval`, and returns the popped correlator so the
    /// caller can issue a probe request.
    pub fn pop_due(&mut self, now: Instant) -> Option<PqItem> {
        let due = match self.pq.peek() {
            Some(Reverse((due, _))) if *due <= now => *due,
            _ => return None,
        };
        let _ = due;
        let Reverse((_, item)) = self.pq.pop().expect("peeked Some above");

        let interval = Duration::from_secs(self.pools[item.pool_id].monitor.interval_secs());
        self.pq.push(Reverse((now + interval, item)));

        Some(item)
    }

    /// Applies a probe response to the addressed member, per the hysteresis
    /// rules in spec §4.1. Returns `None` if no transition occurred.
    pub fn apply_probe_result(
        &mut self,
        result: ProbeResult,
        now_unix: f64,
    ) -> Option<MemberTransition> {
        let retries_cfg = self.pools[result.pool_id].monitor.retries();
        let member = &mut self.pools[result.pool_id].members[result.member_id];
        member.status_reason = result.reason;
        let was_unknown = member.status == Status::Unknown;

        let transitioned = if result.success {
            member.retries_left = retries_cfg;
            if member.status == Status::Up {
                false
            } else {
                member.status = Status::Up;
                true
            }
        } else {
            match member.status {
                Status::Up | Status::Unknown => {
                    if member.retries_left > 0 {
                        member.retries_left -= 1;
                        false
                    } else {
                        member.status = Status::Down;
                        true
                    }
                }
                Status::Down => false,
            }
        };

        if !transitioned {
            return None;
        }

        let member_ip = member.ip;
        let member_name = member.name.clone();
        let monitor_ip = member.probe_destination();
        let new_status = member.status;
        let reason = member.status_reason.clone();

        if was_unknown {
            self.undetermined_count = self.undetermined_count.saturating_sub(1);
            if self.undetermined_count == 0 {
                self.health_converged = true;
            }
        }
        self.state_timestamp = now_unix;

        let pool = &mut self.pools[result.pool_id];
        let pool_name = pool.name.clone();
        let new_pool_status = pool.status();
        let pool_status_changed = if pool.last_status != Some(new_pool_status) {
            pool.last_status = Some(new_pool_status);
            Some(new_pool_status)
        } else {
            None
        };

        Some(MemberTransition {
            pool_name,
            member_ip,
            member_name,
            monitor_ip,
            new_status,
            reason,
            pool_status_changed,
        })
    }

    /// Builds the distribution-form projection published to
    /// `polaris_health:ppdns_state`. `rng` should be freshly seeded per call
    /// (see the rotation shuffle in [`crate::dist::build_dist_tables`]).
    pub fn to_distribution_form(&self, rng: &mut fastrand::Rng) -> DistributionForm {
        self.pools
            .iter()
            .map(|pool| {
                let tables = build_dist_tables(pool, rng);
                (
                    pool.name.clone(),
                    PoolDistributionForm {
                        status_up: pool.status(),
                        lb_method: pool.lb_method,
                        fallback: pool.fallback,
                        max_addrs_returned: pool.max_addrs_returned,
                        tables,
                    },
                )
            })
            .collect()
    }

    /// Builds the generic-form diagnostic projection published to
    /// `polaris_health:generic_state`.
    pub fn to_generic_form(&self) -> GenericForm {
        self.pools
            .iter()
            .map(|pool| {
                let members = pool
                    .members
                    .iter()
                    .map(|m| GenericMemberForm {
                        name: m.name.clone(),
                        ip: m.ip,
                        weight: m.weight,
                        region: m.region.clone(),
                        status: m.status,
                        status_reason: m.status_reason.clone(),
                    })
                    .collect();
                (
                    pool.name.clone(),
                    GenericPoolForm {
                        monitor: pool.monitor.name().to_string(),
                        lb_method: pool.lb_method,
                        fallback: pool.fallback,
                        status_up: pool.status(),
                        members,
                    },
                )
            })
            .collect()
    }
}

pub fn normalize_and_lookup<'a>(
    globalnames: &'a HashMap<String, GlobalName>,
    qname: &str,
) -> Option<&'a GlobalName> {
    globalnames.get(&normalize_qname(qname))
}
