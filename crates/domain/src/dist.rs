use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::config::LbMethod;
use crate::pool::Pool;
use crate::status::Status;

pub const DEFAULT_TABLE: &str = "_default";

/// A shuffled sequence of member IPs (each repeated according to its
/// weight) plus a rotation cursor, used for weighted round-robin record
/// selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub rotation: Vec<Ipv4Addr>,
    /// Parallel to `rotation` on the `_default` table only. Declared by the
    /// wire format but never populated: see the "member names in rotation"
    /// open question resolved in DESIGN.md — this build mandates IPs only.
    pub names: Option<Vec<String>>,
    pub num_unique_addrs: usize,
    pub index: usize,
}

impl DistributionTable {
    fn empty() -> Self {
        DistributionTable {
            rotation: Vec::new(),
            names: None,
            num_unique_addrs: 0,
            index: 0,
        }
    }
}

/// Builds the `_default` table plus, for `twrr` pools, one table per region
/// present among UP members. Mirrors `Pool.to_dist_dict()` from the
/// reference implementation this system is modeled on.
pub fn build_dist_tables(
    pool: &Pool,
    rng: &mut fastrand::Rng,
) -> BTreeMap<String, DistributionTable> {
    let mut tables: BTreeMap<String, DistributionTable> = BTreeMap::new();
    tables.insert(DEFAULT_TABLE.to_string(), DistributionTable::empty());

    if pool.status() {
        for member in &pool.members {
            if member.weight == 0 || member.status != Status::Up {
                continue;
            }

            let default_table = tables.get_mut(DEFAULT_TABLE).unwrap();
            for _ in 0..member.weight {
                default_table.rotation.push(member.ip);
            }
            default_table.num_unique_addrs += 1;

            if pool.lb_method == LbMethod::Twrr {
                if let Some(region) = &member.region {
                    let regional = tables
                        .entry(region.clone())
                        .or_insert_with(DistributionTable::empty);
                    for _ in 0..member.weight {
                        regional.rotation.push(member.ip);
                    }
                    regional.num_unique_addrs += 1;
                }
            }

            if pool.lb_method == LbMethod::Fogroup {
                // Failover group: only the first available UP member appears.
                break;
            }
        }
    } else {
        // Pool DOWN / fallback=any population: every weighted member,
        // regardless of current health status.
        for member in &pool.members {
            if member.weight == 0 {
                continue;
            }
            let default_table = tables.get_mut(DEFAULT_TABLE).unwrap();
            for _ in 0..member.weight {
                default_table.rotation.push(member.ip);
            }
            default_table.num_unique_addrs += 1;
        }
    }

    for table in tables.values_mut() {
        rng.shuffle(&mut table.rotation);
        table.index = if table.rotation.is_empty() {
            0
        } else {
            rng.usize(0..table.rotation.len())
        };
    }

    tables
}
