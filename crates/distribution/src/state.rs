//! The distribution process's in-memory projection of published state: a
//! snapshot hot-swapped behind `arc_swap::ArcSwap` by the subscriber and read
//! lock-free by the query loop. See spec §4.5-§4.6.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};

use gslb_domain::config::{Fallback, LbMethod};
use gslb_domain::{DistributionForm, DistributionTable, DEFAULT_TABLE};

/// A distribution table with its rotation cursor held as an atomic so the
/// read-hot query loop can advance it without taking a lock on the snapshot.
#[derive(Debug)]
pub struct DistTable {
    pub rotation: Vec<Ipv4Addr>,
    pub num_unique_addrs: usize,
    index: AtomicUsize,
}

impl DistTable {
    fn from_wire(table: &DistributionTable) -> Self {
        DistTable {
            rotation: table.rotation.clone(),
            num_unique_addrs: table.num_unique_addrs,
            index: AtomicUsize::new(table.index),
        }
    }

    /// The cursor's current position, without advancing it. For diagnostics
    /// and tests; the query loop always goes through [`DistTable::next_ip`].
    pub fn current_index(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Returns the record at the current cursor and advances it, wrapping at
    /// the end of the rotation. `None` for an empty rotation.
    pub fn next_ip(&self) -> Option<Ipv4Addr> {
        let len = self.rotation.len();
        if len == 0 {
            return None;
        }
        let idx = self
            .index
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| Some((i + 1) % len))
            .expect("closure always returns Some");
        Some(self.rotation[idx])
    }
}

#[derive(Debug)]
pub struct DistPool {
    pub status_up: bool,
    pub lb_method: LbMethod,
    pub fallback: Fallback,
    pub max_addrs_returned: u8,
    pub tables: HashMap<String, DistTable>,
}

impl DistPool {
    /// The table a lookup for `region` should use, per spec §4.5 step 3:
    /// TWRR pools that are UP prefer a same-named regional table, falling
    /// back to `_default`; everything else always uses `_default`.
    pub fn table_for(&self, region: Option<&str>) -> Option<&DistTable> {
        if self.status_up && self.lb_method == LbMethod::Twrr {
            if let Some(region) = region {
                if let Some(table) = self.tables.get(region) {
                    return Some(table);
                }
            }
        }
        self.tables.get(DEFAULT_TABLE)
    }
}

/// The hot-swapped snapshot: one projection per pool plus the publish
/// timestamp it was built from (used for `SOA_SERIAL=auto`).
#[derive(Debug, Default)]
pub struct DistSnapshot {
    pub pools: HashMap<String, DistPool>,
    pub state_timestamp: f64,
}

impl DistSnapshot {
    /// Builds a fresh snapshot from a freshly-fetched distribution form,
    /// carrying forward each surviving pool's `_default` rotation cursor
    /// from `previous` (spec §4.6 / Scenario E): unchanged if still within
    /// range of the new rotation, reset to 0 otherwise.
    pub fn from_wire(
        form: &DistributionForm,
        state_timestamp: f64,
        previous: Option<&DistSnapshot>,
    ) -> Self {
        let mut pools = HashMap::with_capacity(form.len());

        for (pool_name, pool_form) in form {
            let mut tables = HashMap::with_capacity(pool_form.tables.len());
            for (table_name, table) in &pool_form.tables {
                tables.insert(table_name.clone(), DistTable::from_wire(table));
            }

            if let Some(prev_pool) = previous.and_then(|p| p.pools.get(pool_name)) {
                if let (Some(prev_default), Some(new_default)) =
                    (prev_pool.tables.get(DEFAULT_TABLE), tables.get(DEFAULT_TABLE))
                {
                    let len = new_default.rotation.len();
                    let old_index = prev_default.index.load(Ordering::SeqCst);
                    let carried = if len > 0 && old_index < len { old_index } else { 0 };
                    new_default.index.store(carried, Ordering::SeqCst);
                }
            }

            pools.insert(
                pool_name.clone(),
                DistPool {
                    status_up: pool_form.status_up,
                    lb_method: pool_form.lb_method,
                    fallback: pool_form.fallback,
                    max_addrs_returned: pool_form.max_addrs_returned,
                    tables,
                },
            );
        }

        DistSnapshot {
            pools,
            state_timestamp,
        }
    }
}
