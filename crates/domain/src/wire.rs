//! JSON shapes published by the health process and consumed by the
//! distribution process, via the shared KV store. These structs have no
//! behavior beyond (de)serialization — they are the contract, not the model.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::config::{Fallback, LbMethod};
use crate::dist::DistributionTable;
use crate::status::Status;

/// Everything the distribution engine needs to answer a lookup for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolDistributionForm {
    pub status_up: bool,
    pub lb_method: LbMethod,
    pub fallback: Fallback,
    pub max_addrs_returned: u8,
    /// Keyed by table name: `_default` plus, for `twrr` pools, one per region.
    pub tables: BTreeMap<String, DistributionTable>,
}

/// `polaris_health:ppdns_state` payload: pool name -> distribution form.
pub type DistributionForm = BTreeMap<String, PoolDistributionForm>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericMemberForm {
    pub name: String,
    pub ip: Ipv4Addr,
    pub weight: u8,
    pub region: Option<String>,
    pub status: Status,
    pub status_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericPoolForm {
    pub monitor: String,
    pub lb_method: LbMethod,
    pub fallback: Fallback,
    pub status_up: bool,
    pub members: Vec<GenericMemberForm>,
}

/// `polaris_health:generic_state` payload: a full diagnostic dump of State.
pub type GenericForm = BTreeMap<String, GenericPoolForm>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    pub timestamp: f64,
    pub pid: u32,
}
