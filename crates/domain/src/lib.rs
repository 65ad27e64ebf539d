//! Core data model, configuration schema and validation for the GSLB
//! control plane. This crate has no I/O and no logging dependency: it is
//! consumed by both the health process and the distribution process, and
//! stays a pure function of configuration and probe results.

pub mod config;
pub mod dist;
pub mod errors;
pub mod globalname;
pub mod pool;
pub mod state;
pub mod status;
pub mod topology;
pub mod wire;

pub use dist::{build_dist_tables, DistributionTable, DEFAULT_TABLE};
pub use errors::DomainError;
pub use globalname::{normalize_qname, GlobalName};
pub use pool::{Pool, PoolMember};
pub use state::{MemberTransition, PqItem, ProbeResult, State};
pub use status::Status;
pub use topology::TopologyMap;
pub use wire::{DistributionForm, GenericForm, Heartbeat, PoolDistributionForm};
