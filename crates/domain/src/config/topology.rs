use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RESERVED_REGION_NAME: &str = "_default";

/// `region -> [CIDR, ...]`, the on-disk shape of `gslb-topology.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TopologyConfig(pub BTreeMap<String, Vec<String>>);

impl TopologyConfig {
    pub fn validate(&self) -> Result<(), crate::DomainError> {
        if self.0.contains_key(RESERVED_REGION_NAME) {
            return Err(crate::DomainError::ReservedRegionName);
        }
        for cidrs in self.0.values() {
            for cidr in cidrs {
                cidr.parse::<ipnetwork::Ipv4Network>()
                    .map_err(|e| crate::DomainError::InvalidCidr(format!("{}: {}", cidr, e)))?;
            }
        }
        Ok(())
    }
}
