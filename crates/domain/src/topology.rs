use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

use crate::config::TopologyConfig;
use crate::DomainError;

/// Ordered set of (CIDR -> region), resolved by longest-prefix match.
#[derive(Debug, Clone, Default)]
pub struct TopologyMap {
    entries: Vec<(Ipv4Network, String)>,
}

impl TopologyMap {
    pub fn from_config(cfg: &TopologyConfig) -> Result<Self, DomainError> {
        cfg.validate()?;

        let mut entries = Vec::new();
        for (region, cidrs) in &cfg.0 {
            for cidr in cidrs {
                let net: Ipv4Network = cidr
                    .parse()
                    .map_err(|e| DomainError::InvalidCidr(format!("{}: {}", cidr, e)))?;
                entries.push((net, region.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Returns the region of the longest-prefix match for `ip`, or `None`.
    /// Which entry wins among ties in prefix length is undefined, matching
    /// `polaris_common/topology.py`'s `get_region`.
    pub fn get_region(&self, ip: &Ipv4Addr) -> Option<String> {
        self.entries
            .iter()
            .filter(|(net, _)| net.contains(*ip))
            .max_by_key(|(net, _)| net.prefix())
            .map(|(_, region)| region.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
