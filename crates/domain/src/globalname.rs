use crate::config::GlobalNameConfig;

/// An FQDN whose answer is computed by this system rather than served from
/// a zone file.
#[derive(Debug, Clone)]
pub struct GlobalName {
    /// Lowercased, trailing-dot-stripped FQDN.
    pub name: String,
    pub pool_name: String,
    pub ttl: u32,
    pub nsrecord: bool,
}

impl GlobalName {
    pub fn from_config(fqdn: &str, cfg: &GlobalNameConfig) -> Self {
        GlobalName {
            name: normalize_qname(fqdn),
            pool_name: cfg.pool.clone(),
            ttl: cfg.ttl,
            nsrecord: cfg.nsrecord,
        }
    }
}

/// Lowercase and strip a single trailing `.`, the normalization this system
/// mandates for every qname before a globalname lookup.
pub fn normalize_qname(qname: &str) -> String {
    let lower = qname.to_ascii_lowercase();
    lower.strip_suffix('.').unwrap_or(&lower).to_string()
}
