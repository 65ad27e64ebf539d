use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid IPv4 address: {0}")]
    InvalidIpAddress(String),

    #[error("invalid pool member name: {0}")]
    InvalidMemberName(String),

    #[error("invalid pool member weight: {0}")]
    InvalidWeight(String),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("invalid pool: {0}")]
    InvalidPool(String),

    #[error("invalid global name: {0}")]
    InvalidGlobalName(String),

    #[error("unknown pool referenced: {0}")]
    UnknownPool(String),

    #[error("unable to determine region for pool {pool} member {member}")]
    UnresolvedRegion { pool: String, member: String },

    #[error("\"_default\" is a reserved region name")]
    ReservedRegionName,

    #[error("invalid topology CIDR: {0}")]
    InvalidCidr(String),

    #[error("invalid monitor configuration: {0}")]
    InvalidMonitor(String),
}
