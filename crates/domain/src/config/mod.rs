pub mod base;
pub mod errors;
pub mod monitor;
pub mod pools;
pub mod root;
pub mod topology;

pub use base::{KvConfig, LoggingConfig, ServerConfig, SoaConfig, SoaSerial};
pub use errors::ConfigError;
pub use monitor::{
    ExternalParams, ForcedOutcome, ForcedParams, HttpParams, MonitorConfig, MonitorSpec,
    TcpConnectParams, TcpContentParams,
};
pub use pools::{Fallback, GlobalNameConfig, LbConfig, LbMethod, PoolConfig, PoolMemberConfig};
pub use root::{BaseConfig, CliOverrides, Config};
pub use topology::{TopologyConfig, RESERVED_REGION_NAME};
