use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::monitor::MonitorConfig;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LbMethod {
    #[default]
    Wrr,
    Twrr,
    Fogroup,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    #[default]
    Any,
    Refuse,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolMemberConfig {
    pub name: String,
    pub weight: u8,
    #[serde(default)]
    pub monitor_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    #[serde(flatten)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub lb_method: LbMethod,

    #[serde(default)]
    pub fallback: Fallback,

    #[serde(default = "default_max_addrs_returned")]
    pub max_addrs_returned: u8,

    /// Keys are member IPv4 addresses (as in `polaris-lb.yaml`'s members map).
    pub members: BTreeMap<String, PoolMemberConfig>,
}

fn default_max_addrs_returned() -> u8 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalNameConfig {
    pub pool: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub nsrecord: bool,
}

fn default_ttl() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LbConfig {
    #[serde(default)]
    pub pools: BTreeMap<String, PoolConfig>,

    #[serde(default)]
    pub globalnames: BTreeMap<String, GlobalNameConfig>,
}
