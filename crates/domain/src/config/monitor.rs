use serde::{Deserialize, Serialize};

/// Raw, on-disk shape of a pool's monitor: a name plus a free-form params map,
/// matching the `monitor` / `monitor_params` split used throughout `gslb-pools.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    pub monitor: String,

    #[serde(default)]
    pub monitor_params: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForcedOutcome {
    Up,
    Down,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TcpConnectParams {
    pub port: u16,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retries")]
    pub retries: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TcpContentParams {
    pub port: u16,
    #[serde(rename = "match")]
    pub match_regex: String,
    #[serde(default)]
    pub send: Option<String>,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retries")]
    pub retries: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpParams {
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default = "default_url_path")]
    pub url_path: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub expected_codes: Option<Vec<u16>>,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_http_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retries")]
    pub retries: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForcedParams {
    pub status: ForcedOutcome,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retries")]
    pub retries: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExternalParams {
    pub executable: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub args: Vec<String>,
    pub expected_stdout: String,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_external_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retries")]
    pub retries: u16,
}

fn default_interval() -> u64 {
    10
}
fn default_timeout() -> u64 {
    1
}
fn default_http_timeout() -> u64 {
    5
}
fn default_external_timeout() -> u64 {
    5
}
fn default_retries() -> u16 {
    2
}
fn default_url_path() -> String {
    "/".to_string()
}

/// Validated, in-memory monitor specification. Built from [`MonitorConfig`]
/// by `MonitorSpec::from_config`.
#[derive(Debug, Clone)]
pub enum MonitorSpec {
    TcpConnect(TcpConnectParams),
    TcpContent(TcpContentParams),
    Http(HttpParams),
    Forced(ForcedParams),
    External(ExternalParams),
}

impl MonitorSpec {
    pub fn from_config(cfg: &MonitorConfig) -> Result<Self, crate::DomainError> {
        let params = serde_yaml::Value::Mapping(cfg.monitor_params.clone());
        let err = |e: serde_yaml::Error| {
            crate::DomainError::InvalidMonitor(format!(
                "monitor \"{}\": {}",
                cfg.monitor, e
            ))
        };
        match cfg.monitor.as_str() {
            "tcp_connect" => Ok(MonitorSpec::TcpConnect(
                serde_yaml::from_value(params).map_err(err)?,
            )),
            "tcp_content" => Ok(MonitorSpec::TcpContent(
                serde_yaml::from_value(params).map_err(err)?,
            )),
            "http" => Ok(MonitorSpec::Http(serde_yaml::from_value(params).map_err(err)?)),
            "forced" => Ok(MonitorSpec::Forced(
                serde_yaml::from_value(params).map_err(err)?,
            )),
            "external" => Ok(MonitorSpec::External(
                serde_yaml::from_value(params).map_err(err)?,
            )),
            other => Err(crate::DomainError::InvalidMonitor(format!(
                "unknown monitor \"{}\"",
                other
            ))),
        }
    }

    pub fn interval_secs(&self) -> u64 {
        match self {
            MonitorSpec::TcpConnect(p) => p.interval,
            MonitorSpec::TcpContent(p) => p.interval,
            MonitorSpec::Http(p) => p.interval,
            MonitorSpec::Forced(p) => p.interval,
            MonitorSpec::External(p) => p.interval,
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        match self {
            MonitorSpec::TcpConnect(p) => p.timeout,
            MonitorSpec::TcpContent(p) => p.timeout,
            MonitorSpec::Http(p) => p.timeout,
            MonitorSpec::Forced(p) => p.timeout,
            MonitorSpec::External(p) => p.timeout,
        }
    }

    pub fn retries(&self) -> u16 {
        match self {
            MonitorSpec::TcpConnect(p) => p.retries,
            MonitorSpec::TcpContent(p) => p.retries,
            MonitorSpec::Http(p) => p.retries,
            MonitorSpec::Forced(p) => p.retries,
            MonitorSpec::External(p) => p.retries,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MonitorSpec::TcpConnect(_) => "tcp_connect",
            MonitorSpec::TcpContent(_) => "tcp_content",
            MonitorSpec::Http(_) => "http",
            MonitorSpec::Forced(_) => "forced",
            MonitorSpec::External(_) => "external",
        }
    }
}
