use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KvConfig {
    #[serde(default = "default_kv_hostname")]
    pub hostname: String,

    #[serde(default = "default_kv_port")]
    pub port: u16,

    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,

    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,

    #[serde(default = "default_ppdns_state_key")]
    pub ppdns_state_key: String,

    #[serde(default = "default_generic_state_key")]
    pub generic_state_key: String,

    #[serde(default = "default_state_timestamp_key")]
    pub state_timestamp_key: String,

    #[serde(default = "default_heartbeat_key")]
    pub heartbeat_key: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            hostname: default_kv_hostname(),
            port: default_kv_port(),
            socket_timeout_ms: default_socket_timeout_ms(),
            max_value_length: default_max_value_length(),
            ppdns_state_key: default_ppdns_state_key(),
            generic_state_key: default_generic_state_key(),
            state_timestamp_key: default_state_timestamp_key(),
            heartbeat_key: default_heartbeat_key(),
        }
    }
}

fn default_kv_hostname() -> String {
    "127.0.0.1".to_string()
}
fn default_kv_port() -> u16 {
    11211
}
fn default_socket_timeout_ms() -> u64 {
    500
}
fn default_max_value_length() -> usize {
    1024 * 1024
}
fn default_ppdns_state_key() -> String {
    "polaris_health:ppdns_state".to_string()
}
fn default_generic_state_key() -> String {
    "polaris_health:generic_state".to_string()
}
fn default_state_timestamp_key() -> String {
    "polaris_health:state_timestamp".to_string()
}
fn default_heartbeat_key() -> String {
    "polaris_health:heartbeat".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_num_probers")]
    pub num_probers: usize,

    #[serde(default = "default_install_prefix")]
    pub install_prefix: String,

    #[serde(default)]
    pub pid_file: Option<String>,

    #[serde(default)]
    pub control_socket_file: Option<String>,
}

impl ServerConfig {
    pub fn pid_file_path(&self) -> String {
        self.pid_file.clone().unwrap_or_else(|| {
            format!("{}/run/gslb.pid", self.install_prefix)
        })
    }

    pub fn control_socket_path(&self) -> String {
        self.control_socket_file.clone().unwrap_or_else(|| {
            format!("{}/run/gslb.controlsocket", self.install_prefix)
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            num_probers: default_num_probers(),
            install_prefix: default_install_prefix(),
            pid_file: None,
            control_socket_file: None,
        }
    }
}

fn default_num_probers() -> usize {
    4
}
fn default_install_prefix() -> String {
    "/usr/local/gslb".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoaConfig {
    pub mname: String,
    pub rname: String,
    #[serde(default = "default_soa_serial")]
    pub serial: SoaSerial,
    #[serde(default = "default_soa_refresh")]
    pub refresh: u32,
    #[serde(default = "default_soa_retry")]
    pub retry: u32,
    #[serde(default = "default_soa_expire")]
    pub expire: u32,
    #[serde(default = "default_soa_minimum")]
    pub minimum: u32,
    #[serde(default = "default_soa_ttl")]
    pub ttl: u32,
}

impl Default for SoaConfig {
    fn default() -> Self {
        Self {
            mname: "ns1.example.com.".to_string(),
            rname: "hostmaster.example.com.".to_string(),
            serial: default_soa_serial(),
            refresh: default_soa_refresh(),
            retry: default_soa_retry(),
            expire: default_soa_expire(),
            minimum: default_soa_minimum(),
            ttl: default_soa_ttl(),
        }
    }
}

/// `SOA_SERIAL` is either a literal number or the string `"auto"`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SoaSerial {
    Fixed(u32),
    Auto,
}

impl<'de> Deserialize<'de> for SoaSerial {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u32),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(SoaSerial::Fixed(n)),
            Raw::Str(s) if s.eq_ignore_ascii_case("auto") => Ok(SoaSerial::Auto),
            Raw::Str(s) => Err(serde::de::Error::custom(format!(
                "SOA_SERIAL must be a number or \"auto\", got \"{}\"",
                s
            ))),
        }
    }
}

fn default_soa_serial() -> SoaSerial {
    SoaSerial::Auto
}
fn default_soa_refresh() -> u32 {
    3600
}
fn default_soa_retry() -> u32 {
    600
}
fn default_soa_expire() -> u32 {
    86400
}
fn default_soa_minimum() -> u32 {
    60
}
fn default_soa_ttl() -> u32 {
    60
}
