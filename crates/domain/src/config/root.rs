use serde::{Deserialize, Serialize};
use std::path::Path;

use super::base::{KvConfig, LoggingConfig, ServerConfig, SoaConfig};
use super::errors::ConfigError;
use super::pools::LbConfig;
use super::topology::TopologyConfig;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BaseConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub kv: KvConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub soa: SoaConfig,
}

/// Aggregate configuration loaded from the three on-disk YAML documents.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base: BaseConfig,
    pub lb: LbConfig,
    pub topology: TopologyConfig,
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub install_prefix: Option<String>,
    pub control_socket_file: Option<String>,
}

impl Config {
    /// Loads `{dir}/gslb-base.yaml`, `{dir}/gslb-pools.yaml` and the optional
    /// `{dir}/gslb-topology.yaml`.
    pub fn load(dir: &str, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let base_path = Path::new(dir).join("gslb-base.yaml");
        let base: BaseConfig = if base_path.exists() {
            Self::from_yaml_file(&base_path)?
        } else {
            BaseConfig::default()
        };

        let lb_path = Path::new(dir).join("gslb-pools.yaml");
        let lb: LbConfig = Self::from_yaml_file(&lb_path)?;

        let topology_path = Path::new(dir).join("gslb-topology.yaml");
        let topology: TopologyConfig = if topology_path.exists() {
            Self::from_yaml_file(&topology_path)?
        } else {
            TopologyConfig::default()
        };

        let mut config = Config { base, lb, topology };
        config.apply_cli_overrides(overrides);
        Ok(config)
    }

    fn from_yaml_file<T: for<'de> Deserialize<'de>>(
        path: &Path,
    ) -> Result<T, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileRead(path.display().to_string(), e.to_string())
        })?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.base.logging.level = level;
        }
        if let Some(prefix) = overrides.install_prefix {
            self.base.server.install_prefix = prefix;
        }
        if let Some(sock) = overrides.control_socket_file {
            self.base.server.control_socket_file = Some(sock);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lb.pools.is_empty() {
            return Err(ConfigError::Validation(
                "no pools configured".to_string(),
            ));
        }

        self.topology.validate()?;

        for (pool_name, pool) in &self.lb.pools {
            if pool.members.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "pool \"{}\" has no members",
                    pool_name
                )));
            }
            if !(1..=100).contains(&pool.max_addrs_returned) {
                return Err(ConfigError::Validation(format!(
                    "pool \"{}\" max_addrs_returned must be between 1 and 100",
                    pool_name
                )));
            }
            for (ip, member) in &pool.members {
                ip.parse::<std::net::Ipv4Addr>().map_err(|e| {
                    ConfigError::Validation(format!(
                        "pool \"{}\" member \"{}\": {}",
                        pool_name, ip, e
                    ))
                })?;
                if member.weight > 99 {
                    return Err(ConfigError::Validation(format!(
                        "pool \"{}\" member \"{}\" weight must be 0..99",
                        pool_name, ip
                    )));
                }
            }
        }

        for (fqdn, gn) in &self.lb.globalnames {
            if !self.lb.pools.contains_key(&gn.pool) {
                return Err(ConfigError::Validation(format!(
                    "globalname \"{}\" references unknown pool \"{}\"",
                    fqdn, gn.pool
                )));
            }
            if gn.ttl == 0 {
                return Err(ConfigError::Validation(format!(
                    "globalname \"{}\" ttl must be >= 1",
                    fqdn
                )));
            }
        }

        Ok(())
    }
}
