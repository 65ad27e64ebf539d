use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("configuration error: {0}")]
    Config(#[from] gslb_domain::config::ConfigError),

    #[error("domain error: {0}")]
    Domain(#[from] gslb_domain::DomainError),

    #[error("kv store error: {0}")]
    Kv(#[from] gslb_kv::KvError),

    #[error("failed to serialize state for publish: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("control socket error: {0}")]
    ControlSocket(String),
}
