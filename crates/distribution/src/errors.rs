use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("configuration error: {0}")]
    Config(#[from] gslb_domain::config::ConfigError),

    #[error("domain error: {0}")]
    Domain(#[from] gslb_domain::DomainError),

    #[error("i/o error on query loop: {0}")]
    Io(#[from] std::io::Error),
}
