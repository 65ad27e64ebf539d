use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("failed to parse config file {0}: {1}")]
    Parse(String, String),

    #[error("configuration validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Domain(#[from] crate::DomainError),
}
