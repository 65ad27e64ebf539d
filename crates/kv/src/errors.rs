use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("connect to {0} failed: {1}")]
    Connect(String, std::io::Error),

    #[error("timed out talking to {0}")]
    Timeout(String),

    #[error("i/o error talking to {0}: {1}")]
    Io(String, std::io::Error),

    #[error("malformed memcached reply from {0}: {1}")]
    Protocol(String, String),

    #[error("value for key \"{key}\" is {len} bytes, exceeds limit of {max}")]
    ValueTooLarge { key: String, len: usize, max: usize },

    #[error("server rejected set for key \"{key}\": {reply}")]
    NotStored { key: String, reply: String },
}
