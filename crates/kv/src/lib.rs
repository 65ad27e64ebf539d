//! Async client for the shared memcached-protocol key/value store used to
//! hand state between the health process and the distribution process.

pub mod client;
pub mod errors;

pub use client::KvClient;
pub use errors::KvError;
