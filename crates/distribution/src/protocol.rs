//! JSON shapes for the DNS remote-backend stdin/stdout protocol. See spec §6.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Default, Deserialize)]
pub struct Parameters {
    pub qtype: Option<String>,
    pub qname: Option<String>,
    pub remote: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub local: Option<String>,
    #[serde(default, rename = "real-remote")]
    #[allow(dead_code)]
    pub real_remote: Option<String>,
    #[serde(default, rename = "zone-id")]
    #[allow(dead_code)]
    pub zone_id: Option<i64>,
}
