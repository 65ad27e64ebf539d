//! Synthetic SOA record construction. See spec §4.5.

use gslb_domain::config::{SoaConfig, SoaSerial};
use serde_json::{json, Value};

/// `<mname> <rname> <serial> <refresh> <retry> <expire> <minimum>`, with
/// `serial=auto` resolving to the integer part of the last published state
/// timestamp.
pub fn synthesize(cfg: &SoaConfig, qname: &str, state_timestamp: f64) -> Value {
    let serial = match cfg.serial {
        SoaSerial::Fixed(n) => n,
        SoaSerial::Auto => state_timestamp as u32,
    };
    let content = format!(
        "{} {} {} {} {} {} {}",
        cfg.mname, cfg.rname, serial, cfg.refresh, cfg.retry, cfg.expire, cfg.minimum
    );
    json!({
        "result": [{
            "qtype": "SOA",
            "qname": qname,
            "content": content,
            "ttl": cfg.ttl,
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SoaConfig {
        SoaConfig {
            mname: "ns1.example.com.".to_string(),
            rname: "hostmaster.example.com.".to_string(),
            serial: SoaSerial::Fixed(42),
            refresh: 3600,
            retry: 600,
            expire: 86400,
            minimum: 60,
            ttl: 60,
        }
    }

    #[test]
    fn fixed_serial_is_used_verbatim() {
        let response = synthesize(&cfg(), "x.test", 1000.0);
        let content = response["result"][0]["content"].as_str().unwrap();
        assert_eq!(
            content,
            "ns1.example.com. hostmaster.example.com. 42 3600 600 86400 60"
        );
    }

    #[test]
    fn auto_serial_uses_state_timestamp_integer_part() {
        let mut c = cfg();
        c.serial = SoaSerial::Auto;
        let response = synthesize(&c, "x.test", 1700000000.75);
        let content = response["result"][0]["content"].as_str().unwrap();
        assert!(content.contains(" 1700000000 "));
    }
}
