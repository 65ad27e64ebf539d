//! Scenario E — cursor preservation on republish (spec §8). Drives the real
//! subscriber against an in-process fake memcached server, rather than
//! exercising `DistSnapshot::from_wire` directly (already unit-tested in
//! `gslb-distribution`), to cover the KV-polling path end to end.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gslb_domain::config::{Fallback, KvConfig, LbMethod};
use gslb_domain::{DistributionForm, DistributionTable, PoolDistributionForm, DEFAULT_TABLE};
use gslb_distribution::state::DistSnapshot;
use gslb_kv::KvClient;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// A tiny in-memory memcached stand-in good for `set`/`get` on a handful of
/// keys, enough to drive `subscriber::poll_once` against something that
/// actually speaks the wire protocol.
async fn spawn_fake_memcached() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let store: Arc<tokio::sync::Mutex<BTreeMap<String, Vec<u8>>>> =
            Arc::new(tokio::sync::Mutex::new(BTreeMap::new()));

        loop {
            let (stream, _) = match listener.accept().await {
                Ok(s) => s,
                Err(_) => return,
            };
            let store = store.clone();
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let mut reader = BufReader::new(read_half);
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let line = line.trim_end();
                    let mut parts = line.split_whitespace();
                    match parts.next() {
                        Some("set") => {
                            let key = parts.next().unwrap().to_string();
                            let _flags = parts.next();
                            let _exptime = parts.next();
                            let len: usize = parts.next().unwrap().parse().unwrap();
                            let mut data = vec![0u8; len];
                            reader.read_exact(&mut data).await.unwrap();
                            let mut crlf = [0u8; 2];
                            reader.read_exact(&mut crlf).await.unwrap();
                            store.lock().await.insert(key, data);
                            write_half.write_all(b"STORED\r\n").await.unwrap();
                        }
                        Some("get") => {
                            let key = parts.next().unwrap();
                            let data = store.lock().await.get(key).cloned();
                            match data {
                                Some(data) => {
                                    let header = format!("VALUE {} 0 {}\r\n", key, data.len());
                                    write_half.write_all(header.as_bytes()).await.unwrap();
                                    write_half.write_all(&data).await.unwrap();
                                    write_half.write_all(b"\r\nEND\r\n").await.unwrap();
                                }
                                None => {
                                    write_half.write_all(b"END\r\n").await.unwrap();
                                }
                            }
                        }
                        _ => return,
                    }
                }
            });
        }
    });

    addr
}

fn rotation_of(n: usize) -> Vec<Ipv4Addr> {
    (1..=n).map(|i| Ipv4Addr::new(10, 0, 0, i as u8)).collect()
}

fn form_with(rotation: Vec<Ipv4Addr>, index: usize) -> DistributionForm {
    let mut tables = BTreeMap::new();
    let len = rotation.len();
    tables.insert(
        DEFAULT_TABLE.to_string(),
        DistributionTable {
            rotation,
            names: None,
            num_unique_addrs: len,
            index,
        },
    );
    let mut form = BTreeMap::new();
    form.insert(
        "p".to_string(),
        PoolDistributionForm {
            status_up: true,
            lb_method: LbMethod::Wrr,
            fallback: Fallback::Any,
            max_addrs_returned: 1,
            tables,
        },
    );
    form
}

async fn publish(kv: &KvClient, kv_config: &KvConfig, form: &DistributionForm, timestamp: &str) {
    let bytes = serde_json::to_vec(form).unwrap();
    kv.set(&kv_config.ppdns_state_key, &bytes, 0).await.unwrap();
    kv.set(&kv_config.state_timestamp_key, timestamp.as_bytes(), 0)
        .await
        .unwrap();
}

#[tokio::test]
async fn cursor_survives_republish_in_range_and_resets_out_of_range() {
    let addr = spawn_fake_memcached().await;
    let (host, port) = addr.rsplit_once(':').unwrap();

    let kv_config = KvConfig {
        hostname: host.to_string(),
        port: port.parse().unwrap(),
        ..Default::default()
    };
    let kv = KvClient::from_config(&kv_config);

    // First publish: rotation of 10, cursor at 5.
    publish(&kv, &kv_config, &form_with(rotation_of(10), 5), "1700000000").await;

    let snapshot = Arc::new(ArcSwap::from_pointee(DistSnapshot::default()));
    let mut last_seen = None;
    gslb_distribution::subscriber::poll_once(&kv, &kv_config, &snapshot, &mut last_seen).await;
    assert_eq!(
        snapshot.load().pools["p"].tables[DEFAULT_TABLE].current_index(),
        5
    );

    // Republish with the same rotation length: index=5 is still in range
    // and must be carried forward verbatim (spec §4.6 / Scenario E).
    publish(&kv, &kv_config, &form_with(rotation_of(10), 9), "1700000001").await;
    gslb_distribution::subscriber::poll_once(&kv, &kv_config, &snapshot, &mut last_seen).await;
    assert_eq!(
        snapshot.load().pools["p"].tables[DEFAULT_TABLE].current_index(),
        5
    );

    // Republish with a shorter rotation: the carried index is now out of
    // range and must reset to 0.
    publish(&kv, &kv_config, &form_with(rotation_of(3), 1), "1700000002").await;
    gslb_distribution::subscriber::poll_once(&kv, &kv_config, &snapshot, &mut last_seen).await;
    assert_eq!(
        snapshot.load().pools["p"].tables[DEFAULT_TABLE].current_index(),
        0
    );
}
