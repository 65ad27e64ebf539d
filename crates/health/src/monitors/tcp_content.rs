use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use fancy_regex::Regex;
use gslb_domain::config::TcpContentParams;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::budget::TimeBudget;

const MAX_READ_BYTES: usize = 512;

pub async fn check(destination: Ipv4Addr, params: &TcpContentParams) -> (bool, String) {
    let regex = match Regex::new(&format!("(?i){}", params.match_regex)) {
        Ok(r) => r,
        Err(e) => return (false, format!("invalid match regex \"{}\": {}", params.match_regex, e)),
    };

    let addr = SocketAddr::from((destination, params.port));
    let budget = TimeBudget::new(Duration::from_secs(params.timeout));

    let mut stream = match tokio::time::timeout(budget.remaining(), TcpStream::connect(addr)).await
    {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return (false, format!("connect to {} failed: {}", addr, e)),
        Err(_) => return (false, format!("connect to {} timed out", addr)),
    };

    if let Some(payload) = &params.send {
        match tokio::time::timeout(budget.remaining(), stream.write_all(payload.as_bytes())).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = stream.shutdown().await;
                return (false, format!("send to {} failed: {}", addr, e));
            }
            Err(_) => {
                let _ = stream.shutdown().await;
                return (false, format!("send to {} timed out", addr));
            }
        }
    }

    let mut buf = vec![0u8; MAX_READ_BYTES];
    let n = match tokio::time::timeout(budget.remaining(), stream.read(&mut buf)).await {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => {
            let _ = stream.shutdown().await;
            return (false, format!("read from {} failed: {}", addr, e));
        }
        Err(_) => {
            let _ = stream.shutdown().await;
            return (false, format!("read from {} timed out", addr));
        }
    };

    let _ = stream.shutdown().await;

    let received = String::from_utf8_lossy(&buf[..n]);
    match regex.is_match(&received) {
        Ok(true) => (true, "content matched".to_string()),
        Ok(false) => (
            false,
            format!("response did not match /{}/", params.match_regex),
        ),
        Err(e) => (false, format!("regex evaluation failed: {}", e)),
    }
}
