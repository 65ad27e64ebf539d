use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use gslb_domain::config::TcpConnectParams;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

pub async fn check(destination: Ipv4Addr, params: &TcpConnectParams) -> (bool, String) {
    let addr = SocketAddr::from((destination, params.port));
    let timeout = Duration::from_secs(params.timeout);

    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(mut stream)) => {
            let _ = stream.shutdown().await;
            (true, "tcp connect succeeded".to_string())
        }
        Ok(Err(e)) => (false, format!("connect to {} failed: {}", addr, e)),
        Err(_) => (false, format!("connect to {} timed out after {:?}", addr, timeout)),
    }
}
