use std::time::Duration;

use gslb_domain::config::KvConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::KvError;

/// A stateless memcached-text-protocol client: every call opens its own
/// connection, performs one command, and closes it. There is no connection
/// pool and no retry — callers (the publisher, the subscriber) already have
/// their own failure handling per their respective cadences.
#[derive(Debug, Clone)]
pub struct KvClient {
    addr: String,
    socket_timeout: Duration,
    max_value_length: usize,
}

impl KvClient {
    pub fn new(hostname: &str, port: u16, socket_timeout: Duration, max_value_length: usize) -> Self {
        KvClient {
            addr: format!("{}:{}", hostname, port),
            socket_timeout,
            max_value_length,
        }
    }

    pub fn from_config(cfg: &KvConfig) -> Self {
        Self::new(
            &cfg.hostname,
            cfg.port,
            Duration::from_millis(cfg.socket_timeout_ms),
            cfg.max_value_length,
        )
    }

    pub async fn set(&self, key: &str, value: &[u8], exptime_secs: u32) -> Result<(), KvError> {
        if value.len() > self.max_value_length {
            return Err(KvError::ValueTooLarge {
                key: key.to_string(),
                len: value.len(),
                max: self.max_value_length,
            });
        }

        timeout(self.socket_timeout, self.set_inner(key, value, exptime_secs))
            .await
            .map_err(|_| KvError::Timeout(self.addr.clone()))?
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        timeout(self.socket_timeout, self.get_inner(key))
            .await
            .map_err(|_| KvError::Timeout(self.addr.clone()))?
    }

    async fn connect(&self) -> Result<TcpStream, KvError> {
        TcpStream::connect(&self.addr)
            .await
            .map_err(|e| KvError::Connect(self.addr.clone(), e))
    }

    async fn set_inner(&self, key: &str, value: &[u8], exptime_secs: u32) -> Result<(), KvError> {
        let mut stream = self.connect().await?;
        let header = format!("set {} 0 {} {}\r\n", key, exptime_secs, value.len());

        stream
            .write_all(header.as_bytes())
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;
        stream
            .write_all(value)
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;
        stream
            .write_all(b"\r\n")
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;
        stream
            .flush()
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;

        let mut reader = BufReader::new(&mut stream);
        let mut reply = String::new();
        read_line(&mut reader, &mut reply)
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;

        let reply = reply.trim_end();
        if reply != "STORED" {
            return Err(KvError::NotStored {
                key: key.to_string(),
                reply: reply.to_string(),
            });
        }

        let _ = stream.shutdown().await;
        debug!(key, bytes = value.len(), "kv set");
        Ok(())
    }

    async fn get_inner(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let mut stream = self.connect().await?;

        stream
            .write_all(format!("get {}\r\n", key).as_bytes())
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;
        stream
            .flush()
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;

        let mut reader = BufReader::new(&mut stream);
        let mut header = String::new();
        read_line(&mut reader, &mut header)
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;
        let header = header.trim_end();

        if header == "END" {
            return Ok(None);
        }

        let mut parts = header.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        if cmd != "VALUE" {
            return Err(KvError::Protocol(
                self.addr.clone(),
                format!("unexpected reply line: {}", header),
            ));
        }
        let _reply_key = parts.next();
        let _flags = parts.next();
        let len: usize = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                KvError::Protocol(self.addr.clone(), format!("missing length in: {}", header))
            })?;

        let mut data = vec![0u8; len];
        reader
            .read_exact(&mut data)
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;

        let mut crlf = [0u8; 2];
        reader
            .read_exact(&mut crlf)
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;

        let mut end_line = String::new();
        read_line(&mut reader, &mut end_line)
            .await
            .map_err(|e| KvError::Io(self.addr.clone(), e))?;

        let _ = stream.shutdown().await;
        debug!(key, bytes = data.len(), "kv get hit");
        Ok(Some(data))
    }
}

async fn read_line<R: tokio::io::AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut String,
) -> std::io::Result<usize> {
    use tokio::io::AsyncBufReadExt;
    reader.read_line(buf).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader as TokioBufReader};
    use tokio::net::TcpListener;

    /// A minimal in-process memcached stand-in: understands `set` and `get`
    /// against a single in-memory slot, enough to exercise the wire protocol.
    async fn spawn_fake_memcached() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = TokioBufReader::new(read_half);
            let mut stored: Option<(String, Vec<u8>)> = None;

            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    break;
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
                        stored = Some((key, data));
                        write_half.write_all(b"STORED\r\n").await.unwrap();
                    }
                    Some("get") => {
                        let key = parts.next().unwrap();
                        match &stored {
                            Some((k, data)) if k == key => {
                                let header =
                                    format!("VALUE {} 0 {}\r\n", key, data.len());
                                write_half.write_all(header.as_bytes()).await.unwrap();
                                write_half.write_all(data).await.unwrap();
                                write_half.write_all(b"\r\nEND\r\n").await.unwrap();
                            }
                            _ => {
                                write_half.write_all(b"END\r\n").await.unwrap();
                            }
                        }
                    }
                    _ => break,
                }
            }
        });

        addr
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let addr = spawn_fake_memcached().await;
        let (host, port) = addr.rsplit_once(':').unwrap();
        let client = KvClient::new(host, port.parse().unwrap(), Duration::from_secs(1), 1024);

        client.set("polaris_health:ppdns_state", b"hello", 0).await.unwrap();
        let value = client.get("polaris_health:ppdns_state").await.unwrap();
        assert_eq!(value, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn get_miss_returns_none() {
        let addr = spawn_fake_memcached().await;
        let (host, port) = addr.rsplit_once(':').unwrap();
        let client = KvClient::new(host, port.parse().unwrap(), Duration::from_secs(1), 1024);

        let value = client.get("polaris_health:nonexistent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn oversized_value_rejected_before_connecting() {
        let client = KvClient::new("127.0.0.1", 1, Duration::from_secs(1), 4);
        let err = client.set("k", b"toolong", 0).await.unwrap_err();
        assert!(matches!(err, KvError::ValueTooLarge { .. }));
    }
}
