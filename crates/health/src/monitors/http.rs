use std::net::SocketAddr;
use std::net::Ipv4Addr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use fancy_regex::Regex;
use gslb_domain::config::HttpParams;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};

use super::budget::TimeBudget;

/// Status-Line is searched for in up to this many bytes of accumulated
/// response data, matching `polaris_health`'s `HTTPResponse._STATUS_LINE_RE`
/// search window.
const STATUS_LINE_SCAN_WINDOW: usize = 128;
const READ_CHUNK: usize = 128;

fn status_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^HTTP/\d\.\d (\d+) ([^\r]*)\r\n").expect("valid regex"))
}

/// A verifier that accepts any server certificate, for probing backends
/// whose certs may be self-signed or expired — spec mandates "unverified
/// certs" for the HTTP(S) monitor.
#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA1,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

fn unverified_tls_config() -> Arc<ClientConfig> {
    static CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            Arc::new(
                ClientConfig::builder()
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
                    .with_no_client_auth(),
            )
        })
        .clone()
}

enum Conn {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Conn {
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            Conn::Plain(s) => s.write_all(buf).await,
            Conn::Tls(s) => s.write_all(buf).await,
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Conn::Plain(s) => s.read(buf).await,
            Conn::Tls(s) => s.read(buf).await,
        }
    }

    async fn shutdown(&mut self) {
        let _ = match self {
            Conn::Plain(s) => s.shutdown().await,
            Conn::Tls(s) => s.shutdown().await,
        };
    }
}

pub async fn check(destination: Ipv4Addr, params: &HttpParams) -> (bool, String) {
    let port = params
        .port
        .unwrap_or(if params.use_ssl { 443 } else { 80 });
    let host_header = params
        .hostname
        .clone()
        .unwrap_or_else(|| destination.to_string());
    let expected_codes = params.expected_codes.clone().unwrap_or_else(|| vec![200]);

    let addr = SocketAddr::from((destination, port));
    let budget = TimeBudget::new(Duration::from_secs(params.timeout));

    let tcp_stream = match tokio::time::timeout(budget.remaining(), TcpStream::connect(addr)).await
    {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return (false, format!("connect to {} failed: {}", addr, e)),
        Err(_) => return (false, format!("connect to {} timed out", addr)),
    };

    let mut conn = if params.use_ssl {
        let connector = TlsConnector::from(unverified_tls_config());
        let server_name = match &params.hostname {
            Some(h) => match ServerName::try_from(h.clone()) {
                Ok(n) => n,
                Err(e) => return (false, format!("invalid TLS hostname \"{}\": {}", h, e)),
            },
            None => ServerName::IpAddress(destination.into()),
        };
        match tokio::time::timeout(budget.remaining(), connector.connect(server_name, tcp_stream))
            .await
        {
            Ok(Ok(stream)) => Conn::Tls(Box::new(stream)),
            Ok(Err(e)) => return (false, format!("TLS handshake with {} failed: {}", addr, e)),
            Err(_) => return (false, format!("TLS handshake with {} timed out", addr)),
        }
    } else {
        Conn::Plain(tcp_stream)
    };

    let mut path = params.url_path.clone();
    if !path.starts_with('/') {
        path = format!("/{}", path);
    }
    let request = format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, host_header
    );

    if let Err(e) =
        tokio::time::timeout(budget.remaining(), conn.write_all(request.as_bytes())).await
    {
        let _ = e;
        return (false, format!("send to {} timed out", addr));
    }

    let regex = status_line_regex();
    let mut buf: Vec<u8> = Vec::new();

    loop {
        if budget.is_exhausted() {
            return (false, "timed out waiting for HTTP Status-Line".to_string());
        }

        let mut chunk = [0u8; READ_CHUNK];
        let n = match tokio::time::timeout(budget.remaining(), conn.read(&mut chunk)).await {
            Ok(Ok(0)) => {
                return (
                    false,
                    "remote closed connection before Status-Line".to_string(),
                )
            }
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return (false, format!("read from {} failed: {}", addr, e)),
            Err(_) => return (false, "timed out waiting for HTTP Status-Line".to_string()),
        };
        buf.extend_from_slice(&chunk[..n]);

        let scan_len = buf.len().min(STATUS_LINE_SCAN_WINDOW);
        let text = String::from_utf8_lossy(&buf[..scan_len]);

        match regex.captures(&text) {
            Ok(Some(caps)) => {
                conn.shutdown().await;
                let code: u16 = caps
                    .get(1)
                    .map(|m| m.as_str())
                    .unwrap_or("0")
                    .parse()
                    .unwrap_or(0);
                let reason = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                return if expected_codes.contains(&code) {
                    (true, format!("{} {}", code, reason))
                } else {
                    (false, format!("unexpected status {} {}", code, reason))
                };
            }
            Ok(None) => {
                if scan_len >= STATUS_LINE_SCAN_WINDOW {
                    conn.shutdown().await;
                    return (
                        false,
                        format!(
                            "no HTTP Status-Line found in first {} bytes",
                            STATUS_LINE_SCAN_WINDOW
                        ),
                    );
                }
            }
            Err(e) => return (false, format!("status-line regex evaluation failed: {}", e)),
        }
    }
}
