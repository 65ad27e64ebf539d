//! UNIX control socket: `ping` -> `pong`, `stop` -> `ok` then process exit.
//! Grounded on `polaris_health/guardian/__init__.py`'s control loop, minus
//! the child-process supervision (this build runs one process per binary,
//! already supervised externally — see spec §1's scope note).

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn run(socket_path: &str, shutdown: CancellationToken) -> std::io::Result<()> {
    let path = Path::new(socket_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        std::fs::remove_file(path)?;
    }

    let listener = UnixListener::bind(path)?;
    info!(socket = socket_path, "control socket listening");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = std::fs::remove_file(path);
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _)) => {
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, shutdown).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "control socket accept failed"),
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, shutdown: CancellationToken) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
        return;
    }

    match line.trim() {
        "ping" => {
            let _ = write_half.write_all(b"pong\n").await;
        }
        "stop" => {
            let _ = write_half.write_all(b"ok\n").await;
            let _ = write_half.flush().await;
            info!("stop command received on control socket");
            shutdown.cancel();
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            std::process::exit(0);
        }
        other => {
            warn!(command = other, "unknown control socket command received");
            let _ = write_half.write_all(b"unknown command\n").await;
        }
    }
}
