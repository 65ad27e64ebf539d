use std::net::Ipv4Addr;
use std::time::Duration;

use gslb_domain::config::ExternalParams;
use tokio::process::Command;

pub async fn check(destination: Ipv4Addr, params: &ExternalParams) -> (bool, String) {
    let mut cmd = Command::new(&params.executable);
    cmd.arg(destination.to_string());
    if let Some(port) = params.port {
        cmd.arg(port.to_string());
    }
    cmd.args(&params.args);
    cmd.kill_on_drop(true);

    let timeout = Duration::from_secs(params.timeout);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if stdout == params.expected_stdout {
                (true, "external check passed".to_string())
            } else {
                (
                    false,
                    format!(
                        "stdout \"{}\" did not match expected \"{}\"",
                        stdout, params.expected_stdout
                    ),
                )
            }
        }
        Ok(Ok(output)) => (
            false,
            format!(
                "non-zero exit code: {}",
                output.status.code().unwrap_or(-1)
            ),
        ),
        Ok(Err(e)) => (false, format!("failed to run {}: {}", params.executable, e)),
        Err(_) => (false, "timeout".to_string()),
    }
}
