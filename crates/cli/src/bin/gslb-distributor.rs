use clap::Parser;
use gslb_cli::{init_logging, shutdown_token, CommonArgs};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    let config = args.load_config()?;
    init_logging(&config);

    info!(
        config_dir = %args.config_dir,
        pools = config.lb.pools.len(),
        globalnames = config.lb.globalnames.len(),
        "starting gslb-distributor"
    );

    let shutdown = shutdown_token();
    if let Err(e) = gslb_distribution::run(config, shutdown).await {
        error!(error = %e, "gslb-distributor exited with an error");
        return Err(e.into());
    }

    info!("gslb-distributor stopped");
    Ok(())
}
