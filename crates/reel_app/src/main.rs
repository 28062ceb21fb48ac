mod config;
mod demo;
mod live;
mod logging;

use std::path::PathBuf;

use reel_logging::{reel_debug, reel_error, reel_info};

use crate::config::DEFAULT_CONFIG_PATH;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let loaded = config::load(&path)?;
    let from_file = loaded.is_some();
    let config = loaded.unwrap_or_default();

    logging::initialize(config.log_destination, config.level_filter()?);
    if from_file {
        reel_info!("Loaded configuration from {:?}", path);
    } else {
        reel_info!("No configuration at {:?}, using defaults", path);
    }
    reel_debug!("{:?}", config);

    let live = live::assemble(&config).await?;
    if let Err(err) = demo::run(&config, live).await {
        reel_error!("Demo aborted: {:#}", err);
        return Err(err);
    }
    reel_info!("Done");
    Ok(())
}
