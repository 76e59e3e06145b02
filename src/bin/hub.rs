//! Broadcast hub binary.
//!
//! Configured through `FALLING_BLOCKS_HOST`, `FALLING_BLOCKS_PORT`,
//! `FALLING_BLOCKS_START_QUORUM` and `FALLING_BLOCKS_QUEUE`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use falling_blocks::net::{run_hub, HubConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = HubConfig::from_env();
    tracing::info!(addr = %config.bind_addr(), quorum = ?config.start_quorum, "starting hub");
    run_hub(config, None).await
}
