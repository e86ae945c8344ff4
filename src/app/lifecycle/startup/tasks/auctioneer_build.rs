use crate::app::auctioneer::Auctioneer;
use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Builds the auctioneer over the loaded registry and applies the
/// configured s2s routing. A rejected s2s config leaves auctions
/// running client side only
pub struct AuctioneerBuildTask;

impl BlockingTask<StartupContext, Error> for AuctioneerBuildTask {
    #[instrument(skip_all, name = "auctioneer_build_task")]
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let config = context
            .config
            .get()
            .ok_or_else(|| anyhow!("Config must load before the auctioneer"))?;

        let registry = context
            .registry
            .get()
            .ok_or_else(|| anyhow!("Registry must load before the auctioneer"))?;

        let auctioneer = Auctioneer::new(
            registry.clone(),
            config.auction.timeout,
            config.logging.span_sample_rate,
        )?;

        match &config.s2s {
            Some(s2s) => {
                if let Err(e) = auctioneer.set_s2s_config(s2s.clone()) {
                    warn!("s2s disabled, running client side only: {}", e);
                }
            }
            None => info!("No s2s config, running client side only"),
        }

        context
            .auctioneer
            .set(Arc::new(auctioneer))
            .map_err(|_| anyhow!("Auctioneer already built"))
    }
}
