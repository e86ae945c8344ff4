use mimalloc::MiMalloc;
use prex::app::auctioneer::AuctionRequest;
use prex::app::lifecycle::context::StartupContext;
use prex::app::lifecycle::shutdown::build_shutdown_pipeline;
use prex::app::lifecycle::startup::build_start_pipeline;
use std::path::PathBuf;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cfg_path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "prex.yaml".to_string())
        .into();

    let startup_pipeline = build_start_pipeline(cfg_path).expect("Startup pipeline should build");
    let startup_ctx = StartupContext::default();

    match startup_pipeline.run(&startup_ctx).await {
        Ok(_) => info!("Startup successful"),
        Err(e) => panic!("Startup failed: {:?}", e),
    }

    let auctioneer = startup_ctx
        .auctioneer
        .get()
        .expect("Startup should have built the auctioneer");
    let ad_units = startup_ctx
        .config
        .get()
        .map(|cfg| cfg.ad_units.clone())
        .unwrap_or_default();

    match auctioneer.call_bids(AuctionRequest::new(ad_units)).await {
        Ok(outcome) => {
            info!(
                "Auction {} {}: {} responses, {} bids, timed out {:?}, unregistered {:?}",
                outcome.auction_id,
                outcome.state,
                outcome.responses.len(),
                outcome.bids().count(),
                outcome.timed_out,
                outcome.unregistered
            );

            for bid in outcome.bids() {
                info!(
                    "{} bid {} on {} ({}x{})",
                    bid.bidder, bid.cpm, bid.ad_unit_code, bid.width, bid.height
                );
            }
        }
        Err(e) => error!("Auction failed: {}", e),
    }

    let shutdown_pipeline = build_shutdown_pipeline().expect("Shutdown pipeline should build");

    match shutdown_pipeline.run(&startup_ctx).await {
        Ok(_) => println!("Shutdown successful"),
        Err(e) => panic!("Clean shutdown failed {:?}", e),
    }
}
