use crate::app::auctioneer::Auctioneer;
use crate::app::config::PrexConfig;
use crate::core::managers::BidderRegistry;
use crate::core::observability::ObservabilityGuard;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

#[derive(Default)]
pub struct StartupContext {
    /// Loaded once from the yaml config
    pub config: OnceLock<PrexConfig>,

    // Transient items that are assigned but taken ownership of later
    /// Log writer guards, taken and flushed on shutdown
    pub observability: Mutex<Option<ObservabilityGuard>>,

    // Shared things
    /// Adapters by bidder code, shared with the auctioneer
    pub registry: OnceLock<Arc<BidderRegistry>>,
    /// Runs auctions against the registry and s2s config
    pub auctioneer: OnceLock<Arc<Auctioneer>>,
}
