use crate::app::pipeline::auction::context::{AuctionContext, AuctionSnapshot};
use crate::child_span_info;
use crate::core::managers::{BidderRegistry, S2SConfigStore};
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use std::sync::Arc;
use tracing::trace;

/// Captures the registry and s2s configuration for the rest of
/// the auction, later writes to either are not observed
pub struct SnapshotTask {
    registry: Arc<BidderRegistry>,
    s2s: Arc<S2SConfigStore>,
}

impl SnapshotTask {
    pub fn new(registry: Arc<BidderRegistry>, s2s: Arc<S2SConfigStore>) -> Self {
        SnapshotTask { registry, s2s }
    }
}

impl BlockingTask<AuctionContext, Error> for SnapshotTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = child_span_info!(
            "snapshot_task",
            registered = tracing::field::Empty,
            s2s_enabled = tracing::field::Empty
        )
        .entered();

        let snapshot = AuctionSnapshot {
            bidders: self.registry.snapshot(),
            s2s: self.s2s.get_config(),
        };

        if !span.is_disabled() {
            span.record("registered", snapshot.bidders.len());
            span.record("s2s_enabled", snapshot.s2s.is_some());
        }

        trace!(
            "Auction {} sees {} adapters, s2s {}",
            context.auction_id,
            snapshot.bidders.len(),
            snapshot.s2s.is_some()
        );

        context
            .snapshot
            .set(snapshot)
            .map_err(|_| anyhow!("Auction snapshot already taken"))
    }
}
