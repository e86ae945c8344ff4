use crate::app::pipeline::auction::context::AuctionContext;
use crate::app::pipeline::auction::tasks;
use crate::app::span::WrappedPipelineTask;
use crate::core::managers::{BidderRegistry, S2SConfigStore};
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use crate::sample_or_attach_root_span;
use anyhow::{Error, anyhow};
use std::sync::Arc;

fn build_inner_pipeline(
    registry: Arc<BidderRegistry>,
    s2s: Arc<S2SConfigStore>,
    late: Arc<tasks::LateResponseListeners>,
) -> Result<Pipeline<AuctionContext, Error>, Error> {
    PipelineBuilder::new()
        .with_blocking(Box::new(tasks::ValidateAuctionTask))
        .with_blocking(Box::new(tasks::SnapshotTask::new(registry, s2s)))
        .with_blocking(Box::new(tasks::PartitionTask))
        .with_async(Box::new(tasks::DispatchTask::new(late)))
        .build()
        .ok_or_else(|| anyhow!("Auction pipeline should have tasks"))
}

/// Builds the pipeline a single auction flows through, from input
/// validation to the finalized [`AuctionOutcome`](super::AuctionOutcome).
///
/// # Behavior
/// * Observability - Creates its own `auction` root span, sampled at
///   `span_sample_rate`, or attaches to the caller's span if any
/// * Flow - Only invalid input aborts the pipeline. Adapter failures and
///   timeouts are reflected in the outcome instead
pub fn build_auction_pipeline(
    registry: Arc<BidderRegistry>,
    s2s: Arc<S2SConfigStore>,
    late: Arc<tasks::LateResponseListeners>,
    span_sample_rate: f32,
) -> Result<Pipeline<AuctionContext, Error>, Error> {
    let inner = build_inner_pipeline(registry, s2s, late)?;

    let wrapped = WrappedPipelineTask::new(inner, move |context: &AuctionContext| {
        sample_or_attach_root_span!(
            span_sample_rate,
            "auction",
            auction_id = %context.auction_id,
            timeout_ms = context.timeout.as_millis() as u64
        )
    });

    PipelineBuilder::new()
        .with_async(Box::new(wrapped))
        .build()
        .ok_or_else(|| anyhow!("Auction pipeline should have had auction tasks"))
}
