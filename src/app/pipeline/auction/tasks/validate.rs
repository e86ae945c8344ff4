use crate::app::pipeline::auction::context::AuctionContext;
use crate::child_span_info;
use crate::core::error::PrexError;
use crate::core::pipeline::BlockingTask;
use anyhow::Error;
use tracing::debug;

/// Rejects malformed top level auction input, the only auction
/// failure which is handed back to the caller
pub struct ValidateAuctionTask;

impl BlockingTask<AuctionContext, Error> for ValidateAuctionTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = child_span_info!("auction_validate_task", invalid_reason = tracing::field::Empty)
            .entered();

        let ad_units = match context.ad_units.as_ref() {
            Some(ad_units) => ad_units,
            None => {
                span.record("invalid_reason", "missing_ad_units");
                return Err(PrexError::invalid_input("adUnits must be provided").into());
            }
        };

        if context.timeout.is_zero() {
            span.record("invalid_reason", "zero_timeout");
            return Err(PrexError::invalid_input("auction timeout must be positive").into());
        }

        if let Some(pos) = ad_units.iter().position(|u| u.code.is_empty()) {
            span.record("invalid_reason", "missing_ad_unit_code");
            return Err(
                PrexError::invalid_input(format!("ad unit at index {} has no code", pos)).into(),
            );
        }

        debug!(
            "Validated auction {} with {} ad units",
            context.auction_id,
            ad_units.len()
        );

        Ok(())
    }
}
