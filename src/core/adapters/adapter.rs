use crate::core::models::{AdapterRequest, Bid, S2SConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// The call contract every bidder adapter is registered under.
///
/// # Behavior
/// An adapter is handed either the aggregated s2s request or its own
/// client side request, and returns the bids it received. Errors are
/// recorded against the adapter and never abort the auction. Adapters
/// run concurrently and may be abandoned (not cancelled) once the
/// auction deadline passes, so they should not assume their result is
/// always scored
#[async_trait]
pub trait BidAdapter: Send + Sync {
    async fn call_bids(&self, request: &AdapterRequest) -> Result<Vec<Bid>, anyhow::Error>;

    /// Receives the s2s configuration whenever a new one is applied
    /// while this adapter services s2s traffic
    fn set_config(&self, _config: &S2SConfig) {}

    /// A fresh, independent adapter of the same kind, used to register
    /// aliases. `None` means the adapter cannot be aliased
    fn new_instance(&self) -> Option<Arc<dyn BidAdapter>> {
        None
    }
}
