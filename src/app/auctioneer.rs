use crate::app::pipeline::auction::{
    AuctionContext, AuctionOutcome, LateResponse, LateResponseListeners, build_auction_pipeline,
};
use crate::core::adapters::BidAdapter;
use crate::core::adserver::{AdServerNamespace, CachedVideoBid, VideoSupport};
use crate::core::error::PrexError;
use crate::core::managers::{BidderRegistry, S2SConfigStore};
use crate::core::models::{AdUnit, S2SConfig};
use crate::core::pipeline::Pipeline;
use anyhow::{Error, anyhow};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Input of a single auction
#[derive(Debug, Clone, Default)]
pub struct AuctionRequest {
    /// Required, an absent list is rejected as invalid input
    pub ad_units: Option<Vec<AdUnit>>,
    /// Overrides the configured auction timeout for this call only
    pub timeout: Option<Duration>,
}

impl AuctionRequest {
    pub fn new(ad_units: Vec<AdUnit>) -> Self {
        AuctionRequest {
            ad_units: Some(ad_units),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Entry point for running header bidding auctions. Owns the bidder
/// registry, the s2s routing config and the ad server namespace, and
/// feeds every [`AuctionRequest`] through the auction pipeline
pub struct Auctioneer {
    registry: Arc<BidderRegistry>,
    s2s: Arc<S2SConfigStore>,
    namespace: AdServerNamespace,
    late: Arc<LateResponseListeners>,
    pipeline: Pipeline<AuctionContext, Error>,
    default_timeout: Duration,
}

impl Auctioneer {
    pub fn new(
        registry: Arc<BidderRegistry>,
        default_timeout: Duration,
        span_sample_rate: f32,
    ) -> Result<Self, Error> {
        if default_timeout.is_zero() {
            return Err(PrexError::configuration("auction timeout must be positive").into());
        }

        let s2s = Arc::new(S2SConfigStore::new());
        let late = Arc::new(LateResponseListeners::default());
        let pipeline =
            build_auction_pipeline(registry.clone(), s2s.clone(), late.clone(), span_sample_rate)?;

        Ok(Auctioneer {
            registry,
            s2s,
            namespace: AdServerNamespace::new(),
            late,
            pipeline,
            default_timeout,
        })
    }

    /// Registers a bidder adapter. When the code matches the active
    /// s2s adapter code, the adapter immediately receives the config
    pub fn register(&self, code: impl Into<String>, adapter: Arc<dyn BidAdapter>) {
        let code = code.into();

        if let Some(config) = self.s2s.get_config().filter(|c| c.adapter == code) {
            adapter.set_config(&config);
        }

        self.registry.register(code, adapter);
    }

    pub fn alias(&self, existing: &str, alias: impl Into<String>) -> Result<(), PrexError> {
        self.registry.alias(existing, alias)
    }

    /// Replaces the active s2s config, then hands it to the s2s adapter
    /// if one is registered. Invalid configs leave the previous one active
    pub fn set_s2s_config(&self, config: S2SConfig) -> Result<Arc<S2SConfig>, PrexError> {
        let applied = self.s2s.set_config(config)?;

        match self.registry.resolve(&applied.adapter) {
            Some(adapter) => adapter.set_config(&applied),
            None => debug!(
                "s2s adapter '{}' not registered yet, config applied on registration",
                applied.adapter
            ),
        }

        Ok(applied)
    }

    pub fn s2s_config(&self) -> Option<Arc<S2SConfig>> {
        self.s2s.get_config()
    }

    pub fn disable_s2s(&self) {
        self.s2s.disable();
    }

    pub fn register_video_support(&self, ad_server: impl Into<String>, support: VideoSupport) {
        self.namespace.register_video_support(ad_server, support);
    }

    pub fn build_video_ad_url(
        &self,
        ad_server: Option<&str>,
        bid: &CachedVideoBid,
        options: &Value,
    ) -> Option<String> {
        self.namespace.build_video_ad_url(ad_server, bid, options)
    }

    /// Registers a listener for responses which arrive after their
    /// auction timed out
    pub fn on_late_response<F>(&self, listener: F)
    where
        F: Fn(&LateResponse) + Send + Sync + 'static,
    {
        self.late.add(Arc::new(listener));
    }

    /// Runs one auction to completion or timeout.
    ///
    /// # Errors
    /// Only malformed input fails the call, as [`PrexError::InvalidInput`].
    /// Unregistered bidders, adapter failures and timeouts are all
    /// reported on the returned [`AuctionOutcome`]
    pub async fn call_bids(&self, request: AuctionRequest) -> Result<AuctionOutcome, Error> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let context = AuctionContext::new(request.ad_units, timeout);

        if let Err(e) = self.pipeline.run(&context).await {
            warn!("Auction {} rejected: {}", context.auction_id, e);
            return Err(e);
        }

        let auction_id = context.auction_id.clone();

        context
            .outcome
            .into_inner()
            .ok_or_else(|| anyhow!("Auction {} finished without an outcome", auction_id))
    }
}
