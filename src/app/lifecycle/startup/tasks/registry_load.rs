use crate::app::lifecycle::context::StartupContext;
use crate::core::adapters::PrebidServerAdapter;
use crate::core::managers::BidderRegistry;
use crate::core::models::DEFAULT_S2S_ADAPTER;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Creates the bidder registry with the prebid server adapter under
/// the configured s2s adapter code, then applies configured aliases
pub struct RegistryLoadTask;

impl BlockingTask<StartupContext, Error> for RegistryLoadTask {
    #[instrument(skip_all, name = "registry_load_task")]
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let config = context
            .config
            .get()
            .ok_or_else(|| anyhow!("Config must load before the bidder registry"))?;

        let registry = Arc::new(BidderRegistry::new());

        let s2s_code = config
            .s2s
            .as_ref()
            .map(|s2s| s2s.adapter.as_str())
            .unwrap_or(DEFAULT_S2S_ADAPTER);

        let prebid_server = PrebidServerAdapter::new()
            .map_err(|e| anyhow!("Prebid server adapter failed: {}", e))?;
        registry.register(s2s_code, Arc::new(prebid_server));

        for alias in &config.aliases {
            if let Err(e) = registry.alias(&alias.bidder, alias.alias.clone()) {
                warn!("Skipping alias {}: {}", alias.alias, e);
            }
        }

        info!("Loaded bidder registry: {:?}", registry.codes());

        context
            .registry
            .set(registry)
            .map_err(|_| anyhow!("Can't init bidder registry"))
    }
}
