use crate::core::error::PrexError;
use crate::core::models::S2SConfig;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{info, warn};

/// Holds the single active s2s configuration. A new configuration
/// replaces the previous one wholesale, bidder sets are never merged
pub struct S2SConfigStore {
    active: ArcSwapOption<S2SConfig>,
}

impl S2SConfigStore {
    pub fn new() -> Self {
        S2SConfigStore {
            active: ArcSwapOption::empty(),
        }
    }

    /// Validates and activates a configuration.
    ///
    /// # Behavior
    /// On a validation failure the previously active configuration
    /// stays in place and the error is returned to the caller, the
    /// auction may still proceed client side only
    pub fn set_config(&self, config: S2SConfig) -> Result<Arc<S2SConfig>, PrexError> {
        let config = match config.normalized() {
            Ok(config) => Arc::new(config),
            Err(e) => {
                warn!("Rejected s2s config, keeping previous: {}", e);
                return Err(e);
            }
        };

        info!(
            "Activated s2s config: adapter {} enabled {} bidders {:?} max_bids {:?}",
            config.adapter, config.enabled, config.bidders, config.max_bids
        );

        self.active.store(Some(config.clone()));

        Ok(config)
    }

    /// The active configuration, or `None` when never set or disabled
    pub fn get_config(&self) -> Option<Arc<S2SConfig>> {
        self.active.load_full().filter(|cfg| cfg.enabled)
    }

    pub fn disable(&self) {
        if self.active.swap(None).is_some() {
            info!("Disabled s2s config");
        }
    }
}

impl Default for S2SConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
