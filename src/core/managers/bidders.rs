use crate::core::adapters::BidAdapter;
use crate::core::error::PrexError;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type AdapterMap = HashMap<String, Arc<dyn BidAdapter>>;

/// Point in time view of the registry, held by a single auction
/// so registrations mid auction are never observed
#[derive(Clone)]
pub struct RegistrySnapshot {
    adapters: Arc<AdapterMap>,
}

impl RegistrySnapshot {
    pub fn resolve(&self, code: &str) -> Option<Arc<dyn BidAdapter>> {
        self.adapters.get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.adapters.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }
}

/// Maps bidder codes to their adapters. Entries live for the
/// lifetime of the process, a later registration of the same
/// code silently replaces the former
pub struct BidderRegistry {
    adapters: ArcSwap<AdapterMap>,
}

impl BidderRegistry {
    pub fn new() -> Self {
        BidderRegistry {
            adapters: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    pub fn register(&self, code: impl Into<String>, adapter: Arc<dyn BidAdapter>) {
        let code = code.into();

        let prev = self.adapters.rcu(|current| {
            let mut next = AdapterMap::clone(current);
            next.insert(code.clone(), adapter.clone());
            next
        });

        if prev.contains_key(&code) {
            debug!("Bidder adapter replaced: {}", code);
        } else {
            debug!("Bidder adapter registered: {}", code);
        }
    }

    /// Registers a fresh instance of the adapter known as `existing`
    /// under a second code, so both codes can bid in the same auction
    pub fn alias(&self, existing: &str, alias: impl Into<String>) -> Result<(), PrexError> {
        let adapter = self
            .resolve(existing)
            .ok_or_else(|| {
                PrexError::configuration(format!("cannot alias unknown bidder '{}'", existing))
            })?
            .new_instance()
            .ok_or_else(|| {
                PrexError::configuration(format!("bidder '{}' does not support aliases", existing))
            })?;

        self.register(alias, adapter);

        Ok(())
    }

    pub fn resolve(&self, code: &str) -> Option<Arc<dyn BidAdapter>> {
        self.adapters.load().get(code).cloned()
    }

    /// Registered codes, sorted
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.adapters.load().keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            adapters: self.adapters.load_full(),
        }
    }
}

impl Default for BidderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adapters::testing::RecordingAdapter;

    #[test]
    fn test_register_and_resolve() {
        let registry = BidderRegistry::new();
        registry.register("appnexus", RecordingAdapter::new("appnexus"));

        assert!(registry.resolve("appnexus").is_some());
        assert!(registry.resolve("AppNexus").is_none());
        assert!(registry.resolve("rubicon").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = BidderRegistry::new();
        let first = RecordingAdapter::new("first");
        let second = RecordingAdapter::new("second");

        registry.register("appnexus", first.clone());
        registry.register("appnexus", second.clone());

        let resolved = registry.resolve("appnexus").unwrap();
        let second_dyn: Arc<dyn BidAdapter> = second;

        assert!(Arc::ptr_eq(&resolved, &second_dyn));
        assert_eq!(registry.codes(), vec!["appnexus"]);
    }

    #[test]
    fn test_alias_gets_its_own_instance() {
        let registry = BidderRegistry::new();
        let appnexus = RecordingAdapter::new("appnexus");
        registry.register("appnexus", appnexus.clone());

        registry.alias("appnexus", "brealtime").unwrap();

        let a = registry.resolve("appnexus").unwrap();
        let b = registry.resolve("brealtime").unwrap();
        let instance: Arc<dyn BidAdapter> = appnexus.instances()[0].clone();

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &instance));
        assert_eq!(registry.codes(), vec!["appnexus", "brealtime"]);
    }

    struct Fixed;

    #[async_trait::async_trait]
    impl BidAdapter for Fixed {
        async fn call_bids(
            &self,
            _request: &crate::core::models::AdapterRequest,
        ) -> Result<Vec<crate::core::models::Bid>, anyhow::Error> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_alias_requires_instance_support() {
        let registry = BidderRegistry::new();
        registry.register("fixed", Arc::new(Fixed));

        let err = registry.alias("fixed", "other").unwrap_err();
        assert!(matches!(err, PrexError::Configuration(_)));
        assert!(registry.resolve("other").is_none());
    }

    #[test]
    fn test_alias_of_unknown_bidder_fails() {
        let registry = BidderRegistry::new();

        let err = registry.alias("nobody", "alias").unwrap_err();
        assert!(matches!(err, PrexError::Configuration(_)));
        assert!(registry.resolve("alias").is_none());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_registrations() {
        let registry = BidderRegistry::new();
        registry.register("appnexus", RecordingAdapter::new("appnexus"));

        let snapshot = registry.snapshot();
        registry.register("rubicon", RecordingAdapter::new("rubicon"));

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("appnexus"));
        assert!(snapshot.resolve("rubicon").is_none());
        assert!(registry.snapshot().contains("rubicon"));
    }
}
