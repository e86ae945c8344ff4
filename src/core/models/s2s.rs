use crate::core::error::PrexError;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_S2S_ENDPOINT: &str = "https://prebid.adnxs.com/pbs/v1/auction";
pub const DEFAULT_S2S_ADAPTER: &str = "prebidServer";
pub const DEFAULT_S2S_TIMEOUT: Duration = Duration::from_millis(1000);

/// Server to server routing configuration. Bidders listed here are
/// delegated in bulk to the adapter registered under `adapter`
#[derive(Debug, Clone, Serialize, Deserialize, Builder, PartialEq)]
#[builder(setter(into))]
pub struct S2SConfig {
    /// Gates the whole s2s path
    #[serde(default = "default_true")]
    #[builder(default = "true")]
    pub enabled: bool,
    /// Aggregation endpoint, opaque to the auction core
    #[serde(default = "default_endpoint")]
    #[builder(default = "DEFAULT_S2S_ENDPOINT.to_string()")]
    pub endpoint: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    #[builder(default = "DEFAULT_S2S_TIMEOUT")]
    pub timeout: Duration,
    /// Registry code of the adapter which services s2s traffic
    #[serde(default = "default_adapter", alias = "adapter_code")]
    #[builder(default = "DEFAULT_S2S_ADAPTER.to_string()")]
    pub adapter: String,
    /// Bidder codes routed server side, in declaration order
    pub bidders: Vec<String>,
    /// Caps the s2s bidders to a prefix of `bidders`
    #[serde(default)]
    #[builder(default)]
    pub max_bids: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_S2S_ENDPOINT.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_S2S_TIMEOUT
}

fn default_adapter() -> String {
    DEFAULT_S2S_ADAPTER.to_string()
}

impl S2SConfig {
    /// Validates the config and collapses duplicate bidder
    /// codes, keeping the first declaration of each
    pub fn normalized(mut self) -> Result<S2SConfig, PrexError> {
        if self.bidders.is_empty() {
            return Err(PrexError::configuration("s2s bidders must not be empty"));
        }

        if self.bidders.iter().any(|b| b.is_empty()) {
            return Err(PrexError::configuration("s2s bidders contain an empty code"));
        }

        if self.timeout.is_zero() {
            return Err(PrexError::configuration("s2s timeout must be positive"));
        }

        if self.max_bids == Some(0) {
            return Err(PrexError::configuration("s2s max_bids must be at least 1"));
        }

        if self.adapter.is_empty() {
            return Err(PrexError::configuration("s2s adapter code must not be empty"));
        }

        let mut seen = Vec::with_capacity(self.bidders.len());
        for bidder in std::mem::take(&mut self.bidders) {
            if !seen.contains(&bidder) {
                seen.push(bidder);
            }
        }
        self.bidders = seen;

        Ok(self)
    }

    /// The bidders actually routed server side, which is the
    /// first `max_bids` codes when a cap is configured
    pub fn effective_bidders(&self) -> &[String] {
        match self.max_bids {
            Some(max) if max < self.bidders.len() => &self.bidders[..max],
            _ => &self.bidders,
        }
    }

    /// Budget of the s2s request, never longer than the auction itself
    pub fn request_timeout(&self, auction_timeout: Duration) -> Duration {
        self.timeout.min(auction_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bidders: &[&str]) -> S2SConfig {
        S2SConfigBuilder::default()
            .bidders(bidders.iter().map(|b| b.to_string()).collect::<Vec<_>>())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let cfg = config(&["appnexus"]);

        assert!(cfg.enabled);
        assert_eq!(cfg.endpoint, DEFAULT_S2S_ENDPOINT);
        assert_eq!(cfg.adapter, DEFAULT_S2S_ADAPTER);
        assert_eq!(cfg.timeout, Duration::from_millis(1000));
        assert_eq!(cfg.max_bids, None);
    }

    #[test]
    fn test_rejects_empty_bidders() {
        let err = config(&[]).normalized().unwrap_err();
        assert!(matches!(err, PrexError::Configuration(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut cfg = config(&["appnexus"]);
        cfg.timeout = Duration::ZERO;

        assert!(matches!(
            cfg.normalized(),
            Err(PrexError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_zero_max_bids() {
        let mut cfg = config(&["appnexus"]);
        cfg.max_bids = Some(0);

        assert!(cfg.normalized().is_err());
    }

    #[test]
    fn test_duplicates_collapse_in_declaration_order() {
        let cfg = config(&["rubicon", "appnexus", "rubicon", "ix"])
            .normalized()
            .unwrap();

        assert_eq!(cfg.bidders, vec!["rubicon", "appnexus", "ix"]);
    }

    #[test]
    fn test_max_bids_is_a_declaration_order_prefix() {
        let mut cfg = config(&["rubicon", "appnexus", "ix"]);
        cfg.max_bids = Some(2);

        assert_eq!(cfg.effective_bidders(), &["rubicon", "appnexus"]);

        cfg.max_bids = Some(10);
        assert_eq!(cfg.effective_bidders().len(), 3);
    }

    #[test]
    fn test_request_timeout_is_capped_by_auction() {
        let mut cfg = config(&["appnexus"]);
        cfg.timeout = Duration::from_millis(100);

        assert_eq!(cfg.request_timeout(Duration::from_millis(1000)), Duration::from_millis(100));

        cfg.timeout = Duration::from_millis(2000);
        assert_eq!(cfg.request_timeout(Duration::from_millis(1000)), Duration::from_millis(1000));
    }

    #[test]
    fn test_deserializes_humantime_timeout() {
        let cfg: S2SConfig = serde_json::from_str(
            r#"{ "timeout": "750ms", "adapter": "prebidServer", "bidders": ["appnexus"], "max_bids": 1 }"#,
        )
        .unwrap();

        assert_eq!(cfg.timeout, Duration::from_millis(750));
        assert_eq!(cfg.max_bids, Some(1));
        assert!(cfg.enabled);
    }
}
