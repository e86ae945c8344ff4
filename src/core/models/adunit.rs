use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A creative size as `[width, height]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Size(pub u32, pub u32);

/// One configured bidder on an ad unit. The params are owned
/// by the bidder and passed through untouched
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder, PartialEq)]
#[builder(setter(into))]
pub struct BidRequestSpec {
    /// Case sensitive registry key of the bidder
    pub bidder: String,
    #[serde(default)]
    #[builder(default)]
    pub params: Map<String, Value>,
}

impl BidRequestSpec {
    pub fn new(bidder: impl Into<String>) -> Self {
        BidRequestSpec {
            bidder: bidder.into(),
            params: Map::new(),
        }
    }
}

/// A placement eligible for bids, along with the ordered
/// list of bidders configured for it
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder, PartialEq)]
#[builder(setter(into))]
pub struct AdUnit {
    pub code: String,
    #[serde(default)]
    #[builder(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    #[builder(default)]
    pub bids: Vec<BidRequestSpec>,
}

impl AdUnit {
    /// True if any configured bid satisfies the predicate on its bidder code
    pub fn has_bidder<F>(&self, pred: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        self.bids.iter().any(|bid| pred(&bid.bidder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adunit_deserializes_with_defaults() {
        let unit: AdUnit = serde_json::from_str(
            r#"{
                "code": "div-gpt-ad-1",
                "sizes": [[300, 250], [300, 600]],
                "bids": [
                    { "bidder": "appnexus", "params": { "placementId": "10433394" } },
                    { "bidder": "adequant" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(unit.code, "div-gpt-ad-1");
        assert_eq!(unit.sizes, vec![Size(300, 250), Size(300, 600)]);
        assert_eq!(unit.bids.len(), 2);
        assert_eq!(unit.bids[0].params["placementId"], "10433394");
        assert!(unit.bids[1].params.is_empty());
    }

    #[test]
    fn test_has_bidder_is_case_exact() {
        let unit = AdUnitBuilder::default()
            .code("a")
            .bids(vec![BidRequestSpec::new("appnexus")])
            .build()
            .unwrap();

        assert!(unit.has_bidder(|b| b == "appnexus"));
        assert!(!unit.has_bidder(|b| b == "AppNexus"));
    }
}
