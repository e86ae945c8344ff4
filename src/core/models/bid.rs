use crate::core::models::request::DispatchPath;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder, PartialEq)]
#[builder(setter(into), default)]
pub struct Bid {
    pub bidder: String,
    #[serde(rename = "code")]
    pub ad_unit_code: String,
    #[serde(rename = "price")]
    pub cpm: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum BidderResponseState {
    Bids(Vec<Bid>),
    Failed(String),
}

/// The response slot written by exactly one adapter invocation
#[derive(Debug, Clone)]
pub struct BidderResponse {
    /// The bidder code, or the s2s adapter code on the s2s path
    pub code: String,
    pub path: DispatchPath,
    pub elapsed: Duration,
    pub state: BidderResponseState,
}

impl BidderResponse {
    pub fn bids(&self) -> &[Bid] {
        match &self.state {
            BidderResponseState::Bids(bids) => bids,
            BidderResponseState::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, BidderResponseState::Failed(_))
    }
}
