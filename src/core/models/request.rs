use crate::core::models::adunit::{AdUnit, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

/// Which execution path an adapter invocation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DispatchPath {
    S2s,
    Client,
}

/// The single request handed to the s2s adapter for an auction.
/// Each ad unit holding at least one s2s bidder is carried in full
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedS2SRequest {
    #[serde(rename = "tid")]
    pub auction_id: String,
    pub timeout_millis: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bids: Option<usize>,
    /// Effective s2s bidders after any `max_bids` cap
    pub bidders: Vec<String>,
    pub ad_units: Vec<AdUnit>,
}

/// One ad unit slot requested from a client side bidder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientBid {
    pub bid_id: String,
    pub ad_unit_code: String,
    pub sizes: Vec<Size>,
    pub params: Map<String, Value>,
}

/// Everything a client side bidder is asked for in one auction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientBidRequest {
    pub auction_id: String,
    pub bidder: String,
    pub timeout_millis: u64,
    pub bids: Vec<ClientBid>,
}

impl ClientBidRequest {
    pub fn ad_unit_codes(&self) -> Vec<&str> {
        self.bids.iter().map(|b| b.ad_unit_code.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdapterRequest {
    S2s(AggregatedS2SRequest),
    Client(ClientBidRequest),
}

impl AdapterRequest {
    pub fn path(&self) -> DispatchPath {
        match self {
            AdapterRequest::S2s(_) => DispatchPath::S2s,
            AdapterRequest::Client(_) => DispatchPath::Client,
        }
    }

    pub fn as_s2s(&self) -> Option<&AggregatedS2SRequest> {
        match self {
            AdapterRequest::S2s(req) => Some(req),
            AdapterRequest::Client(_) => None,
        }
    }

    pub fn as_client(&self) -> Option<&ClientBidRequest> {
        match self {
            AdapterRequest::Client(req) => Some(req),
            AdapterRequest::S2s(_) => None,
        }
    }
}
