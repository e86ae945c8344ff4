pub mod adunit;
pub mod bid;
pub mod request;
pub mod s2s;

pub use adunit::{AdUnit, AdUnitBuilder, BidRequestSpec, Size};
pub use bid::{Bid, BidBuilder, BidderResponse, BidderResponseState};
pub use request::{AdapterRequest, AggregatedS2SRequest, ClientBid, ClientBidRequest, DispatchPath};
pub use s2s::{
    DEFAULT_S2S_ADAPTER, DEFAULT_S2S_ENDPOINT, DEFAULT_S2S_TIMEOUT, S2SConfig, S2SConfigBuilder,
};
