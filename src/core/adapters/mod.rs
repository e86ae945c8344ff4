mod adapter;
mod prebid_server;

pub use adapter::BidAdapter;
pub use prebid_server::PrebidServerAdapter;

#[cfg(test)]
pub mod testing;
