pub mod bidders;
pub mod s2s;

pub use bidders::{BidderRegistry, RegistrySnapshot};
pub use s2s::S2SConfigStore;
