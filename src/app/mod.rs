pub mod auctioneer;
pub mod config;
pub mod lifecycle;
pub mod pipeline;
pub mod span;
