mod context;
mod pipeline;
pub mod tasks;

pub use context::{AuctionContext, AuctionOutcome, AuctionSnapshot, AuctionState, Callout};
pub use pipeline::build_auction_pipeline;
pub use tasks::{LateResponse, LateResponseListener, LateResponseListeners};
