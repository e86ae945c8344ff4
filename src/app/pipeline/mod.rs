/// Pipeline which runs a single header bidding auction, from
/// partitioning bids between s2s and client adapters to
/// collecting responses under the auction deadline
pub mod auction;
