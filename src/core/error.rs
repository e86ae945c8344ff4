use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy surfaced by the auction core. Only
/// [`PrexError::InvalidInput`] is ever returned from an auction
/// run; the other kinds are non fatal and are either returned by
/// configuration calls or recorded on the auction outcome
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrexError {
    /// Rejected s2s or registry configuration. The previously active
    /// configuration remains in effect
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Malformed top level auction input
    #[error("invalid auction input: {0}")]
    InvalidInput(String),

    /// A bid referenced a bidder code with no registered adapter
    #[error("no adapter registered for bidder '{0}'")]
    UnregisteredBidder(String),

    /// The auction deadline elapsed with adapters still pending
    #[error("auction timed out after {timeout:?} with {pending} adapter(s) pending")]
    DispatchTimeout { timeout: Duration, pending: usize },
}

impl PrexError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        PrexError::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        PrexError::InvalidInput(msg.into())
    }
}
