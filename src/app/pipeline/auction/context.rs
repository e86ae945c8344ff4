use crate::core::adapters::BidAdapter;
use crate::core::managers::RegistrySnapshot;
use crate::core::models::{AdUnit, AdapterRequest, Bid, BidderResponse, DispatchPath, S2SConfig};
use anyhow::{Error, bail};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use strum::Display;
use tokio::time::Instant;
use tracing::trace;

/// Lifecycle of a single auction. `Completed` and `TimedOut`
/// are terminal and mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuctionState {
    Created,
    Partitioned,
    Dispatched,
    Completed,
    TimedOut,
}

impl AuctionState {
    fn can_advance_to(self, next: AuctionState) -> bool {
        matches!(
            (self, next),
            (AuctionState::Created, AuctionState::Partitioned)
                | (AuctionState::Partitioned, AuctionState::Dispatched)
                | (AuctionState::Dispatched, AuctionState::Completed)
                | (AuctionState::Dispatched, AuctionState::TimedOut)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AuctionState::Completed | AuctionState::TimedOut)
    }
}

/// Registry and s2s state captured once when partitioning starts
#[derive(Clone)]
pub struct AuctionSnapshot {
    pub bidders: RegistrySnapshot,
    pub s2s: Option<Arc<S2SConfig>>,
}

/// A single adapter invocation planned for this auction
#[derive(Clone)]
pub struct Callout {
    /// Bidder code, or the s2s adapter code on the s2s path
    pub code: String,
    pub adapter: Arc<dyn BidAdapter>,
    pub request: AdapterRequest,
    /// Budget from auction start, never longer than the auction timeout
    pub timeout: Duration,
}

impl Callout {
    pub fn path(&self) -> DispatchPath {
        self.request.path()
    }
}

/// The result handed back to the caller once an auction finalizes
#[derive(Debug, Clone)]
pub struct AuctionOutcome {
    pub auction_id: String,
    pub state: AuctionState,
    /// Responses which arrived before the deadline, in arrival order
    pub responses: Vec<BidderResponse>,
    /// Callouts still pending when the deadline fired
    pub timed_out: Vec<String>,
    /// Bidder codes skipped for lack of a registered adapter
    pub unregistered: Vec<String>,
}

impl AuctionOutcome {
    pub fn bids(&self) -> impl Iterator<Item = &Bid> {
        self.responses.iter().flat_map(|r| r.bids())
    }

    pub fn bids_for<'a>(&'a self, ad_unit_code: &'a str) -> impl Iterator<Item = &'a Bid> + 'a {
        self.bids().filter(move |b| b.ad_unit_code == ad_unit_code)
    }

    pub fn response(&self, code: &str) -> Option<&BidderResponse> {
        self.responses.iter().find(|r| r.code == code)
    }

    pub fn is_timed_out(&self) -> bool {
        self.state == AuctionState::TimedOut
    }
}

pub struct AuctionContext {
    pub auction_id: String,
    /// `None` when the caller supplied no ad units at all
    pub ad_units: Option<Vec<AdUnit>>,
    pub timeout: Duration,
    /// Start of the shared auction clock
    pub started: Instant,
    state: Mutex<AuctionState>,
    pub snapshot: OnceLock<AuctionSnapshot>,
    /// Planned callouts, taken by the dispatcher
    pub callouts: Mutex<Vec<Callout>>,
    pub unregistered: OnceLock<Vec<String>>,
    pub outcome: OnceLock<AuctionOutcome>,
}

impl AuctionContext {
    pub fn new(ad_units: Option<Vec<AdUnit>>, timeout: Duration) -> AuctionContext {
        AuctionContext {
            auction_id: uuid::Uuid::new_v4().to_string(),
            ad_units,
            timeout,
            started: Instant::now(),
            state: Mutex::new(AuctionState::Created),
            snapshot: OnceLock::new(),
            callouts: Mutex::new(Vec::new()),
            unregistered: OnceLock::new(),
            outcome: OnceLock::new(),
        }
    }

    pub fn state(&self) -> AuctionState {
        *self.state.lock()
    }

    /// Moves the auction along its lifecycle, rejecting any
    /// transition that skips a step or leaves a terminal state
    pub fn advance(&self, next: AuctionState) -> Result<(), Error> {
        let mut state = self.state.lock();

        if !state.can_advance_to(next) {
            bail!(
                "Illegal auction state transition {} -> {} for {}",
                *state,
                next,
                self.auction_id
            );
        }

        trace!("Auction {} {} -> {}", self.auction_id, *state, next);
        *state = next;

        Ok(())
    }

    pub fn deadline(&self) -> Instant {
        self.started + self.timeout
    }

    pub fn ad_units(&self) -> &[AdUnit] {
        self.ad_units.as_deref().unwrap_or_default()
    }
}
