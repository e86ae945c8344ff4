use crate::app::pipeline::auction::context::{AuctionContext, AuctionSnapshot, AuctionState, Callout};
use crate::child_span_info;
use crate::core::adapters::BidAdapter;
use crate::core::error::PrexError;
use crate::core::models::{
    AdUnit, AdapterRequest, AggregatedS2SRequest, ClientBid, ClientBidRequest, S2SConfig,
};
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How one auction's bids split across the two execution paths
pub struct Partition {
    /// Present only when at least one ad unit holds an s2s bidder
    pub s2s: Option<Callout>,
    /// One entry per distinct registered client bidder, in first seen order
    pub clients: Vec<Callout>,
    /// Client bidder codes without a registered adapter
    pub unregistered: Vec<String>,
}

impl Partition {
    pub fn into_callouts(self) -> Vec<Callout> {
        self.s2s.into_iter().chain(self.clients).collect()
    }
}

/// Resolves the s2s route for the snapshot, if the path is usable at all
fn s2s_route(snapshot: &AuctionSnapshot) -> Option<(Arc<S2SConfig>, Arc<dyn BidAdapter>)> {
    let config = snapshot.s2s.as_ref()?;

    match snapshot.bidders.resolve(&config.adapter) {
        Some(adapter) => Some((config.clone(), adapter)),
        None => {
            warn!(
                "s2s adapter '{}' is not registered, routing every bid client side",
                config.adapter
            );
            None
        }
    }
}

/// Splits the auction's ad units into the aggregated s2s request and
/// per bidder client requests.
///
/// # Behavior
/// - An ad unit holding any s2s bidder is forwarded to s2s in full,
///   ad unit order preserved
/// - Every bid of a non s2s bidder is grouped under its bidder code,
///   so an ad unit may be on both paths
/// - Client bidders without an adapter are dropped and reported
/// - No adapter instance is planned twice: client bids naming the s2s
///   adapter, or sharing an adapter already planned, are dropped
/// - Ad units with nothing to dispatch simply disappear
pub fn partition(
    auction_id: &str,
    ad_units: &[AdUnit],
    timeout: Duration,
    snapshot: &AuctionSnapshot,
) -> Partition {
    let route = s2s_route(snapshot);
    let s2s_bidders: HashSet<&str> = route
        .as_ref()
        .map(|(config, _)| {
            config
                .effective_bidders()
                .iter()
                .map(String::as_str)
                .collect()
        })
        .unwrap_or_default();

    let s2s_code = route.as_ref().map(|(config, _)| config.adapter.clone());
    let timeout_millis = timeout.as_millis() as u64;

    let mut s2s_units = Vec::new();
    let mut client_order: Vec<&str> = Vec::new();
    let mut client_bids: HashMap<&str, Vec<ClientBid>> = HashMap::new();

    for unit in ad_units {
        if !s2s_bidders.is_empty() && unit.has_bidder(|b| s2s_bidders.contains(b)) {
            s2s_units.push(unit.clone());
        }

        for bid in &unit.bids {
            if s2s_bidders.contains(bid.bidder.as_str()) {
                continue;
            }

            let slot = client_bids.entry(bid.bidder.as_str()).or_insert_with(|| {
                client_order.push(bid.bidder.as_str());
                Vec::new()
            });

            slot.push(ClientBid {
                bid_id: uuid::Uuid::new_v4().simple().to_string(),
                ad_unit_code: unit.code.clone(),
                sizes: unit.sizes.clone(),
                params: bid.params.clone(),
            });
        }
    }

    let s2s = match route {
        Some((config, adapter)) if !s2s_units.is_empty() => {
            let s2s_timeout = config.request_timeout(timeout);

            Some(Callout {
                code: config.adapter.clone(),
                adapter,
                request: AdapterRequest::S2s(AggregatedS2SRequest {
                    auction_id: auction_id.to_string(),
                    timeout_millis: s2s_timeout.as_millis() as u64,
                    max_bids: config.max_bids,
                    bidders: config.effective_bidders().to_vec(),
                    ad_units: s2s_units,
                }),
                timeout: s2s_timeout,
            })
        }
        _ => None,
    };

    let mut clients: Vec<Callout> = Vec::with_capacity(client_order.len());
    let mut unregistered = Vec::new();

    for code in client_order {
        let bids = client_bids.remove(code).unwrap_or_default();

        if s2s_code.as_deref() == Some(code) {
            warn!("Bidder {} is the s2s adapter code, skipping its client bids", code);
            continue;
        }

        let Some(adapter) = snapshot.bidders.resolve(code) else {
            warn!("{}, skipping", PrexError::UnregisteredBidder(code.to_string()));
            unregistered.push(code.to_string());
            continue;
        };

        let claimed = s2s
            .iter()
            .chain(clients.iter())
            .find(|c| Arc::ptr_eq(&c.adapter, &adapter));

        if let Some(claimed) = claimed {
            warn!(
                "Bidder {} shares its adapter with {} which is already called this auction, skipping",
                code, claimed.code
            );
            continue;
        }

        clients.push(Callout {
            code: code.to_string(),
            adapter,
            request: AdapterRequest::Client(ClientBidRequest {
                auction_id: auction_id.to_string(),
                bidder: code.to_string(),
                timeout_millis,
                bids,
            }),
            timeout,
        });
    }

    Partition {
        s2s,
        clients,
        unregistered,
    }
}

/// Plans the adapter callouts for the auction from its snapshot
pub struct PartitionTask;

impl BlockingTask<AuctionContext, Error> for PartitionTask {
    fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = child_span_info!(
            "partition_task",
            s2s_ad_units = tracing::field::Empty,
            client_bidders = tracing::field::Empty,
            unregistered = tracing::field::Empty
        )
        .entered();

        let snapshot = context
            .snapshot
            .get()
            .ok_or_else(|| anyhow!("Snapshot task must run before partitioning"))?;

        let partition = partition(
            &context.auction_id,
            context.ad_units(),
            context.timeout,
            snapshot,
        );

        let s2s_units = partition
            .s2s
            .as_ref()
            .and_then(|c| c.request.as_s2s())
            .map(|r| r.ad_units.len())
            .unwrap_or_default();

        if !span.is_disabled() {
            span.record("s2s_ad_units", s2s_units);
            span.record("client_bidders", partition.clients.len());
            span.record("unregistered", partition.unregistered.len());
        }

        debug!(
            "Partitioned auction {}: {} s2s ad units, {} client bidders, {} unregistered",
            context.auction_id,
            s2s_units,
            partition.clients.len(),
            partition.unregistered.len()
        );

        context
            .unregistered
            .set(partition.unregistered.clone())
            .map_err(|_| anyhow!("Auction already partitioned"))?;

        *context.callouts.lock() = partition.into_callouts();

        context.advance(AuctionState::Partitioned)
    }
}
