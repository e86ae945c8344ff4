use crate::app::pipeline::auction::context::{AuctionContext, AuctionOutcome, AuctionState, Callout};
use crate::child_span_info;
use crate::core::error::PrexError;
use crate::core::models::{BidderResponse, BidderResponseState, DispatchPath};
use crate::core::pipeline::AsyncTask;
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, warn};

/// A response which arrived after its auction already timed out
#[derive(Debug, Clone)]
pub struct LateResponse {
    pub auction_id: String,
    pub response: BidderResponse,
}

pub type LateResponseListener = Arc<dyn Fn(&LateResponse) + Send + Sync>;

/// Receivers of responses excluded from their auction for lateness,
/// e.g. to warm caches used by later auctions
#[derive(Default)]
pub struct LateResponseListeners {
    listeners: RwLock<Vec<LateResponseListener>>,
}

impl LateResponseListeners {
    pub fn add(&self, listener: LateResponseListener) {
        self.listeners.write().push(listener);
    }

    /// Listeners run outside the lock, so they may register others
    fn notify(&self, late: &LateResponse) {
        let listeners = self.listeners.read().clone();

        for listener in listeners.iter() {
            listener(late);
        }
    }
}

async fn invoke(callout: Callout) -> BidderResponse {
    let started = Instant::now();
    let path = callout.path();

    let state = match callout.adapter.call_bids(&callout.request).await {
        Ok(bids) => {
            debug!("{} adapter {} returned {} bids", path, callout.code, bids.len());
            BidderResponseState::Bids(bids)
        }
        Err(e) => {
            warn!("{} adapter {} failed: {}", path, callout.code, e);
            BidderResponseState::Failed(e.to_string())
        }
    };

    BidderResponse {
        code: callout.code,
        path,
        elapsed: started.elapsed(),
        state,
    }
}

fn joined(
    code: String,
    path: DispatchPath,
    dispatched: Instant,
    result: Result<BidderResponse, JoinError>,
) -> BidderResponse {
    result.unwrap_or_else(|e| {
        warn!("{} adapter {} task failed: {}", path, code, e);

        BidderResponse {
            code,
            path,
            elapsed: dispatched.elapsed(),
            state: BidderResponseState::Failed(format!("adapter task failed: {}", e)),
        }
    })
}

enum Arrival {
    OnTime(Result<BidderResponse, JoinError>),
    /// The callout's own deadline passed, the task keeps running
    Expired(JoinHandle<BidderResponse>),
}

async fn within(
    idx: usize,
    deadline: Instant,
    mut handle: JoinHandle<BidderResponse>,
) -> (usize, Arrival) {
    match tokio::time::timeout_at(deadline, &mut handle).await {
        Ok(result) => (idx, Arrival::OnTime(result)),
        Err(_) => (idx, Arrival::Expired(handle)),
    }
}

async fn straggler(
    idx: usize,
    handle: JoinHandle<BidderResponse>,
) -> (usize, Result<BidderResponse, JoinError>) {
    (idx, handle.await)
}

/// Issues every planned callout concurrently, then collects responses
/// until all have arrived or their deadlines fire.
///
/// # Behavior
/// Each callout is bounded by its own timeout, the s2s callout may have
/// a tighter one than the auction. Adapters still pending past their
/// deadline are not interrupted. Their responses are handed to the late
/// listeners once they arrive and never make it into the auction outcome
pub struct DispatchTask {
    late: Arc<LateResponseListeners>,
}

impl DispatchTask {
    pub fn new(late: Arc<LateResponseListeners>) -> Self {
        DispatchTask { late }
    }

    async fn run0(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = Span::current();
        let callouts = std::mem::take(&mut *context.callouts.lock());
        let dispatched = Instant::now();

        let mut pending: Vec<Option<(String, DispatchPath)>> = Vec::with_capacity(callouts.len());
        let mut inflight = FuturesUnordered::new();

        for (idx, callout) in callouts.into_iter().enumerate() {
            pending.push(Some((callout.code.clone(), callout.path())));

            let deadline = context.started + callout.timeout.min(context.timeout);
            let callout_span = child_span_info!(
                "adapter_callout",
                code = %callout.code,
                path = %callout.path()
            );
            let handle = tokio::spawn(invoke(callout).instrument(callout_span));

            inflight.push(within(idx, deadline, handle));
        }

        context.advance(AuctionState::Dispatched)?;

        let deadline = context.deadline();
        let mut responses = Vec::with_capacity(pending.len());
        let mut stragglers = FuturesUnordered::new();

        let deadline_fired = loop {
            if inflight.is_empty() {
                break false;
            }

            match tokio::time::timeout_at(deadline, inflight.next()).await {
                Ok(Some((idx, Arrival::OnTime(result)))) => {
                    let (code, path) = pending[idx]
                        .take()
                        .ok_or_else(|| anyhow!("Callout {} answered twice", idx))?;

                    responses.push(joined(code, path, dispatched, result));
                }
                Ok(Some((idx, Arrival::Expired(handle)))) => {
                    stragglers.push(straggler(idx, handle));
                }
                Ok(None) => break false,
                Err(_) => break true,
            }
        };

        let timed_out = deadline_fired || !stragglers.is_empty();
        let still_pending: Vec<(String, DispatchPath)> = pending.iter().flatten().cloned().collect();

        let state = if timed_out {
            warn!(
                "{}: {:?}",
                PrexError::DispatchTimeout {
                    timeout: context.timeout,
                    pending: still_pending.len(),
                },
                still_pending.iter().map(|(code, _)| code).collect::<Vec<_>>()
            );

            let late = self.late.clone();
            let auction_id = context.auction_id.clone();

            tokio::spawn(
                async move {
                    let mut deliver = |idx: usize, result| {
                        let Some((code, path)) = pending.get_mut(idx).and_then(Option::take) else {
                            return;
                        };
                        let response = joined(code, path, dispatched, result);

                        debug!(
                            "Late {} response from {} for auction {}",
                            response.path, response.code, auction_id
                        );

                        late.notify(&LateResponse {
                            auction_id: auction_id.clone(),
                            response,
                        });
                    };

                    while let Some((idx, arrival)) = inflight.next().await {
                        match arrival {
                            Arrival::OnTime(result) => deliver(idx, result),
                            Arrival::Expired(handle) => stragglers.push(straggler(idx, handle)),
                        }
                    }

                    while let Some((idx, result)) = stragglers.next().await {
                        deliver(idx, result);
                    }
                }
                .instrument(span.clone()),
            );

            AuctionState::TimedOut
        } else {
            AuctionState::Completed
        };

        if !span.is_disabled() {
            span.record("responses", responses.len());
            span.record("timed_out", timed_out);
        }

        context.advance(state)?;

        let outcome = AuctionOutcome {
            auction_id: context.auction_id.clone(),
            state,
            responses,
            timed_out: still_pending.into_iter().map(|(code, _)| code).collect(),
            unregistered: context.unregistered.get().cloned().unwrap_or_default(),
        };

        context
            .outcome
            .set(outcome)
            .map_err(|_| anyhow!("Auction outcome already set"))
    }
}

#[async_trait]
impl AsyncTask<AuctionContext, Error> for DispatchTask {
    async fn run(&self, context: &AuctionContext) -> Result<(), Error> {
        let span = child_span_info!(
            "dispatch_task",
            responses = tracing::field::Empty,
            timed_out = tracing::field::Empty
        );

        self.run0(context).instrument(span).await
    }
}
