use crate::core::adapters::BidAdapter;
use crate::core::models::{AdapterRequest, AggregatedS2SRequest, Bid, S2SConfig};
use anyhow::{Error, anyhow, bail};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, StatusCode, redirect, retry};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

#[derive(Debug, Deserialize)]
struct S2SResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    bids: Vec<Bid>,
}

/// Decodes a server side auction response into bids, dropping
/// any bid for a bidder that was not part of the request
fn decode_response(req: &AggregatedS2SRequest, body: &[u8]) -> Result<Vec<Bid>, Error> {
    let res: S2SResponse = serde_json::from_slice(body)?;

    if !res.status.is_empty() && res.status != "OK" {
        debug!("s2s response status {}", res.status);
    }

    let (bids, foreign): (Vec<Bid>, Vec<Bid>) = res
        .bids
        .into_iter()
        .partition(|bid| req.bidders.contains(&bid.bidder));

    if !foreign.is_empty() {
        warn!(
            "Dropped {} s2s bids from bidders outside the request",
            foreign.len()
        );
    }

    Ok(bids)
}

/// Adapter which services the s2s path by posting the aggregated
/// request as json to the configured endpoint
pub struct PrebidServerAdapter {
    client: Client,
    config: RwLock<Option<Arc<S2SConfig>>>,
}

impl PrebidServerAdapter {
    /// Builds the shared http client, failing if tls cannot be set up
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(concat!("prex/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(1))
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_keepalive(Some(Duration::from_secs(20)))
            .retry(retry::never())
            .redirect(redirect::Policy::none())
            .tcp_nodelay(true)
            .gzip(true)
            .deflate(true)
            .build()?;

        Ok(PrebidServerAdapter {
            client,
            config: RwLock::new(None),
        })
    }

    async fn post(&self, req: &AggregatedS2SRequest) -> Result<Vec<Bid>, Error> {
        let config = self
            .config
            .read()
            .clone()
            .ok_or_else(|| anyhow!("Prebid server adapter has no s2s config"))?;

        let body = serde_json::to_vec(req)?;

        if tracing::event_enabled!(tracing::Level::TRACE) {
            trace!("{}", String::from_utf8_lossy(&body));
        }

        let http_req = self
            .client
            .post(&config.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .timeout(Duration::from_millis(req.timeout_millis))
            .body(body)
            .build()
            .map_err(|e| anyhow!("Failed to build s2s request for {}: {}", config.endpoint, e))?;

        let res = self
            .client
            .execute(http_req)
            .await
            .map_err(|e| anyhow!("Failed to execute s2s request for {}: {}", config.endpoint, e))?;

        let status = res.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        if status != StatusCode::OK {
            bail!("s2s endpoint {} returned {}", config.endpoint, status);
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| anyhow!("Failed to read s2s response for {}: {}", config.endpoint, e))?;

        decode_response(req, &bytes)
    }
}

#[async_trait]
impl BidAdapter for PrebidServerAdapter {
    async fn call_bids(&self, request: &AdapterRequest) -> Result<Vec<Bid>, Error> {
        match request {
            AdapterRequest::S2s(req) => self.post(req).await,
            AdapterRequest::Client(req) => bail!(
                "Prebid server adapter cannot service client request for {}",
                req.bidder
            ),
        }
    }

    fn set_config(&self, config: &S2SConfig) {
        *self.config.write() = Some(Arc::new(config.clone()));
    }

    fn new_instance(&self) -> Option<Arc<dyn BidAdapter>> {
        Some(Arc::new(PrebidServerAdapter {
            client: self.client.clone(),
            config: RwLock::new(self.config.read().clone()),
        }))
    }
}
