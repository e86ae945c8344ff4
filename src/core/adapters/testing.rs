use crate::core::adapters::BidAdapter;
use crate::core::models::{AdapterRequest, Bid, BidBuilder, S2SConfig};
use anyhow::{Error, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Adapter which records every request it receives and answers
/// with one bid per requested ad unit, optionally after a delay
#[derive(Default)]
pub struct RecordingAdapter {
    pub code: String,
    pub delay: Option<Duration>,
    pub fail: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<AdapterRequest>>,
    configs: Mutex<Vec<S2SConfig>>,
    instances: Mutex<Vec<Arc<RecordingAdapter>>>,
}

impl RecordingAdapter {
    pub fn new(code: &str) -> Arc<Self> {
        Arc::new(RecordingAdapter {
            code: code.to_string(),
            ..Default::default()
        })
    }

    pub fn slow(code: &str, delay: Duration) -> Arc<Self> {
        Arc::new(RecordingAdapter {
            code: code.to_string(),
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn failing(code: &str) -> Arc<Self> {
        Arc::new(RecordingAdapter {
            code: code.to_string(),
            fail: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<AdapterRequest> {
        self.requests.lock().clone()
    }

    pub fn configs(&self) -> Vec<S2SConfig> {
        self.configs.lock().clone()
    }

    /// Instances handed out for aliases, in creation order
    pub fn instances(&self) -> Vec<Arc<RecordingAdapter>> {
        self.instances.lock().clone()
    }

    fn bids_for(&self, request: &AdapterRequest) -> Vec<Bid> {
        let codes: Vec<String> = match request {
            AdapterRequest::S2s(req) => req.ad_units.iter().map(|u| u.code.clone()).collect(),
            AdapterRequest::Client(req) => {
                req.bids.iter().map(|b| b.ad_unit_code.clone()).collect()
            }
        };

        codes
            .into_iter()
            .map(|code| {
                BidBuilder::default()
                    .bidder(self.code.clone())
                    .ad_unit_code(code)
                    .cpm(1.0)
                    .build()
                    .unwrap()
            })
            .collect()
    }
}

#[async_trait]
impl BidAdapter for RecordingAdapter {
    async fn call_bids(&self, request: &AdapterRequest) -> Result<Vec<Bid>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            bail!("{} exploded", self.code);
        }

        Ok(self.bids_for(request))
    }

    fn set_config(&self, config: &S2SConfig) {
        self.configs.lock().push(config.clone());
    }

    fn new_instance(&self) -> Option<Arc<dyn BidAdapter>> {
        let instance = Arc::new(RecordingAdapter {
            code: self.code.clone(),
            delay: self.delay,
            fail: self.fail,
            ..Default::default()
        });
        self.instances.lock().push(instance.clone());

        Some(instance)
    }
}
