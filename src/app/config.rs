use crate::core::models::{AdUnit, S2SConfig};
use config::Config;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
pub struct AuctionConfig {
    /// Auction wide deadline applied when a call does not override it
    #[serde(default = "default_auction_timeout", with = "humantime_serde")]
    #[builder(default = "default_auction_timeout()")]
    pub timeout: Duration,
}

fn default_auction_timeout() -> Duration {
    Duration::from_millis(1000)
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            timeout: default_auction_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
pub struct PrexConfig {
    #[serde(default)]
    #[builder(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    #[builder(default)]
    pub auction: AuctionConfig,
    /// Server side routing, the s2s path is disabled when absent
    #[serde(default)]
    #[builder(default)]
    pub s2s: Option<S2SConfig>,
    /// Bidder aliases as `alias: existing_code`
    #[serde(default)]
    #[builder(default)]
    pub aliases: Vec<BidderAlias>,
    /// Ad units auctioned by the cli run
    #[serde(default)]
    #[builder(default)]
    pub ad_units: Vec<AdUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BidderAlias {
    pub alias: String,
    pub bidder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSink {
    #[serde(flatten)]
    pub dest: LogType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogType {
    Stdout {
        #[serde(default = "default_true")]
        color: bool,
        #[serde(default)]
        json: bool,
        #[serde(default)]
        spans: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        json: bool,
        #[serde(default)]
        rotation: FileRotation,
        #[serde(default)]
        max_files: usize,
        #[serde(default)]
        spans: bool,
    },
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_span_sample_rate() -> f32 {
    0.01
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Fraction of auctions which get a root span
    #[serde(default = "default_span_sample_rate")]
    pub span_sample_rate: f32,
    #[serde(default = "default_sinks")]
    pub sinks: Vec<LogSink>,
}

fn default_sinks() -> Vec<LogSink> {
    vec![LogSink {
        dest: LogType::Stdout {
            color: true,
            json: false,
            spans: false,
        },
    }]
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            span_sample_rate: default_span_sample_rate(),
            sinks: default_sinks(),
        }
    }
}

impl LoggingConfig {
    /// Validates the logging configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.sinks.is_empty() {
            anyhow::bail!("At least one logging sink must be configured");
        }

        self.level.parse::<tracing::Level>().map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                self.level
            )
        })?;

        if !(0.0..=1.0).contains(&self.span_sample_rate) {
            anyhow::bail!(
                "span_sample_rate must be between 0.0 and 1.0, got {}",
                self.span_sample_rate
            );
        }

        Ok(())
    }
}

impl PrexConfig {
    pub fn load(path: &PathBuf) -> Result<PrexConfig, anyhow::Error> {
        let cfg = Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(yaml: &str) -> PrexConfig {
        Config::builder()
            .add_source(config::File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_from_empty_document() {
        let cfg = parse("ad_units: []");

        assert_eq!(cfg.auction.timeout, Duration::from_millis(1000));
        assert!(cfg.s2s.is_none());
        assert!(cfg.logging.validate().is_ok());
    }

    #[test]
    fn test_full_document() {
        let cfg = parse(
            r#"
logging:
  level: debug
  span_sample_rate: 1.0
  sinks:
    - type: stdout
      json: true
    - type: file
      path: logs/prex.log
      rotation: hourly
      max_files: 3
auction:
  timeout: 800ms
s2s:
  endpoint: https://pbs.example.com/auction
  timeout: 500ms
  adapter: prebidServer
  bidders: [appnexus, rubicon]
  max_bids: 1
aliases:
  - alias: brealtime
    bidder: appnexus
ad_units:
  - code: div-1
    sizes: [[300, 250]]
    bids:
      - bidder: appnexus
        params:
          placement_id: 13144370
"#,
        );

        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.sinks.len(), 2);
        assert!(matches!(
            cfg.logging.sinks[1].dest,
            LogType::File { rotation: FileRotation::Hourly, max_files: 3, .. }
        ));
        assert_eq!(cfg.auction.timeout, Duration::from_millis(800));

        let s2s = cfg.s2s.unwrap();
        assert_eq!(s2s.endpoint, "https://pbs.example.com/auction");
        assert_eq!(s2s.timeout, Duration::from_millis(500));
        assert_eq!(s2s.bidders, vec!["appnexus", "rubicon"]);
        assert_eq!(s2s.max_bids, Some(1));

        assert_eq!(cfg.aliases[0].alias, "brealtime");
        assert_eq!(cfg.ad_units[0].bids[0].params["placement_id"], 13144370);
    }

    #[test]
    fn test_partial_logging_keeps_stdout_sink() {
        let cfg = parse("logging:\n  level: warn\n");

        assert_eq!(cfg.logging.level, "warn");
        assert!(matches!(cfg.logging.sinks[0].dest, LogType::Stdout { color: true, .. }));
    }

    #[test]
    fn test_logging_validation() {
        let mut logging = LoggingConfig::default();
        logging.level = "loud".into();
        assert!(logging.validate().is_err());

        let mut logging = LoggingConfig::default();
        logging.span_sample_rate = 1.5;
        assert!(logging.validate().is_err());

        let mut logging = LoggingConfig::default();
        logging.sinks.clear();
        assert!(logging.validate().is_err());
    }
}
