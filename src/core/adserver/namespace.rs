use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A winning video bid which was stored in the video cache
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CachedVideoBid {
    pub video_cache_id: String,
    #[serde(default)]
    pub ad_unit_code: String,
    #[serde(default)]
    pub cpm: f64,
}

/// Builds the url a video player calls to let the bid compete in the
/// ad server. Options are ad server specific
pub type VideoAdUrlBuilder = Arc<dyn Fn(&CachedVideoBid, &Value) -> String + Send + Sync>;

#[derive(Clone)]
pub struct VideoSupport {
    pub build_video_ad_url: VideoAdUrlBuilder,
}

impl VideoSupport {
    pub fn new<F>(build_video_ad_url: F) -> Self
    where
        F: Fn(&CachedVideoBid, &Value) -> String + Send + Sync + 'static,
    {
        VideoSupport {
            build_video_ad_url: Arc::new(build_video_ad_url),
        }
    }
}

impl fmt::Debug for VideoSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VideoSupport")
    }
}

/// Where ad server handlers are mounted. A lone ad server is reachable
/// directly, as soon as a second distinct one registers every handler
/// moves under its own name
#[derive(Debug, Clone, Default)]
pub enum NamespaceState {
    #[default]
    Empty,
    Single {
        name: String,
        handlers: VideoSupport,
    },
    Multi(BTreeMap<String, VideoSupport>),
}

impl NamespaceState {
    fn attach(self, name: String, handlers: VideoSupport) -> NamespaceState {
        match self {
            NamespaceState::Empty => NamespaceState::Single { name, handlers },
            NamespaceState::Single { name: current, .. } if current == name => {
                NamespaceState::Single { name, handlers }
            }
            NamespaceState::Single {
                name: current,
                handlers: current_handlers,
            } => {
                debug!(
                    "Second ad server '{}' registered, migrating '{}' to named mounts",
                    name, current
                );

                let mut mounts = BTreeMap::new();
                mounts.insert(current, current_handlers);
                mounts.insert(name, handlers);

                NamespaceState::Multi(mounts)
            }
            NamespaceState::Multi(mut mounts) => {
                mounts.insert(name, handlers);
                NamespaceState::Multi(mounts)
            }
        }
    }
}

/// Mount point for ad server modules' video support
#[derive(Default)]
pub struct AdServerNamespace {
    state: RwLock<NamespaceState>,
}

impl AdServerNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_video_support(&self, name: impl Into<String>, support: VideoSupport) {
        let mut state = self.state.write();
        let current = std::mem::take(&mut *state);

        *state = current.attach(name.into(), support);
    }

    /// Handlers for a named ad server, in either mount shape
    pub fn video_support(&self, name: &str) -> Option<VideoSupport> {
        match &*self.state.read() {
            NamespaceState::Empty => None,
            NamespaceState::Single {
                name: current,
                handlers,
            } => (current == name).then(|| handlers.clone()),
            NamespaceState::Multi(mounts) => mounts.get(name).cloned(),
        }
    }

    /// Handlers reachable without a name, which only exist while a
    /// single ad server is registered
    pub fn default_video_support(&self) -> Option<VideoSupport> {
        match &*self.state.read() {
            NamespaceState::Single { handlers, .. } => Some(handlers.clone()),
            _ => None,
        }
    }

    pub fn build_video_ad_url(
        &self,
        name: Option<&str>,
        bid: &CachedVideoBid,
        options: &Value,
    ) -> Option<String> {
        let support = match name {
            Some(name) => self.video_support(name),
            None => self.default_video_support(),
        }?;

        Some((support.build_video_ad_url)(bid, options))
    }

    pub fn names(&self) -> Vec<String> {
        match &*self.state.read() {
            NamespaceState::Empty => Vec::new(),
            NamespaceState::Single { name, .. } => vec![name.clone()],
            NamespaceState::Multi(mounts) => mounts.keys().cloned().collect(),
        }
    }

    pub fn state(&self) -> NamespaceState {
        self.state.read().clone()
    }
}
