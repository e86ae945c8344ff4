mod namespace;

pub use namespace::{AdServerNamespace, CachedVideoBid, NamespaceState, VideoAdUrlBuilder, VideoSupport};
