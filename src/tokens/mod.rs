//! Token model and token-level services
//!
//! - `types`: `TokenRecord`, trending snapshots, search and selection records
//! - `normalize`: upstream payloads -> `TokenRecord`
//! - `cache`: first-seen tracking and age eviction
//! - `socials`: batched social link enrichment
//! - `search`: multi-source search
//! - `selection`: selected coin hand-off file

pub mod cache;
pub mod normalize;
pub mod search;
pub mod selection;
pub mod socials;
pub mod types;

pub use cache::{CacheEntry, TokenCache};
pub use search::{SearchSource, TokenSearch};
pub use selection::SelectedCoinStore;
pub use socials::SocialEnricher;
pub use types::{
    DataSource, DexScreenerMetrics, GeckoMetrics, SearchResult, SelectedCoin, SocialLinks, Tier,
    TokenRecord, TrendingToken,
};
