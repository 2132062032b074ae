/// Upstream API clients
pub mod client;
pub mod dexscreener;
pub mod geckoterminal;
pub mod jupiter;
pub mod lenient;
pub mod manager;
pub mod solana_rpc;
pub mod stats;

pub use client::{HttpClient, RateLimiter};
pub use dexscreener::DexScreenerClient;
pub use geckoterminal::GeckoTerminalClient;
pub use jupiter::JupiterClient;
pub use manager::{ApiManager, ApiManagerStats};
pub use solana_rpc::SolanaRpcClient;
pub use stats::{ApiStats, ApiStatsTracker};
