/// Source traits consumed by the engines
///
/// Engines depend on these traits rather than on the concrete API clients so
/// tests can drive them with in-memory fakes.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;

use crate::apis::dexscreener::{DexScreenerClient, DexScreenerPair};
use crate::apis::geckoterminal::GeckoTerminalClient;
use crate::apis::jupiter::JupiterClient;
use crate::errors::ApiError;
use crate::tokens::normalize::{normalize_new_pools_page, normalize_trending_page, social_links_from_pair};
use crate::tokens::types::{SocialLinks, TokenRecord, TrendingToken};

/// Newly created pools, normalized
#[async_trait]
pub trait NewPoolsSource: Send + Sync {
    async fn fetch_new_pools(&self) -> Result<Vec<TokenRecord>, ApiError>;
}

/// Trending pools with per-source GeckoTerminal metrics
#[async_trait]
pub trait TrendingSource: Send + Sync {
    async fn fetch_trending(&self) -> Result<Vec<TrendingToken>, ApiError>;
}

/// Pair lookups by mint, used for cross-validation
#[async_trait]
pub trait PairSource: Send + Sync {
    /// Maximum mints per `fetch_pairs` call
    fn batch_size(&self) -> usize;

    async fn fetch_pairs(&self, mints: &[String]) -> Result<Vec<DexScreenerPair>, ApiError>;
}

#[async_trait]
pub trait SocialSource: Send + Sync {
    async fn fetch_socials(&self, mint: &str) -> Result<SocialLinks, ApiError>;
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, ApiError>;
}

// ============================================================================
// CLIENT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl NewPoolsSource for GeckoTerminalClient {
    async fn fetch_new_pools(&self) -> Result<Vec<TokenRecord>, ApiError> {
        let pages = self.fetch_new_pools_pages().await?;
        let now = Utc::now();
        Ok(pages
            .iter()
            .flat_map(|page| normalize_new_pools_page(page, now))
            .collect())
    }
}

#[async_trait]
impl TrendingSource for GeckoTerminalClient {
    async fn fetch_trending(&self) -> Result<Vec<TrendingToken>, ApiError> {
        let page = self.fetch_trending_pools().await?;
        Ok(normalize_trending_page(&page, Utc::now()))
    }
}

#[async_trait]
impl PairSource for DexScreenerClient {
    fn batch_size(&self) -> usize {
        DexScreenerClient::batch_size(self)
    }

    async fn fetch_pairs(&self, mints: &[String]) -> Result<Vec<DexScreenerPair>, ApiError> {
        self.fetch_token_pairs(mints).await
    }
}

#[async_trait]
impl SocialSource for DexScreenerClient {
    /// Links from the first pair listed for the mint
    async fn fetch_socials(&self, mint: &str) -> Result<SocialLinks, ApiError> {
        let pairs = self.fetch_token_pairs(&[mint.to_string()]).await?;
        Ok(pairs
            .first()
            .map(social_links_from_pair)
            .unwrap_or_else(SocialLinks::none))
    }
}

#[async_trait]
impl PriceSource for JupiterClient {
    async fn fetch_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, ApiError> {
        JupiterClient::fetch_prices(self, mints).await
    }
}
