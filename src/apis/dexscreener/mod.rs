/// DexScreener API client
///
/// API Documentation: https://docs.dexscreener.com/api/reference
///
/// Endpoints implemented:
/// 1. /latest/dex/tokens/{tokenAddresses} - Pairs for up to 30 comma-joined mints
/// 2. /latest/dex/search?q={query} - Search pairs
pub mod types;

pub use self::types::{DexScreenerPair, DexScreenerPairsResponse};

use std::time::Duration;

use crate::apis::client::{HttpClient, RateLimiter};
use crate::apis::stats::ApiStats;
use crate::config::DexScreenerConfig;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};

pub struct DexScreenerClient {
    http: HttpClient,
    config: DexScreenerConfig,
}

impl DexScreenerClient {
    pub fn new(config: DexScreenerConfig) -> Result<Self, String> {
        let limiter = RateLimiter::new(
            "DexScreener",
            config.max_requests_per_window,
            Duration::from_secs(config.window_seconds),
            Duration::from_secs(config.rate_limit_backoff_seconds),
        );
        let http = HttpClient::new(
            "DexScreener",
            config.enabled,
            config.timeout_seconds,
            Some(limiter),
        )?;

        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.http.is_enabled()
    }

    pub fn chain_id(&self) -> &str {
        &self.config.chain_id
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    pub fn get_stats(&self) -> ApiStats {
        self.http.get_stats()
    }

    /// Pairs for one batch of mints (callers keep batches at `batch_size`)
    pub async fn fetch_token_pairs(&self, mints: &[String]) -> Result<Vec<DexScreenerPair>, ApiError> {
        if mints.is_empty() {
            return Ok(Vec::new());
        }

        let joined = mints.join(",");
        let url = format!("{}/latest/dex/tokens/{}", self.config.base_url, joined);
        let response: Option<DexScreenerPairsResponse> =
            self.http.get_json("latest/dex/tokens", &url, &[]).await?;

        let pairs = response.map(|r| r.into_pairs()).unwrap_or_default();
        logger::debug(
            LogTag::Api,
            &format!(
                "[DEXSCREENER] {} pairs for {} mints",
                pairs.len(),
                mints.len()
            ),
        );
        Ok(pairs)
    }

    /// Pair search, restricted to the configured chain
    pub async fn search_pairs(&self, query: &str) -> Result<Vec<DexScreenerPair>, ApiError> {
        let url = format!("{}/latest/dex/search", self.config.base_url);
        let response: Option<DexScreenerPairsResponse> = self
            .http
            .get_json("latest/dex/search", &url, &[("q", query.to_string())])
            .await?;

        Ok(response
            .map(|r| r.into_pairs())
            .unwrap_or_default()
            .into_iter()
            .filter(|pair| pair.chain_id.as_deref() == Some(self.config.chain_id.as_str()))
            .collect())
    }
}
