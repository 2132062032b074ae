/// GeckoTerminal API client
///
/// API Documentation: https://www.geckoterminal.com/dex-api
///
/// Endpoints implemented:
/// 1. /networks/{network}/new_pools - Newly listed pools (paged)
/// 2. /networks/{network}/trending_pools - Trending pools per network
/// 3. /search/pools - Pool search by name, symbol or address
pub mod types;

pub use self::types::{
    GeckoTerminalIncluded, GeckoTerminalPoolData, GeckoTerminalPoolsPage, GeckoTerminalResourceRef,
};

use std::future::Future;
use std::time::Duration;

use crate::apis::client::{HttpClient, RateLimiter};
use crate::apis::stats::ApiStats;
use crate::config::GeckoTerminalConfig;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};

/// Entities side-loaded with every pool page
const POOL_INCLUDES: &str = "base_token,quote_token,dex";

pub struct GeckoTerminalClient {
    http: HttpClient,
    config: GeckoTerminalConfig,
}

impl GeckoTerminalClient {
    pub fn new(config: GeckoTerminalConfig) -> Result<Self, String> {
        let limiter = RateLimiter::new(
            "GeckoTerminal",
            config.max_requests_per_window,
            Duration::from_secs(config.window_seconds),
            Duration::from_secs(config.rate_limit_backoff_seconds),
        );
        let http = HttpClient::new(
            "GeckoTerminal",
            config.enabled,
            config.timeout_seconds,
            Some(limiter),
        )?;

        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.http.is_enabled()
    }

    pub fn network(&self) -> &str {
        &self.config.network
    }

    pub fn get_stats(&self) -> ApiStats {
        self.http.get_stats()
    }

    /// GET a pool page; non-2xx responses come back as an empty page
    async fn fetch_page(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<GeckoTerminalPoolsPage, ApiError> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        let page: Option<GeckoTerminalPoolsPage> = self.http.get_json(endpoint, &url, query).await?;
        Ok(page.unwrap_or_default())
    }

    /// Single page of newly created pools
    pub async fn fetch_new_pools_page(&self, page: u32) -> Result<GeckoTerminalPoolsPage, ApiError> {
        let endpoint = format!("networks/{}/new_pools", self.config.network);
        self.fetch_page(
            &endpoint,
            &[
                ("page", page.to_string()),
                ("include", POOL_INCLUDES.to_string()),
            ],
        )
        .await
    }

    /// Pages `1..=new_pools_pages`, fetched sequentially
    pub async fn fetch_new_pools_pages(&self) -> Result<Vec<GeckoTerminalPoolsPage>, ApiError> {
        collect_pages(self.config.new_pools_pages, |page| self.fetch_new_pools_page(page)).await
    }

    pub async fn fetch_trending_pools(&self) -> Result<GeckoTerminalPoolsPage, ApiError> {
        let endpoint = format!("networks/{}/trending_pools", self.config.network);
        let page = self
            .fetch_page(
                &endpoint,
                &[
                    ("page", "1".to_string()),
                    ("page_size", self.config.trending_page_size.to_string()),
                    ("include", POOL_INCLUDES.to_string()),
                ],
            )
            .await?;

        logger::debug(
            LogTag::Api,
            &format!("[GECKOTERMINAL] trending_pools: {} pools", page.data.len()),
        );
        Ok(page)
    }

    pub async fn search_pools(&self, query: &str) -> Result<GeckoTerminalPoolsPage, ApiError> {
        self.fetch_page(
            "search/pools",
            &[
                ("query", query.to_string()),
                ("network", self.config.network.clone()),
                ("include", "base_token".to_string()),
            ],
        )
        .await
    }
}

/// Fetch pages `1..=count` in order. A failed page is logged and skipped,
/// running out of budget stops paging, and a disabled source fails at once.
/// Errors only surface when no page came back at all.
async fn collect_pages<F, Fut>(count: u32, mut fetch: F) -> Result<Vec<GeckoTerminalPoolsPage>, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<GeckoTerminalPoolsPage, ApiError>>,
{
    let mut pages = Vec::with_capacity(count as usize);
    let mut last_error = None;

    for page in 1..=count {
        let fetched = match fetch(page).await {
            Ok(fetched) => fetched,
            Err(e @ ApiError::Disabled(_)) => return Err(e),
            Err(e @ ApiError::RateLimited { .. }) => {
                logger::debug(
                    LogTag::Api,
                    &format!("[GECKOTERMINAL] budget spent after {} new_pools pages", pages.len()),
                );
                last_error = Some(e);
                break;
            }
            Err(e) => {
                logger::warning(
                    LogTag::Api,
                    &format!("[GECKOTERMINAL] new_pools page {} failed: {}", page, e),
                );
                last_error = Some(e);
                continue;
            }
        };
        logger::debug(
            LogTag::Api,
            &format!(
                "[GECKOTERMINAL] new_pools page {}: {} pools, {} included",
                page,
                fetched.data.len(),
                fetched.included.len()
            ),
        );
        pages.push(fetched);
    }

    match last_error {
        Some(e) if pages.is_empty() => Err(e),
        _ => Ok(pages),
    }
}
