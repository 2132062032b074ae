/// Multi-source token search
///
/// Queries every source concurrently, keeps the first hit per address, then
/// ranks verified tokens first, then liquidity, then 24h volume.
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::apis::dexscreener::{DexScreenerClient, DexScreenerPair};
use crate::apis::geckoterminal::{GeckoTerminalClient, GeckoTerminalPoolsPage};
use crate::apis::jupiter::{JupiterClient, JupiterListToken};
use crate::config::SearchConfig;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use crate::tokens::normalize::{normalize, parse_num, IncludedIndex, RawPool};
use crate::tokens::types::{DataSource, SearchResult};

#[async_trait]
pub trait SearchSource: Send + Sync {
    fn source(&self) -> DataSource;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ApiError>;
}

pub struct TokenSearch {
    sources: Vec<Arc<dyn SearchSource>>,
    config: SearchConfig,
}

impl TokenSearch {
    pub fn new(sources: Vec<Arc<dyn SearchSource>>, config: SearchConfig) -> Self {
        Self { sources, config }
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let query = query.trim();
        if query.chars().count() < self.config.min_query_length {
            return Vec::new();
        }

        let limit = self.config.max_results;
        let per_source = join_all(self.sources.iter().map(|source| async move {
            match source.search(query, limit).await {
                Ok(mut results) => {
                    results.truncate(limit);
                    results
                }
                Err(e) => {
                    logger::warning(
                        LogTag::Search,
                        &format!("{} search failed: {}", source.source(), e),
                    );
                    Vec::new()
                }
            }
        }))
        .await;

        let results = rank_results(per_source.into_iter().flatten().collect(), limit);
        logger::debug(
            LogTag::Search,
            &format!("Search '{}' -> {} results", query, results.len()),
        );
        results
    }
}

/// Dedup by address (first occurrence wins), sort, truncate
pub fn rank_results(combined: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut results: Vec<SearchResult> = combined
        .into_iter()
        .filter(|r| !r.address.is_empty() && seen.insert(r.address.clone()))
        .collect();

    results.sort_by(|a, b| {
        b.verified
            .cmp(&a.verified)
            .then_with(|| b.liquidity.unwrap_or(0.0).total_cmp(&a.liquidity.unwrap_or(0.0)))
            .then_with(|| b.volume_24h.unwrap_or(0.0).total_cmp(&a.volume_24h.unwrap_or(0.0)))
    });
    results.truncate(limit);
    results
}

// ============================================================================
// JUPITER VERIFIED LIST
// ============================================================================

/// Verified token list, cached for `token_list_ttl_seconds`. A failed refresh
/// keeps serving the previous list.
pub struct JupiterVerifiedSearch {
    client: Arc<JupiterClient>,
    ttl: Duration,
    cached: Mutex<Option<(Arc<Vec<JupiterListToken>>, Instant)>>,
}

impl JupiterVerifiedSearch {
    pub fn new(client: Arc<JupiterClient>, ttl: Duration) -> Self {
        Self {
            client,
            ttl,
            cached: Mutex::new(None),
        }
    }

    async fn tokens(&self) -> Arc<Vec<JupiterListToken>> {
        let stale = {
            let cached = self.cached.lock();
            match cached.as_ref() {
                Some((tokens, fetched)) if fetched.elapsed() < self.ttl => return tokens.clone(),
                Some((tokens, _)) => Some(tokens.clone()),
                None => None,
            }
        };

        match self.client.fetch_verified_tokens().await {
            Ok(tokens) => {
                logger::debug(
                    LogTag::Search,
                    &format!("Jupiter tokens loaded: {}", tokens.len()),
                );
                let tokens = Arc::new(tokens);
                *self.cached.lock() = Some((tokens.clone(), Instant::now()));
                tokens
            }
            Err(e) => {
                logger::warning(
                    LogTag::Search,
                    &format!("Jupiter token list unavailable, using fallback: {}", e),
                );
                stale.unwrap_or_default()
            }
        }
    }
}

#[async_trait]
impl SearchSource for JupiterVerifiedSearch {
    fn source(&self) -> DataSource {
        DataSource::Jupiter
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ApiError> {
        let tokens = self.tokens().await;
        Ok(match_verified_tokens(&tokens, query, limit))
    }
}

/// Case-insensitive substring match on name, symbol or address
pub fn match_verified_tokens(tokens: &[JupiterListToken], query: &str, limit: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();
    let matches = |field: Option<&str>| field.map(|f| f.to_lowercase().contains(&q)).unwrap_or(false);

    tokens
        .iter()
        .filter(|t| matches(t.name.as_deref()) || matches(t.symbol.as_deref()) || matches(Some(&t.address)))
        .take(limit)
        .map(|t| SearchResult {
            source: DataSource::Jupiter,
            name: t.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            symbol: t.symbol.clone().unwrap_or_else(|| "???".to_string()),
            address: t.address.clone(),
            logo: t.logo_uri.clone(),
            verified: true,
            price: None,
            market_cap: None,
            volume_24h: None,
            liquidity: None,
            price_change_24h: None,
            pair_address: None,
        })
        .collect()
}

// ============================================================================
// DEXSCREENER / GECKOTERMINAL
// ============================================================================

pub fn search_result_from_pair(pair: &DexScreenerPair) -> Option<SearchResult> {
    let record = normalize(RawPool::DexScreener(pair), Utc::now())?;
    Some(SearchResult {
        source: DataSource::DexScreener,
        name: pair
            .base_token
            .as_ref()
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        symbol: pair
            .base_token
            .as_ref()
            .and_then(|t| t.symbol.clone())
            .unwrap_or_else(|| "???".to_string()),
        address: record.mint,
        logo: record.logo_url,
        verified: false,
        price: Some(record.price_usd),
        market_cap: Some(parse_num(pair.market_cap.as_ref())),
        volume_24h: Some(record.volume_24h_usd),
        liquidity: Some(record.liquidity_usd),
        price_change_24h: Some(record.price_change_24h_pct),
        pair_address: pair.pair_address.clone(),
    })
}

#[async_trait]
impl SearchSource for DexScreenerClient {
    fn source(&self) -> DataSource {
        DataSource::DexScreener
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ApiError> {
        let pairs = self.search_pairs(query).await?;
        Ok(pairs
            .iter()
            .take(limit)
            .filter_map(search_result_from_pair)
            .collect())
    }
}

/// Pool search hits. The base token address comes from the included token,
/// or from the relationship id (`{network}_{mint}`) when it was not side-loaded.
pub fn search_results_from_pools(page: &GeckoTerminalPoolsPage, network: &str, limit: usize) -> Vec<SearchResult> {
    let included = IncludedIndex::build(&page.included);
    let prefix = format!("{}_", network);

    page.data
        .iter()
        .take(limit)
        .filter_map(|pool| {
            let attrs = &pool.attributes;
            let base_ref = pool.relationships.base_token.as_ref().and_then(|r| r.data.as_ref());
            let base = included.resolve(pool.relationships.base_token.as_ref());

            let address = base
                .and_then(|b| b.attributes.address.clone())
                .or_else(|| base_ref.and_then(|r| r.id.strip_prefix(&prefix).map(str::to_string)))
                .filter(|a| !a.is_empty())?;

            let volume = attrs.volume_usd.as_ref();
            let change = attrs.price_change_percentage.as_ref();

            Some(SearchResult {
                source: DataSource::GeckoTerminal,
                name: attrs.name.clone().unwrap_or_else(|| "Unknown".to_string()),
                symbol: base
                    .and_then(|b| b.attributes.symbol.clone())
                    .unwrap_or_else(|| "???".to_string()),
                address,
                logo: base.and_then(|b| b.attributes.image_url.clone()),
                verified: false,
                price: Some(parse_num(attrs.base_token_price_usd.as_ref())),
                market_cap: Some(parse_num(attrs.market_cap_usd.as_ref())),
                volume_24h: Some(parse_num(volume.and_then(|v| v.h24.as_ref()))),
                liquidity: Some(parse_num(attrs.reserve_in_usd.as_ref())),
                price_change_24h: Some(parse_num(change.and_then(|c| c.h24.as_ref()))),
                pair_address: pool
                    .id
                    .split_once('_')
                    .map(|(_, address)| address.to_string())
                    .or_else(|| attrs.address.clone()),
            })
        })
        .collect()
}

#[async_trait]
impl SearchSource for GeckoTerminalClient {
    fn source(&self) -> DataSource {
        DataSource::GeckoTerminal
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, ApiError> {
        let page = self.search_pools(query).await?;
        Ok(search_results_from_pools(&page, self.network(), limit))
    }
}
