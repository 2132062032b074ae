/// Trending engine: GeckoTerminal discovery, cross-validated and scored
///
/// Two cadences share one cycle guard:
/// - full refresh (60s): fetch trending pools, attach Jupiter prices,
///   cross-validate against DexScreener, filter, score and publish
/// - fast refresh (5s): re-enrich the stored list from DexScreener and rescore,
///   without calling the discovery endpoint
///
/// A full refresh that gets no GeckoTerminal tokens keeps the previous list
/// and publishes nothing.
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::apis::dexscreener::DexScreenerPair;
use crate::config::TrendingConfig;
use crate::engines::guard::{CycleGuard, EngineState};
use crate::engines::sources::{PairSource, PriceSource, TrendingSource};
use crate::events::EventBus;
use crate::logger::{self, LogTag};
use crate::screener::scoring::{filter_and_score, tier_counts};
use crate::shutdown::{wait_for_shutdown, ShutdownReceiver};
use crate::tokens::normalize::{dexscreener_metrics, parse_num};
use crate::tokens::types::TrendingToken;

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Another cycle was in flight
    Skipped,
    /// Nothing to work with; previous list kept, nothing published
    NoData,
    Published {
        count: usize,
        tier_s: usize,
        tier_a: usize,
        tier_b: usize,
        elapsed_ms: u128,
    },
}

pub struct TrendingEngine {
    discovery: Arc<dyn TrendingSource>,
    pairs: Arc<dyn PairSource>,
    prices: Option<Arc<dyn PriceSource>>,
    bus: Arc<EventBus>,
    tokens: RwLock<Vec<TrendingToken>>,
    last_refresh_at: RwLock<Option<DateTime<Utc>>>,
    guard: CycleGuard,
    config: TrendingConfig,
}

impl TrendingEngine {
    pub fn new(
        discovery: Arc<dyn TrendingSource>,
        pairs: Arc<dyn PairSource>,
        prices: Option<Arc<dyn PriceSource>>,
        bus: Arc<EventBus>,
        config: TrendingConfig,
    ) -> Self {
        Self {
            discovery,
            pairs,
            prices,
            bus,
            tokens: RwLock::new(Vec::new()),
            last_refresh_at: RwLock::new(None),
            guard: CycleGuard::new(),
            config,
        }
    }

    pub fn state(&self) -> EngineState {
        self.guard.state()
    }

    pub fn get_trending_tokens(&self) -> Vec<TrendingToken> {
        self.tokens.read().clone()
    }

    pub fn get_last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh_at.read()
    }

    pub async fn full_refresh(&self) -> RefreshOutcome {
        let Some(permit) = self.guard.try_enter() else {
            logger::debug(LogTag::Trending, "Already refreshing, skipping");
            return RefreshOutcome::Skipped;
        };
        let started = Instant::now();

        permit.set_state(EngineState::Fetching);
        let mut tokens = match self.discovery.fetch_trending().await {
            Ok(tokens) => tokens,
            Err(e) => {
                logger::warning(LogTag::Trending, &format!("GeckoTerminal trending fetch failed: {}", e));
                Vec::new()
            }
        };

        if tokens.is_empty() {
            logger::warning(LogTag::Trending, "No tokens from GeckoTerminal, keeping previous list");
            return RefreshOutcome::NoData;
        }

        permit.set_state(EngineState::Normalizing);
        if self.config.jupiter_prices_enabled {
            self.enrich_with_prices(&mut tokens).await;
        }
        self.enrich_with_pairs(&mut tokens).await;

        permit.set_state(EngineState::ScoringAndPublishing);
        let outcome = self.score_and_publish(tokens, started);

        if let RefreshOutcome::Published {
            count,
            tier_s,
            tier_a,
            tier_b,
            elapsed_ms,
        } = &outcome
        {
            logger::info(
                LogTag::Trending,
                &format!(
                    "Refreshed {} tokens: S={} A={} B={} ({}ms)",
                    count, tier_s, tier_a, tier_b, elapsed_ms
                ),
            );
            self.log_top_tokens(5);
        }
        outcome
    }

    /// Rescore the stored list with fresh DexScreener data. No-op while the
    /// list is empty.
    pub async fn fast_refresh(&self) -> RefreshOutcome {
        let Some(permit) = self.guard.try_enter() else {
            return RefreshOutcome::Skipped;
        };
        let started = Instant::now();

        let mut tokens = self.tokens.read().clone();
        if tokens.is_empty() {
            return RefreshOutcome::NoData;
        }

        permit.set_state(EngineState::Normalizing);
        self.enrich_with_pairs(&mut tokens).await;

        permit.set_state(EngineState::ScoringAndPublishing);
        let outcome = self.score_and_publish(tokens, started);

        if let RefreshOutcome::Published { count, elapsed_ms, .. } = &outcome {
            logger::debug(
                LogTag::Trending,
                &format!("Fast refresh: {} tokens ({}ms)", count, elapsed_ms),
            );
        }
        outcome
    }

    fn score_and_publish(&self, tokens: Vec<TrendingToken>, started: Instant) -> RefreshOutcome {
        let now = Utc::now();
        let scored = filter_and_score(tokens, &self.config, now);
        let (tier_s, tier_a, tier_b) = tier_counts(&scored);
        let count = scored.len();

        *self.tokens.write() = scored.clone();
        *self.last_refresh_at.write() = Some(now);
        self.bus.publish_trending(scored, now);

        RefreshOutcome::Published {
            count,
            tier_s,
            tier_a,
            tier_b,
            elapsed_ms: started.elapsed().as_millis(),
        }
    }

    /// Best effort: on failure tokens keep their GeckoTerminal prices
    async fn enrich_with_prices(&self, tokens: &mut [TrendingToken]) {
        let Some(prices) = &self.prices else {
            return;
        };

        let mints: Vec<String> = tokens
            .iter()
            .map(|t| t.mint().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if mints.is_empty() {
            return;
        }

        match prices.fetch_prices(&mints).await {
            Ok(price_map) => {
                logger::debug(
                    LogTag::Trending,
                    &format!("Jupiter prices for {}/{} tokens", price_map.len(), mints.len()),
                );
                for token in tokens.iter_mut() {
                    token.jupiter_price = price_map.get(token.mint()).copied();
                }
            }
            Err(e) => {
                logger::warning(
                    LogTag::Trending,
                    &format!("Jupiter prices unavailable, using GeckoTerminal prices: {}", e),
                );
            }
        }
    }

    /// Cross-validate against DexScreener in batches. Within one pass the
    /// first pair seen for a mint replaces the previous snapshot and later
    /// pairs only win with a higher 24h volume.
    async fn enrich_with_pairs(&self, tokens: &mut [TrendingToken]) {
        let batch_size = self.pairs.batch_size().max(1);
        let mut refreshed: HashSet<String> = HashSet::new();

        for chunk in tokens.chunks_mut(batch_size) {
            let mints: Vec<String> = chunk
                .iter()
                .map(|t| t.mint().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if mints.is_empty() {
                continue;
            }

            let pairs = match self.pairs.fetch_pairs(&mints).await {
                Ok(pairs) => pairs,
                Err(e) => {
                    logger::warning(LogTag::Trending, &format!("DexScreener batch failed: {}", e));
                    continue;
                }
            };

            for pair in &pairs {
                apply_pair(chunk, pair, &mut refreshed);
            }
        }

        let validated = tokens.iter().filter(|t| t.is_dexscreener_validated()).count();
        logger::debug(
            LogTag::Trending,
            &format!("Enriched {}/{} with DexScreener", validated, tokens.len()),
        );
    }

    fn log_top_tokens(&self, n: usize) {
        let tokens = self.tokens.read();
        for (i, t) in tokens.iter().take(n).enumerate() {
            logger::debug(
                LogTag::Trending,
                &format!(
                    "  [{}] {} score={:.1} tier={} liq=${:.0} vol1h=${:.0}",
                    i + 1,
                    t.token.symbol,
                    t.score,
                    t.tier,
                    t.gecko.liquidity_usd.unwrap_or(0.0),
                    t.gecko.volume_1h_usd.unwrap_or(0.0)
                ),
            );
        }
    }

    /// Full refresh every `full_refresh_interval`, fast refresh every
    /// `fast_refresh_interval`, both until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownReceiver) {
        logger::info(
            LogTag::Trending,
            &format!(
                "Engine started (full every {}ms, fast every {}ms)",
                self.config.full_refresh_interval_ms, self.config.fast_refresh_interval_ms
            ),
        );

        let mut full = tokio::time::interval(self.config.full_refresh_interval());
        full.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut fast = tokio::time::interval(self.config.fast_refresh_interval());
        fast.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first fast tick would race the initial full refresh
        fast.tick().await;

        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => {
                    logger::info(LogTag::Trending, "Engine shutting down");
                    break;
                }
                _ = full.tick() => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.full_refresh().await;
                    });
                }
                _ = fast.tick() => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.fast_refresh().await;
                    });
                }
            }
        }
    }
}

/// Attach `pair` to its token in `chunk`, if any
fn apply_pair(chunk: &mut [TrendingToken], pair: &DexScreenerPair, refreshed: &mut HashSet<String>) {
    let Some(address) = pair.base_address() else {
        return;
    };
    let Some(token) = chunk.iter_mut().find(|t| t.mint() == address) else {
        return;
    };

    let pair_volume = parse_num(pair.volume.as_ref().and_then(|v| v.h24.as_ref()));
    let current_volume = token
        .dexscreener
        .as_ref()
        .and_then(|d| d.volume_24h_usd)
        .unwrap_or(0.0);

    let first_this_pass = refreshed.insert(address.to_string());
    if first_this_pass || pair_volume > current_volume {
        token.dexscreener = Some(dexscreener_metrics(pair));
    }
}
