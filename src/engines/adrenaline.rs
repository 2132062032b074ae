/// Adrenaline engine: new pairs, migrating and migrated lists
///
/// Each cycle:
/// 1. Fetch the GeckoTerminal new-pools pages (failures yield an empty batch)
/// 2. Merge into the first-seen cache and recompute ages
/// 3. Classify into buckets, enrich the head of each list with socials
/// 4. Publish the three lists, truncated to `max_pairs_displayed`
///
/// Ticks fire on a fixed cadence; a tick landing while a cycle is still
/// running is dropped by the cycle guard.
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::config::AdrenalineConfig;
use crate::engines::guard::{CycleGuard, EngineState};
use crate::engines::sources::NewPoolsSource;
use crate::events::{EventBus, Topic};
use crate::logger::{self, LogTag};
use crate::screener::buckets::{classify, Buckets};
use crate::shutdown::{wait_for_shutdown, ShutdownReceiver};
use crate::tokens::cache::TokenCache;
use crate::tokens::socials::SocialEnricher;
use crate::tokens::types::TokenRecord;

/// Outcome of one completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct AdrenalineCycleReport {
    pub fetched: usize,
    pub cached: usize,
    pub new_pairs: usize,
    pub migrating: usize,
    pub migrated: usize,
    pub elapsed_ms: u128,
}

pub struct AdrenalineEngine {
    source: Arc<dyn NewPoolsSource>,
    enricher: Option<Arc<SocialEnricher>>,
    bus: Arc<EventBus>,
    cache: Mutex<TokenCache>,
    guard: CycleGuard,
    config: AdrenalineConfig,
}

impl AdrenalineEngine {
    pub fn new(
        source: Arc<dyn NewPoolsSource>,
        enricher: Option<Arc<SocialEnricher>>,
        bus: Arc<EventBus>,
        config: AdrenalineConfig,
    ) -> Self {
        Self {
            source,
            enricher,
            bus,
            cache: Mutex::new(TokenCache::with_max_age_minutes(config.cache_max_age_minutes)),
            guard: CycleGuard::new(),
            config,
        }
    }

    pub fn state(&self) -> EngineState {
        self.guard.state()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Run one cycle. Returns `None` when another cycle is already in flight.
    pub async fn run_cycle(&self) -> Option<AdrenalineCycleReport> {
        let Some(permit) = self.guard.try_enter() else {
            logger::debug(LogTag::Adrenaline, "Refresh already in progress, skipping tick");
            return None;
        };
        let started = Instant::now();

        permit.set_state(EngineState::Fetching);
        let fresh = match self.source.fetch_new_pools().await {
            Ok(tokens) => tokens,
            Err(e) => {
                logger::warning(LogTag::Adrenaline, &format!("New pools fetch failed: {}", e));
                Vec::new()
            }
        };
        let fetched = fresh.len();

        permit.set_state(EngineState::Normalizing);
        let all = {
            let mut cache = self.cache.lock();
            cache.upsert_at(fresh, Utc::now())
        };
        log_cache_ages(&all);

        permit.set_state(EngineState::ScoringAndPublishing);
        let mut buckets = classify(&all, &self.config);

        if !buckets.migrating.is_empty() {
            let summary: Vec<String> = buckets
                .migrating
                .iter()
                .map(|t| format!("{} (${:.0}, age:{}m)", t.symbol, t.market_cap_usd, t.age_minutes))
                .collect();
            logger::debug(
                LogTag::Adrenaline,
                &format!("Migrating tokens: {}", summary.join(", ")),
            );
        }

        if let Some(enricher) = &self.enricher {
            enricher.enrich(&mut buckets.new_pairs).await;
            enricher.enrich(&mut buckets.migrating).await;
            enricher.enrich(&mut buckets.migrated).await;
        }

        self.publish(&buckets);

        let (new_pairs, migrating, migrated) = buckets.counts();
        logger::info(
            LogTag::Adrenaline,
            &format!(
                "New: {} | Migrating: {} | Migrated: {}",
                new_pairs, migrating, migrated
            ),
        );

        Some(AdrenalineCycleReport {
            fetched,
            cached: all.len(),
            new_pairs,
            migrating,
            migrated,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }

    fn publish(&self, buckets: &Buckets) {
        let published = buckets.truncated(self.config.max_pairs_displayed);
        self.bus.publish_pairs(Topic::NewPairs, published.new_pairs);
        self.bus.publish_pairs(Topic::Migrating, published.migrating);
        self.bus.publish_pairs(Topic::Migrated, published.migrated);
    }

    /// Tick every `refresh_interval` until shutdown. Each cycle runs on its
    /// own task so a slow cycle makes the next tick a no-op instead of
    /// delaying it.
    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownReceiver) {
        logger::info(
            LogTag::Adrenaline,
            &format!(
                "Engine started (every {}ms)",
                self.config.refresh_interval_ms
            ),
        );

        let mut interval = tokio::time::interval(self.config.refresh_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = wait_for_shutdown(&mut shutdown) => {
                    logger::info(LogTag::Adrenaline, "Engine shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.run_cycle().await;
                    });
                }
            }
        }
    }
}

fn log_cache_ages(tokens: &[TokenRecord]) {
    let max_age = tokens.iter().map(|t| t.age_minutes).max().unwrap_or(0);
    let avg_age = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().map(|t| t.age_minutes as f64).sum::<f64>() / tokens.len() as f64
    };
    logger::debug(
        LogTag::Cache,
        &format!(
            "Cache: {} tokens | Ages: max {}m, avg {:.1}m",
            tokens.len(),
            max_age,
            avg_age
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnrichmentConfig, EventsConfig};
    use crate::engines::sources::SocialSource;
    use crate::errors::ApiError;
    use crate::tokens::types::SocialLinks;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct FakeNewPools {
        batches: Mutex<Vec<Result<Vec<TokenRecord>, ApiError>>>,
        calls: AtomicUsize,
    }

    impl FakeNewPools {
        fn new(batches: Vec<Result<Vec<TokenRecord>, ApiError>>) -> Self {
            Self {
                batches: Mutex::new(batches),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NewPoolsSource for FakeNewPools {
        async fn fetch_new_pools(&self) -> Result<Vec<TokenRecord>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut batches = self.batches.lock();
            if batches.is_empty() {
                Ok(Vec::new())
            } else {
                batches.remove(0)
            }
        }
    }

    /// Blocks inside fetch until released
    struct GatedNewPools {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl NewPoolsSource for GatedNewPools {
        async fn fetch_new_pools(&self) -> Result<Vec<TokenRecord>, ApiError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Vec::new())
        }
    }

    struct TwitterForAll;

    #[async_trait]
    impl SocialSource for TwitterForAll {
        async fn fetch_socials(&self, mint: &str) -> Result<SocialLinks, ApiError> {
            Ok(SocialLinks::new(Some(format!("https://x.com/{}", mint)), None))
        }
    }

    fn pump(mint: &str, mcap: f64) -> TokenRecord {
        let mut t = TokenRecord::new(mint);
        t.market_cap_usd = mcap;
        t.is_pump_fun = true;
        t
    }

    fn raydium(mint: &str, liq: f64) -> TokenRecord {
        let mut t = TokenRecord::new(mint);
        t.market_cap_usd = 500_000.0;
        t.liquidity_usd = liq;
        t.is_real_dex = true;
        t
    }

    fn bus() -> Arc<EventBus> {
        Arc::new(EventBus::new(&EventsConfig::default()))
    }

    #[tokio::test]
    async fn cycle_publishes_all_three_lists() {
        let source = Arc::new(FakeNewPools::new(vec![Ok(vec![
            pump("fresh", 5_000.0),
            pump("curve", 40_000.0),
            raydium("pool", 20_000.0),
        ])]));
        let bus = bus();
        let mut new_rx = bus.subscribe(Topic::NewPairs);
        let engine = AdrenalineEngine::new(source, None, bus.clone(), AdrenalineConfig::default());

        let report = engine.run_cycle().await.expect("cycle should run");
        assert_eq!(report.fetched, 3);
        assert_eq!(report.cached, 3);
        // every token is age 0 on first sight, so all are new pairs
        assert_eq!(report.new_pairs, 3);
        assert_eq!(report.migrating, 1);
        assert_eq!(report.migrated, 1);

        assert!(new_rx.recv().await.is_ok());
        assert_eq!(bus.get_migrating_pairs()[0].mint, "curve");
        assert_eq!(bus.get_migrated_pairs()[0].mint, "pool");
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_cached_tokens_published() {
        let source = Arc::new(FakeNewPools::new(vec![
            Ok(vec![raydium("pool", 20_000.0)]),
            Err(ApiError::Network("connection reset".into())),
        ]));
        let bus = bus();
        let engine = AdrenalineEngine::new(source.clone(), None, bus.clone(), AdrenalineConfig::default());

        engine.run_cycle().await.expect("first cycle");
        let report = engine.run_cycle().await.expect("second cycle");

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.fetched, 0);
        assert_eq!(report.cached, 1);
        assert_eq!(bus.get_migrated_pairs().len(), 1);
    }

    #[tokio::test]
    async fn published_lists_are_truncated() {
        let tokens: Vec<TokenRecord> = (0..45).map(|i| pump(&format!("m{:02}", i), 1_000.0)).collect();
        let source = Arc::new(FakeNewPools::new(vec![Ok(tokens)]));
        let bus = bus();
        let engine = AdrenalineEngine::new(source, None, bus.clone(), AdrenalineConfig::default());

        let report = engine.run_cycle().await.expect("cycle");
        assert_eq!(report.new_pairs, 45);
        assert_eq!(bus.get_new_pairs().len(), 30);
        assert_eq!(engine.cached_count(), 45);
    }

    #[tokio::test(start_paused = true)]
    async fn published_pairs_carry_socials() {
        let source = Arc::new(FakeNewPools::new(vec![Ok(vec![raydium("pool", 20_000.0)])]));
        let enricher = Arc::new(SocialEnricher::new(Arc::new(TwitterForAll), EnrichmentConfig::default()));
        let bus = bus();
        let engine = AdrenalineEngine::new(source, Some(enricher), bus.clone(), AdrenalineConfig::default());

        engine.run_cycle().await.expect("cycle");
        let migrated = bus.get_migrated_pairs();
        assert!(migrated[0].has_socials);
        assert_eq!(migrated[0].twitter.as_deref(), Some("https://x.com/pool"));
    }

    #[tokio::test]
    async fn overlapping_cycle_is_skipped() {
        let source = Arc::new(GatedNewPools {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let engine = Arc::new(AdrenalineEngine::new(
            source.clone(),
            None,
            bus(),
            AdrenalineConfig::default(),
        ));

        let running = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run_cycle().await })
        };
        source.entered.notified().await;
        assert_eq!(engine.state(), EngineState::Fetching);

        assert!(engine.run_cycle().await.is_none());

        source.release.notify_one();
        assert!(running.await.unwrap().is_some());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn run_loop_stops_on_shutdown() {
        let source = Arc::new(FakeNewPools::new(vec![Ok(vec![pump("a", 1_000.0)])]));
        let bus = bus();
        let engine = Arc::new(AdrenalineEngine::new(
            source.clone(),
            None,
            bus.clone(),
            AdrenalineConfig::default(),
        ));
        let signal = crate::shutdown::ShutdownSignal::new();

        let handle = tokio::spawn(engine.clone().run(signal.subscribe()));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        signal.trigger();

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("loop should stop")
            .expect("loop should not panic");
        assert!(source.calls.load(Ordering::SeqCst) >= 1);
    }
}
