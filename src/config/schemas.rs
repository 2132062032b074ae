/// Configuration schemas - every section defined once with its defaults
///
/// The defaults reproduce the production dashboard behaviour; a missing
/// `config.toml` (or a partial one) is always valid.
use std::time::Duration;

use crate::config_struct;

// ============================================================================
// UPSTREAM SOURCES
// ============================================================================

config_struct! {
    /// GeckoTerminal public API
    pub struct GeckoTerminalConfig {
        enabled: bool = true,
        base_url: String = "https://api.geckoterminal.com/api/v2".to_string(),
        network: String = "solana".to_string(),
        timeout_seconds: u64 = 10,
        /// Self-imposed budget, leaves headroom under the ~30/min public limit
        max_requests_per_window: usize = 25,
        window_seconds: u64 = 60,
        /// Cooldown after an HTTP 429
        rate_limit_backoff_seconds: u64 = 30,
        /// Pages of /new_pools fetched per cycle
        new_pools_pages: u32 = 3,
        trending_page_size: u32 = 100,
    }
}

config_struct! {
    /// DexScreener public API
    pub struct DexScreenerConfig {
        enabled: bool = true,
        base_url: String = "https://api.dexscreener.com".to_string(),
        chain_id: String = "solana".to_string(),
        timeout_seconds: u64 = 10,
        max_requests_per_window: usize = 300,
        window_seconds: u64 = 60,
        rate_limit_backoff_seconds: u64 = 30,
        /// Mints per /latest/dex/tokens call
        batch_size: usize = 30,
    }
}

config_struct! {
    /// Jupiter quote/swap/price APIs
    pub struct JupiterConfig {
        enabled: bool = true,
        quote_url: String = "https://quote-api.jup.ag/v6/quote".to_string(),
        swap_url: String = "https://quote-api.jup.ag/v6/swap".to_string(),
        price_url: String = "https://api.jup.ag/price/v2".to_string(),
        token_list_url: String = "https://tokens.jup.ag/tokens?tags=verified".to_string(),
        timeout_seconds: u64 = 15,
        slippage_bps: u32 = 50,
        /// Extra attempts after the first failed quote request
        quote_max_retries: u32 = 2,
        /// Linear backoff unit: delay = unit * attempt
        quote_retry_delay_ms: u64 = 500,
    }
}

config_struct! {
    /// Solana JSON-RPC endpoint
    pub struct SolanaRpcConfig {
        enabled: bool = true,
        url: String = "https://api.mainnet-beta.solana.com".to_string(),
        timeout_seconds: u64 = 10,
    }
}

config_struct! {
    pub struct SourcesConfig {
        geckoterminal: GeckoTerminalConfig = GeckoTerminalConfig::default(),
        dexscreener: DexScreenerConfig = DexScreenerConfig::default(),
        jupiter: JupiterConfig = JupiterConfig::default(),
        solana_rpc: SolanaRpcConfig = SolanaRpcConfig::default(),
    }
}

// ============================================================================
// ENGINES
// ============================================================================

config_struct! {
    /// New pairs / migrating / migrated engine
    pub struct AdrenalineConfig {
        enabled: bool = true,
        refresh_interval_ms: u64 = 5_000,
        /// New pairs: younger than this...
        new_max_age_minutes: i64 = 3,
        /// ...or below this market cap
        new_max_mcap_usd: f64 = 30_000.0,
        migrating_min_mcap_usd: f64 = 10_000.0,
        migrating_max_age_minutes: i64 = 120,
        migrated_min_liquidity_usd: f64 = 5_000.0,
        /// Lists are truncated to this size only when published
        max_pairs_displayed: usize = 30,
        cache_max_age_minutes: i64 = 120,
    }
}

config_struct! {
    /// Trending scorer engine
    pub struct TrendingConfig {
        enabled: bool = true,
        /// Full refetch from GeckoTerminal
        full_refresh_interval_ms: u64 = 60_000,
        /// Rescore-only pass over stored tokens
        fast_refresh_interval_ms: u64 = 5_000,
        max_tokens_stored: usize = 200,
        min_liquidity_usd: f64 = 2_000.0,
        min_volume_1h_usd: f64 = 2_000.0,
        min_volume_24h_usd: f64 = 10_000.0,
        jupiter_prices_enabled: bool = true,
    }
}

config_struct! {
    /// Best-effort social link lookups
    pub struct EnrichmentConfig {
        enabled: bool = true,
        /// Only the first N tokens of each list are enriched
        max_tokens_per_list: usize = 20,
        batch_size: usize = 5,
        batch_delay_ms: u64 = 200,
        cache_ttl_seconds: u64 = 600,
    }
}

config_struct! {
    pub struct EventsConfig {
        /// Per-topic broadcast buffer; slow subscribers skip to newer snapshots
        channel_capacity: usize = 16,
    }
}

config_struct! {
    /// Multi-source token search
    pub struct SearchConfig {
        min_query_length: usize = 2,
        max_results: usize = 5,
        token_list_ttl_seconds: u64 = 300,
    }
}

config_struct! {
    /// Root configuration
    pub struct Config {
        sources: SourcesConfig = SourcesConfig::default(),
        adrenaline: AdrenalineConfig = AdrenalineConfig::default(),
        trending: TrendingConfig = TrendingConfig::default(),
        enrichment: EnrichmentConfig = EnrichmentConfig::default(),
        events: EventsConfig = EventsConfig::default(),
        search: SearchConfig = SearchConfig::default(),
    }
}

impl AdrenalineConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl TrendingConfig {
    pub fn full_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.full_refresh_interval_ms)
    }

    pub fn fast_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.fast_refresh_interval_ms)
    }
}

impl EnrichmentConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
