use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use nebulax::{
    apis::{jupiter::SOL_MINT, ApiManager},
    arguments::{
        get_balance_address, get_config_path_override, get_quote_mint, get_search_query,
        get_select_index, get_wallet_pubkey, is_adrenaline_disabled, is_once_enabled,
        is_trending_disabled, patterns, print_debug_info, print_help,
    },
    config::{self, Config},
    engines::{AdrenalineEngine, PriceSource, RefreshOutcome, TrendingEngine},
    events::{EventBus, Topic},
    logger::{self, LogTag},
    shutdown::{wait_for_shutdown, ShutdownSignal},
    tokens::{
        search::JupiterVerifiedSearch, SearchSource, SelectedCoin, SelectedCoinStore, SocialEnricher,
        TokenSearch,
    },
};

/// 0.1 SOL in lamports
const QUOTE_AMOUNT_LAMPORTS: u64 = 100_000_000;

/// Main entry point for NebulaX
///
/// One-shot modes (--search, --balance, --quote) run and exit. Otherwise the
/// adrenaline and trending engines run until Ctrl+C, or for a single cycle
/// with --once.
#[tokio::main]
async fn main() {
    // Logger needs the logs directory
    if let Err(e) = nebulax::paths::ensure_all_directories() {
        eprintln!("Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "NebulaX starting up...");
    print_debug_info();

    if let Err(e) = run().await {
        logger::error(LogTag::System, &format!("Fatal: {:#}", e));
        logger::flush();
        std::process::exit(1);
    }

    logger::flush();
}

async fn run() -> Result<()> {
    config::load_config()
        .map_err(|e| anyhow!(e))
        .context("Failed to load configuration")?;
    let config = config::get_config_clone();

    let config_path = get_config_path_override()
        .map(PathBuf::from)
        .unwrap_or_else(nebulax::paths::get_config_path);
    if !config_path.exists() {
        match config::save_config(&config_path) {
            Ok(()) => logger::info(
                LogTag::Config,
                &format!("Wrote default configuration to {}", config_path.display()),
            ),
            Err(e) => logger::warning(LogTag::Config, &e),
        }
    }

    let apis = Arc::new(ApiManager::new(&config.sources).map_err(|e| anyhow!(e))?);

    // =========================================================================
    // ONE-SHOT MODES
    // =========================================================================

    if let Some(query) = get_search_query() {
        return run_search(&apis, &config, &query).await;
    }
    if let Some(address) = get_balance_address() {
        let sol = apis
            .solana_rpc
            .get_balance(&address)
            .await
            .with_context(|| format!("getBalance failed for {}", address))?;
        println!("{}: {:.9} SOL", address, sol);
        return Ok(());
    }
    if let Some(mint) = get_quote_mint() {
        return run_quote(&apis, &mint).await;
    }

    // =========================================================================
    // ENGINES
    // =========================================================================

    let bus = Arc::new(EventBus::new(&config.events));

    let enricher = config
        .enrichment
        .enabled
        .then(|| Arc::new(SocialEnricher::new(apis.dexscreener.clone(), config.enrichment.clone())));

    let adrenaline = (config.adrenaline.enabled && !is_adrenaline_disabled()).then(|| {
        Arc::new(AdrenalineEngine::new(
            apis.geckoterminal.clone(),
            enricher.clone(),
            bus.clone(),
            config.adrenaline.clone(),
        ))
    });

    let trending = (config.trending.enabled && !is_trending_disabled()).then(|| {
        let prices: Option<Arc<dyn PriceSource>> = if config.sources.jupiter.enabled {
            Some(apis.jupiter.clone() as Arc<dyn PriceSource>)
        } else {
            None
        };
        Arc::new(TrendingEngine::new(
            apis.geckoterminal.clone(),
            apis.dexscreener.clone(),
            prices,
            bus.clone(),
            config.trending.clone(),
        ))
    });

    if adrenaline.is_none() && trending.is_none() {
        logger::warning(LogTag::System, "Both engines disabled, nothing to do");
        return Ok(());
    }

    if is_once_enabled() {
        run_once(adrenaline.as_deref(), trending.as_deref(), &bus).await;
        logger::info(
            LogTag::System,
            &format!("API stats: {}", apis.get_all_stats().summary()),
        );
        return Ok(());
    }

    let signal = ShutdownSignal::new();
    signal.install_ctrlc_handler()?;

    let mut handles = Vec::new();
    if let Some(engine) = adrenaline {
        handles.push(tokio::spawn(engine.run(signal.subscribe())));
    }
    if let Some(engine) = trending {
        handles.push(tokio::spawn(engine.run(signal.subscribe())));
    }
    for topic in Topic::ALL {
        handles.push(tokio::spawn(log_topic(bus.clone(), topic, signal.subscribe())));
    }

    logger::info(LogTag::System, "Engines running, press Ctrl+C to stop");
    let mut shutdown = signal.subscribe();
    wait_for_shutdown(&mut shutdown).await;

    // Loops exit on their next select; in-flight requests finish on their own
    for handle in handles {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            logger::warning(LogTag::System, "Task did not stop within 5s");
        }
    }

    logger::info(
        LogTag::System,
        &format!("API stats: {}", apis.get_all_stats().summary()),
    );
    logger::info(LogTag::System, "NebulaX stopped");
    Ok(())
}

async fn run_once(adrenaline: Option<&AdrenalineEngine>, trending: Option<&TrendingEngine>, bus: &EventBus) {
    if let Some(engine) = adrenaline {
        if let Some(report) = engine.run_cycle().await {
            println!(
                "Adrenaline: fetched {} | cached {} | new {} | migrating {} | migrated {} ({}ms)",
                report.fetched,
                report.cached,
                report.new_pairs,
                report.migrating,
                report.migrated,
                report.elapsed_ms
            );
            for (label, pairs) in [
                ("NEW", bus.get_new_pairs()),
                ("MIGRATING", bus.get_migrating_pairs()),
                ("MIGRATED", bus.get_migrated_pairs()),
            ] {
                for t in pairs.iter().take(5) {
                    println!(
                        "  [{}] {:<10} {} mcap=${:.0} liq=${:.0} age={}m dex={}",
                        label, t.symbol, t.mint, t.market_cap_usd, t.liquidity_usd, t.age_minutes, t.dex
                    );
                }
            }
        }
    }

    if let Some(engine) = trending {
        match engine.full_refresh().await {
            RefreshOutcome::Published {
                count,
                tier_s,
                tier_a,
                tier_b,
                elapsed_ms,
            } => {
                println!(
                    "Trending: {} tokens S={} A={} B={} ({}ms)",
                    count, tier_s, tier_a, tier_b, elapsed_ms
                );
                for t in bus.get_trending_tokens().iter().take(10) {
                    println!(
                        "  [{}] {:<10} score={:.1} validated={}",
                        t.tier,
                        t.token.symbol,
                        t.score,
                        t.is_dexscreener_validated()
                    );
                }
            }
            RefreshOutcome::NoData => println!("Trending: no tokens from GeckoTerminal"),
            RefreshOutcome::Skipped => {}
        }
    }
}

async fn run_search(apis: &ApiManager, config: &Config, query: &str) -> Result<()> {
    let sources: Vec<Arc<dyn SearchSource>> = vec![
        Arc::new(JupiterVerifiedSearch::new(
            apis.jupiter.clone(),
            Duration::from_secs(config.search.token_list_ttl_seconds),
        )) as Arc<dyn SearchSource>,
        apis.dexscreener.clone() as Arc<dyn SearchSource>,
        apis.geckoterminal.clone() as Arc<dyn SearchSource>,
    ];
    let search = TokenSearch::new(sources, config.search.clone());
    let results = search.search(query).await;

    if results.is_empty() {
        println!("No results for '{}'", query);
        return Ok(());
    }

    for (i, r) in results.iter().enumerate() {
        println!(
            "{}. {}{} ({}) {} [{}] liq=${:.0} vol24h=${:.0}",
            i + 1,
            r.name,
            if r.verified { " ✓" } else { "" },
            r.symbol,
            r.address,
            r.source,
            r.liquidity.unwrap_or(0.0),
            r.volume_24h.unwrap_or(0.0)
        );
    }

    if let Some(index) = get_select_index() {
        let result = index
            .checked_sub(1)
            .and_then(|i| results.get(i))
            .ok_or_else(|| anyhow!("--select {} is out of range (1..={})", index, results.len()))?;
        let coin = SelectedCoin::from_search_result(result);
        let store = SelectedCoinStore::default_location();
        store.save(&coin)?;
        println!("Selected {} saved to {}", coin.pair, store.path().display());
    }

    Ok(())
}

async fn run_quote(apis: &ApiManager, mint: &str) -> Result<()> {
    let quote = apis
        .jupiter
        .get_quote(SOL_MINT, mint, QUOTE_AMOUNT_LAMPORTS)
        .await
        .ok_or_else(|| anyhow!("No quote available for {}", mint))?;

    println!(
        "0.1 SOL -> {} units of {} (price impact {}%)",
        quote.out_amount,
        mint,
        quote.price_impact_pct.as_deref().unwrap_or("?")
    );

    if let Some(wallet) = get_wallet_pubkey() {
        let tx = apis.jupiter.get_swap_transaction(&quote, &wallet).await?;
        println!("Unsigned swap transaction ({} bytes base64):\n{}", tx.len(), tx);
    }
    Ok(())
}

/// Log each snapshot published on `topic` until shutdown
async fn log_topic(bus: Arc<EventBus>, topic: Topic, mut shutdown: nebulax::shutdown::ShutdownReceiver) {
    let mut rx = bus.subscribe(topic);
    loop {
        tokio::select! {
            _ = wait_for_shutdown(&mut shutdown) => break,
            received = rx.recv() => match received {
                Ok(event) => {
                    let count = match &event.payload {
                        nebulax::events::EventPayload::Pairs(p) => p.pairs.len(),
                        nebulax::events::EventPayload::Trending(t) => t.count,
                    };
                    logger::debug(LogTag::Events, &format!("{}: {} entries", topic, count));
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    logger::debug(
                        LogTag::Events,
                        &format!("{}: listener lagged, skipped {} snapshots", topic, skipped),
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
