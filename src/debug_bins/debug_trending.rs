use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use nebulax::apis::ApiManager;
use nebulax::config::{EventsConfig, SourcesConfig, TrendingConfig};
use nebulax::engines::{PriceSource, RefreshOutcome, TrendingEngine};
use nebulax::events::EventBus;
use nebulax::tokens::Tier;
use nebulax::logger::{self, LogTag};

#[derive(Parser)]
#[command(name = "debug_trending")]
#[command(about = "Run one trending refresh and print tokens by tier", long_about = None)]
struct Args {
    /// Tokens to show per tier
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Skip Jupiter price enrichment
    #[arg(long)]
    no_prices: bool,

    /// Also run a fast refresh after the full one
    #[arg(long)]
    fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    nebulax::paths::ensure_all_directories().map_err(|e| anyhow!(e))?;
    logger::init();
    logger::info(LogTag::Test, "debug tool starting");

    println!("Trending Engine Debug Tool\n");
    println!("{}", "=".repeat(80));

    let apis = ApiManager::new(&SourcesConfig::default()).map_err(|e| anyhow!(e))?;
    let bus = Arc::new(EventBus::new(&EventsConfig::default()));
    let prices: Option<Arc<dyn PriceSource>> = if args.no_prices {
        None
    } else {
        Some(apis.jupiter.clone() as Arc<dyn PriceSource>)
    };

    let engine = TrendingEngine::new(
        apis.geckoterminal.clone(),
        apis.dexscreener.clone(),
        prices,
        bus.clone(),
        TrendingConfig::default(),
    );

    print_outcome("full", &engine.full_refresh().await);
    if args.fast {
        print_outcome("fast", &engine.fast_refresh().await);
    }

    let tokens = bus.get_trending_tokens();
    for tier in [Tier::S, Tier::A, Tier::B] {
        let in_tier: Vec<_> = tokens.iter().filter(|t| t.tier == tier).collect();
        println!("\n[TIER {}] {} tokens", tier, in_tier.len());
        for t in in_tier.iter().take(args.limit) {
            let ds = t.dexscreener.as_ref();
            println!(
                "  {:<12} {} score={:.2} liq=${:.0} vol1h=${:.0} pc1h={:+.1}% validated={} boosts={} jup={:?}",
                t.token.symbol,
                t.mint(),
                t.score,
                t.gecko.liquidity_usd.unwrap_or(0.0),
                t.gecko.volume_1h_usd.unwrap_or(0.0),
                ds.and_then(|d| d.price_change_1h_pct).unwrap_or(0.0),
                t.is_dexscreener_validated(),
                ds.map(|d| d.boosts_active).unwrap_or(0),
                t.jupiter_price
            );
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("\n[API STATS] {}", apis.get_all_stats().summary());
    Ok(())
}

fn print_outcome(label: &str, outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::Published {
            count,
            tier_s,
            tier_a,
            tier_b,
            elapsed_ms,
        } => println!(
            "{} refresh: {} tokens S={} A={} B={} ({}ms)",
            label, count, tier_s, tier_a, tier_b, elapsed_ms
        ),
        RefreshOutcome::NoData => println!("{} refresh: no data", label),
        RefreshOutcome::Skipped => println!("{} refresh: skipped", label),
    }
}
