use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use nebulax::apis::stats::ApiStats;
use nebulax::apis::GeckoTerminalClient;
use nebulax::config::GeckoTerminalConfig;
use nebulax::tokens::normalize::{normalize_new_pools_page, normalize_trending_page};
use nebulax::logger::{self, LogTag};

#[derive(Clone, Copy, ValueEnum)]
enum Feed {
    NewPools,
    Trending,
}

#[derive(Parser)]
#[command(name = "debug_geckoterminal")]
#[command(about = "Fetch and normalize a GeckoTerminal feed", long_about = None)]
struct Args {
    /// Feed to fetch
    #[arg(short, long, value_enum, default_value = "new-pools")]
    feed: Feed,

    /// Page of /new_pools to fetch (new-pools feed only)
    #[arg(short, long, default_value = "1")]
    page: u32,

    /// Maximum number of tokens to display
    #[arg(short, long, default_value = "20")]
    limit: usize,

    /// Show raw included-entity counts and per-token venue flags
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    nebulax::paths::ensure_all_directories().map_err(|e| anyhow!(e))?;
    logger::init();
    logger::info(LogTag::Test, "debug tool starting");

    println!("GeckoTerminal Debug Tool\n");
    println!("{}", "=".repeat(80));

    let client = GeckoTerminalClient::new(GeckoTerminalConfig::default()).map_err(|e| anyhow!(e))?;
    let now = Utc::now();

    match args.feed {
        Feed::NewPools => {
            println!("\n[TEST] new_pools page {}\n", args.page);
            let page = client.fetch_new_pools_page(args.page).await?;
            if args.verbose {
                println!("{} pools, {} included entities", page.data.len(), page.included.len());
            }

            let tokens = normalize_new_pools_page(&page, now);
            println!("Normalized {} tokens\n", tokens.len());
            for (i, t) in tokens.iter().enumerate().take(args.limit) {
                println!(
                    "{:>3}. {:<12} {} mcap=${:.0} liq=${:.0} vol5m=${:.0} txns5m={} dex={}",
                    i + 1,
                    t.symbol,
                    t.mint,
                    t.market_cap_usd,
                    t.liquidity_usd,
                    t.volume_5m_usd,
                    t.tx_count_5m,
                    t.dex
                );
                if args.verbose {
                    println!(
                        "     real_dex={} pump_fun={} created={:?}",
                        t.is_real_dex, t.is_pump_fun, t.created_at
                    );
                }
            }
        }
        Feed::Trending => {
            println!("\n[TEST] trending_pools\n");
            let page = client.fetch_trending_pools().await?;
            let tokens = normalize_trending_page(&page, now);
            println!("Normalized {} of {} pools\n", tokens.len(), page.data.len());
            for (i, t) in tokens.iter().enumerate().take(args.limit) {
                println!(
                    "{:>3}. {:<12} {} liq={:?} vol1h={:?} vol24h={:?} txns5m={:?}",
                    i + 1,
                    t.token.symbol,
                    t.mint(),
                    t.gecko.liquidity_usd,
                    t.gecko.volume_1h_usd,
                    t.gecko.volume_24h_usd,
                    t.gecko.txns_5m
                );
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    print_stats(&client.get_stats());
    Ok(())
}

fn print_stats(stats: &ApiStats) {
    println!("\n[API STATS]");
    println!("Total Requests: {}", stats.total_requests);
    println!("Successful: {}", stats.successful_requests);
    println!("Failed: {}", stats.failed_requests);
    println!("Skipped: {}", stats.skipped_requests);
    println!("Avg Response Time: {:.2}ms", stats.average_response_time_ms);
    if let Some(err) = &stats.last_error {
        println!("Last Error: {}", err);
    }
}
