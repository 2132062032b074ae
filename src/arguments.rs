/// Centralized command-line argument handling
///
/// Arguments are stored once in `CMD_ARGS` so that any module (logger,
/// runner, debug helpers) can query flags without threading them through.
/// Tests and tools can override the list with `set_cmd_args`.
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::env;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

pub fn set_cmd_args(args: Vec<String>) {
    *CMD_ARGS.lock() = args;
}

pub fn get_cmd_args() -> Vec<String> {
    CMD_ARGS.lock().clone()
}

pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Value following `flag`, e.g. `--config path.toml`
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|value| !value.starts_with("--"))
        .cloned()
}

// =============================================================================
// RUN MODES
// =============================================================================

/// Run a single refresh cycle per engine and exit
pub fn is_once_enabled() -> bool {
    has_arg("--once")
}

pub fn is_adrenaline_disabled() -> bool {
    has_arg("--no-adrenaline")
}

pub fn is_trending_disabled() -> bool {
    has_arg("--no-trending")
}

pub fn get_config_path_override() -> Option<String> {
    get_arg_value("--config")
}

pub fn get_search_query() -> Option<String> {
    get_arg_value("--search")
}

pub fn get_balance_address() -> Option<String> {
    get_arg_value("--balance")
}

/// Output mint for a one-off SOL quote
pub fn get_quote_mint() -> Option<String> {
    get_arg_value("--quote")
}

/// Wallet public key; with `--quote`, also build the unsigned swap transaction
pub fn get_wallet_pubkey() -> Option<String> {
    get_arg_value("--wallet")
}

/// 1-based index into `--search` results to save as the selected coin
pub fn get_select_index() -> Option<usize> {
    get_arg_value("--select").and_then(|v| v.parse().ok())
}

// =============================================================================
// DEBUG FLAGS
// =============================================================================

pub fn is_debug_api_enabled() -> bool {
    has_arg("--debug-api")
}

pub fn is_debug_cache_enabled() -> bool {
    has_arg("--debug-cache")
}

pub fn is_debug_events_enabled() -> bool {
    has_arg("--debug-events")
}

/// Print which debug modes are on, if any
pub fn print_debug_info() {
    let enabled: Vec<&str> = [
        ("api", is_debug_api_enabled()),
        ("cache", is_debug_cache_enabled()),
        ("events", is_debug_events_enabled()),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect();

    if !enabled.is_empty() {
        println!("Debug modes enabled: {}", enabled.join(", "));
    }
}

pub fn print_help() {
    println!("NebulaX - Solana token discovery and ranking pipeline");
    println!();
    println!("USAGE:");
    println!("    nebulax [FLAGS]");
    println!();
    println!("RUN FLAGS:");
    println!("    --config <path>           Use a specific config.toml");
    println!("    --once                    Run one refresh per engine and exit");
    println!("    --no-adrenaline           Disable the new pairs / migration engine");
    println!("    --no-trending             Disable the trending engine");
    println!("    --search <query>          Search tokens across sources and exit");
    println!("    --select <n>              With --search, save result n as the selected coin");
    println!("    --balance <address>       Print SOL balance for a wallet and exit");
    println!("    --quote <mint>            Quote 0.1 SOL into <mint> via Jupiter and exit");
    println!("    --wallet <pubkey>         With --quote, also build the unsigned swap transaction");
    println!("    --help, -h                Show this help message");
    println!();
    println!("LOGGING FLAGS:");
    println!("    --debug-<tag>             Debug output for a tag (api, cache, adrenaline,");
    println!("                              trending, enrichment, events, search, config, all)");
    println!("    --verbose                 Show all verbose output");
    println!("    --verbose-<tag>           Verbose output for a single tag");
    println!("    --quiet                   Errors only");
    println!("    --log-tags=a,b            Only log these tags");
    println!("    --no-log-file             Do not write the daily log file");
}

pub mod patterns {
    use super::*;

    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // CMD_ARGS is process-global; keep all assertions in one test.
    #[test]
    fn flag_and_value_lookup() {
        set_cmd_args(
            ["nebulax", "--config", "/tmp/x.toml", "--once", "--search", "--debug-api", "--select", "2"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        assert!(is_once_enabled());
        assert!(is_debug_api_enabled());
        assert!(!is_trending_disabled());
        assert_eq!(get_config_path_override().as_deref(), Some("/tmp/x.toml"));
        // a flag directly following --search is not a value
        assert_eq!(get_search_query(), None);
        assert_eq!(get_select_index(), Some(2));
        assert_eq!(get_quote_mint(), None);
    }
}
