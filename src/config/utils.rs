/// Configuration loading and access helpers
///
/// The global `CONFIG` is the single source of truth for the running binary.
/// Engines never read it directly: they receive their config sections by
/// value at construction, which keeps them independently testable.
use std::path::Path;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use super::schemas::Config;
use crate::logger::{self, LogTag};

pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Parse a TOML document; missing sections and fields take their defaults
pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Read a config file, falling back to defaults when it does not exist
pub fn read_config_file(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path.display()),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
    parse_config(&contents).map_err(|e| format!("{} ({})", e, path.display()))
}

/// Load configuration from `path` into the global slot. Call once at startup.
pub fn load_config_from_path(path: &Path) -> Result<(), String> {
    let config = read_config_file(path)?;
    validate_config(&config)?;

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())?;

    logger::debug(
        LogTag::Config,
        &format!("Configuration loaded from {}", path.display()),
    );
    Ok(())
}

/// Load from `--config <path>` or the default data directory location
pub fn load_config() -> Result<(), String> {
    let path = crate::arguments::get_config_path_override()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(crate::paths::get_config_path);
    load_config_from_path(&path)
}

/// Read access to the global configuration; defaults when not loaded
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(lock) => f(&lock.read()),
        None => f(&Config::default()),
    }
}

/// Owned copy, for holding across await points
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

/// Write the effective configuration (defaults included) as TOML
pub fn save_config(path: &Path) -> Result<(), String> {
    let contents = with_config(|cfg| {
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))
    })?;
    std::fs::write(path, contents)
        .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))
}

/// Reject values that would stall or spin the engines
pub fn validate_config(config: &Config) -> Result<(), String> {
    let checks: [(bool, &str); 7] = [
        (config.adrenaline.refresh_interval_ms > 0, "adrenaline.refresh_interval_ms must be > 0"),
        (config.trending.full_refresh_interval_ms > 0, "trending.full_refresh_interval_ms must be > 0"),
        (config.trending.fast_refresh_interval_ms > 0, "trending.fast_refresh_interval_ms must be > 0"),
        (config.enrichment.batch_size > 0, "enrichment.batch_size must be > 0"),
        (config.sources.dexscreener.batch_size > 0, "sources.dexscreener.batch_size must be > 0"),
        (config.events.channel_capacity > 0, "events.channel_capacity must be > 0"),
        (config.sources.geckoterminal.timeout_seconds > 0, "sources.geckoterminal.timeout_seconds must be > 0"),
    ];

    match checks.iter().find(|(ok, _)| !ok) {
        Some((_, message)) => Err(message.to_string()),
        None => Ok(()),
    }
}
