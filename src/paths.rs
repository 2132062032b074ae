//! Centralized path resolution
//!
//! All data lives under one platform-specific base directory:
//! - **macOS**: `~/Library/Application Support/NebulaX/`
//! - **Windows**: `%LOCALAPPDATA%\NebulaX\`
//! - **Linux**: `$XDG_DATA_HOME/NebulaX/` (fallback `~/.local/share/NebulaX/`)
//!
//! ```text
//! NebulaX/
//! ├── data/
//! │   ├── config.toml
//! │   └── selected_coin.json
//! └── logs/
//!     └── nebulax_YYYY-MM-DD.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;

static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

fn resolve_base_directory() -> PathBuf {
    const APP_DIR: &str = "NebulaX";

    if let Some(dir) = std::env::var_os("NEBULAX_HOME") {
        return PathBuf::from(dir);
    }

    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(APP_DIR))
}

pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

pub fn get_data_directory() -> PathBuf {
    BASE_DIRECTORY.join("data")
}

pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

pub fn get_config_path() -> PathBuf {
    get_data_directory().join("config.toml")
}

/// Hand-off file read by the coin detail view
pub fn get_selected_coin_path() -> PathBuf {
    get_data_directory().join("selected_coin.json")
}

pub fn ensure_all_directories() -> Result<(), String> {
    for (name, dir) in [
        ("base", get_base_directory()),
        ("data", get_data_directory()),
        ("logs", get_logs_directory()),
    ] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create {} directory {}: {}", name, dir.display(), e))?;
    }
    Ok(())
}
