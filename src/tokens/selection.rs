/// Selected coin hand-off store
///
/// The coin chosen from search results is written as a small JSON file that
/// a coin detail view (or any other consumer) reads back.
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::NebulaError;
use crate::logger::{self, LogTag};
use crate::tokens::types::{SearchResult, SelectedCoin};

impl SelectedCoin {
    pub fn from_search_result(result: &SearchResult) -> Self {
        Self {
            mint: result.address.clone(),
            symbol: result.symbol.clone(),
            name: result.name.clone(),
            pair: format!("{}/SOL", result.symbol),
            pair_address: result.pair_address.clone().unwrap_or_default(),
            price: result.price.unwrap_or(0.0),
        }
    }
}

pub struct SelectedCoinStore {
    path: PathBuf,
}

impl SelectedCoinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the default data directory
    pub fn default_location() -> Self {
        Self::new(crate::paths::get_selected_coin_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, coin: &SelectedCoin) -> Result<(), NebulaError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(coin)?;
        fs::write(&self.path, json)?;

        logger::debug(
            LogTag::Search,
            &format!("Selected {} ({}) saved to {}", coin.symbol, coin.mint, self.path.display()),
        );
        Ok(())
    }

    /// Missing or unreadable selection yields `None`
    pub fn load(&self) -> Option<SelectedCoin> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(coin) => Some(coin),
            Err(e) => {
                logger::warning(
                    LogTag::Search,
                    &format!("Ignoring corrupt selection file {}: {}", self.path.display(), e),
                );
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), NebulaError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
