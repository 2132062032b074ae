/// API manager - one instance of every upstream client
///
/// Built once from `SourcesConfig` and shared (via `Arc`) by the engines and
/// the search service, so each source has exactly one request budget.
use std::sync::Arc;

use crate::config::SourcesConfig;
use crate::logger::{self, LogTag};

use super::dexscreener::DexScreenerClient;
use super::geckoterminal::GeckoTerminalClient;
use super::jupiter::JupiterClient;
use super::solana_rpc::SolanaRpcClient;
use super::stats::ApiStats;

pub struct ApiManager {
    pub geckoterminal: Arc<GeckoTerminalClient>,
    pub dexscreener: Arc<DexScreenerClient>,
    pub jupiter: Arc<JupiterClient>,
    pub solana_rpc: Arc<SolanaRpcClient>,
}

impl ApiManager {
    pub fn new(config: &SourcesConfig) -> Result<Self, String> {
        logger::info(LogTag::Api, "Initializing API manager");

        let manager = Self {
            geckoterminal: Arc::new(GeckoTerminalClient::new(config.geckoterminal.clone())?),
            dexscreener: Arc::new(DexScreenerClient::new(config.dexscreener.clone())?),
            jupiter: Arc::new(JupiterClient::new(config.jupiter.clone())?),
            solana_rpc: Arc::new(SolanaRpcClient::new(config.solana_rpc.clone())?),
        };

        for (name, enabled) in [
            ("GeckoTerminal", config.geckoterminal.enabled),
            ("DexScreener", config.dexscreener.enabled),
            ("Jupiter", config.jupiter.enabled),
            ("Solana RPC", config.solana_rpc.enabled),
        ] {
            if !enabled {
                logger::warning(LogTag::Api, &format!("{} client disabled via configuration", name));
            }
        }

        Ok(manager)
    }

    /// Aggregated stats from all API clients
    pub fn get_all_stats(&self) -> ApiManagerStats {
        ApiManagerStats {
            geckoterminal: self.geckoterminal.get_stats(),
            dexscreener: self.dexscreener.get_stats(),
            jupiter: self.jupiter.get_stats(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiManagerStats {
    pub geckoterminal: ApiStats,
    pub dexscreener: ApiStats,
    pub jupiter: ApiStats,
}

impl ApiManagerStats {
    /// One-line summary for the shutdown log
    pub fn summary(&self) -> String {
        [
            ("gecko", &self.geckoterminal),
            ("dex", &self.dexscreener),
            ("jup", &self.jupiter),
        ]
        .iter()
        .map(|(name, s)| {
            format!(
                "{}={}/{} ok, {} skipped",
                name, s.successful_requests, s.total_requests, s.skipped_requests
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
    }
}
