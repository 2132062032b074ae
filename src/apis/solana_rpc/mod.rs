/// Minimal Solana JSON-RPC client
///
/// Only `getBalance` is needed (wallet balance display), so requests are
/// plain JSON-RPC POSTs through the shared `HttpClient`.
use serde::Deserialize;
use serde_json::Value;

use crate::apis::client::HttpClient;
use crate::config::SolanaRpcConfig;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

pub struct SolanaRpcClient {
    http: HttpClient,
    url: String,
}

impl SolanaRpcClient {
    pub fn new(config: SolanaRpcConfig) -> Result<Self, String> {
        let http = HttpClient::new("SolanaRPC", config.enabled, config.timeout_seconds, None)?;
        Ok(Self {
            http,
            url: config.url,
        })
    }

    async fn execute_raw(&self, method: &str, params: Value) -> Result<Value, ApiError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post_json(method, &self.url, &payload)
            .await?
            .ok_or_else(|| ApiError::InvalidResponse(format!("{} rejected by RPC", method)))?;

        if let Some(err) = response.error {
            return Err(ApiError::InvalidResponse(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }
        response
            .result
            .ok_or_else(|| ApiError::InvalidResponse(format!("{} returned no result", method)))
    }

    /// SOL balance of `address`
    pub async fn get_balance(&self, address: &str) -> Result<f64, ApiError> {
        let result = self
            .execute_raw("getBalance", serde_json::json!([address]))
            .await?;

        let sol = lamports_to_sol(&result)?;
        logger::debug(
            LogTag::Wallet,
            &format!("Balance for {}: {:.4} SOL", address, sol),
        );
        Ok(sol)
    }
}

/// `{"context":..,"value":<lamports>}` -> SOL
fn lamports_to_sol(result: &Value) -> Result<f64, ApiError> {
    let lamports = result
        .get("value")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| ApiError::InvalidResponse("Invalid balance response".to_string()))?;
    Ok(lamports as f64 / LAMPORTS_PER_SOL)
}
