/// Jupiter API client
///
/// API Documentation: https://station.jup.ag/docs/apis/swap-api
///
/// Endpoints implemented:
/// 1. /v6/quote - Swap quote (retried on transport failures)
/// 2. /v6/swap - Unsigned swap transaction for a quote
/// 3. /price/v2?ids= - USD prices for up to 100 mints
/// 4. tokens?tags=verified - Verified token list (search)
pub mod types;

pub use self::types::{JupiterListToken, JupiterQuote};

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use self::types::{JupiterPriceResponse, JupiterSwapRequest, JupiterSwapResponse};
use crate::apis::client::HttpClient;
use crate::apis::lenient::parse_records;
use crate::apis::stats::ApiStats;
use crate::config::JupiterConfig;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use crate::tokens::normalize::parse_num;

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Price API accepts at most this many ids per call
const MAX_PRICE_IDS: usize = 100;

pub struct JupiterClient {
    http: HttpClient,
    config: JupiterConfig,
}

impl JupiterClient {
    pub fn new(config: JupiterConfig) -> Result<Self, String> {
        let http = HttpClient::new("Jupiter", config.enabled, config.timeout_seconds, None)?;
        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.http.is_enabled()
    }

    pub fn get_stats(&self) -> ApiStats {
        self.http.get_stats()
    }

    async fn request_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<Option<JupiterQuote>, ApiError> {
        let query = [
            ("inputMint", input_mint.to_string()),
            ("outputMint", output_mint.to_string()),
            ("amount", amount.to_string()),
            ("slippageBps", self.config.slippage_bps.to_string()),
        ];
        let body: Option<Value> = self
            .http
            .get_json("v6/quote", &self.config.quote_url, &query)
            .await?;

        Ok(body.and_then(|raw| {
            let quote = JupiterQuote::from_value(raw);
            if quote.is_none() {
                logger::warning(LogTag::Api, "[JUPITER] Quote response missing outAmount");
            }
            quote
        }))
    }

    /// Quote `amount` (smallest units) of `input_mint` into `output_mint`.
    /// `None` when no usable quote could be obtained.
    pub async fn get_quote(&self, input_mint: &str, output_mint: &str, amount: u64) -> Option<JupiterQuote> {
        let unit = Duration::from_millis(self.config.quote_retry_delay_ms);
        let quote = with_quote_retry(self.config.quote_max_retries, unit, || {
            self.request_quote(input_mint, output_mint, amount)
        })
        .await;

        if let Some(q) = &quote {
            logger::debug(
                LogTag::Api,
                &format!(
                    "[JUPITER] Quote {} -> {}: in={} out={} impact={:?}",
                    input_mint, output_mint, q.in_amount, q.out_amount, q.price_impact_pct
                ),
            );
        }
        quote
    }

    /// Build the unsigned swap transaction (base64) for a quote
    pub async fn get_swap_transaction(
        &self,
        quote: &JupiterQuote,
        user_public_key: &str,
    ) -> Result<String, ApiError> {
        let request = JupiterSwapRequest {
            quote_response: &quote.raw,
            user_public_key,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: "auto",
        };

        let response: Option<JupiterSwapResponse> = self
            .http
            .post_json("v6/swap", &self.config.swap_url, &request)
            .await?;

        match response {
            Some(JupiterSwapResponse {
                swap_transaction: Some(tx),
                ..
            }) if !tx.is_empty() => Ok(tx),
            Some(_) => Err(ApiError::InvalidResponse(
                "No transaction in swap response".to_string(),
            )),
            None => Err(ApiError::InvalidResponse(
                "Swap request rejected by Jupiter".to_string(),
            )),
        }
    }

    /// USD prices keyed by mint; mints without a price are absent
    pub async fn fetch_prices(&self, mints: &[String]) -> Result<HashMap<String, f64>, ApiError> {
        let mut prices = HashMap::new();

        for chunk in mints.chunks(MAX_PRICE_IDS) {
            let response: Option<JupiterPriceResponse> = self
                .http
                .get_json("price/v2", &self.config.price_url, &[("ids", chunk.join(","))])
                .await?;

            let Some(response) = response else { continue };
            for (mint, entry) in response.data {
                let price = entry.and_then(|e| e.price).map(|p| parse_num(Some(&p)));
                if let Some(price) = price.filter(|p| *p > 0.0) {
                    prices.insert(mint, price);
                }
            }
        }

        logger::debug(
            LogTag::Api,
            &format!("[JUPITER] Prices for {}/{} mints", prices.len(), mints.len()),
        );
        Ok(prices)
    }

    pub async fn fetch_verified_tokens(&self) -> Result<Vec<JupiterListToken>, ApiError> {
        let tokens: Option<Vec<Value>> = self
            .http
            .get_json("tokens", &self.config.token_list_url, &[])
            .await?;

        tokens
            .map(parse_records::<JupiterListToken>)
            .ok_or_else(|| ApiError::InvalidResponse("Token list unavailable".to_string()))
    }
}

/// Log line for retry number `retry` (1-based) out of `max_retries`
fn retry_notice(err: &ApiError, delay: Duration, max_retries: u32, retry: u32) -> String {
    format!(
        "[JUPITER] Quote error: {} - retrying in {}ms ({} retries left)",
        err,
        delay.as_millis(),
        max_retries.saturating_sub(retry)
    )
}

/// Run `attempt` once, then up to `max_retries` more times while it fails with
/// a transient error, sleeping `unit * n` before retry `n`. A non-2xx or
/// malformed response (`Ok(None)`) ends the loop without retrying.
pub async fn with_quote_retry<T, F, Fut>(max_retries: u32, unit: Duration, mut attempt: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, ApiError>>,
{
    let mut retry = 0;
    loop {
        match attempt().await {
            Ok(result) => return result,
            Err(err) if err.is_transient() && retry < max_retries => {
                retry += 1;
                let delay = unit * retry;
                logger::warning(LogTag::Api, &retry_notice(&err, delay, max_retries, retry));
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                logger::warning(LogTag::Api, &format!("[JUPITER] Quote failed: {}", err));
                return None;
            }
        }
    }
}
