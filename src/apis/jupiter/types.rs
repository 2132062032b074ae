/// Jupiter API types
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A v6 quote. The raw body is kept for the swap request, which expects it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct JupiterQuote {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    pub price_impact_pct: Option<String>,
    pub raw: Value,
}

impl JupiterQuote {
    /// `None` when the body lacks `outAmount`
    pub fn from_value(raw: Value) -> Option<Self> {
        let text = |key: &str| raw.get(key).and_then(value_as_string);

        let out_amount = text("outAmount").filter(|s| !s.is_empty())?;
        Some(Self {
            input_mint: text("inputMint").unwrap_or_default(),
            output_mint: text("outputMint").unwrap_or_default(),
            in_amount: text("inAmount").unwrap_or_default(),
            out_amount,
            price_impact_pct: text("priceImpactPct"),
            raw,
        })
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JupiterSwapRequest<'a> {
    pub quote_response: &'a Value,
    pub user_public_key: &'a str,
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
    pub prioritization_fee_lamports: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JupiterSwapResponse {
    /// Base64-encoded unsigned transaction
    pub swap_transaction: Option<String>,
    pub last_valid_block_height: Option<u64>,
}

/// `/price/v2?ids=` response; unknown mints map to `null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JupiterPriceResponse {
    #[serde(default)]
    pub data: HashMap<String, Option<JupiterPriceEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JupiterPriceEntry {
    pub id: Option<String>,
    pub price: Option<Value>,
}

/// Entry of the verified token list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JupiterListToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(rename = "logoURI")]
    pub logo_uri: Option<String>,
    pub decimals: Option<u8>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quote_requires_out_amount() {
        assert!(JupiterQuote::from_value(json!({"inAmount": "1000"})).is_none());

        let quote = JupiterQuote::from_value(json!({
            "inputMint": "So11111111111111111111111111111111111111112",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "inAmount": "1000000",
            "outAmount": "152340",
            "priceImpactPct": "0.0012"
        }))
        .unwrap();
        assert_eq!(quote.out_amount, "152340");
        assert_eq!(quote.price_impact_pct.as_deref(), Some("0.0012"));
    }

    #[test]
    fn swap_request_uses_camel_case() {
        let quote = json!({"outAmount": "1"});
        let body = serde_json::to_value(JupiterSwapRequest {
            quote_response: &quote,
            user_public_key: "wallet",
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: "auto",
        })
        .unwrap();
        assert_eq!(body["userPublicKey"], "wallet");
        assert_eq!(body["prioritizationFeeLamports"], "auto");
        assert_eq!(body["quoteResponse"]["outAmount"], "1");
    }
}
