//! Quote/swap aggregator client
//!
//! `SwapAggregator` is the seam; `JupiterClient` speaks the Jupiter v6 HTTP
//! API. The quote JSON is kept verbatim so it can be posted back unchanged.

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::metrics::metrics;
use crate::token::amount::{ui_amount_to_base_units, Rounding};
use crate::types::{SwapSettings, TokenInfo};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use reqwest::Client;
use serde::Deserialize;
use solana_sdk::{pubkey::Pubkey, transaction::VersionedTransaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Parameters of one quote request, in base units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub amount: u64,
    pub slippage_bps: u16,
}

impl QuoteRequest {
    /// Build from UI input. The amount is floored to the input token's
    /// decimals; zero, negative or unparsable amounts are rejected here so
    /// they never reach the aggregator.
    pub fn from_ui(
        input: &TokenInfo,
        output: &TokenInfo,
        amount_ui: &str,
        settings: &SwapSettings,
    ) -> LaunchpadResult<Self> {
        if input.mint == output.mint {
            return Err(LaunchpadError::validation(
                "output",
                "input and output tokens must differ",
            ));
        }
        let amount = ui_amount_to_base_units(amount_ui, input.decimals, Rounding::Floor)?;
        if amount == 0 {
            return Err(LaunchpadError::validation(
                "amount",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            input_mint: input.mint,
            output_mint: output.mint,
            amount,
            slippage_bps: settings.slippage_bps(),
        })
    }
}

/// Aggregator quote: typed view plus the raw server JSON
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub in_amount: u64,
    pub out_amount: u64,
    /// Fraction as reported by the server (0.01 = 1%); absent on some routes
    pub price_impact: Option<f64>,
    pub route_labels: Vec<String>,
    raw: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteFields {
    input_mint: String,
    output_mint: String,
    in_amount: String,
    out_amount: String,
    #[serde(default)]
    price_impact_pct: Option<String>,
    #[serde(default)]
    route_plan: Vec<RoutePlanStep>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutePlanStep {
    swap_info: SwapInfo,
}

#[derive(Deserialize)]
struct SwapInfo {
    label: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: String,
}

impl Quote {
    pub fn from_value(raw: serde_json::Value) -> LaunchpadResult<Self> {
        let fields: QuoteFields = serde_json::from_value(raw.clone())
            .map_err(|e| LaunchpadError::Quote(format!("unexpected quote shape: {}", e)))?;

        let pubkey = |field: &str, value: &str| {
            Pubkey::from_str(value)
                .map_err(|e| LaunchpadError::Quote(format!("invalid {}: {}", field, e)))
        };
        let amount = |field: &str, value: &str| {
            value
                .parse::<u64>()
                .map_err(|e| LaunchpadError::Quote(format!("invalid {}: {}", field, e)))
        };

        Ok(Self {
            input_mint: pubkey("inputMint", &fields.input_mint)?,
            output_mint: pubkey("outputMint", &fields.output_mint)?,
            in_amount: amount("inAmount", &fields.in_amount)?,
            out_amount: amount("outAmount", &fields.out_amount)?,
            price_impact: fields
                .price_impact_pct
                .and_then(|p| p.parse::<f64>().ok()),
            route_labels: fields
                .route_plan
                .into_iter()
                .filter_map(|step| step.swap_info.label)
                .collect(),
            raw,
        })
    }

    /// The quote exactly as the server returned it
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}

/// Quote and swap-build capability
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> LaunchpadResult<Quote>;

    /// Unsigned swap transaction for `user`, who signs and broadcasts it
    async fn build_swap(&self, quote: &Quote, user: &Pubkey)
        -> LaunchpadResult<VersionedTransaction>;
}

/// Jupiter v6 HTTP client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    http: Client,
    base_url: String,
}

impl JupiterClient {
    pub fn new(base_url: &str, timeout: Duration) -> LaunchpadResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LaunchpadError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SwapAggregator for JupiterClient {
    async fn quote(&self, request: &QuoteRequest) -> LaunchpadResult<Quote> {
        let url = format!("{}/quote", self.base_url);
        let query = [
            ("inputMint", request.input_mint.to_string()),
            ("outputMint", request.output_mint.to_string()),
            ("amount", request.amount.to_string()),
            ("slippageBps", request.slippage_bps.to_string()),
        ];
        debug!(%url, amount = request.amount, slippage_bps = request.slippage_bps, "Requesting quote");

        let resp = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| LaunchpadError::Quote(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "Quote API error");
            return Err(LaunchpadError::Quote(format!("HTTP {}: {}", status, body)));
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LaunchpadError::Quote(format!("JSON parse error: {}", e)))?;
        Quote::from_value(raw)
    }

    async fn build_swap(
        &self,
        quote: &Quote,
        user: &Pubkey,
    ) -> LaunchpadResult<VersionedTransaction> {
        let url = format!("{}/swap", self.base_url);
        let payload = serde_json::json!({
            "quoteResponse": quote.raw(),
            "userPublicKey": user.to_string(),
        });

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LaunchpadError::Swap(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "Swap API error");
            return Err(LaunchpadError::Swap(format!("HTTP {}: {}", status, body)));
        }

        let body: SwapResponse = resp
            .json()
            .await
            .map_err(|e| LaunchpadError::Swap(format!("JSON parse error: {}", e)))?;
        decode_swap_transaction(&body.swap_transaction)
    }
}

/// base64 wire bytes to a `VersionedTransaction`
pub fn decode_swap_transaction(encoded: &str) -> LaunchpadResult<VersionedTransaction> {
    let bytes = BASE64_STANDARD
        .decode(encoded)
        .map_err(|e| LaunchpadError::Swap(format!("base64 decode error: {}", e)))?;
    bincode::deserialize::<VersionedTransaction>(&bytes)
        .map_err(|e| LaunchpadError::Swap(format!("transaction decode error: {}", e)))
}

/// Count a quote attempt and its outcome
pub(crate) fn record_quote_outcome<T>(result: &LaunchpadResult<T>) {
    metrics().quotes_requested.inc();
    if result.is_err() {
        metrics().quotes_failed.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::find_token;

    #[test]
    fn test_from_ui_scales_sol_amount() {
        let sol = find_token("SOL").unwrap();
        let usdc = find_token("USDC").unwrap();
        let settings = SwapSettings::from_percent(0.5).unwrap();

        let req = QuoteRequest::from_ui(&sol, &usdc, "1.5", &settings).unwrap();
        assert_eq!(req.amount, 1_500_000_000);
        assert_eq!(req.slippage_bps, 50);
        assert_eq!(req.input_mint, sol.mint);
        assert_eq!(req.output_mint, usdc.mint);
    }

    #[test]
    fn test_from_ui_floors_extra_digits() {
        let usdc = find_token("USDC").unwrap();
        let bonk = find_token("BONK").unwrap();
        let req =
            QuoteRequest::from_ui(&usdc, &bonk, "0.1234569", &SwapSettings::default()).unwrap();
        assert_eq!(req.amount, 123_456);
    }

    #[test]
    fn test_from_ui_rejects_bad_amounts() {
        let sol = find_token("SOL").unwrap();
        let usdc = find_token("USDC").unwrap();
        let settings = SwapSettings::default();
        for amount in ["0", "0.0000000001", "-1", "", "abc"] {
            let err = QuoteRequest::from_ui(&sol, &usdc, amount, &settings).unwrap_err();
            assert!(
                matches!(err, LaunchpadError::Validation(_)),
                "{:?} gave {:?}",
                amount,
                err
            );
        }
    }

    #[test]
    fn test_from_ui_rejects_same_token() {
        let sol = find_token("SOL").unwrap();
        let err = QuoteRequest::from_ui(&sol, &sol, "1", &SwapSettings::default()).unwrap_err();
        assert!(matches!(err, LaunchpadError::Validation(_)));
    }

    #[test]
    fn test_quote_from_value_keeps_raw() {
        let raw = serde_json::json!({
            "inputMint": "So11111111111111111111111111111111111111112",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "inAmount": "1500000000",
            "outAmount": "210450000",
            "priceImpactPct": "0.0012",
            "routePlan": [{"swapInfo": {"label": "Whirlpool", "ammKey": "x"}}],
            "contextSlot": 1
        });
        let quote = Quote::from_value(raw.clone()).unwrap();
        assert_eq!(quote.in_amount, 1_500_000_000);
        assert_eq!(quote.out_amount, 210_450_000);
        assert_eq!(quote.price_impact, Some(0.0012));
        assert_eq!(quote.route_labels, vec!["Whirlpool".to_string()]);
        assert_eq!(quote.raw(), &raw);
    }

    #[test]
    fn test_quote_from_value_rejects_missing_amount() {
        let raw = serde_json::json!({
            "inputMint": "So11111111111111111111111111111111111111112",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "inAmount": "1"
        });
        assert!(matches!(
            Quote::from_value(raw),
            Err(LaunchpadError::Quote(_))
        ));
    }

    #[test]
    fn test_decode_swap_transaction_rejects_garbage() {
        assert!(matches!(
            decode_swap_transaction("not base64!"),
            Err(LaunchpadError::Swap(_))
        ));
        let short = BASE64_STANDARD.encode([1u8, 2, 3]);
        assert!(matches!(
            decode_swap_transaction(&short),
            Err(LaunchpadError::Swap(_))
        ));
    }
}
