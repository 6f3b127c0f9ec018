//! Swap screen state: token pair, amount, slippage and the cached quote

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::metrics::metrics;
use crate::structured_logging::StructuredLogger;
use crate::swap::client::{record_quote_outcome, Quote, QuoteRequest, SwapAggregator};
use crate::token::amount::base_units_to_ui;
use crate::types::{SwapSettings, TokenInfo};
use crate::wallet::WalletSigner;
use solana_sdk::signature::Signature;

/// One swap form. Operations take `&mut self`, so a session has at most one
/// request in flight.
#[derive(Debug, Clone)]
pub struct SwapSession {
    input: TokenInfo,
    output: TokenInfo,
    amount: String,
    settings: SwapSettings,
    quote: Option<Quote>,
    logger: StructuredLogger,
}

impl SwapSession {
    pub fn new(input: TokenInfo, output: TokenInfo, settings: SwapSettings) -> Self {
        Self {
            input,
            output,
            amount: String::new(),
            settings,
            quote: None,
            logger: StructuredLogger::with_new_context(),
        }
    }

    pub fn input(&self) -> &TokenInfo {
        &self.input
    }

    pub fn output(&self) -> &TokenInfo {
        &self.output
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn settings(&self) -> &SwapSettings {
        &self.settings
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    /// A changed amount drops the cached quote, so `confirm_swap` never
    /// submits a quote for a different amount than the form shows
    pub fn set_amount(&mut self, amount: &str) {
        if self.amount != amount {
            self.amount = amount.to_string();
            self.quote = None;
        }
    }

    pub fn set_settings(&mut self, settings: SwapSettings) {
        if self.settings != settings {
            self.settings = settings;
            self.quote = None;
        }
    }

    /// Change the input token; a cached quote for the old pair is dropped
    pub fn set_input(&mut self, token: TokenInfo) {
        self.input = token;
        self.quote = None;
    }

    pub fn set_output(&mut self, token: TokenInfo) {
        self.output = token;
        self.quote = None;
    }

    /// Fetch a quote for the current form and cache it.
    ///
    /// Invalid amounts fail with `Validation` before the aggregator is called.
    /// A failed request leaves any previously cached quote in place.
    pub async fn request_quote(
        &mut self,
        aggregator: &dyn SwapAggregator,
    ) -> LaunchpadResult<&Quote> {
        let request = QuoteRequest::from_ui(&self.input, &self.output, &self.amount, &self.settings)?;

        let result = aggregator.quote(&request).await;
        record_quote_outcome(&result);
        let quote = result?;

        self.logger.log_quote_received(
            &self.input.symbol,
            &self.output.symbol,
            quote.in_amount,
            quote.out_amount,
        );
        let cached: &Quote = self.quote.insert(quote);
        Ok(cached)
    }

    /// Build the swap for the cached quote and submit it through `wallet`.
    ///
    /// On success the quote and amount are cleared.
    pub async fn confirm_swap(
        &mut self,
        aggregator: &dyn SwapAggregator,
        wallet: &dyn WalletSigner,
    ) -> LaunchpadResult<Signature> {
        let user = match wallet.pubkey() {
            Some(pubkey) if wallet.is_connected() => pubkey,
            _ => return Err(LaunchpadError::wallet_not_connected()),
        };
        let quote = self
            .quote
            .as_ref()
            .ok_or_else(|| LaunchpadError::Swap("no quote; request a quote first".to_string()))?;

        let result = match aggregator.build_swap(quote, &user).await {
            Ok(tx) => wallet.send_transaction(tx).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(signature) => {
                metrics().swaps_submitted.inc();
                self.logger.log_swap_submitted(
                    &self.input.symbol,
                    &self.output.symbol,
                    &signature.to_string(),
                );
                self.quote = None;
                self.amount.clear();
                Ok(signature)
            }
            Err(e) => {
                metrics().swaps_failed.inc();
                self.logger
                    .warn(&format!("swap {} failed: {}", e.category(), e));
                Err(e)
            }
        }
    }

    /// Swap input and output; the cached quote no longer applies
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.input, &mut self.output);
        self.quote = None;
    }

    /// Quoted output in whole output tokens
    pub fn expected_output_ui(&self) -> Option<f64> {
        self.quote
            .as_ref()
            .map(|q| base_units_to_ui(q.out_amount, self.output.decimals))
    }

    /// Quoted price impact as a percentage
    pub fn price_impact_pct(&self) -> Option<f64> {
        self.quote
            .as_ref()
            .and_then(|q| q.price_impact)
            .map(|fraction| fraction * 100.0)
    }
}
