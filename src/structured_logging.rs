//! Structured logging for token launch flows and swaps

use uuid::Uuid;

/// Structured logger tagging every event with one context id
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context_id: String,
}

impl StructuredLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    /// Logger with a fresh UUID v4 context id
    pub fn with_new_context() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_flow_started(&self, symbol: &str, decimals: u8, base_units: u64) {
        tracing::info!(
            context_id = %self.context_id,
            symbol = %symbol,
            decimals = %decimals,
            base_units = %base_units,
            "Token launch started"
        );
    }

    pub fn log_step_submitted(&self, step: &str, mint: &str) {
        tracing::debug!(
            context_id = %self.context_id,
            step = %step,
            mint = %mint,
            "Submitting transaction"
        );
    }

    pub fn log_step_confirmed(&self, step: &str, mint: &str, sig: &str) {
        tracing::info!(
            context_id = %self.context_id,
            step = %step,
            mint = %mint,
            signature = %sig,
            "Transaction accepted"
        );
    }

    pub fn log_flow_created(&self, mint: &str, ata: &str, latency_ms: u64) {
        tracing::info!(
            context_id = %self.context_id,
            mint = %mint,
            associated_account = %ata,
            latency_ms = %latency_ms,
            "Token created"
        );
    }

    pub fn log_flow_failed(&self, step: &str, category: &str, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            step = %step,
            category = %category,
            error = %error,
            "Token launch failed"
        );
    }

    pub fn log_orphaned_mint(&self, mint: &str, step: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            mint = %mint,
            failed_step = %step,
            "Mint exists on-chain but the launch did not finish; no supply was minted"
        );
    }

    pub fn log_identity_retired(&self, mint: &str) {
        tracing::debug!(
            context_id = %self.context_id,
            mint = %mint,
            "Mint identity retired"
        );
    }

    pub fn log_quote_received(&self, input: &str, output: &str, in_amount: u64, out_amount: u64) {
        tracing::info!(
            context_id = %self.context_id,
            input = %input,
            output = %output,
            in_amount = %in_amount,
            out_amount = %out_amount,
            "Quote received"
        );
    }

    pub fn log_swap_submitted(&self, input: &str, output: &str, sig: &str) {
        tracing::info!(
            context_id = %self.context_id,
            input = %input,
            output = %output,
            signature = %sig,
            "Swap submitted"
        );
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            message = %message,
            "Warning"
        );
    }
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::with_new_context()
    }
}
