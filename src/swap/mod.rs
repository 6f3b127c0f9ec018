//! Token swaps through a quote aggregator

pub mod client;
pub mod session;

pub use client::{decode_swap_transaction, JupiterClient, Quote, QuoteRequest, SwapAggregator};
pub use session::SwapSession;
