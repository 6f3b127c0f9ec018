//! solx - Token-2022 launchpad and swap client for Solana
//!
//! Creates a Token-2022 mint with embedded metadata in three ordered
//! transactions and swaps tokens through a quote aggregator.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod network;
pub mod signing;
pub mod structured_logging;
pub mod swap;
pub mod test_utils;
pub mod token;
pub mod types;
pub mod wallet;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use errors::{LaunchpadError, LaunchpadResult};
pub use network::{NetworkConnection, RpcConnection};
pub use swap::{JupiterClient, Quote, QuoteRequest, SwapAggregator, SwapSession};
pub use token::{CreatedToken, FlowFailure, FlowState, FlowStep, TokenLaunchFlow};
pub use types::{SwapSettings, TokenCreationRequest, TokenForm, TokenInfo};
pub use wallet::{KeypairWallet, WalletSigner};
