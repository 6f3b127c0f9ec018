//! Test Utilities Module
//!
//! In-memory doubles for the network, wallet and swap aggregator so the
//! launch flow and swap session can be driven deterministically.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::network::NetworkConnection;
use crate::signing::{missing_signers, sign_at_signer_slot};
use crate::swap::client::{Quote, QuoteRequest, SwapAggregator};
use crate::types::{TokenCreationRequest, TokenForm};
use crate::wallet::WalletSigner;
use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, VersionedTransaction},
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Lamports per byte-year times the two-year exemption threshold
const MOCK_LAMPORTS_PER_BYTE: u64 = 6_960;
/// Account metadata overhead counted by the rent calculation
const MOCK_ACCOUNT_OVERHEAD: u64 = 128;

/// Mock NetworkConnection
///
/// Rent follows the cluster formula; every blockhash is unique.
#[derive(Default)]
pub struct MockConnection {
    rent_queries: Mutex<Vec<usize>>,
    blockhash_calls: AtomicUsize,
    fail_rent: AtomicBool,
    fail_blockhash: AtomicBool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rent the mock charges for `data_len` bytes
    pub fn rent_for(data_len: usize) -> u64 {
        (data_len as u64 + MOCK_ACCOUNT_OVERHEAD) * MOCK_LAMPORTS_PER_BYTE
    }

    pub fn fail_rent_queries(&self) {
        self.fail_rent.store(true, Ordering::SeqCst);
    }

    pub fn fail_blockhash_queries(&self) {
        self.fail_blockhash.store(true, Ordering::SeqCst);
    }

    /// Sizes passed to every rent query so far
    pub fn rent_queries(&self) -> Vec<usize> {
        self.rent_queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    pub fn blockhash_calls(&self) -> usize {
        self.blockhash_calls.load(Ordering::SeqCst)
    }

    /// Total queries of any kind
    pub fn call_count(&self) -> usize {
        self.rent_queries().len() + self.blockhash_calls()
    }
}

#[async_trait]
impl NetworkConnection for MockConnection {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> LaunchpadResult<u64> {
        if let Ok(mut queries) = self.rent_queries.lock() {
            queries.push(data_len);
        }
        if self.fail_rent.load(Ordering::SeqCst) {
            return Err(LaunchpadError::Network(
                "getMinimumBalanceForRentExemption timed out".to_string(),
            ));
        }
        Ok(Self::rent_for(data_len))
    }

    async fn latest_blockhash(&self) -> LaunchpadResult<Hash> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_blockhash.load(Ordering::SeqCst) {
            return Err(LaunchpadError::Network("getLatestBlockhash failed".to_string()));
        }
        Ok(Hash::new_unique())
    }
}

/// Failure injected into the Nth (1-based) `send_transaction` call
#[derive(Debug, Clone)]
struct InjectedFailure {
    call: usize,
    error: LaunchpadError,
}

/// Mock WalletSigner
///
/// Signs for real with its own keypair, so co-signatures and signer slots are
/// checked exactly as on-chain, but never broadcasts.
pub struct MockWallet {
    keypair: Keypair,
    connected: AtomicBool,
    send_calls: AtomicUsize,
    sent: Mutex<Vec<VersionedTransaction>>,
    failure: Mutex<Option<InjectedFailure>>,
}

impl MockWallet {
    /// A connected wallet that accepts everything
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
            connected: AtomicBool::new(true),
            send_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    pub fn disconnected() -> Self {
        let wallet = Self::new();
        wallet.disconnect();
        wallet
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// The wallet's key, regardless of connection state
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// The user declines the Nth signature request
    pub fn reject_on_call(&self, call: usize) {
        self.inject(call, LaunchpadError::UserRejected("user declined".to_string()));
    }

    /// The Nth broadcast fails
    pub fn fail_on_call(&self, call: usize) {
        self.inject(
            call,
            LaunchpadError::Submission("blockhash not found".to_string()),
        );
    }

    fn inject(&self, call: usize, error: LaunchpadError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(InjectedFailure { call, error });
        }
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    /// Fully signed transactions accepted so far, in order
    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn pubkey(&self) -> Option<Pubkey> {
        self.is_connected().then(|| self.keypair.pubkey())
    }

    async fn send_transaction(
        &self,
        mut transaction: VersionedTransaction,
    ) -> LaunchpadResult<Signature> {
        let call = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.is_connected() {
            return Err(LaunchpadError::wallet_not_connected());
        }

        let injected = self
            .failure
            .lock()
            .ok()
            .and_then(|f| f.clone())
            .filter(|f| f.call == call);
        if let Some(failure) = injected {
            return Err(failure.error);
        }

        let signature = sign_at_signer_slot(&mut transaction, &self.keypair)?;
        let missing = missing_signers(&transaction);
        if !missing.is_empty() {
            return Err(LaunchpadError::Submission(format!(
                "missing signatures from {:?}",
                missing
            )));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(transaction);
        }
        Ok(signature)
    }
}

/// Mock SwapAggregator quoting a fixed output per input base unit
pub struct MockAggregator {
    /// Output base units per input base unit, as a ratio
    rate: (u64, u64),
    price_impact: String,
    quote_calls: AtomicUsize,
    swap_calls: AtomicUsize,
    requests: Mutex<Vec<QuoteRequest>>,
    fail_quotes: AtomicBool,
    fail_swaps: AtomicBool,
}

impl MockAggregator {
    /// `out_amount = in_amount * numerator / denominator`
    pub fn with_rate(numerator: u64, denominator: u64) -> Self {
        Self {
            rate: (numerator, denominator.max(1)),
            price_impact: "0.0012".to_string(),
            quote_calls: AtomicUsize::new(0),
            swap_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            fail_quotes: AtomicBool::new(false),
            fail_swaps: AtomicBool::new(false),
        }
    }

    pub fn new() -> Self {
        Self::with_rate(1, 1)
    }

    pub fn set_fail_quotes(&self, fail: bool) {
        self.fail_quotes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_swaps(&self, fail: bool) {
        self.fail_swaps.store(fail, Ordering::SeqCst);
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }

    /// Every quote request received, in order
    pub fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for MockAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SwapAggregator for MockAggregator {
    async fn quote(&self, request: &QuoteRequest) -> LaunchpadResult<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.fail_quotes.load(Ordering::SeqCst) {
            return Err(LaunchpadError::Quote("HTTP 503: unavailable".to_string()));
        }

        let out = u128::from(request.amount) * u128::from(self.rate.0) / u128::from(self.rate.1);
        Quote::from_value(serde_json::json!({
            "inputMint": request.input_mint.to_string(),
            "outputMint": request.output_mint.to_string(),
            "inAmount": request.amount.to_string(),
            "outAmount": out.to_string(),
            "otherAmountThreshold": out.to_string(),
            "slippageBps": request.slippage_bps,
            "priceImpactPct": self.price_impact,
            "routePlan": [{"swapInfo": {"label": "MockAmm"}, "percent": 100}],
        }))
    }

    async fn build_swap(
        &self,
        _quote: &Quote,
        user: &Pubkey,
    ) -> LaunchpadResult<VersionedTransaction> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_swaps.load(Ordering::SeqCst) {
            return Err(LaunchpadError::Swap("HTTP 500: route expired".to_string()));
        }

        #[allow(deprecated)]
        let ix = solana_sdk::system_instruction::transfer(user, &Pubkey::new_unique(), 1);
        let message = Message::new_with_blockhash(&[ix], Some(user), &Hash::new_unique());
        Ok(VersionedTransaction::from(Transaction::new_unsigned(message)))
    }
}

/// Validated request from plain form values
pub fn token_request(name: &str, symbol: &str, decimals: u8, supply: &str) -> TokenCreationRequest {
    let form = TokenForm {
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimals: decimals.to_string(),
        initial_supply: supply.to_string(),
        description: String::new(),
        image_url: String::new(),
    };
    TokenCreationRequest::from_form(&form).expect("test form should validate")
}
