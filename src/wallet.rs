//! Wallet capability: connection state, identity, sign-and-send

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::signing::{missing_signers, sign_at_signer_slot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Async wallet interface used by the token flow and swap session
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Whether a wallet is connected and may be asked to sign
    fn is_connected(&self) -> bool;

    /// Public key of the connected wallet, `None` when disconnected
    fn pubkey(&self) -> Option<Pubkey>;

    /// Add the wallet's signature and broadcast.
    ///
    /// Existing co-signatures on `transaction` are preserved. Returns the
    /// transaction signature, or `UserRejected` / `Submission`.
    async fn send_transaction(&self, transaction: VersionedTransaction)
        -> LaunchpadResult<Signature>;
}

/// Load a keypair from a file holding either a JSON byte array (the
/// `solana-keygen` format), raw 64 bytes, or a base58 secret key string.
pub fn read_keypair(path: &Path) -> Result<Keypair> {
    let keypair_bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;

    let secret = if keypair_bytes.len() == 64 {
        keypair_bytes
    } else if keypair_bytes.first() == Some(&b'[') {
        serde_json::from_slice::<Vec<u8>>(&keypair_bytes).context("Failed to parse keypair JSON")?
    } else {
        let text = String::from_utf8(keypair_bytes).context("Keypair file is not UTF-8")?;
        bs58::decode(text.trim())
            .into_vec()
            .context("Failed to decode base58 keypair")?
    };

    if secret.len() != 64 {
        anyhow::bail!("Invalid keypair length: expected 64 bytes, got {}", secret.len());
    }
    if secret.iter().all(|&b| b == 0) {
        anyhow::bail!("Invalid keypair: all-zero key rejected");
    }
    Keypair::try_from(secret.as_slice()).context("Invalid keypair bytes")
}

/// Local-keypair wallet broadcasting through an RPC client
pub struct KeypairWallet {
    keypair: Arc<Keypair>,
    client: Arc<RpcClient>,
    connected: AtomicBool,
    confirm: bool,
}

impl KeypairWallet {
    /// Wallet from a keypair file; starts connected
    pub fn from_file(path: &Path, client: Arc<RpcClient>, confirm: bool) -> Result<Self> {
        let keypair = read_keypair(path)?;
        Ok(Self::from_keypair(keypair, client, confirm))
    }

    pub fn from_keypair(keypair: Keypair, client: Arc<RpcClient>, confirm: bool) -> Self {
        Self {
            keypair: Arc::new(keypair),
            client,
            connected: AtomicBool::new(true),
            confirm,
        }
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        info!(wallet = %self.keypair.pubkey(), "Wallet connected");
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!(wallet = %self.keypair.pubkey(), "Wallet disconnected");
    }
}

#[async_trait]
impl WalletSigner for KeypairWallet {
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
        if !self.is_connected() {
            return Err(LaunchpadError::wallet_not_connected());
        }

        sign_at_signer_slot(&mut transaction, self.keypair.as_ref())?;

        let missing = missing_signers(&transaction);
        if !missing.is_empty() {
            return Err(LaunchpadError::Submission(format!(
                "transaction still needs signatures from {:?}",
                missing
            )));
        }

        let result = if self.confirm {
            self.client.send_and_confirm_transaction(&transaction).await
        } else {
            self.client.send_transaction(&transaction).await
        };

        let signature =
            result.map_err(|e| LaunchpadError::Submission(format!("broadcast failed: {}", e)))?;
        debug!(%signature, confirmed = self.confirm, "Transaction broadcast");
        Ok(signature)
    }
}
