//! Network connection capability
//!
//! The token flow needs exactly two read queries from the cluster: the
//! rent-exempt minimum for an account size, and a recent blockhash. Both are
//! behind `NetworkConnection` so flows can run against an in-memory double.

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::metrics::{metrics, Timer};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read-only cluster queries used while building transactions
#[async_trait]
pub trait NetworkConnection: Send + Sync {
    /// Minimum lamports keeping an account of `data_len` bytes rent-exempt
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> LaunchpadResult<u64>;

    /// A blockhash recent enough to sign a new transaction with
    async fn latest_blockhash(&self) -> LaunchpadResult<Hash>;
}

/// `NetworkConnection` over the nonblocking RPC client
pub struct RpcConnection {
    client: Arc<RpcClient>,
    timeout: Duration,
}

impl RpcConnection {
    pub fn new(url: &str, timeout: Duration, commitment: CommitmentConfig) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(url.to_string(), timeout, commitment);
        Self {
            client: Arc::new(client),
            timeout,
        }
    }

    /// Shared handle, so the wallet can broadcast over the same client
    pub fn client(&self) -> Arc<RpcClient> {
        Arc::clone(&self.client)
    }

    async fn timed<T, F>(&self, method: &'static str, fut: F) -> LaunchpadResult<T>
    where
        F: Future<Output = Result<T, solana_client::client_error::ClientError>> + Send,
    {
        let timer = Timer::new();
        let result = tokio::time::timeout(self.timeout, fut).await;
        timer.observe_duration(&metrics().rpc_latency);

        match result {
            Ok(Ok(value)) => {
                debug!(method, elapsed_ms = timer.elapsed_ms(), "RPC query ok");
                Ok(value)
            }
            Ok(Err(e)) => Err(LaunchpadError::Network(format!("{} failed: {}", method, e))),
            Err(_) => Err(LaunchpadError::Network(format!(
                "{} timed out after {}ms",
                method,
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl NetworkConnection for RpcConnection {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> LaunchpadResult<u64> {
        self.timed(
            "getMinimumBalanceForRentExemption",
            self.client.get_minimum_balance_for_rent_exemption(data_len),
        )
        .await
    }

    async fn latest_blockhash(&self) -> LaunchpadResult<Hash> {
        self.timed("getLatestBlockhash", self.client.get_latest_blockhash())
            .await
    }
}

impl std::fmt::Debug for RpcConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConnection")
            .field("url", &self.client.url())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    /// A listener that completes the TCP handshake but never answers
    fn silent_endpoint() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    #[tokio::test]
    async fn test_unanswered_rent_query_is_network_error() {
        let (_listener, url) = silent_endpoint();
        let connection = RpcConnection::new(
            &url,
            Duration::from_millis(300),
            CommitmentConfig::confirmed(),
        );
        let samples_before = metrics().rpc_latency.get_sample_count();

        let err = connection
            .minimum_balance_for_rent_exemption(234)
            .await
            .unwrap_err();

        assert!(matches!(err, LaunchpadError::Network(_)), "got {:?}", err);
        assert!(err.to_string().contains("getMinimumBalanceForRentExemption"));
        assert!(metrics().rpc_latency.get_sample_count() > samples_before);
    }

    #[tokio::test]
    async fn test_unanswered_blockhash_query_is_network_error() {
        let (_listener, url) = silent_endpoint();
        let connection = RpcConnection::new(
            &url,
            Duration::from_millis(300),
            CommitmentConfig::confirmed(),
        );

        let err = connection.latest_blockhash().await.unwrap_err();
        assert!(matches!(err, LaunchpadError::Network(_)), "got {:?}", err);
    }
}
