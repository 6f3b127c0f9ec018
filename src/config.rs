//! Configuration for the solx launchpad
//!
//! Loaded from a TOML file, with `.env` support and a few environment
//! overrides for the endpoints and keypair.

use crate::types::MAX_SLIPPAGE_BPS;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_RPC_URL: &str = "SOLX_RPC_URL";
pub const ENV_KEYPAIR_PATH: &str = "SOLX_KEYPAIR_PATH";
pub const ENV_JUPITER_URL: &str = "SOLX_JUPITER_URL";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Wallet configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Swap aggregator configuration
    #[serde(default)]
    pub swap: SwapConfig,

    /// Monitoring and metrics
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// processed | confirmed | finalized
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Wait for confirmation after each broadcast
    #[serde(default = "default_true")]
    pub confirm_submissions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to keypair file; a leading `~` is expanded
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    #[serde(default = "default_jupiter_base_url")]
    pub jupiter_base_url: String,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Slippage tolerance (basis points) when none is given
    #[serde(default = "default_slippage_bps")]
    pub default_slippage_bps: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Print the Prometheus text dump after a `--verbose` run.
    /// Counters are recorded either way.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit logs as JSON lines
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_rpc_url() -> String { "https://api.mainnet-beta.solana.com".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_keypair_path() -> String { "~/.config/solana/id.json".to_string() }
fn default_jupiter_base_url() -> String { "https://quote-api.jup.ag/v6".to_string() }
fn default_slippage_bps() -> u16 { 50 }
fn default_true() -> bool { true }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_secs: default_timeout(),
            commitment: default_commitment(),
            confirm_submissions: default_true(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            jupiter_base_url: default_jupiter_base_url(),
            timeout_secs: default_timeout(),
            default_slippage_bps: default_slippage_bps(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }

    /// Load configuration, then `.env`, then environment overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override endpoint and keypair settings from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc.url = url;
        }
        if let Some(path) = lookup(ENV_KEYPAIR_PATH) {
            self.wallet.keypair_path = path;
        }
        if let Some(url) = lookup(ENV_JUPITER_URL) {
            self.swap.jupiter_base_url = url;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.url.trim().is_empty() {
            bail!("rpc.url must not be empty");
        }
        if self.swap.jupiter_base_url.trim().is_empty() {
            bail!("swap.jupiter_base_url must not be empty");
        }
        if self.rpc.timeout_secs == 0 {
            bail!("rpc.timeout_secs must be greater than zero");
        }
        if self.swap.timeout_secs == 0 {
            bail!("swap.timeout_secs must be greater than zero");
        }
        if self.swap.default_slippage_bps > MAX_SLIPPAGE_BPS {
            bail!(
                "swap.default_slippage_bps must be at most {}, got {}",
                MAX_SLIPPAGE_BPS,
                self.swap.default_slippage_bps
            );
        }
        self.rpc.commitment_config()?;
        Ok(())
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn commitment_config(&self) -> anyhow::Result<CommitmentConfig> {
        let commitment = CommitmentLevel::from_str(&self.commitment)
            .map_err(|_| anyhow::anyhow!("unknown rpc.commitment: {}", self.commitment))?;
        Ok(CommitmentConfig { commitment })
    }
}

impl WalletConfig {
    /// Keypair path with a leading `~` replaced by `$HOME`
    pub fn expanded_keypair_path(&self) -> PathBuf {
        expand_home(&self.keypair_path)
    }
}

impl SwapConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
