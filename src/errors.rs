//! Error types for the launchpad and swap flows
//!
//! One taxonomy covers validation, wallet, network, submission and aggregator
//! failures. Errors are caught at the flow boundary, logged and surfaced as a
//! single user-facing message. Nothing in this crate retries.

use std::fmt;
use thiserror::Error;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending input field (e.g. `"symbol"`)
    pub field: &'static str,
    /// Human readable reason, shown inline next to the field
    pub reason: String,
}

/// All validation failures collected for one form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single-field failure
    pub fn single(field: &'static str, reason: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, reason);
        errors
    }

    pub fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Reason reported for `field`, if any
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.reason.as_str())
    }

    /// `Ok(())` when nothing was collected, otherwise the collected errors
    pub fn into_result(self) -> Result<(), LaunchpadError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(LaunchpadError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.reason)?;
            first = false;
        }
        Ok(())
    }
}

/// Error type for every launchpad and swap operation
#[derive(Error, Debug, Clone)]
pub enum LaunchpadError {
    /// Form input failed its constraints; caught before any network call
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The wallet declined to sign, or no wallet is connected
    #[error("Rejected by wallet: {0}")]
    UserRejected(String),

    /// RPC query failure or timeout (rent, blockhash)
    #[error("Network error: {0}")]
    Network(String),

    /// Broadcast of a signed transaction failed
    #[error("Submission error: {0}")]
    Submission(String),

    /// The aggregator quote endpoint failed
    #[error("Quote error: {0}")]
    Quote(String),

    /// The aggregator swap-build endpoint failed, or no quote is cached
    #[error("Swap error: {0}")]
    Swap(String),

    /// Failed to build an instruction for a specific program
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program the instruction targets
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// Instructions are not in the order the flow requires
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// Configuration or keypair loading error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violation or misuse of a flow
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LaunchpadError {
    /// Whether retrying could help. Always `false`: every failure is terminal
    /// for the attempt that produced it, and restarting a token flow goes
    /// through `TokenLaunchFlow::retry` with a fresh mint identity.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UserRejected(_) => "user_rejected",
            Self::Network(_) => "network",
            Self::Submission(_) => "submission",
            Self::Quote(_) => "quote",
            Self::Swap(_) => "swap",
            Self::InstructionBuild { .. } => "instruction",
            Self::InvalidInstructionOrder(_) => "instruction_order",
            Self::Configuration(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// The single message shown to the user at the flow boundary
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => format!("Please fix the form: {}", errors),
            Self::UserRejected(reason) => format!("Transaction not approved ({})", reason),
            Self::Network(_) => "Could not reach the network. Please try again.".to_string(),
            Self::Submission(_) => "The transaction could not be submitted.".to_string(),
            Self::Quote(_) => "Failed to get quote. Please try again.".to_string(),
            Self::Swap(reason) => format!("Swap failed: {}", reason),
            Self::InstructionBuild { .. }
            | Self::InvalidInstructionOrder(_)
            | Self::Configuration(_)
            | Self::Internal(_) => format!("Unexpected error: {}", self),
        }
    }
}

// Convenience constructors for common error scenarios
impl LaunchpadError {
    /// Wallet missing at submission time
    pub fn wallet_not_connected() -> Self {
        Self::UserRejected("wallet not connected; connect a wallet to continue".to_string())
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, reason))
    }

    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

impl From<solana_client::client_error::ClientError> for LaunchpadError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        Self::Network(err.to_string())
    }
}

pub type LaunchpadResult<T> = std::result::Result<T, LaunchpadError>;
