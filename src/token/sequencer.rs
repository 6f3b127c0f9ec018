//! Token launch flow: three strictly ordered submissions
//!
//! ```text
//! Idle ──execute──> Building ──> Submitting{CreateMint}
//!                                  ──> Submitting{CreateAssociatedAccount}
//!                                  ──> Submitting{MintSupply} ──> Created
//!   any failure ──> Failed ──retry──> Idle (new mint identity)
//! ```
//!
//! A mint-to is never submitted unless the mint-initialization transaction for
//! the same identity was accepted first. Nothing is retried automatically, and
//! a failure after step 1 leaves the mint on-chain without supply.

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::metrics::{metrics, Timer};
use crate::network::NetworkConnection;
use crate::structured_logging::StructuredLogger;
use crate::token::instructions::{
    associated_token_address, plan_associated_account_instructions, plan_create_mint_instructions,
    plan_mint_to_instructions, InstructionPlan,
};
use crate::token::metadata::build_token_metadata;
use crate::token::rent::{rent_exempt_lamports, MintAccountSizing};
use crate::types::TokenCreationRequest;
use crate::wallet::WalletSigner;
use solana_sdk::{
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, VersionedTransaction},
};
use std::fmt;

/// One on-chain submission of the launch flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    CreateMint,
    CreateAssociatedAccount,
    MintSupply,
}

impl FlowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateMint => "create_mint",
            Self::CreateAssociatedAccount => "create_associated_account",
            Self::MintSupply => "mint_supply",
        }
    }

    /// Whether the mint account exists once this step has been reached
    fn follows_mint_creation(&self) -> bool {
        !matches!(self, Self::CreateMint)
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keypair for the mint being created.
///
/// Not `Clone`. The secret half only co-signs transaction 1 and
/// is dropped when the identity is retired.
pub struct MintIdentity {
    pubkey: Pubkey,
    keypair: Option<Keypair>,
}

impl MintIdentity {
    pub fn generate() -> Self {
        let keypair = Keypair::new();
        Self {
            pubkey: keypair.pubkey(),
            keypair: Some(keypair),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    pub fn is_retired(&self) -> bool {
        self.keypair.is_none()
    }

    fn keypair(&self) -> LaunchpadResult<&Keypair> {
        self.keypair
            .as_ref()
            .ok_or_else(|| LaunchpadError::internal("mint identity already retired"))
    }

    fn retire(&mut self) {
        self.keypair = None;
    }
}

impl fmt::Debug for MintIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintIdentity")
            .field("pubkey", &self.pubkey)
            .field("retired", &self.is_retired())
            .finish()
    }
}

/// Result of a completed launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedToken {
    pub mint: Pubkey,
    pub associated_token_account: Pubkey,
    pub base_units: u64,
    /// Signatures of the create-mint, associated-account and mint-to
    /// transactions, in submission order
    pub signatures: [Signature; 3],
}

/// Why and where a launch stopped
#[derive(Debug, Clone)]
pub struct FlowFailure {
    /// Step being built or submitted; `None` when the flow never started one
    pub step: Option<FlowStep>,
    pub error: LaunchpadError,
    /// Set when the mint was created but a later step failed
    pub orphaned_mint: Option<Pubkey>,
}

#[derive(Debug, Clone)]
pub enum FlowState {
    Idle,
    Building,
    Submitting { step: FlowStep },
    Created(CreatedToken),
    Failed(FlowFailure),
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Failed(_))
    }

    /// Step in progress, with building counted as part of mint creation
    fn current_step(&self) -> Option<FlowStep> {
        match self {
            Self::Building => Some(FlowStep::CreateMint),
            Self::Submitting { step } => Some(*step),
            _ => None,
        }
    }
}

/// Explicit state machine for one token launch
#[derive(Debug)]
pub struct TokenLaunchFlow {
    request: TokenCreationRequest,
    state: FlowState,
    mint_identity: Option<MintIdentity>,
    logger: StructuredLogger,
}

impl TokenLaunchFlow {
    pub fn new(request: TokenCreationRequest) -> Self {
        Self {
            request,
            state: FlowState::Idle,
            mint_identity: None,
            logger: StructuredLogger::with_new_context(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn request(&self) -> &TokenCreationRequest {
        &self.request
    }

    /// Mint address of the identity this flow generated, if any
    pub fn mint(&self) -> Option<Pubkey> {
        self.mint_identity.as_ref().map(MintIdentity::pubkey)
    }

    pub fn context_id(&self) -> &str {
        self.logger.context_id()
    }

    /// Run the three submissions against `wallet`.
    ///
    /// Only valid from `Idle`. A disconnected wallet fails the flow before any
    /// network call. On failure the state becomes `Failed` and the same error
    /// is returned.
    pub async fn execute(
        &mut self,
        wallet: &dyn WalletSigner,
        connection: &dyn NetworkConnection,
    ) -> LaunchpadResult<CreatedToken> {
        if !matches!(self.state, FlowState::Idle) {
            return Err(LaunchpadError::internal("flow already ran"));
        }

        metrics().token_flows_started.inc();
        self.logger.log_flow_started(
            self.request.symbol(),
            self.request.decimals(),
            self.request.supply_base_units(),
        );

        let payer = match wallet.pubkey() {
            Some(pubkey) if wallet.is_connected() => pubkey,
            _ => return Err(self.fail(LaunchpadError::wallet_not_connected())),
        };

        self.state = FlowState::Building;
        self.mint_identity = Some(MintIdentity::generate());

        let timer = Timer::new();
        match self.run(wallet, connection, payer).await {
            Ok(created) => {
                self.retire_identity();
                metrics().token_flows_created.inc();
                self.logger.log_flow_created(
                    &created.mint.to_string(),
                    &created.associated_token_account.to_string(),
                    timer.elapsed_ms(),
                );
                self.state = FlowState::Created(created.clone());
                Ok(created)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Start over after a failure with a new mint identity.
    ///
    /// The failed identity is retired and never reused.
    pub fn retry(self) -> LaunchpadResult<Self> {
        if !matches!(self.state, FlowState::Failed(_)) {
            return Err(LaunchpadError::internal(
                "retry is only allowed from a failed flow",
            ));
        }
        if let Some(mint) = self.mint() {
            self.logger.log_identity_retired(&mint.to_string());
        }
        Ok(Self::new(self.request))
    }

    async fn run(
        &mut self,
        wallet: &dyn WalletSigner,
        connection: &dyn NetworkConnection,
        payer: Pubkey,
    ) -> LaunchpadResult<CreatedToken> {
        let identity = self
            .mint_identity
            .as_ref()
            .ok_or_else(|| LaunchpadError::internal("no mint identity generated"))?;
        let mint = identity.pubkey();

        // Step 1: allocate and initialize the mint, co-signed by its keypair
        let metadata = build_token_metadata(&self.request, &mint)?;
        let sizing = MintAccountSizing::for_metadata(&metadata)?;
        let lamports = rent_exempt_lamports(connection, &sizing).await?;
        let plan = plan_create_mint_instructions(
            &payer,
            &mint,
            lamports,
            &sizing,
            self.request.decimals(),
            &metadata,
        )?;
        let tx = compile_transaction(connection, &plan, &payer, &[identity.keypair()?]).await?;
        let create_sig = self.submit(wallet, FlowStep::CreateMint, &mint, tx).await?;

        // Step 2: the wallet's associated account for the new mint
        self.state = FlowState::Submitting {
            step: FlowStep::CreateAssociatedAccount,
        };
        let ata = associated_token_address(&payer, &mint);
        let plan = plan_associated_account_instructions(&payer, &payer, &mint);
        let tx = compile_transaction(connection, &plan, &payer, &[]).await?;
        let ata_sig = self
            .submit(wallet, FlowStep::CreateAssociatedAccount, &mint, tx)
            .await?;

        // Step 3: mint the initial supply to the wallet
        self.state = FlowState::Submitting {
            step: FlowStep::MintSupply,
        };
        let base_units = self.request.supply_base_units();
        let plan = plan_mint_to_instructions(&mint, &ata, &payer, base_units)?;
        let tx = compile_transaction(connection, &plan, &payer, &[]).await?;
        let mint_sig = self.submit(wallet, FlowStep::MintSupply, &mint, tx).await?;

        Ok(CreatedToken {
            mint,
            associated_token_account: ata,
            base_units,
            signatures: [create_sig, ata_sig, mint_sig],
        })
    }

    async fn submit(
        &mut self,
        wallet: &dyn WalletSigner,
        step: FlowStep,
        mint: &Pubkey,
        tx: VersionedTransaction,
    ) -> LaunchpadResult<Signature> {
        self.state = FlowState::Submitting { step };
        let mint = mint.to_string();
        self.logger.log_step_submitted(step.as_str(), &mint);

        let signature = wallet.send_transaction(tx).await?;
        self.logger
            .log_step_confirmed(step.as_str(), &mint, &signature.to_string());
        Ok(signature)
    }

    /// Move to `Failed`, record any orphaned mint, and hand the error back
    fn fail(&mut self, error: LaunchpadError) -> LaunchpadError {
        let step = self.state.current_step();
        let orphaned_mint = match step {
            Some(s) if s.follows_mint_creation() => self.mint(),
            _ => None,
        };

        metrics().token_flows_failed.inc();
        let step_label = step.map_or("precondition", |s| s.as_str());
        self.logger
            .log_flow_failed(step_label, error.category(), &error.to_string());
        if let Some(mint) = orphaned_mint {
            metrics().orphaned_mints.inc();
            self.logger.log_orphaned_mint(&mint.to_string(), step_label);
        }

        self.retire_identity();
        self.state = FlowState::Failed(FlowFailure {
            step,
            error: error.clone(),
            orphaned_mint,
        });
        error
    }

    fn retire_identity(&mut self) {
        if let Some(identity) = self.mint_identity.as_mut() {
            identity.retire();
        }
    }
}

/// Compile `plan` with a freshly fetched blockhash, wallet as fee payer, and
/// co-sign with `cosigners`. The wallet's own slot is left empty.
async fn compile_transaction(
    connection: &dyn NetworkConnection,
    plan: &InstructionPlan,
    payer: &Pubkey,
    cosigners: &[&Keypair],
) -> LaunchpadResult<VersionedTransaction> {
    let blockhash = connection.latest_blockhash().await?;
    let message = Message::new_with_blockhash(&plan.instructions, Some(payer), &blockhash);
    let mut tx = Transaction::new_unsigned(message);
    if !cosigners.is_empty() {
        tx.try_partial_sign(cosigners, blockhash).map_err(|e| {
            LaunchpadError::internal(format!("{} co-signing failed: {}", plan.step, e))
        })?;
    }
    Ok(VersionedTransaction::from(tx))
}
