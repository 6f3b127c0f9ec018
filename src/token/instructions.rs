//! Instruction planning and ordering validation for token creation
//!
//! Transaction 1 batches four instructions so no one can observe an account
//! that exists but is not yet a valid mint:
//! 1. `create_account` (system program, owner = Token-2022)
//! 2. `initialize` metadata pointer (pointing at the mint itself)
//! 3. `initialize_mint` (no freeze authority)
//! 4. `initialize` token metadata
//!
//! Transactions 2 and 3 each carry a single instruction: create the
//! associated token account, then mint the supply into it.

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::token::rent::MintAccountSizing;
use crate::token::sequencer::FlowStep;
#[allow(deprecated)]
use solana_sdk::system_program;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_token_2022::{extension::metadata_pointer, instruction::TokenInstruction};
use spl_token_metadata_interface::{instruction::TokenMetadataInstruction, state::TokenMetadata};

/// What an instruction does, as far as the launch flow cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    CreateAccount,
    InitializeMetadataPointer,
    InitializeMint,
    InitializeMetadata,
    CreateAssociatedAccount,
    MintTo,
    Other,
}

/// Required order of the instructions in transaction 1
pub const CREATE_MINT_ORDER: [InstructionKind; 4] = [
    InstructionKind::CreateAccount,
    InstructionKind::InitializeMetadataPointer,
    InstructionKind::InitializeMint,
    InstructionKind::InitializeMetadata,
];

/// Ordered instructions for one step of the flow
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    /// The ordered list of instructions for the transaction
    pub instructions: Vec<Instruction>,

    /// Which step of the launch flow this transaction performs
    pub step: FlowStep,
}

impl InstructionPlan {
    pub fn new(instructions: Vec<Instruction>, step: FlowStep) -> Self {
        Self { instructions, step }
    }

    pub fn kinds(&self) -> Vec<InstructionKind> {
        self.instructions.iter().map(classify_instruction).collect()
    }
}

/// Plan transaction 1: allocate the mint and initialize pointer, mint and metadata.
///
/// The account is allocated at `sizing.mint_len` but funded with `lamports`
/// covering `sizing.total_len()`; Token-2022 grows the account when the
/// metadata is written.
pub fn plan_create_mint_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    lamports: u64,
    sizing: &MintAccountSizing,
    decimals: u8,
    metadata: &TokenMetadata,
) -> LaunchpadResult<InstructionPlan> {
    let token_program = spl_token_2022::id();

    #[allow(deprecated)]
    let create_account = solana_sdk::system_instruction::create_account(
        payer,
        mint,
        lamports,
        sizing.mint_len as u64,
        &token_program,
    );

    let init_pointer =
        metadata_pointer::instruction::initialize(&token_program, mint, Some(*payer), Some(*mint))
            .map_err(|e| token_error("metadata pointer initialize", e))?;

    let init_mint =
        spl_token_2022::instruction::initialize_mint(&token_program, mint, payer, None, decimals)
            .map_err(|e| token_error("initialize mint", e))?;

    let init_metadata = spl_token_metadata_interface::instruction::initialize(
        &token_program,
        mint,
        payer,
        mint,
        payer,
        metadata.name.clone(),
        metadata.symbol.clone(),
        metadata.uri.clone(),
    );

    let instructions = vec![create_account, init_pointer, init_mint, init_metadata];
    sanity_check_create_mint_order(&instructions)?;

    Ok(InstructionPlan::new(instructions, FlowStep::CreateMint))
}

fn token_error(what: &str, e: impl std::fmt::Display) -> LaunchpadError {
    LaunchpadError::instruction_failed("token-2022", format!("{}: {}", what, e))
}

/// Token-2022 associated token address of `owner` for `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address_with_program_id(
        owner,
        mint,
        &spl_token_2022::id(),
    )
}

/// Plan transaction 2: create the owner's associated account, paid by `payer`
pub fn plan_associated_account_instructions(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> InstructionPlan {
    let ix = spl_associated_token_account::instruction::create_associated_token_account(
        payer,
        owner,
        mint,
        &spl_token_2022::id(),
    );
    InstructionPlan::new(vec![ix], FlowStep::CreateAssociatedAccount)
}

/// Plan transaction 3: mint `amount` base units into `destination`
pub fn plan_mint_to_instructions(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> LaunchpadResult<InstructionPlan> {
    if amount == 0 {
        return Err(LaunchpadError::instruction_failed(
            "token-2022",
            "mint_to amount must be positive",
        ));
    }
    let ix = spl_token_2022::instruction::mint_to(
        &spl_token_2022::id(),
        mint,
        destination,
        authority,
        &[],
        amount,
    )
    .map_err(|e| token_error("mint_to", e))?;

    Ok(InstructionPlan::new(vec![ix], FlowStep::MintSupply))
}

/// Identify an instruction by program id and discriminator
pub fn classify_instruction(ix: &Instruction) -> InstructionKind {
    if ix.program_id == system_program::id() {
        // create_account is discriminator 0 (u32 little-endian)
        return if ix.data.len() >= 4 && ix.data[..4] == [0, 0, 0, 0] {
            InstructionKind::CreateAccount
        } else {
            InstructionKind::Other
        };
    }

    if ix.program_id == spl_associated_token_account::id() {
        return InstructionKind::CreateAssociatedAccount;
    }

    if ix.program_id == spl_token_2022::id() {
        if let Ok(TokenMetadataInstruction::Initialize(_)) =
            TokenMetadataInstruction::unpack(&ix.data)
        {
            return InstructionKind::InitializeMetadata;
        }
        return match TokenInstruction::unpack(&ix.data) {
            Ok(TokenInstruction::MetadataPointerExtension) => {
                InstructionKind::InitializeMetadataPointer
            }
            Ok(TokenInstruction::InitializeMint { .. }) => InstructionKind::InitializeMint,
            Ok(TokenInstruction::MintTo { .. }) => InstructionKind::MintTo,
            _ => InstructionKind::Other,
        };
    }

    InstructionKind::Other
}

/// Validate that transaction 1 is exactly
/// {createAccount, initMetadataPointer, initMint, initMetadata}
///
/// # Errors
///
/// Returns `LaunchpadError::InvalidInstructionOrder` if the list is empty,
/// has the wrong length, or any position holds the wrong instruction.
pub fn sanity_check_create_mint_order(instructions: &[Instruction]) -> LaunchpadResult<()> {
    if instructions.is_empty() {
        return Err(LaunchpadError::invalid_order("Instruction list is empty"));
    }
    if instructions.len() != CREATE_MINT_ORDER.len() {
        return Err(LaunchpadError::invalid_order(format!(
            "Mint creation needs exactly {} instructions, got {}",
            CREATE_MINT_ORDER.len(),
            instructions.len()
        )));
    }

    for (idx, (ix, expected)) in instructions.iter().zip(CREATE_MINT_ORDER).enumerate() {
        let actual = classify_instruction(ix);
        if actual != expected {
            return Err(LaunchpadError::invalid_order(format!(
                "Position {} must be {:?}, got {:?} (program_id: {})",
                idx, expected, actual, ix.program_id
            )));
        }
    }

    Ok(())
}
