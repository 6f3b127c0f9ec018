//! Token-2022 launchpad: amount scaling, metadata, sizing, instruction
//! planning and the three-transaction launch flow.

pub mod amount;
pub mod instructions;
pub mod metadata;
pub mod rent;
pub mod sequencer;

pub use amount::{base_units_to_ui, ui_amount_to_base_units, Rounding};
pub use instructions::{
    associated_token_address, sanity_check_create_mint_order, InstructionKind, InstructionPlan,
};
pub use metadata::{build_token_metadata, TokenUriDocument};
pub use rent::{rent_exempt_lamports, MintAccountSizing};
pub use sequencer::{
    CreatedToken, FlowFailure, FlowState, FlowStep, MintIdentity, TokenLaunchFlow,
};
