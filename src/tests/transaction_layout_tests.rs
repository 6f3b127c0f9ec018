//! Layout of the transactions the launch flow hands to the wallet

use crate::test_utils::{token_request, MockConnection, MockWallet};
use crate::token::instructions::{classify_instruction, InstructionKind, CREATE_MINT_ORDER};
use crate::token::rent::MintAccountSizing;
use crate::token::sequencer::TokenLaunchFlow;
use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, transaction::VersionedTransaction,
};
use spl_token_2022::instruction::TokenInstruction;
use std::collections::HashSet;

/// Rebuild program id and data of each compiled instruction
fn instructions(tx: &VersionedTransaction) -> Vec<Instruction> {
    let keys = tx.message.static_account_keys();
    tx.message
        .instructions()
        .iter()
        .map(|ix| Instruction {
            program_id: keys[ix.program_id_index as usize],
            accounts: vec![],
            data: ix.data.clone(),
        })
        .collect()
}

fn kinds(tx: &VersionedTransaction) -> Vec<InstructionKind> {
    instructions(tx).iter().map(classify_instruction).collect()
}

async fn launched() -> (MockWallet, MockConnection, Pubkey, Vec<VersionedTransaction>) {
    let connection = MockConnection::new();
    let wallet = MockWallet::new();
    let mut flow = TokenLaunchFlow::new(token_request("Test Token", "TT", 6, "1000"));
    let created = flow.execute(&wallet, &connection).await.unwrap();
    let sent = wallet.sent_transactions();
    (wallet, connection, created.mint, sent)
}

#[tokio::test]
async fn test_transaction_order_and_contents() {
    let (_, _, _, sent) = launched().await;

    assert_eq!(kinds(&sent[0]), CREATE_MINT_ORDER.to_vec());
    assert_eq!(kinds(&sent[1]), vec![InstructionKind::CreateAssociatedAccount]);
    assert_eq!(kinds(&sent[2]), vec![InstructionKind::MintTo]);
}

#[tokio::test]
async fn test_create_mint_is_co_signed_by_mint() {
    let (wallet, _, mint, sent) = launched().await;
    let tx = &sent[0];

    let keys = tx.message.static_account_keys();
    assert_eq!(tx.message.header().num_required_signatures, 2);
    assert_eq!(keys[0], wallet.address());
    assert_eq!(keys[1], mint);
    assert!(tx.verify_with_results().iter().all(|ok| *ok));
}

#[tokio::test]
async fn test_later_steps_only_need_the_wallet() {
    let (wallet, _, _, sent) = launched().await;
    for tx in &sent[1..] {
        assert_eq!(tx.message.header().num_required_signatures, 1);
        assert_eq!(tx.message.static_account_keys()[0], wallet.address());
        assert!(tx.verify_with_results().iter().all(|ok| *ok));
    }
}

#[tokio::test]
async fn test_each_transaction_has_its_own_blockhash() {
    let (_, _, _, sent) = launched().await;
    let hashes: HashSet<_> = sent.iter().map(|tx| *tx.message.recent_blockhash()).collect();
    assert_eq!(hashes.len(), 3);
}

#[tokio::test]
async fn test_mint_decimals_and_amount_on_the_wire() {
    let (_, _, _, sent) = launched().await;

    let init_mint = &instructions(&sent[0])[2];
    match TokenInstruction::unpack(&init_mint.data).unwrap() {
        TokenInstruction::InitializeMint { decimals, .. } => assert_eq!(decimals, 6),
        other => panic!("unexpected {:?}", other),
    }

    let mint_to = &instructions(&sent[2])[0];
    match TokenInstruction::unpack(&mint_to.data).unwrap() {
        TokenInstruction::MintTo { amount } => assert_eq!(amount, 1_000_000_000),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_create_account_funded_for_metadata_growth() {
    let (_, connection, mint, sent) = launched().await;

    let request = token_request("Test Token", "TT", 6, "1000");
    let metadata = crate::token::metadata::build_token_metadata(&request, &mint).unwrap();
    let sizing = MintAccountSizing::for_metadata(&metadata).unwrap();
    assert_eq!(connection.rent_queries(), vec![sizing.total_len()]);

    // SystemInstruction::CreateAccount: u32 tag, u64 lamports, u64 space, owner
    let data = &instructions(&sent[0])[0].data;
    let lamports = u64::from_le_bytes(data[4..12].try_into().unwrap());
    let space = u64::from_le_bytes(data[12..20].try_into().unwrap());
    let owner = Pubkey::try_from(&data[20..52]).unwrap();

    assert_eq!(lamports, MockConnection::rent_for(sizing.total_len()));
    assert_eq!(space, sizing.mint_len as u64);
    assert_eq!(owner, spl_token_2022::id());
}
