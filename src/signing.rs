//! Signature-slot helpers for `VersionedTransaction`
//!
//! Token creation hands the wallet a transaction already co-signed by the new
//! mint keypair, and swap transactions arrive pre-built from the aggregator.
//! In both cases a signer must fill exactly its own slot among the required
//! signers and leave the other signatures untouched.

use crate::errors::{LaunchpadError, LaunchpadResult};
use solana_sdk::{
    message::{MessageHeader, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::VersionedTransaction,
};

/// Message header for Legacy and V0 messages alike
#[inline]
#[must_use]
pub fn get_message_header(message: &VersionedMessage) -> &MessageHeader {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.header,
        VersionedMessage::V0(v0_msg) => &v0_msg.header,
    }
}

/// The first `num_required_signatures` static account keys
#[inline]
#[must_use]
pub fn get_required_signers(message: &VersionedMessage) -> &[Pubkey] {
    let num_signers = get_message_header(message).num_required_signatures as usize;
    let account_keys = message.static_account_keys();
    &account_keys[..num_signers.min(account_keys.len())]
}

/// Required signers whose signature slot is still empty
pub fn missing_signers(tx: &VersionedTransaction) -> Vec<Pubkey> {
    get_required_signers(&tx.message)
        .iter()
        .enumerate()
        .filter(|(idx, _)| {
            tx.signatures
                .get(*idx)
                .map_or(true, |sig| *sig == Signature::default())
        })
        .map(|(_, key)| *key)
        .collect()
}

/// Sign `tx` in the slot belonging to `signer`, keeping other signatures.
///
/// Fails with `UserRejected` when `signer` is not one of the required signers:
/// the wallet has nothing it is allowed to approve.
pub fn sign_at_signer_slot<S: Signer + ?Sized>(
    tx: &mut VersionedTransaction,
    signer: &S,
) -> LaunchpadResult<Signature> {
    let pubkey = signer.pubkey();
    let required = get_required_signers(&tx.message);
    let slot = required.iter().position(|k| *k == pubkey).ok_or_else(|| {
        LaunchpadError::UserRejected(format!(
            "{} is not a required signer of this transaction",
            pubkey
        ))
    })?;
    let num_required = required.len();

    if tx.signatures.len() < num_required {
        tx.signatures.resize(num_required, Signature::default());
    }

    let signature = signer
        .try_sign_message(&tx.message.serialize())
        .map_err(|e| LaunchpadError::UserRejected(format!("signing failed: {}", e)))?;
    tx.signatures[slot] = signature;
    Ok(signature)
}
