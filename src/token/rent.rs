//! Mint account sizing and rent-exemption lookup

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::network::NetworkConnection;
use crate::token::metadata;
use spl_token_2022::{extension::ExtensionType, state::Mint};
use spl_token_metadata_interface::state::TokenMetadata;
use tracing::debug;

/// Size of the extension type tag in a Token-2022 TLV entry
pub const TYPE_SIZE: usize = 2;
/// Size of the length field in a Token-2022 TLV entry
pub const LENGTH_SIZE: usize = 2;

/// Byte sizes for a mint carrying a metadata pointer and embedded metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintAccountSizing {
    /// Mint plus the metadata-pointer extension; the allocated size
    pub mint_len: usize,
    /// TLV header plus packed metadata, added later by the metadata initialize
    pub metadata_len: usize,
}

impl MintAccountSizing {
    pub fn for_metadata(metadata: &TokenMetadata) -> LaunchpadResult<Self> {
        let mint_len =
            ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::MetadataPointer])
                .map_err(|e| {
                    LaunchpadError::instruction_failed(
                        "token-2022",
                        format!("mint size calculation failed: {}", e),
                    )
                })?;
        let packed_len = metadata::pack(metadata)?.len();

        Ok(Self {
            mint_len,
            metadata_len: TYPE_SIZE + LENGTH_SIZE + packed_len,
        })
    }

    /// Size the account reaches once metadata is written; rent is paid for this
    pub fn total_len(&self) -> usize {
        self.mint_len + self.metadata_len
    }
}

/// One network query: lamports needed to keep the fully grown mint rent-exempt.
///
/// Failures surface as `Network` and are not retried.
pub async fn rent_exempt_lamports(
    connection: &dyn NetworkConnection,
    sizing: &MintAccountSizing,
) -> LaunchpadResult<u64> {
    let lamports = connection
        .minimum_balance_for_rent_exemption(sizing.total_len())
        .await?;
    debug!(
        mint_len = sizing.mint_len,
        metadata_len = sizing.metadata_len,
        lamports,
        "Rent-exempt minimum resolved"
    );
    Ok(lamports)
}
