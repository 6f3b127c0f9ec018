//! Token metadata record for the Token-2022 metadata extension
//!
//! The URI stored on-chain is a compact JSON document in the usual off-chain
//! metadata shape, so explorers can read name/symbol/description/image without
//! a hosted file.

use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::types::TokenCreationRequest;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use spl_token_metadata_interface::state::TokenMetadata;

/// Off-chain style metadata document embedded as the token URI
#[derive(Debug, Clone, Serialize)]
pub struct TokenUriDocument {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<serde_json::Value>,
    pub external_url: String,
    pub properties: UriProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct UriProperties {
    pub files: Vec<serde_json::Value>,
    pub category: String,
}

impl TokenUriDocument {
    pub fn from_request(request: &TokenCreationRequest) -> Self {
        Self {
            name: request.name().to_string(),
            symbol: request.symbol().to_string(),
            description: request.description().to_string(),
            image: request.image_url().unwrap_or_default().to_string(),
            attributes: Vec::new(),
            external_url: String::new(),
            properties: UriProperties {
                files: Vec::new(),
                category: "image".to_string(),
            },
        }
    }

    pub fn to_json(&self) -> LaunchpadResult<String> {
        serde_json::to_string(self)
            .map_err(|e| LaunchpadError::internal(format!("metadata URI encoding failed: {}", e)))
    }
}

/// Metadata for `mint`, ready for sizing and for the initialize instruction.
///
/// The update authority is left unset: it does not change the packed length,
/// and the initialize instruction carries the real authority.
pub fn build_token_metadata(
    request: &TokenCreationRequest,
    mint: &Pubkey,
) -> LaunchpadResult<TokenMetadata> {
    let uri = TokenUriDocument::from_request(request).to_json()?;
    Ok(TokenMetadata {
        mint: *mint,
        name: request.name().to_string(),
        symbol: request.symbol().to_string(),
        uri,
        additional_metadata: Vec::new(),
        ..Default::default()
    })
}

/// Borsh bytes of the metadata, as stored in the extension's TLV value
pub fn pack(metadata: &TokenMetadata) -> LaunchpadResult<Vec<u8>> {
    borsh::to_vec(metadata)
        .map_err(|e| LaunchpadError::internal(format!("metadata serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenForm;

    fn request(image_url: &str) -> TokenCreationRequest {
        TokenCreationRequest::from_form(&TokenForm {
            name: "Test Token".to_string(),
            symbol: "TT".to_string(),
            decimals: "6".to_string(),
            initial_supply: "1000".to_string(),
            description: "for tests".to_string(),
            image_url: image_url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_uri_document_shape() {
        let json = TokenUriDocument::from_request(&request("https://x.io/a.png"))
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Test Token");
        assert_eq!(value["symbol"], "TT");
        assert_eq!(value["description"], "for tests");
        assert_eq!(value["image"], "https://x.io/a.png");
        assert_eq!(value["attributes"], serde_json::json!([]));
        assert_eq!(value["external_url"], "");
        assert_eq!(value["properties"]["category"], "image");
    }

    #[test]
    fn test_missing_image_is_empty_string() {
        let doc = TokenUriDocument::from_request(&request(""));
        assert_eq!(doc.image, "");
    }

    #[test]
    fn test_metadata_fields() {
        let mint = Pubkey::new_unique();
        let metadata = build_token_metadata(&request(""), &mint).unwrap();
        assert_eq!(metadata.mint, mint);
        assert_eq!(metadata.name, "Test Token");
        assert_eq!(metadata.symbol, "TT");
        assert!(metadata.uri.starts_with('{'));
        assert!(metadata.additional_metadata.is_empty());
    }

    #[test]
    fn test_packed_length_matches_tlv_size() {
        let metadata = build_token_metadata(&request(""), &Pubkey::new_unique()).unwrap();
        let packed = pack(&metadata).unwrap();
        // tlv_size_of reports header + value
        let tlv = metadata.tlv_size_of().unwrap();
        assert!(tlv > packed.len());
        // update authority (32) + mint (32) + three length-prefixed strings + empty vec
        let expected = 32
            + 32
            + 4 + metadata.name.len()
            + 4 + metadata.symbol.len()
            + 4 + metadata.uri.len()
            + 4;
        assert_eq!(packed.len(), expected);
    }
}
