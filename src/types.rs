//! Common types used throughout the application

use crate::errors::{LaunchpadError, LaunchpadResult, ValidationErrors};
use crate::token::amount::{ui_amount_to_base_units, Rounding, MAX_DECIMALS};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Longest symbol accepted by the launch form
pub const MAX_SYMBOL_LEN: usize = 10;

/// Slippage upper bound: 50%
pub const MAX_SLIPPAGE_BPS: u16 = 5_000;

/// Slippage presets offered to the user, in percent
pub const SLIPPAGE_PRESETS_PCT: [f64; 4] = [0.1, 0.5, 1.0, 3.0];

/// Raw token launch form, exactly as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenForm {
    pub name: String,
    pub symbol: String,
    pub decimals: String,
    pub initial_supply: String,
    pub description: String,
    pub image_url: String,
}

/// Validated token creation request
///
/// Fields are private so the request cannot change after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCreationRequest {
    name: String,
    symbol: String,
    decimals: u8,
    initial_supply: String,
    supply_base_units: u64,
    description: String,
    image_url: Option<String>,
}

impl TokenCreationRequest {
    /// Validate a form, collecting every field error before returning
    pub fn from_form(form: &TokenForm) -> LaunchpadResult<Self> {
        let mut errors = ValidationErrors::new();

        let name = form.name.trim();
        if name.is_empty() {
            errors.push("name", "is required");
        }

        let symbol = form.symbol.trim();
        if symbol.is_empty() {
            errors.push("symbol", "is required");
        } else if symbol.chars().count() > MAX_SYMBOL_LEN {
            errors.push(
                "symbol",
                format!("must be at most {} characters", MAX_SYMBOL_LEN),
            );
        }

        let decimals = match form.decimals.trim().parse::<u8>() {
            Ok(d) if (1..=MAX_DECIMALS).contains(&d) => Some(d),
            _ => {
                errors.push(
                    "decimals",
                    format!("must be a whole number between 1 and {}", MAX_DECIMALS),
                );
                None
            }
        };

        let initial_supply = form.initial_supply.trim();
        let supply_base_units = decimals.and_then(|d| {
            match ui_amount_to_base_units(initial_supply, d, Rounding::Nearest) {
                Ok(0) => {
                    errors.push("initial_supply", "must be greater than zero");
                    None
                }
                Ok(units) => Some(units),
                Err(LaunchpadError::Validation(inner)) => {
                    for e in inner.iter() {
                        errors.push("initial_supply", e.reason.clone());
                    }
                    None
                }
                Err(other) => {
                    errors.push("initial_supply", other.to_string());
                    None
                }
            }
        });

        let image_url = form.image_url.trim();
        let image_url = if image_url.is_empty() {
            None
        } else {
            match reqwest::Url::parse(image_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https" | "ipfs" | "ar") => {
                    Some(image_url.to_string())
                }
                Ok(url) => {
                    errors.push(
                        "image_url",
                        format!("unsupported scheme '{}'", url.scheme()),
                    );
                    None
                }
                Err(e) => {
                    errors.push("image_url", format!("is not a valid URL ({})", e));
                    None
                }
            }
        };

        errors.into_result()?;

        match (decimals, supply_base_units) {
            (Some(decimals), Some(supply_base_units)) => Ok(Self {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
                initial_supply: initial_supply.to_string(),
                supply_base_units,
                description: form.description.trim().to_string(),
                image_url,
            }),
            _ => Err(LaunchpadError::internal(
                "validation passed without decimals or supply",
            )),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Supply as typed, in whole tokens
    pub fn initial_supply(&self) -> &str {
        &self.initial_supply
    }

    /// `round(initial_supply * 10^decimals)`
    pub fn supply_base_units(&self) -> u64 {
        self.supply_base_units
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// A tradable token known to the swap screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub mint: Pubkey,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(symbol: &str, name: &str, mint: &str, decimals: u8) -> LaunchpadResult<Self> {
        let mint = Pubkey::from_str(mint).map_err(|e| {
            LaunchpadError::Configuration(format!("invalid mint for {}: {}", symbol, e))
        })?;
        Ok(Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            mint,
            decimals,
        })
    }
}

const POPULAR_TOKENS: [(&str, &str, &str, u8); 5] = [
    ("SOL", "Solana", "So11111111111111111111111111111111111111112", 9),
    ("USDC", "USD Coin", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 6),
    ("USDT", "Tether USD", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", 6),
    ("RAY", "Raydium", "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", 6),
    ("BONK", "Bonk", "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 5),
];

/// Built-in list of popular tokens, SOL first
pub fn popular_tokens() -> Vec<TokenInfo> {
    POPULAR_TOKENS
        .iter()
        .filter_map(|(symbol, name, mint, decimals)| {
            TokenInfo::new(symbol, name, mint, *decimals).ok()
        })
        .collect()
}

/// Look up a popular token by symbol (case-insensitive) or mint address
pub fn find_token(query: &str) -> Option<TokenInfo> {
    popular_tokens().into_iter().find(|t| {
        t.symbol.eq_ignore_ascii_case(query) || t.mint.to_string() == query
    })
}

/// Swap configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSwapSettings")]
pub struct SwapSettings {
    slippage_bps: u16,
}

/// Unchecked wire form; deserialization goes through `from_bps`
#[derive(Deserialize)]
struct RawSwapSettings {
    slippage_bps: u16,
}

impl TryFrom<RawSwapSettings> for SwapSettings {
    type Error = LaunchpadError;

    fn try_from(raw: RawSwapSettings) -> Result<Self, Self::Error> {
        Self::from_bps(raw.slippage_bps)
    }
}

impl SwapSettings {
    pub fn from_bps(slippage_bps: u16) -> LaunchpadResult<Self> {
        if slippage_bps > MAX_SLIPPAGE_BPS {
            return Err(LaunchpadError::validation(
                "slippage",
                format!("must be at most {}%", MAX_SLIPPAGE_BPS / 100),
            ));
        }
        Ok(Self { slippage_bps })
    }

    /// `floor(pct * 100)` basis points
    pub fn from_percent(pct: f64) -> LaunchpadResult<Self> {
        if !pct.is_finite() || pct < 0.0 {
            return Err(LaunchpadError::validation(
                "slippage",
                "must be a non-negative percentage",
            ));
        }
        // Nudge before flooring so 0.29 * 100 = 28.999.. still yields 29
        let bps = (pct * 100.0 + 1e-9).floor();
        if bps > f64::from(MAX_SLIPPAGE_BPS) {
            return Err(LaunchpadError::validation(
                "slippage",
                format!("must be at most {}%", MAX_SLIPPAGE_BPS / 100),
            ));
        }
        Self::from_bps(bps as u16)
    }

    pub fn slippage_bps(&self) -> u16 {
        self.slippage_bps
    }

    pub fn slippage_pct(&self) -> f64 {
        f64::from(self.slippage_bps) / 100.0
    }
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self { slippage_bps: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, symbol: &str, decimals: &str, supply: &str) -> TokenForm {
        TokenForm {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: decimals.to_string(),
            initial_supply: supply.to_string(),
            description: "A test token".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_valid_form_scales_supply() {
        let request =
            TokenCreationRequest::from_form(&form("Test Token", "TT", "6", "1000")).unwrap();
        assert_eq!(request.name(), "Test Token");
        assert_eq!(request.symbol(), "TT");
        assert_eq!(request.decimals(), 6);
        assert_eq!(request.supply_base_units(), 1_000_000_000);
        assert_eq!(request.image_url(), None);
    }

    #[test]
    fn test_symbol_longer_than_ten_chars_rejected() {
        let err = TokenCreationRequest::from_form(&form("Token", "ABCDEFGHIJK", "6", "1"))
            .unwrap_err();
        match err {
            LaunchpadError::Validation(errors) => {
                assert!(errors.for_field("symbol").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(TokenCreationRequest::from_form(&form("Token", "ABCDEFGHIJ", "6", "1")).is_ok());
    }

    #[test]
    fn test_decimals_out_of_range_rejected() {
        for bad in ["0", "10", "-1", "six", ""] {
            let err = TokenCreationRequest::from_form(&form("Token", "TK", bad, "1")).unwrap_err();
            let LaunchpadError::Validation(errors) = err else {
                panic!("expected validation error");
            };
            assert!(errors.for_field("decimals").is_some(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_all_field_errors_reported_together() {
        let mut f = form("", "", "12", "0");
        f.image_url = "not a url".to_string();
        let LaunchpadError::Validation(errors) = TokenCreationRequest::from_form(&f).unwrap_err()
        else {
            panic!("expected validation error");
        };
        assert!(errors.for_field("name").is_some());
        assert!(errors.for_field("symbol").is_some());
        assert!(errors.for_field("decimals").is_some());
        assert!(errors.for_field("image_url").is_some());
    }

    #[test]
    fn test_zero_and_oversized_supply_rejected() {
        let LaunchpadError::Validation(errors) =
            TokenCreationRequest::from_form(&form("T", "T", "6", "0")).unwrap_err()
        else {
            panic!("expected validation error");
        };
        assert!(errors.for_field("initial_supply").is_some());

        assert!(TokenCreationRequest::from_form(&form("T", "T", "9", "10000000000")).is_err());
        assert!(TokenCreationRequest::from_form(&form("T", "T", "9", "1000000000")).is_ok());
    }

    #[test]
    fn test_image_url_kept_when_valid() {
        let mut f = form("Token", "TK", "9", "5");
        f.image_url = "https://example.com/logo.png".to_string();
        let request = TokenCreationRequest::from_form(&f).unwrap();
        assert_eq!(request.image_url(), Some("https://example.com/logo.png"));
    }

    #[test]
    fn test_popular_tokens_lookup() {
        let tokens = popular_tokens();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].symbol, "SOL");

        let usdc = find_token("usdc").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(find_token(&usdc.mint.to_string()), Some(usdc));
        assert!(find_token("DOGE").is_none());
    }

    #[test]
    fn test_slippage_settings() {
        assert_eq!(SwapSettings::from_percent(0.5).unwrap().slippage_bps(), 50);
        assert_eq!(SwapSettings::from_percent(0.29).unwrap().slippage_bps(), 29);
        assert_eq!(SwapSettings::from_percent(50.0).unwrap().slippage_bps(), 5_000);
        assert!(SwapSettings::from_percent(50.5).is_err());
        assert!(SwapSettings::from_percent(-1.0).is_err());
        assert!(SwapSettings::from_bps(5_001).is_err());
        assert_eq!(SwapSettings::default().slippage_pct(), 0.5);
        for preset in SLIPPAGE_PRESETS_PCT {
            assert!(SwapSettings::from_percent(preset).is_ok());
        }
    }

    #[test]
    fn test_deserialized_slippage_is_bounded() {
        let settings: SwapSettings = serde_json::from_str(r#"{"slippage_bps":300}"#).unwrap();
        assert_eq!(settings.slippage_bps(), 300);

        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<SwapSettings>(&json).unwrap(), settings);

        let err = serde_json::from_str::<SwapSettings>(r#"{"slippage_bps":9000}"#).unwrap_err();
        assert!(err.to_string().contains("slippage"));
    }
}
