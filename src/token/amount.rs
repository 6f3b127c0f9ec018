//! Decimal UI amount to integer base-unit conversion
//!
//! Amounts arrive as user-typed decimal strings. Scaling is done on the digit
//! string, never through floating point, so `1000` at 6 decimals is exactly
//! `1_000_000_000` and `1e9` at 9 decimals is exactly `1e18`.

use crate::errors::{LaunchpadError, LaunchpadResult};

/// Largest number of decimals a token may carry
pub const MAX_DECIMALS: u8 = 9;

/// Base-unit amounts are bounded by the signed 64-bit range
pub const MAX_BASE_UNITS: u64 = i64::MAX as u64;

/// How to treat fractional digits beyond the token's decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Drop extra digits (swap amounts)
    Floor,
    /// Round half up on the first dropped digit (minted supply)
    Nearest,
}

/// Convert a decimal string such as `"1.5"` into base units.
///
/// Errors are reported as `Validation` against the `amount` field.
pub fn ui_amount_to_base_units(
    amount: &str,
    decimals: u8,
    rounding: Rounding,
) -> LaunchpadResult<u64> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(LaunchpadError::validation("amount", "is required"));
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(LaunchpadError::validation("amount", "is not a number"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(LaunchpadError::validation(
            "amount",
            format!("'{}' is not a plain decimal number", amount),
        ));
    }

    let decimals = decimals as usize;
    let kept = &fraction[..fraction.len().min(decimals)];
    let round_up = match rounding {
        Rounding::Floor => false,
        Rounding::Nearest => fraction
            .as_bytes()
            .get(decimals)
            .is_some_and(|digit| *digit >= b'5'),
    };

    let overflow = || {
        LaunchpadError::validation("amount", "exceeds the signed 64-bit base-unit range")
    };

    let mut units: u128 = 0;
    for digit in whole.bytes().chain(kept.bytes()) {
        units = units
            .checked_mul(10)
            .and_then(|u| u.checked_add(u128::from(digit - b'0')))
            .filter(|u| *u <= u128::from(MAX_BASE_UNITS))
            .ok_or_else(overflow)?;
    }
    // Pad the fraction with zeros up to `decimals`
    for _ in kept.len()..decimals {
        units = units
            .checked_mul(10)
            .filter(|u| *u <= u128::from(MAX_BASE_UNITS))
            .ok_or_else(overflow)?;
    }
    if round_up {
        units += 1;
    }
    if units > u128::from(MAX_BASE_UNITS) {
        return Err(overflow());
    }

    Ok(units as u64)
}

/// Display conversion for amounts returned by the network (e.g. quote output)
pub fn base_units_to_ui(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10f64.powi(i32::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_whole_supply_scales_by_decimals() {
        assert_eq!(
            ui_amount_to_base_units("1000", 6, Rounding::Nearest).unwrap(),
            1_000_000_000
        );
    }

    #[test]
    fn test_fractional_swap_amount() {
        assert_eq!(
            ui_amount_to_base_units("1.5", 9, Rounding::Floor).unwrap(),
            1_500_000_000
        );
        assert_eq!(
            ui_amount_to_base_units(".25", 2, Rounding::Floor).unwrap(),
            25
        );
        assert_eq!(ui_amount_to_base_units("3.", 1, Rounding::Floor).unwrap(), 30);
    }

    #[test]
    fn test_rounding_modes_on_extra_digits() {
        assert_eq!(ui_amount_to_base_units("1.2345", 2, Rounding::Floor).unwrap(), 123);
        assert_eq!(ui_amount_to_base_units("1.2350", 2, Rounding::Nearest).unwrap(), 124);
        assert_eq!(ui_amount_to_base_units("1.2349", 2, Rounding::Nearest).unwrap(), 123);
    }

    #[test]
    fn test_billion_supply_at_nine_decimals_fits() {
        assert_eq!(
            ui_amount_to_base_units("1000000000", 9, Rounding::Nearest).unwrap(),
            1_000_000_000_000_000_000
        );
    }

    #[test]
    fn test_overflow_is_rejected() {
        let err = ui_amount_to_base_units("10000000000", 9, Rounding::Nearest).unwrap_err();
        assert!(matches!(err, LaunchpadError::Validation(_)));
        assert!(ui_amount_to_base_units("9223372036854775807", 0, Rounding::Floor).is_ok());
        assert!(ui_amount_to_base_units("9223372036854775808", 0, Rounding::Floor).is_err());
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        for bad in ["", "  ", ".", "-1", "+1", "1e9", "1.2.3", "abc", "1,5"] {
            assert!(
                ui_amount_to_base_units(bad, 6, Rounding::Floor).is_err(),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_base_units_to_ui() {
        assert_eq!(base_units_to_ui(1_500_000, 6), 1.5);
        assert_eq!(base_units_to_ui(0, 9), 0.0);
    }

    proptest! {
        #[test]
        fn prop_whole_numbers_scale_exactly(supply in 1u64..=1_000_000_000, decimals in 1u8..=MAX_DECIMALS) {
            let units = ui_amount_to_base_units(&supply.to_string(), decimals, Rounding::Nearest).unwrap();
            prop_assert_eq!(units, supply * 10u64.pow(u32::from(decimals)));
        }

        #[test]
        fn prop_floor_never_exceeds_nearest(whole in 0u32..1_000_000, frac in 0u32..1_000_000_000, decimals in 1u8..=MAX_DECIMALS) {
            let s = format!("{}.{:09}", whole, frac);
            let floor = ui_amount_to_base_units(&s, decimals, Rounding::Floor).unwrap();
            let nearest = ui_amount_to_base_units(&s, decimals, Rounding::Nearest).unwrap();
            prop_assert!(nearest == floor || nearest == floor + 1);
        }
    }
}
