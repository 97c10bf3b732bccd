use alloy::primitives::U256;

/// Fractional digits kept for token balances.
pub const TOKEN_DISPLAY_DECIMALS: usize = 6;

/// Render a raw token amount as a decimal string.
///
/// The fractional part is truncated (not rounded) to six digits and trailing
/// zeros are dropped; when nothing is left only the whole part is printed.
/// Amounts smaller than one millionth of a unit therefore render as `"0"`.
pub fn format_token(value: U256, decimals: u8) -> String {
    format_units(value, decimals, Some(TOKEN_DISPLAY_DECIMALS))
}

/// Render a native balance at full precision, trailing zeros dropped.
pub fn format_native(value: U256, decimals: u8) -> String {
    format_units(value, decimals, None)
}

fn format_units(value: U256, decimals: u8, max_fraction: Option<usize>) -> String {
    let decimals = decimals as usize;
    // 10^78 overflows U256; no real token gets anywhere near that.
    let Some(divisor) = U256::from(10u8).checked_pow(U256::from(decimals)) else {
        return "0".to_string();
    };
    let whole = value / divisor;
    let rem = value % divisor;

    let rem = rem.to_string();
    let mut frac = format!("{rem:0>decimals$}");
    if let Some(max) = max_fraction {
        frac.truncate(max);
    }
    let frac = frac.trim_end_matches('0');

    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pow10(d: u8) -> U256 {
        U256::from(10u8).pow(U256::from(d))
    }

    #[test]
    fn test_format_token_examples() {
        assert_eq!(format_token(U256::from(1_500_000_000_000_000_000u128), 18), "1.5");
        assert_eq!(format_token(U256::from(5_000_000u64), 6), "5");
        assert_eq!(format_token(U256::from(2_000_000_000_000_000_000u128), 18), "2");
    }

    #[test]
    fn test_sub_precision_amount_is_zero() {
        assert_eq!(format_token(U256::from(1u8), 18), "0");
        assert_eq!(format_token(U256::from(999_999_999_999u64), 18), "0");
        assert_eq!(format_token(U256::from(1_000_000_000_000u64), 18), "0.000001");
    }

    #[test]
    fn test_boundaries_for_common_decimals() {
        for d in [0u8, 6, 8, 18] {
            let one = pow10(d);
            assert_eq!(format_token(U256::ZERO, d), "0", "d={d}");
            assert_eq!(format_token(one, d), "1", "d={d}");
            let plus = one + U256::from(123_456_789u64);
            let expected = match d {
                0 => "123456790".to_string(),
                6 => "124.456789".to_string(),
                8 => "2.234567".to_string(),
                _ => "1".to_string(),
            };
            assert_eq!(format_token(plus, d), expected, "d={d}");
        }
        assert_eq!(format_token(U256::from(1u8), 0), "1");
        assert_eq!(format_token(U256::from(1u8), 6), "0.000001");
        assert_eq!(format_token(U256::from(1u8), 8), "0");
        assert_eq!(format_token(pow10(6) - U256::from(1u8), 6), "0.999999");
        assert_eq!(format_token(pow10(8) - U256::from(1u8), 8), "0.999999");
        assert_eq!(format_token(pow10(18) - U256::from(1u8), 18), "0.999999");
    }

    #[test]
    fn test_native_keeps_full_precision() {
        assert_eq!(format_native(U256::from(1u8), 18), "0.000000000000000001");
        assert_eq!(format_native(U256::from(2_000_000_000_000_000_000u128), 18), "2");
        assert_eq!(
            format_native(U256::from(12_345_678_900_000_000_000u128), 18),
            "12.3456789"
        );
    }

    proptest! {
        #[test]
        fn formatted_token_never_exceeds_six_fraction_digits(raw in any::<u128>(), d in 0u8..=30) {
            let s = format_token(U256::from(raw), d);
            if let Some((_, frac)) = s.split_once('.') {
                prop_assert!(frac.len() <= TOKEN_DISPLAY_DECIMALS);
                prop_assert!(!frac.ends_with('0'));
            }
        }

        #[test]
        fn whole_part_matches_integer_division(raw in any::<u128>(), d in 0u8..=30) {
            let s = format_token(U256::from(raw), d);
            let whole = s.split('.').next().unwrap().to_string();
            prop_assert_eq!(whole, (U256::from(raw) / pow10(d)).to_string());
        }
    }
}
