//! Decimal ether amounts to wei.

use crate::error::{AttestError, ValidationError};

/// Decimals of the base unit (wei per ether = 10^18).
pub const ETHER_DECIMALS: usize = 18;

/// Threshold used when the caller supplies none.
pub const DEFAULT_THRESHOLD: &str = "0.1";

/// Convert a human ether amount such as `"0.1"` into wei.
///
/// At most 18 fractional digits are accepted; amounts of 2^128 wei or more
/// are a [`AttestError::Range`].
pub fn parse_ether(value: &str) -> Result<u128, AttestError> {
    let malformed = || {
        ValidationError::new("threshold", "expected a non-negative decimal amount")
            .with_value(value)
            .into_error()
    };

    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(malformed());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }
    if frac_part.len() > ETHER_DECIMALS {
        return Err(ValidationError::new("threshold", "more than 18 decimal places")
            .with_value(value)
            .into_error());
    }

    let overflow = || AttestError::Range(format!("threshold {} ether exceeds u128 wei", value));

    let mut wei: u128 = 0;
    for digit in int_part.bytes().chain(frac_part.bytes()) {
        wei = wei
            .checked_mul(10)
            .and_then(|w| w.checked_add(u128::from(digit - b'0')))
            .ok_or_else(overflow)?;
    }
    let scale = 10u128.pow((ETHER_DECIMALS - frac_part.len()) as u32);
    wei.checked_mul(scale).ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ether_values() {
        assert_eq!(parse_ether("0.1").unwrap(), 100_000_000_000_000_000);
        assert_eq!(parse_ether("1").unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(parse_ether(".5").unwrap(), 500_000_000_000_000_000);
        assert_eq!(parse_ether("2.").unwrap(), 2_000_000_000_000_000_000);
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), 1);
        assert_eq!(parse_ether("0").unwrap(), 0);
        assert_eq!(parse_ether(DEFAULT_THRESHOLD).unwrap(), 100_000_000_000_000_000);
    }

    #[test]
    fn test_parse_ether_malformed() {
        for bad in ["", ".", "-1", "+1", "1e18", "1.2.3", " 1", "abc", "0.0000000000000000001"] {
            assert!(
                matches!(parse_ether(bad), Err(AttestError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_ether_u128_boundary() {
        // u128::MAX wei = 340282366920938463463.374607431768211455 ether
        assert_eq!(
            parse_ether("340282366920938463463.374607431768211455").unwrap(),
            u128::MAX
        );
        assert!(matches!(
            parse_ether("340282366920938463463.374607431768211456"),
            Err(AttestError::Range(_))
        ));
        assert!(matches!(
            parse_ether("1000000000000000000000"),
            Err(AttestError::Range(_))
        ));
    }
}
