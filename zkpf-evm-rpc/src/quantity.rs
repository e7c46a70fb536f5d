//! Ethereum JSON-RPC hex quantities (`"0x1a"`).

use num_bigint::BigUint;
use zkpf_attestation::AttestError;

fn digits<'a>(field: &str, value: &'a str) -> Result<&'a str, AttestError> {
    let digits = value.strip_prefix("0x").ok_or_else(|| {
        AttestError::ExternalService(format!("{}: quantity missing 0x prefix: {:?}", field, value))
    })?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AttestError::ExternalService(format!(
            "{}: malformed hex quantity {:?}",
            field, value
        )));
    }
    Ok(digits.trim_start_matches('0'))
}

pub fn parse_quantity_u64(field: &str, value: &str) -> Result<u64, AttestError> {
    let significant = digits(field, value)?;
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > 16 {
        return Err(AttestError::ExternalService(format!(
            "{}: quantity {} exceeds u64",
            field, value
        )));
    }
    u64::from_str_radix(significant, 16)
        .map_err(|e| AttestError::ExternalService(format!("{}: {}", field, e)))
}

pub fn parse_quantity_u256(field: &str, value: &str) -> Result<BigUint, AttestError> {
    let significant = digits(field, value)?;
    if significant.len() > 64 {
        return Err(AttestError::ExternalService(format!(
            "{}: quantity {} exceeds u256",
            field, value
        )));
    }
    if significant.is_empty() {
        return Ok(BigUint::default());
    }
    BigUint::parse_bytes(significant.as_bytes(), 16).ok_or_else(|| {
        AttestError::ExternalService(format!("{}: malformed hex quantity {:?}", field, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_quantities() {
        assert_eq!(parse_quantity_u64("n", "0x0").unwrap(), 0);
        assert_eq!(parse_quantity_u64("n", "0x1").unwrap(), 1);
        assert_eq!(parse_quantity_u64("n", "0x112a880").unwrap(), 18_000_000);
        assert_eq!(parse_quantity_u64("n", "0xffffffffffffffff").unwrap(), u64::MAX);
        assert_eq!(parse_quantity_u64("n", "0x00000000000000000001").unwrap(), 1);
        assert!(parse_quantity_u64("n", "0x10000000000000000").is_err());
        assert!(parse_quantity_u64("n", "0x").is_err());
        assert!(parse_quantity_u64("n", "12").is_err());
        assert!(parse_quantity_u64("n", "0xzz").is_err());
    }

    #[test]
    fn test_u256_quantities() {
        assert_eq!(
            parse_quantity_u256("b", "0x6f05b59d3b20000").unwrap(),
            BigUint::from(500_000_000_000_000_000u128)
        );
        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(
            parse_quantity_u256("b", &max).unwrap(),
            (BigUint::from(1u8) << 256) - 1u8
        );
        assert!(parse_quantity_u256("b", &format!("0x1{}", "0".repeat(64))).is_err());
        assert_eq!(parse_quantity_u256("b", "0x0").unwrap(), BigUint::default());
    }
}
