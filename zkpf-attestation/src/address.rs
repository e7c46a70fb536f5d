use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{validation, AttestError, ValidationError};

/// 20-byte EVM account address. Checksum casing is not enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn parse(value: &str) -> Result<Self, AttestError> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or_else(|| {
                ValidationError::new("address", "missing 0x prefix")
                    .with_value(value)
                    .into_error()
            })?;
        validation::require_hex("address", digits)?;
        if digits.len() != 40 {
            return Err(ValidationError::new("address", "expected 40 hex characters")
                .with_value(digits.len())
                .into_error());
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| AttestError::Validation(format!("address: {}", e)))?;
        Ok(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = AttestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
