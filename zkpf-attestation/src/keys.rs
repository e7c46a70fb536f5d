//! Oracle signing key.

use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use crate::error::{validation, AttestError, ValidationError};

/// secp256k1 secret scalar used to sign attestations.
///
/// The wrapped key zeroizes on drop. Callers hand it to [`crate::signer`] and
/// [`crate::pubkey`] explicitly; it is never kept in process-wide state.
pub struct OracleKey {
    signing_key: SigningKey,
}

impl OracleKey {
    /// Parse a 32-byte hex scalar, with or without a `0x`/`0X` prefix.
    pub fn from_hex(value: &str) -> Result<Self, AttestError> {
        let digits = value.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        validation::require_hex("oracle key", digits)?;
        if digits.len() != 64 {
            return Err(ValidationError::new("oracle key", "expected 64 hex characters")
                .with_value(digits.len())
                .into_error());
        }
        let bytes = Zeroizing::new(
            hex::decode(digits).map_err(|e| AttestError::Validation(format!("oracle key: {}", e)))?,
        );
        Self::from_slice(&bytes)
    }

    /// Build from raw big-endian scalar bytes. Zero or >= n is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AttestError> {
        if bytes.len() != 32 {
            return Err(AttestError::Crypto(format!(
                "secret key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| AttestError::Crypto("secret key is not a valid secp256k1 scalar".into()))?;
        Ok(Self { signing_key })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for OracleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OracleKey(..)")
    }
}
