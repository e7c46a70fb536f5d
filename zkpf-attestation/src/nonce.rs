//! 64-bit attestation nonces.
//!
//! An auto-generated nonce packs the low 32 bits of the unix time into the high
//! half and XORs a fresh 32-bit random word into the low half. The result is
//! never zero.

use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::{
    entropy::Clock,
    error::{validation, AttestError, ValidationError},
};

/// Parse a caller-supplied nonce. `"0"` means "not supplied".
pub fn parse_explicit_nonce(value: &str) -> Result<Option<u64>, AttestError> {
    let value = value.trim();
    validation::require_decimal("nonce", value)?;
    let nonce: u64 = value.parse().map_err(|_| {
        ValidationError::new("nonce", "does not fit in 64 bits")
            .with_value(value)
            .into_error()
    })?;
    Ok((nonce > 0).then_some(nonce))
}

/// Produces non-zero nonces from an injected clock and random source.
pub struct NonceGenerator<C, R> {
    clock: C,
    rng: R,
}

impl<C: Clock, R: RngCore + CryptoRng> NonceGenerator<C, R> {
    pub fn new(clock: C, rng: R) -> Self {
        Self { clock, rng }
    }

    /// Return `explicit` unchanged when it is non-zero, otherwise derive one.
    ///
    /// Derivation reads exactly one 32-bit word from the random source.
    pub fn generate(&mut self, explicit: Option<u64>) -> Result<u64, AttestError> {
        if let Some(nonce) = explicit.filter(|n| *n > 0) {
            debug!("using explicit nonce");
            return Ok(nonce);
        }

        let mut word = [0u8; 4];
        self.rng
            .try_fill_bytes(&mut word)
            .map_err(|e| AttestError::Fatal(format!("random source unavailable: {}", e)))?;
        let rand = u64::from(u32::from_be_bytes(word));
        let time_high = (self.clock.unix_seconds() & 0xffff_ffff) << 32;

        let nonce = time_high ^ rand;
        debug!("derived nonce from clock and random word");
        Ok(if nonce == 0 { 1 } else { nonce })
    }

    /// Release the random source, e.g. to reuse it for the nullifier secret.
    pub fn into_rng(self) -> R {
        self.rng
    }
}
