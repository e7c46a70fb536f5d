use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use crate::{error::AttestError, types::NullifierSecret};

/// Bytes of entropy in a nullifier secret. 31 bytes keep the value below any
/// ~254-bit proving field modulus.
pub const SECRET_BYTES: usize = 31;

/// Draw a fresh nullifier secret as a big-endian integer in decimal.
pub fn generate_secret<R: RngCore + CryptoRng>(rng: &mut R) -> Result<NullifierSecret, AttestError> {
    let mut bytes = [0u8; SECRET_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| AttestError::Fatal(format!("random source unavailable: {}", e)))?;
    let secret = BigUint::from_bytes_be(&bytes).to_str_radix(10);
    Ok(NullifierSecret(secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_secret_is_decimal_below_2_248() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let bound = BigUint::from(1u8) << 248;
        for _ in 0..64 {
            let secret = generate_secret(&mut rng).unwrap();
            assert!(secret.as_str().bytes().all(|b| b.is_ascii_digit()));
            let value: BigUint = secret.as_str().parse().unwrap();
            assert!(value < bound);
        }
    }

    #[test]
    fn test_secret_is_seed_dependent() {
        let a = generate_secret(&mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        let b = generate_secret(&mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        let c = generate_secret(&mut ChaCha20Rng::seed_from_u64(2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
