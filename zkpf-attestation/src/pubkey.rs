use k256::ecdsa::VerifyingKey;

use crate::{error::AttestError, keys::OracleKey, types::Secp256k1Pubkey};

/// SEC1 tag of an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Derive the oracle's public key and split it into x and y.
pub fn derive_pubkey(key: &OracleKey) -> Result<Secp256k1Pubkey, AttestError> {
    let verifying_key = VerifyingKey::from(key.signing_key());
    let encoded = verifying_key.to_encoded_point(false);
    split_uncompressed(encoded.as_bytes())
}

/// Split `0x04 || x || y` into its coordinates.
pub fn split_uncompressed(bytes: &[u8]) -> Result<Secp256k1Pubkey, AttestError> {
    match bytes.first() {
        Some(&UNCOMPRESSED_TAG) => {}
        Some(tag) => {
            return Err(AttestError::Format(format!(
                "expected uncompressed public key (0x04 prefix), got 0x{:02x}",
                tag
            )))
        }
        None => return Err(AttestError::Format("empty public key encoding".into())),
    }
    if bytes.len() != 65 {
        return Err(AttestError::Format(format!(
            "uncompressed public key must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(&bytes[1..33]);
    y.copy_from_slice(&bytes[33..65]);
    Ok(Secp256k1Pubkey { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_point() {
        // secret scalar 1 maps to the curve generator G
        let mut one = [0u8; 32];
        one[31] = 1;
        let key = OracleKey::from_slice(&one).unwrap();
        let pubkey = derive_pubkey(&key).unwrap();
        assert_eq!(
            hex::encode(pubkey.x),
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(pubkey.y),
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn test_round_trips_through_uncompressed() {
        let key = OracleKey::from_slice(&[9u8; 32]).unwrap();
        let pubkey = derive_pubkey(&key).unwrap();
        assert_eq!(split_uncompressed(&pubkey.to_uncompressed()).unwrap(), pubkey);
    }

    #[test]
    fn test_compressed_encoding_rejected() {
        let key = OracleKey::from_slice(&[9u8; 32]).unwrap();
        let compressed = VerifyingKey::from(key.signing_key()).to_encoded_point(true);
        assert!(matches!(
            split_uncompressed(compressed.as_bytes()),
            Err(AttestError::Format(_))
        ));
        assert!(matches!(split_uncompressed(&[]), Err(AttestError::Format(_))));
        assert!(matches!(
            split_uncompressed(&[0x04; 64]),
            Err(AttestError::Format(_))
        ));
    }
}
