use sha3::{Digest, Keccak256};

use crate::{encoding::encode_packed, types::{Attestation, MessageHash}};

/// Keccak-256 (the pre-NIST padding used by the EVM) of arbitrary bytes.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    Keccak256::digest(bytes).into()
}

/// Hash of the packed attestation, the digest that gets signed.
pub fn message_hash(attestation: &Attestation) -> MessageHash {
    MessageHash(keccak256(&encode_packed(attestation)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_message_hash_matches_packed_digest() {
        let att = Attestation {
            chain_id: 1,
            block_number: 18_000_000,
            threshold: 100_000_000_000_000_000,
            nonce: 42,
            balance: 500_000_000_000_000_000,
        };
        assert_eq!(message_hash(&att).0, keccak256(&encode_packed(&att)));
    }

    #[test]
    fn test_message_hash_binds_every_field() {
        let base = Attestation {
            chain_id: 1,
            block_number: 2,
            threshold: 3,
            nonce: 4,
            balance: 5,
        };
        let h = message_hash(&base);
        let variants = [
            Attestation { chain_id: 9, ..base },
            Attestation { block_number: 9, ..base },
            Attestation { threshold: 9, ..base },
            Attestation { nonce: 9, ..base },
            Attestation { balance: 9, ..base },
        ];
        for v in variants {
            assert_ne!(message_hash(&v), h);
        }
    }
}
