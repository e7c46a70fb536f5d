use serde::{Deserialize, Serialize};

/// Domain separation prefix for the packed attestation message.
pub const DOMAIN_TAG: &str = "BALANCE_AT_BLOCK_V1";

/// Balance-at-block claim, the preimage of the signed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub chain_id: u64,
    pub block_number: u64,
    /// Threshold in wei.
    pub threshold: u128,
    pub nonce: u64,
    /// Balance in wei, observed at `block_number`.
    pub balance: u128,
}

/// Keccak-256 digest of the packed attestation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHash(pub [u8; 32]);

impl MessageHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// Raw secp256k1 ECDSA signature, no recovery byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl EcdsaSignature {
    /// `r || s`, the 64-byte layout the circuit consumes.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 64 {
            return None;
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Some(Self { r, s })
    }
}

/// Affine coordinates of the oracle's uncompressed secp256k1 public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secp256k1Pubkey {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl Secp256k1Pubkey {
    /// SEC1 uncompressed encoding, `0x04 || x || y`.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x);
        out[33..].copy_from_slice(&self.y);
        out
    }
}

/// Private nullifier scalar rendered as a decimal string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierSecret(pub String);

impl NullifierSecret {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NullifierSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NullifierSecret(..)")
    }
}
