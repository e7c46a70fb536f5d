//! ECDSA over secp256k1 on a raw 32-byte digest.
//!
//! The digest is signed as-is (no second hash). Nonces follow RFC 6979, so the
//! same key and digest always give the same signature, and `s` is normalized
//! to the low half of the curve order.

use k256::ecdsa::{
    signature::hazmat::{PrehashSigner, PrehashVerifier},
    Signature, VerifyingKey,
};

use crate::{
    error::AttestError,
    keys::OracleKey,
    types::{EcdsaSignature, Secp256k1Pubkey},
};

pub fn sign_digest(digest: &[u8], key: &OracleKey) -> Result<EcdsaSignature, AttestError> {
    if digest.len() != 32 {
        return Err(AttestError::Crypto(format!(
            "digest must be 32 bytes, got {}",
            digest.len()
        )));
    }
    let signature: Signature = key
        .signing_key()
        .sign_prehash(digest)
        .map_err(|e| AttestError::Crypto(format!("failed to sign digest: {}", e)))?;

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(signature.r().to_bytes().as_slice());
    s.copy_from_slice(signature.s().to_bytes().as_slice());
    Ok(EcdsaSignature { r, s })
}

/// Check `signature` over `digest` against an uncompressed public key.
pub fn verify_digest(
    digest: &[u8; 32],
    signature: &EcdsaSignature,
    pubkey: &Secp256k1Pubkey,
) -> Result<(), AttestError> {
    let verifying_key = VerifyingKey::from_sec1_bytes(&pubkey.to_uncompressed())
        .map_err(|_| AttestError::Crypto("public key is not a valid secp256k1 point".into()))?;
    let signature = Signature::from_slice(&signature.to_bytes())
        .map_err(|_| AttestError::Crypto("signature scalars out of range".into()))?;
    verifying_key
        .verify_prehash(digest, &signature)
        .map_err(|_| AttestError::Crypto("signature does not verify".into()))
}
