//! Packed attestation encoding.
//!
//! Layout (no length prefixes, no padding):
//!   domain tag (UTF-8) || chain_id (8) || block_number (8) || threshold (16)
//!   || nonce (8) || balance (16)
//! All integers are big-endian. Any independent verifier recomputes exactly
//! these bytes, so field order and width must not change.

use crate::types::{Attestation, DOMAIN_TAG};

/// Length of the packed message in bytes.
pub const PACKED_LEN: usize = DOMAIN_TAG.len() + 8 + 8 + 16 + 8 + 16;

pub fn encode_packed(attestation: &Attestation) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(PACKED_LEN);

    encoded.extend_from_slice(DOMAIN_TAG.as_bytes());
    // uint64 chain_id
    encoded.extend_from_slice(&attestation.chain_id.to_be_bytes());
    // uint64 block_number
    encoded.extend_from_slice(&attestation.block_number.to_be_bytes());
    // uint128 threshold
    encoded.extend_from_slice(&attestation.threshold.to_be_bytes());
    // uint64 nonce
    encoded.extend_from_slice(&attestation.nonce.to_be_bytes());
    // uint128 balance
    encoded.extend_from_slice(&attestation.balance.to_be_bytes());

    encoded
}
