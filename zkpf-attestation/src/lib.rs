//! Signed balance-at-block attestations for the zk proof-of-funds circuit.
//!
//! The pipeline packs `(chain_id, block_number, threshold, nonce, balance)`
//! behind a domain tag, hashes it with Keccak-256, signs the digest with the
//! oracle's secp256k1 key and renders everything the circuit needs into a
//! `Prover.toml` record.

pub mod address;
pub mod encoding;
pub mod entropy;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod nonce;
pub mod pipeline;
pub mod provider;
pub mod prover_toml;
pub mod pubkey;
pub mod secret;
pub mod signer;
pub mod types;
pub mod units;

pub use address::Address;
pub use encoding::{encode_packed, PACKED_LEN};
pub use entropy::{Clock, FixedClock, SystemClock};
pub use error::AttestError;
pub use hashing::{keccak256, message_hash};
pub use keys::OracleKey;
pub use nonce::{parse_explicit_nonce, NonceGenerator};
pub use pipeline::{
    build_signed, build_unsigned, sign_attestation, verify_claim, ClaimRequest, SignedClaim,
    UnsignedClaim,
};
pub use provider::{
    balance_to_u128, fetch_balance, fetch_chain_state, BlockTag, ChainDataProvider, ChainState,
};
pub use prover_toml::{render_byte_array, ProverKey, ProverRecord, ProverValue};
pub use pubkey::{derive_pubkey, split_uncompressed};
pub use secret::{generate_secret, SECRET_BYTES};
pub use signer::{sign_digest, verify_digest};
pub use types::{
    Attestation, EcdsaSignature, MessageHash, NullifierSecret, Secp256k1Pubkey, DOMAIN_TAG,
};
pub use units::{parse_ether, DEFAULT_THRESHOLD};
