//! End-to-end construction of prover inputs.
//!
//! Both variants are all-or-nothing: a [`ProverRecord`] exists only once every
//! stage has succeeded, so a partial artifact can never be rendered.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use crate::{
    address::Address,
    encoding::encode_packed,
    entropy::Clock,
    error::AttestError,
    hashing::keccak256,
    keys::OracleKey,
    nonce::NonceGenerator,
    provider::{fetch_balance, fetch_chain_state, ChainDataProvider, ChainState},
    prover_toml::{ProverKey, ProverRecord},
    pubkey::derive_pubkey,
    secret::generate_secret,
    signer::{sign_digest, verify_digest},
    types::{Attestation, EcdsaSignature, MessageHash, NullifierSecret, Secp256k1Pubkey},
};

/// Caller parameters for one invocation.
#[derive(Clone, Debug)]
pub struct ClaimRequest {
    pub address: Address,
    /// Threshold in wei.
    pub threshold: u128,
    /// Explicit non-zero nonce; `None` derives one.
    pub nonce: Option<u64>,
    /// Read the balance at this height instead of the latest block.
    pub block_override: Option<u64>,
}

/// Output of the unsigned variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedClaim {
    pub balance: u128,
    pub threshold: u128,
    pub nonce: u64,
}

impl UnsignedClaim {
    pub fn prover_record(&self) -> ProverRecord {
        ProverRecord::unsigned(self.balance, self.threshold, self.nonce)
    }
}

/// Every typed intermediate of the signed variant.
#[derive(Clone, Debug)]
pub struct SignedClaim {
    pub attestation: Attestation,
    pub packed: Vec<u8>,
    pub message_hash: MessageHash,
    pub signature: EcdsaSignature,
    pub pubkey: Secp256k1Pubkey,
    pub secret: NullifierSecret,
}

impl SignedClaim {
    /// Record in the field order the signed circuit template expects.
    pub fn prover_record(&self) -> Result<ProverRecord, AttestError> {
        let att = &self.attestation;
        let mut record = ProverRecord::new();
        record.push_scalar(ProverKey::Balance, att.balance)?;
        record.push_scalar(ProverKey::Secret, self.secret.as_str())?;
        record.push_scalar(ProverKey::Threshold, att.threshold)?;
        record.push_scalar(ProverKey::Nonce, att.nonce)?;
        record.push_scalar(ProverKey::BlockNumber, att.block_number)?;
        record.push_scalar(ProverKey::ChainId, att.chain_id)?;
        record.push_bytes(ProverKey::Signature, &self.signature.to_bytes())?;
        record.push_bytes(ProverKey::PubKeyX, &self.pubkey.x)?;
        record.push_bytes(ProverKey::PubKeyY, &self.pubkey.y)?;
        record.push_bytes(ProverKey::HashedMessage, self.message_hash.as_bytes())?;
        Ok(record)
    }
}

/// Hash, sign and decorate an already-assembled attestation.
pub fn sign_attestation<R: RngCore + CryptoRng>(
    attestation: Attestation,
    key: &OracleKey,
    rng: &mut R,
) -> Result<SignedClaim, AttestError> {
    let packed = encode_packed(&attestation);
    let message_hash = MessageHash(keccak256(&packed));
    debug!(hash = %message_hash.to_hex(), "computed attestation message hash");

    let signature = sign_digest(message_hash.as_bytes(), key)?;
    let pubkey = derive_pubkey(key)?;
    let secret = generate_secret(rng)?;

    Ok(SignedClaim {
        attestation,
        packed,
        message_hash,
        signature,
        pubkey,
        secret,
    })
}

/// Signed variant: fetch chain state, build the attestation and sign it.
pub async fn build_signed<P, C, R>(
    provider: &P,
    key: &OracleKey,
    request: &ClaimRequest,
    clock: C,
    rng: R,
) -> Result<SignedClaim, AttestError>
where
    P: ChainDataProvider + ?Sized,
    C: Clock,
    R: RngCore + CryptoRng,
{
    let mut nonces = NonceGenerator::new(clock, rng);
    let nonce = nonces.generate(request.nonce)?;
    let mut rng = nonces.into_rng();

    let ChainState {
        balance,
        block_number,
        chain_id,
    } = fetch_chain_state(provider, &request.address, request.block_override).await?;

    let attestation = Attestation {
        chain_id,
        block_number,
        threshold: request.threshold,
        nonce,
        balance,
    };
    let claim = sign_attestation(attestation, key, &mut rng)?;
    info!(
        block_number,
        chain_id,
        hash = %claim.message_hash.to_hex(),
        "signed balance attestation"
    );
    Ok(claim)
}

/// Unsigned variant: balance, threshold and nonce only.
pub async fn build_unsigned<P, C, R>(
    provider: &P,
    request: &ClaimRequest,
    clock: C,
    rng: R,
) -> Result<UnsignedClaim, AttestError>
where
    P: ChainDataProvider + ?Sized,
    C: Clock,
    R: RngCore + CryptoRng,
{
    let nonce = NonceGenerator::new(clock, rng).generate(request.nonce)?;
    let balance = fetch_balance(provider, &request.address).await?;
    info!(address = %request.address, balance = %balance, "fetched balance");
    Ok(UnsignedClaim {
        balance,
        threshold: request.threshold,
        nonce,
    })
}

/// Re-derive the hash of a signed record and check its signature.
///
/// Returns the attestation the record commits to.
pub fn verify_claim(record: &ProverRecord) -> Result<Attestation, AttestError> {
    let attestation = Attestation {
        chain_id: scalar_u64(record, ProverKey::ChainId)?,
        block_number: scalar_u64(record, ProverKey::BlockNumber)?,
        threshold: scalar_u128(record, ProverKey::Threshold)?,
        nonce: scalar_u64(record, ProverKey::Nonce)?,
        balance: scalar_u128(record, ProverKey::Balance)?,
    };

    let expected = keccak256(&encode_packed(&attestation));
    let hashed = fixed_bytes::<32>(record, ProverKey::HashedMessage)?;
    if hashed != expected {
        return Err(AttestError::Crypto(
            "hashed_message does not match the packed attestation fields".into(),
        ));
    }

    let signature = EcdsaSignature::from_slice(required_bytes(record, ProverKey::Signature)?)
        .ok_or_else(|| AttestError::Format("signature must be 64 bytes".into()))?;
    let pubkey = Secp256k1Pubkey {
        x: fixed_bytes::<32>(record, ProverKey::PubKeyX)?,
        y: fixed_bytes::<32>(record, ProverKey::PubKeyY)?,
    };
    verify_digest(&expected, &signature, &pubkey)?;
    Ok(attestation)
}

fn required_scalar(record: &ProverRecord, key: ProverKey) -> Result<&str, AttestError> {
    record
        .scalar(key)
        .ok_or_else(|| AttestError::Format(format!("missing {}", key)))
}

fn required_bytes(record: &ProverRecord, key: ProverKey) -> Result<&[u8], AttestError> {
    record
        .bytes(key)
        .ok_or_else(|| AttestError::Format(format!("missing {}", key)))
}

fn fixed_bytes<const N: usize>(record: &ProverRecord, key: ProverKey) -> Result<[u8; N], AttestError> {
    required_bytes(record, key)?
        .try_into()
        .map_err(|_| AttestError::Format(format!("{} must be {} bytes", key, N)))
}

fn scalar_u64(record: &ProverRecord, key: ProverKey) -> Result<u64, AttestError> {
    let value = scalar_big(record, key)?;
    u64::try_from(&value).map_err(|_| AttestError::Range(format!("{} {} exceeds u64", key, value)))
}

fn scalar_u128(record: &ProverRecord, key: ProverKey) -> Result<u128, AttestError> {
    let value = scalar_big(record, key)?;
    u128::try_from(&value).map_err(|_| AttestError::Range(format!("{} {} exceeds u128", key, value)))
}

fn scalar_big(record: &ProverRecord, key: ProverKey) -> Result<BigUint, AttestError> {
    let raw = required_scalar(record, key)?;
    raw.parse::<BigUint>()
        .map_err(|_| AttestError::Format(format!("{}: invalid decimal {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn scenario() -> Attestation {
        Attestation {
            chain_id: 1,
            block_number: 18_000_000,
            threshold: 100_000_000_000_000_000,
            nonce: 42,
            balance: 500_000_000_000_000_000,
        }
    }

    fn oracle() -> OracleKey {
        OracleKey::from_slice(&[7u8; 32]).unwrap()
    }

    #[test]
    fn test_signed_record_order() {
        let claim =
            sign_attestation(scenario(), &oracle(), &mut ChaCha20Rng::seed_from_u64(0)).unwrap();
        let record = claim.prover_record().unwrap();
        let keys: Vec<_> = record.keys().map(ProverKey::name).collect();
        assert_eq!(
            keys,
            [
                "balance",
                "secret",
                "threshold",
                "nonce",
                "block_number",
                "chain_id",
                "signature",
                "pub_key_x",
                "pub_key_y",
                "hashed_message"
            ]
        );
        let text = record.render();
        assert!(text.starts_with("balance = \"500000000000000000\"\n"));
        assert!(text.contains("block_number = \"18000000\"\n"));
    }

    #[test]
    fn test_verify_claim_accepts_rendered_record() {
        let claim =
            sign_attestation(scenario(), &oracle(), &mut ChaCha20Rng::seed_from_u64(0)).unwrap();
        let parsed = ProverRecord::parse(&claim.prover_record().unwrap().render()).unwrap();
        assert_eq!(verify_claim(&parsed).unwrap(), scenario());
    }

    #[test]
    fn test_verify_claim_detects_tampering() {
        let claim =
            sign_attestation(scenario(), &oracle(), &mut ChaCha20Rng::seed_from_u64(0)).unwrap();
        let text = claim.prover_record().unwrap().render();

        let bumped = text.replace("balance = \"500000000000000000\"", "balance = \"500000000000000001\"");
        let record = ProverRecord::parse(&bumped).unwrap();
        assert!(matches!(verify_claim(&record), Err(AttestError::Crypto(_))));

        let mut other = sign_attestation(
            Attestation { nonce: 43, ..scenario() },
            &oracle(),
            &mut ChaCha20Rng::seed_from_u64(0),
        )
        .unwrap();
        other.message_hash = claim.message_hash;
        other.attestation = claim.attestation;
        let forged = other.prover_record().unwrap();
        assert!(matches!(verify_claim(&forged), Err(AttestError::Crypto(_))));
    }

    #[test]
    fn test_verify_claim_missing_field() {
        let record = ProverRecord::unsigned(1, 1, 1);
        assert!(matches!(verify_claim(&record), Err(AttestError::Format(_))));
    }
}
