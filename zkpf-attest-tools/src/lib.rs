//! Commands behind the `zkpf-attest` binary.
//!
//! Each command computes everything in memory first and writes its artifact
//! last, so a failure anywhere leaves no output behind.

pub mod config;

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::{CryptoRng, RngCore};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;
use zkpf_attestation::{
    build_signed, build_unsigned, derive_pubkey, parse_ether, parse_explicit_nonce, verify_claim,
    Address, AttestError, Attestation, ChainDataProvider, ClaimRequest, Clock, OracleKey,
    ProverRecord, SignedClaim, UnsignedClaim, DEFAULT_THRESHOLD,
};

/// Turn positional CLI strings into a typed request.
pub fn claim_request(
    address: &str,
    threshold: Option<&str>,
    nonce: Option<&str>,
    block_override: Option<u64>,
) -> Result<ClaimRequest, AttestError> {
    let address = Address::parse(address)?;
    let threshold = parse_ether(threshold.unwrap_or(DEFAULT_THRESHOLD))?;
    let nonce = match nonce {
        Some(raw) => parse_explicit_nonce(raw)?,
        None => None,
    };
    Ok(ClaimRequest {
        address,
        threshold,
        nonce,
        block_override,
    })
}

/// Unsigned variant: write `balance`, `threshold` and `nonce`.
pub async fn fetch_command<P, C, R>(
    provider: &P,
    request: &ClaimRequest,
    output: &Path,
    clock: C,
    rng: R,
) -> Result<ClaimSummary>
where
    P: ChainDataProvider + ?Sized,
    C: Clock,
    R: RngCore + CryptoRng,
{
    let claim = build_unsigned(provider, request, clock, rng).await?;
    write_prover_toml(output, &claim.prover_record())?;
    Ok(ClaimSummary::unsigned(&request.address, output, &claim))
}

/// Signed variant: write the full signed claim.
pub async fn sign_command<P, C, R>(
    provider: &P,
    key: &OracleKey,
    request: &ClaimRequest,
    output: &Path,
    clock: C,
    rng: R,
) -> Result<ClaimSummary>
where
    P: ChainDataProvider + ?Sized,
    C: Clock,
    R: RngCore + CryptoRng,
{
    let claim = build_signed(provider, key, request, clock, rng).await?;
    let record = claim.prover_record()?;
    write_prover_toml(output, &record)?;
    Ok(ClaimSummary::signed(&request.address, output, &claim))
}

/// Re-check a written signed `Prover.toml`.
pub fn verify_command(input: &Path) -> Result<Attestation> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let record = ProverRecord::parse(&text)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let attestation = verify_claim(&record)
        .with_context(|| format!("{} does not carry a valid attestation", input.display()))?;
    Ok(attestation)
}

pub fn export_pubkey(key: &OracleKey) -> Result<PubkeySummary> {
    let pubkey = derive_pubkey(key)?;
    Ok(PubkeySummary {
        pubkey_uncompressed: format!("0x{}", hex::encode(pubkey.to_uncompressed())),
        pubkey_x: format!("0x{}", hex::encode(pubkey.x)),
        pubkey_y: format!("0x{}", hex::encode(pubkey.y)),
    })
}

/// Write `record` next to `path` and rename it into place, so readers only
/// ever see the previous file or the complete new one.
pub fn write_prover_toml(path: &Path, record: &ProverRecord) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to stage output in {}", dir.display()))?;
    staged
        .write_all(record.render().as_bytes())
        .with_context(|| format!("failed to write {}", staged.path().display()))?;
    staged
        .as_file()
        .sync_all()
        .with_context(|| format!("failed to flush {}", staged.path().display()))?;
    staged
        .persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), "prover input written");
    Ok(())
}

/// Printable outcome of `fetch` / `sign`.
#[derive(Debug, Serialize)]
pub struct ClaimSummary {
    pub output: PathBuf,
    pub address: String,
    pub balance: String,
    pub threshold: String,
    pub nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_message: Option<String>,
}

impl ClaimSummary {
    fn unsigned(address: &Address, output: &Path, claim: &UnsignedClaim) -> Self {
        Self {
            output: output.to_path_buf(),
            address: address.to_string(),
            balance: claim.balance.to_string(),
            threshold: claim.threshold.to_string(),
            nonce: claim.nonce.to_string(),
            block_number: None,
            chain_id: None,
            hashed_message: None,
        }
    }

    fn signed(address: &Address, output: &Path, claim: &SignedClaim) -> Self {
        let att = &claim.attestation;
        Self {
            output: output.to_path_buf(),
            address: address.to_string(),
            balance: att.balance.to_string(),
            threshold: att.threshold.to_string(),
            nonce: att.nonce.to_string(),
            block_number: Some(att.block_number),
            chain_id: Some(att.chain_id),
            hashed_message: Some(claim.message_hash.to_hex()),
        }
    }
}

impl fmt::Display for ClaimSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} written", self.output.display())?;
        writeln!(f, "address: {}", self.address)?;
        writeln!(f, "balance: {}", self.balance)?;
        writeln!(f, "threshold: {}", self.threshold)?;
        write!(f, "nonce: {}", self.nonce)?;
        if let Some(block_number) = self.block_number {
            write!(f, "\nblock_number: {}", block_number)?;
        }
        if let Some(chain_id) = self.chain_id {
            write!(f, "\nchain_id: {}", chain_id)?;
        }
        if let Some(hash) = &self.hashed_message {
            write!(f, "\nhashed_message: {}", hash)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PubkeySummary {
    pub pubkey_uncompressed: String,
    pub pubkey_x: String,
    pub pubkey_y: String,
}

impl fmt::Display for PubkeySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pubkey_uncompressed: {}", self.pubkey_uncompressed)?;
        writeln!(f, "pubkey_x: {}", self.pubkey_x)?;
        write!(f, "pubkey_y: {}", self.pubkey_y)
    }
}

#[derive(Debug, Serialize)]
pub struct VerifySummary {
    pub input: PathBuf,
    pub attestation: Attestation,
}

impl fmt::Display for VerifySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let att = &self.attestation;
        writeln!(f, "{}: signature valid", self.input.display())?;
        writeln!(f, "chain_id: {}", att.chain_id)?;
        writeln!(f, "block_number: {}", att.block_number)?;
        writeln!(f, "balance: {}", att.balance)?;
        writeln!(f, "threshold: {}", att.threshold)?;
        write!(f, "nonce: {}", att.nonce)
    }
}
