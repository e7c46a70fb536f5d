use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use num_bigint::BigUint;
use once_cell::sync::OnceCell;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use zkpf_attestation::{
    sign_attestation, Address, AttestError, Attestation, BlockTag, ChainDataProvider, FixedClock,
    OracleKey, SignedClaim,
};

/// Deterministic oracle key, the scalar 0x0707...07.
pub const ORACLE_KEY_HEX: &str =
    "0x0707070707070707070707070707070707070707070707070707070707070707";
pub const SCENARIO_ADDRESS: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const SCENARIO_CHAIN_ID: u64 = 1;
pub const SCENARIO_BLOCK: u64 = 18_000_000;
/// 0.1 ether in wei.
pub const SCENARIO_THRESHOLD: u128 = 100_000_000_000_000_000;
pub const SCENARIO_NONCE: u64 = 42;
/// 0.5 ether in wei.
pub const SCENARIO_BALANCE: u128 = 500_000_000_000_000_000;
pub const FIXED_UNIX: u64 = 1_700_000_000;
const RNG_SEED: u64 = 0x5eed;

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// Signed scenario claim and its rendered `Prover.toml`, shared across tests.
pub struct TestFixtures {
    claim: SignedClaim,
    prover_toml: String,
}

impl TestFixtures {
    pub fn claim(&self) -> &SignedClaim {
        &self.claim
    }

    pub fn prover_toml(&self) -> &str {
        &self.prover_toml
    }
}

/// Return lazily constructed test fixtures.
pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(|| build_fixtures().expect("failed to build attestation fixtures"))
}

fn build_fixtures() -> Result<TestFixtures> {
    let claim = sign_attestation(scenario_attestation(), &oracle_key(), &mut seeded_rng())
        .context("sign scenario attestation")?;
    let prover_toml = claim
        .prover_record()
        .context("build prover record")?
        .render();
    Ok(TestFixtures { claim, prover_toml })
}

pub fn oracle_key() -> OracleKey {
    OracleKey::from_hex(ORACLE_KEY_HEX).expect("fixture key is a valid scalar")
}

pub fn scenario_address() -> Address {
    Address::parse(SCENARIO_ADDRESS).expect("fixture address is well formed")
}

pub fn scenario_attestation() -> Attestation {
    Attestation {
        chain_id: SCENARIO_CHAIN_ID,
        block_number: SCENARIO_BLOCK,
        threshold: SCENARIO_THRESHOLD,
        nonce: SCENARIO_NONCE,
        balance: SCENARIO_BALANCE,
    }
}

pub fn seeded_rng() -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(RNG_SEED)
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(FIXED_UNIX)
}

/// Which read a [`StaticChainProvider`] should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailingCall {
    Balance,
    BlockNumber,
    ChainId,
}

/// In-memory provider with call accounting and failure injection.
pub struct StaticChainProvider {
    balance: BigUint,
    block_number: u64,
    chain_id: u64,
    failing: Option<FailingCall>,
    calls: AtomicUsize,
    balance_tags: Mutex<Vec<BlockTag>>,
}

impl StaticChainProvider {
    pub fn new(balance: impl Into<BigUint>, block_number: u64, chain_id: u64) -> Self {
        Self {
            balance: balance.into(),
            block_number,
            chain_id,
            failing: None,
            calls: AtomicUsize::new(0),
            balance_tags: Mutex::new(Vec::new()),
        }
    }

    /// Provider answering with the scenario's chain state.
    pub fn scenario() -> Self {
        Self::new(SCENARIO_BALANCE, SCENARIO_BLOCK, SCENARIO_CHAIN_ID)
    }

    pub fn failing(mut self, call: FailingCall) -> Self {
        self.failing = Some(call);
        self
    }

    /// Total reads served or refused.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Block tags the balance was requested at, in call order.
    pub fn balance_tags(&self) -> Vec<BlockTag> {
        self.balance_tags.lock().expect("tags lock").clone()
    }

    fn check(&self, call: FailingCall) -> Result<(), AttestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some(call) {
            return Err(AttestError::ExternalService(format!("{:?} unavailable", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainDataProvider for StaticChainProvider {
    async fn balance(&self, _address: &Address, block: BlockTag) -> Result<BigUint, AttestError> {
        self.balance_tags.lock().expect("tags lock").push(block);
        self.check(FailingCall::Balance)?;
        Ok(self.balance.clone())
    }

    async fn block_number(&self) -> Result<u64, AttestError> {
        self.check(FailingCall::BlockNumber)?;
        Ok(self.block_number)
    }

    async fn chain_id(&self) -> Result<u64, AttestError> {
        self.check(FailingCall::ChainId)?;
        Ok(self.chain_id)
    }
}
