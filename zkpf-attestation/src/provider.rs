//! Chain-data provider seam.
//!
//! Independent reads are issued concurrently; any failure aborts the whole
//! fetch.

use async_trait::async_trait;
use num_bigint::BigUint;
use tracing::info;

use crate::{address::Address, error::AttestError};

/// Block selector for balance reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

/// Read-only access to account and chain state.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Account balance in wei (u256 on the wire).
    async fn balance(&self, address: &Address, block: BlockTag) -> Result<BigUint, AttestError>;

    async fn block_number(&self) -> Result<u64, AttestError>;

    async fn chain_id(&self) -> Result<u64, AttestError>;
}

#[async_trait]
impl<P: ChainDataProvider + ?Sized> ChainDataProvider for std::sync::Arc<P> {
    async fn balance(&self, address: &Address, block: BlockTag) -> Result<BigUint, AttestError> {
        (**self).balance(address, block).await
    }

    async fn block_number(&self) -> Result<u64, AttestError> {
        (**self).block_number().await
    }

    async fn chain_id(&self) -> Result<u64, AttestError> {
        (**self).chain_id().await
    }
}

/// Live state an attestation is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainState {
    pub balance: u128,
    pub block_number: u64,
    pub chain_id: u64,
}

/// Narrow a u256 balance to the circuit's u128 field.
pub fn balance_to_u128(balance: &BigUint) -> Result<u128, AttestError> {
    u128::try_from(balance).map_err(|_| {
        AttestError::Range(format!("balance {} wei exceeds u128", balance))
    })
}

/// Fetch balance, block number and chain id.
///
/// Block number and chain id are read concurrently, then the balance is read
/// at exactly that height so the attested pair always refers to one block.
/// With `block_override` the block number is not queried and the balance and
/// chain id reads run concurrently.
pub async fn fetch_chain_state<P>(
    provider: &P,
    address: &Address,
    block_override: Option<u64>,
) -> Result<ChainState, AttestError>
where
    P: ChainDataProvider + ?Sized,
{
    let (balance, block_number, chain_id) = match block_override {
        Some(height) => {
            let (balance, chain_id) = tokio::try_join!(
                provider.balance(address, BlockTag::Number(height)),
                provider.chain_id(),
            )?;
            (balance, height, chain_id)
        }
        None => {
            let (height, chain_id) =
                tokio::try_join!(provider.block_number(), provider.chain_id())?;
            let balance = provider.balance(address, BlockTag::Number(height)).await?;
            (balance, height, chain_id)
        }
    };

    let balance = balance_to_u128(&balance)?;
    info!(
        %address,
        balance = %balance,
        block_number,
        chain_id,
        "fetched chain state"
    );
    Ok(ChainState {
        balance,
        block_number,
        chain_id,
    })
}

/// Fetch only the latest balance (unsigned variant).
pub async fn fetch_balance<P>(provider: &P, address: &Address) -> Result<u128, AttestError>
where
    P: ChainDataProvider + ?Sized,
{
    let balance = provider.balance(address, BlockTag::Latest).await?;
    balance_to_u128(&balance)
}
