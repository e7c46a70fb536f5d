//! Ethereum JSON-RPC chain-data provider.
//!
//! Implements [`ChainDataProvider`] with `eth_getBalance`, `eth_blockNumber`
//! and `eth_chainId`. Failures are reported once and never retried.

mod quantity;

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use num_bigint::BigUint;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;
use zkpf_attestation::{Address, AttestError, BlockTag, ChainDataProvider};

pub use quantity::{parse_quantity_u256, parse_quantity_u64};

/// Endpoint used by the unsigned flow when none is configured.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC 2.0 client over HTTP.
pub struct EvmRpcClient {
    rpc_url: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl EvmRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self, AttestError> {
        let url = Url::parse(rpc_url).map_err(|e| {
            AttestError::Configuration(format!("invalid RPC URL {:?}: {}", rpc_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AttestError::Configuration(format!(
                "unsupported RPC URL scheme {:?}",
                url.scheme()
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AttestError::Configuration(format!("http client: {}", e)))?;

        Ok(Self {
            rpc_url: url,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.rpc_url
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, AttestError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "json-rpc request");

        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| AttestError::ExternalService(format!("{}: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttestError::ExternalService(format!(
                "{}: http status {}",
                method, status
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AttestError::ExternalService(format!("{}: invalid response: {}", method, e)))?;

        if let Some(error) = json.get("error") {
            return Err(AttestError::ExternalService(format!("{}: {}", method, error)));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| AttestError::ExternalService(format!("{}: missing result", method)))
    }

    async fn call_quantity(&self, method: &str, params: Value) -> Result<String, AttestError> {
        match self.rpc_call(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(AttestError::ExternalService(format!(
                "{}: expected hex quantity, got {}",
                method, other
            ))),
        }
    }
}

fn block_param(block: BlockTag) -> String {
    match block {
        BlockTag::Latest => "latest".to_string(),
        BlockTag::Number(n) => format!("0x{:x}", n),
    }
}

#[async_trait]
impl ChainDataProvider for EvmRpcClient {
    async fn balance(&self, address: &Address, block: BlockTag) -> Result<BigUint, AttestError> {
        let raw = self
            .call_quantity(
                "eth_getBalance",
                json!([address.to_string(), block_param(block)]),
            )
            .await?;
        parse_quantity_u256("eth_getBalance", &raw)
    }

    async fn block_number(&self) -> Result<u64, AttestError> {
        let raw = self.call_quantity("eth_blockNumber", json!([])).await?;
        parse_quantity_u64("eth_blockNumber", &raw)
    }

    async fn chain_id(&self) -> Result<u64, AttestError> {
        let raw = self.call_quantity("eth_chainId", json!([])).await?;
        parse_quantity_u64("eth_chainId", &raw)
    }
}
