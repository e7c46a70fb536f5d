//! Environment configuration.

use std::{env, path::PathBuf};

use zkpf_attestation::{AttestError, OracleKey};
use zkpf_evm_rpc::DEFAULT_RPC_URL;

pub const DEFAULT_PROVER_TOML: &str = "Prover.toml";

/// Settings read from the environment (after `.env` is loaded).
#[derive(Clone)]
pub struct AttestConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Option<String>,
    /// Hex secp256k1 scalar used to sign attestations.
    oracle_private_key: Option<String>,
    /// Where the prover input is written.
    pub prover_toml: PathBuf,
}

impl AttestConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            rpc_url: non_empty("RPC_URL"),
            oracle_private_key: non_empty("ORACLE_PRIVATE_KEY"),
            prover_toml: non_empty("ZKPF_PROVER_TOML")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROVER_TOML)),
        }
    }

    /// Flag, then `RPC_URL`, then the local node.
    pub fn rpc_url_or_default(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.rpc_url.clone())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string())
    }

    /// Flag, then `RPC_URL`; the signed flow refuses to guess.
    pub fn require_rpc_url(&self, flag: Option<&str>) -> Result<String, AttestError> {
        flag.map(str::to_string)
            .or_else(|| self.rpc_url.clone())
            .ok_or_else(|| AttestError::Configuration("set RPC_URL or pass --rpc-url".into()))
    }

    pub fn oracle_key(&self) -> Result<OracleKey, AttestError> {
        let hex = self
            .oracle_private_key
            .as_deref()
            .ok_or_else(|| AttestError::Configuration("set ORACLE_PRIVATE_KEY".into()))?;
        OracleKey::from_hex(hex)
    }
}

impl std::fmt::Debug for AttestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestConfig")
            .field("rpc_url", &self.rpc_url)
            .field("oracle_private_key", &self.oracle_private_key.as_ref().map(|_| ".."))
            .field("prover_toml", &self.prover_toml)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AttestConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AttestConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.rpc_url_or_default(None), DEFAULT_RPC_URL);
        assert_eq!(cfg.prover_toml, PathBuf::from("Prover.toml"));
        assert!(matches!(
            cfg.require_rpc_url(None),
            Err(AttestError::Configuration(_))
        ));
        assert!(matches!(cfg.oracle_key(), Err(AttestError::Configuration(_))));
    }

    #[test]
    fn test_flag_overrides_env() {
        let cfg = config(&[("RPC_URL", "http://env:8545"), ("ZKPF_PROVER_TOML", "out.toml")]);
        assert_eq!(cfg.rpc_url_or_default(None), "http://env:8545");
        assert_eq!(cfg.require_rpc_url(Some("http://flag")).unwrap(), "http://flag");
        assert_eq!(cfg.prover_toml, PathBuf::from("out.toml"));
    }

    #[test]
    fn test_blank_values_are_missing() {
        let cfg = config(&[("RPC_URL", "  "), ("ORACLE_PRIVATE_KEY", "")]);
        assert!(cfg.require_rpc_url(None).is_err());
        assert!(matches!(cfg.oracle_key(), Err(AttestError::Configuration(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let key = "11".repeat(32);
        let cfg = config(&[("ORACLE_PRIVATE_KEY", key.as_str())]);
        assert!(cfg.oracle_key().is_ok());
        assert!(!format!("{:?}", cfg).contains(&key));
    }
}
