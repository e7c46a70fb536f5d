//! `Prover.toml` records consumed by the proving tool.
//!
//! Scalars are rendered as quoted decimal strings and byte arrays as
//! `[b0, b1, ...]`. Key names and this syntax are fixed by the circuit's input
//! template; everything goes through [`ProverRecord::render`].

use std::fmt;

use crate::error::{validation, AttestError};

/// Keys recognized by the circuit input template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProverKey {
    Balance,
    Secret,
    Threshold,
    Nonce,
    BlockNumber,
    ChainId,
    Signature,
    PubKeyX,
    PubKeyY,
    HashedMessage,
}

impl ProverKey {
    pub const ALL: [ProverKey; 10] = [
        ProverKey::Balance,
        ProverKey::Secret,
        ProverKey::Threshold,
        ProverKey::Nonce,
        ProverKey::BlockNumber,
        ProverKey::ChainId,
        ProverKey::Signature,
        ProverKey::PubKeyX,
        ProverKey::PubKeyY,
        ProverKey::HashedMessage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProverKey::Balance => "balance",
            ProverKey::Secret => "secret",
            ProverKey::Threshold => "threshold",
            ProverKey::Nonce => "nonce",
            ProverKey::BlockNumber => "block_number",
            ProverKey::ChainId => "chain_id",
            ProverKey::Signature => "signature",
            ProverKey::PubKeyX => "pub_key_x",
            ProverKey::PubKeyY => "pub_key_y",
            ProverKey::HashedMessage => "hashed_message",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Fixed length for byte-array keys, `None` for scalar keys.
    pub fn byte_len(self) -> Option<usize> {
        match self {
            ProverKey::Signature => Some(64),
            ProverKey::PubKeyX | ProverKey::PubKeyY | ProverKey::HashedMessage => Some(32),
            _ => None,
        }
    }
}

impl fmt::Display for ProverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProverValue {
    /// Non-negative decimal integer.
    Scalar(String),
    Bytes(Vec<u8>),
}

/// Ordered, typed record rendered once into `Prover.toml` text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProverRecord {
    entries: Vec<(ProverKey, ProverValue)>,
}

impl ProverRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for the unsigned variant: balance, threshold and nonce only.
    pub fn unsigned(balance: u128, threshold: u128, nonce: u64) -> Self {
        let mut record = Self::new();
        record.entries.push((ProverKey::Balance, ProverValue::Scalar(balance.to_string())));
        record.entries.push((ProverKey::Threshold, ProverValue::Scalar(threshold.to_string())));
        record.entries.push((ProverKey::Nonce, ProverValue::Scalar(nonce.to_string())));
        record
    }

    /// Append a scalar. `value` must render as an unsigned decimal.
    pub fn push_scalar(
        &mut self,
        key: ProverKey,
        value: impl fmt::Display,
    ) -> Result<(), AttestError> {
        if key.byte_len().is_some() {
            return Err(AttestError::Format(format!("{} is a byte-array key", key)));
        }
        let value = value.to_string();
        validation::require_decimal(key.name(), &value)
            .map_err(|e| AttestError::Format(e.to_string()))?;
        self.insert(key, ProverValue::Scalar(value))
    }

    /// Append a byte array, rejecting anything but the key's fixed length.
    pub fn push_bytes(&mut self, key: ProverKey, bytes: &[u8]) -> Result<(), AttestError> {
        let expected = key
            .byte_len()
            .ok_or_else(|| AttestError::Format(format!("{} is a scalar key", key)))?;
        validation::require_len(key.name(), bytes, expected)?;
        self.insert(key, ProverValue::Bytes(bytes.to_vec()))
    }

    fn insert(&mut self, key: ProverKey, value: ProverValue) -> Result<(), AttestError> {
        if self.get(key).is_some() {
            return Err(AttestError::Format(format!("duplicate key {}", key)));
        }
        self.entries.push((key, value));
        Ok(())
    }

    pub fn get(&self, key: ProverKey) -> Option<&ProverValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn scalar(&self, key: ProverKey) -> Option<&str> {
        match self.get(key)? {
            ProverValue::Scalar(s) => Some(s),
            ProverValue::Bytes(_) => None,
        }
    }

    pub fn bytes(&self, key: ProverKey) -> Option<&[u8]> {
        match self.get(key)? {
            ProverValue::Bytes(b) => Some(b),
            ProverValue::Scalar(_) => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = ProverKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| match value {
                ProverValue::Scalar(s) => format!("{} = \"{}\"\n", key, s),
                ProverValue::Bytes(b) => format!("{} = {}\n", key, render_byte_array(b)),
            })
            .collect()
    }

    /// Parse a `Prover.toml` document.
    ///
    /// Any valid TOML is accepted (comments, multi-line arrays, trailing
    /// commas), but scalars must still be quoted decimals and byte arrays
    /// must have their key's fixed length.
    pub fn parse(text: &str) -> Result<Self, AttestError> {
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| AttestError::Format(format!("invalid Prover.toml: {}", e)))?;

        let mut record = Self::new();
        for (name, value) in &table {
            let key = ProverKey::from_name(name)
                .ok_or_else(|| AttestError::Format(format!("unrecognized key {}", name)))?;
            match key.byte_len() {
                Some(_) => record.push_bytes(key, &byte_array(key, value)?)?,
                None => {
                    let value = value.as_str().ok_or_else(|| {
                        AttestError::Format(format!("{}: expected a quoted decimal", key))
                    })?;
                    record.push_scalar(key, value)?;
                }
            }
        }
        Ok(record)
    }
}

/// `[1, 2, 3]`
pub fn render_byte_array(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(u8::to_string).collect();
    format!("[{}]", items.join(", "))
}

fn byte_array(key: ProverKey, value: &toml::Value) -> Result<Vec<u8>, AttestError> {
    let items = value
        .as_array()
        .ok_or_else(|| AttestError::Format(format!("{}: expected a byte array", key)))?;
    items
        .iter()
        .map(|item| {
            item.as_integer()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| AttestError::Format(format!("{}: invalid byte value {}", key, item)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_render() {
        let record = ProverRecord::unsigned(500_000_000_000_000_000, 100_000_000_000_000_000, 42);
        assert_eq!(
            record.render(),
            "balance = \"500000000000000000\"\n\
             threshold = \"100000000000000000\"\n\
             nonce = \"42\"\n"
        );
    }

    #[test]
    fn test_byte_array_syntax() {
        assert_eq!(render_byte_array(&[0, 1, 255]), "[0, 1, 255]");
        assert_eq!(render_byte_array(&[]), "[]");
    }

    #[test]
    fn test_parse_byte_values() {
        let record = ProverRecord::parse(&format!("pub_key_x = [{}255 ]\n", "0,".repeat(31))).unwrap();
        assert_eq!(record.bytes(ProverKey::PubKeyX).unwrap()[31], 255);

        let bad = |raw: &str| ProverRecord::parse(&format!("pub_key_x = {}\n", raw)).is_err();
        assert!(bad(&format!("[{}256]", "0, ".repeat(31))));
        assert!(bad(&format!("[{}-1]", "0, ".repeat(31))));
        assert!(bad(&format!("[{}\"1\"]", "0, ".repeat(31))));
        assert!(bad("[1,,2]"));
        assert!(bad("\"0x00\""));
    }

    #[test]
    fn test_push_bytes_enforces_length() {
        let mut record = ProverRecord::new();
        assert!(matches!(
            record.push_bytes(ProverKey::HashedMessage, &[0u8; 31]),
            Err(AttestError::Format(_))
        ));
        assert!(matches!(
            record.push_bytes(ProverKey::Signature, &[0u8; 65]),
            Err(AttestError::Format(_))
        ));
        assert!(matches!(
            record.push_bytes(ProverKey::Balance, &[0u8; 32]),
            Err(AttestError::Format(_))
        ));
        record.push_bytes(ProverKey::Signature, &[7u8; 64]).unwrap();
        assert_eq!(record.bytes(ProverKey::Signature).unwrap(), &[7u8; 64][..]);
    }

    #[test]
    fn test_push_scalar_rejects_non_decimal() {
        let mut record = ProverRecord::new();
        assert!(record.push_scalar(ProverKey::Nonce, "-1").is_err());
        assert!(record.push_scalar(ProverKey::PubKeyX, 1).is_err());
        record.push_scalar(ProverKey::Nonce, 1u64).unwrap();
        assert!(matches!(
            record.push_scalar(ProverKey::Nonce, 2u64),
            Err(AttestError::Format(_))
        ));
    }

    #[test]
    fn test_parse_round_trip() {
        let mut record = ProverRecord::new();
        record.push_scalar(ProverKey::Balance, 5u8).unwrap();
        record.push_scalar(ProverKey::ChainId, 1u8).unwrap();
        record.push_bytes(ProverKey::PubKeyX, &[3u8; 32]).unwrap();
        let parsed = ProverRecord::parse(&record.render()).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(
            parsed.keys().collect::<Vec<_>>(),
            vec![ProverKey::Balance, ProverKey::ChainId, ProverKey::PubKeyX]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!(ProverRecord::parse("owner = \"1\"\n").is_err());
        assert!(ProverRecord::parse("balance = 1\n").is_err());
        assert!(ProverRecord::parse("balance\n").is_err());
        assert!(ProverRecord::parse("balance = \"1\"\nbalance = \"2\"\n").is_err());
        assert!(ProverRecord::parse("hashed_message = [1, 2]\n").is_err());
        assert!(ProverRecord::parse("nonce = \"-3\"\n").is_err());
    }

    #[test]
    fn test_parse_accepts_reformatted_toml() {
        let text = format!(
            "# signed inputs\n\
             nonce = \"42\" # fixed\n\
             balance = '7'\n\
             hashed_message = [\n  {}\n  9,\n]\n",
            "1, ".repeat(31)
        );
        let record = ProverRecord::parse(&text).unwrap();
        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec![ProverKey::Nonce, ProverKey::Balance, ProverKey::HashedMessage]
        );
        assert_eq!(record.scalar(ProverKey::Nonce), Some("42"));
        assert_eq!(record.scalar(ProverKey::Balance), Some("7"));
        let hashed = record.bytes(ProverKey::HashedMessage).unwrap();
        assert_eq!(hashed.len(), 32);
        assert_eq!(hashed[31], 9);
    }
}
