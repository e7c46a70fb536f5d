//! Error types for the attestation pipeline.
//!
//! Every stage reports through [`AttestError`]; nothing is retried internally and
//! the caller decides how to surface the failure.

use thiserror::Error;

/// Aggregated error type for attestation construction and signing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttestError {
    /// Malformed caller input (address, nonce, threshold, key encoding).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Required secret material or endpoint is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value does not fit its declared fixed width.
    #[error("out of range: {0}")]
    Range(String),

    /// Unexpected byte length or encoding.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid secret scalar or signing input.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Chain-data read failed.
    #[error("chain rpc error: {0}")]
    ExternalService(String),

    /// The secure random source is unavailable.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl AttestError {
    /// Get a machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            AttestError::Validation(_) => "VALIDATION_ERROR",
            AttestError::Configuration(_) => "CONFIGURATION_ERROR",
            AttestError::Range(_) => "RANGE_ERROR",
            AttestError::Format(_) => "FORMAT_ERROR",
            AttestError::Crypto(_) => "CRYPTO_ERROR",
            AttestError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AttestError::Fatal(_) => "FATAL_ERROR",
        }
    }
}

/// Field-scoped validation error builder.
pub struct ValidationError {
    field: String,
    message: String,
    value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Attach the offending value to the message.
    pub fn with_value(mut self, value: impl std::fmt::Display) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn into_error(self) -> AttestError {
        let msg = if let Some(value) = self.value {
            format!("{}: {} (got: {})", self.field, self.message, value)
        } else {
            format!("{}: {}", self.field, self.message)
        };
        AttestError::Validation(msg)
    }
}

/// Common checks shared by the parsers.
pub mod validation {
    use super::*;

    /// Require a slice to have exactly `expected` bytes.
    pub fn require_len(field: &str, bytes: &[u8], expected: usize) -> Result<(), AttestError> {
        if bytes.len() != expected {
            return Err(AttestError::Format(format!(
                "{}: expected {} bytes, got {}",
                field,
                expected,
                bytes.len()
            )));
        }
        Ok(())
    }

    /// Require a non-empty string made only of ASCII hex digits.
    pub fn require_hex(field: &str, value: &str) -> Result<(), AttestError> {
        if value.is_empty() {
            return Err(ValidationError::new(field, "must not be empty").into_error());
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::new(field, "invalid hex characters")
                .with_value(value)
                .into_error());
        }
        Ok(())
    }

    /// Require a non-empty string made only of ASCII decimal digits.
    pub fn require_decimal(field: &str, value: &str) -> Result<(), AttestError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(field, "expected an unsigned decimal integer")
                .with_value(value)
                .into_error());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AttestError::Range("x".into()).error_code(), "RANGE_ERROR");
        assert_eq!(AttestError::Format("x".into()).error_code(), "FORMAT_ERROR");
        assert_eq!(
            AttestError::ExternalService("x".into()).error_code(),
            "EXTERNAL_SERVICE_ERROR"
        );
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::new("nonce", "not a u64").with_value("abc").into_error();
        assert_eq!(err.to_string(), "invalid input: nonce: not a u64 (got: abc)");
    }

    #[test]
    fn test_require_len() {
        assert!(validation::require_len("hash", &[0u8; 32], 32).is_ok());
        assert!(matches!(
            validation::require_len("hash", &[0u8; 31], 32),
            Err(AttestError::Format(_))
        ));
    }

    #[test]
    fn test_require_hex_and_decimal() {
        assert!(validation::require_hex("addr", "deadBEEF").is_ok());
        assert!(validation::require_hex("addr", "0xzz").is_err());
        assert!(validation::require_hex("addr", "").is_err());
        assert!(validation::require_decimal("nonce", "42").is_ok());
        assert!(validation::require_decimal("nonce", "-1").is_err());
        assert!(validation::require_decimal("nonce", "").is_err());
    }
}
