//! Error types for peer identity verification

use thiserror::Error;

/// Main error type for peer identity operations
#[derive(Error, Debug)]
pub enum Error {
    /// The certificate text could not be decoded into DER
    #[error("Certificate decode error: {0}")]
    Decode(String),

    /// The DER bytes are not a structurally valid X.509 certificate
    #[error("Certificate parse error: {0}")]
    Parse(String),

    /// Verifier configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// TLS verifier or trust store construction failed
    #[error("TLS configuration error: {0}")]
    Tls(String),

    /// Network or I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a Decode error with detailed message
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a Parse error with detailed message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a Config error with detailed message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Tls error with detailed message
    pub fn tls(msg: impl Into<String>) -> Self {
        Self::Tls(msg.into())
    }

    /// Whether the error was caused by malformed peer-supplied certificate data
    pub fn is_malformed_certificate(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Parse(_))
    }
}
