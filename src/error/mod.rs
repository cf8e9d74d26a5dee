//! Error handling for the ledger
//!
//! This module provides the error types for all ledger, identity and
//! protocol operations.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Error types for ledger operations
#[derive(Debug, Clone)]
pub enum ChainError {
    /// Cryptographic operation errors (digests, malformed key material)
    Crypto(String),
    /// RSA keypair generation errors; the caller retries with fresh primes
    KeyGeneration(String),
    /// Identity or signature check failed; surfaced to the peer as one
    /// generic rejection with no detail about which check failed
    Authentication,
    /// Target index not present in the ledger
    IndexOutOfRange { index: usize, len: usize },
    /// Required protocol fields missing or not parseable as their type
    MalformedRequest(String),
    /// Ledger operation errors
    Ledger(String),
    /// Network communication errors
    Network(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            ChainError::KeyGeneration(msg) => write!(f, "Key generation error: {msg}"),
            ChainError::Authentication => write!(f, "Authentication failed"),
            ChainError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} out of range for chain of {len} records")
            }
            ChainError::MalformedRequest(msg) => write!(f, "Malformed request: {msg}"),
            ChainError::Ledger(msg) => write!(f, "Ledger error: {msg}"),
            ChainError::Network(msg) => write!(f, "Network error: {msg}"),
            ChainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            ChainError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}
