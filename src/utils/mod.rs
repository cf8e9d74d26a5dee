//! Utility functions and helpers
//!
//! Cryptographic digest helpers and timestamp utilities used throughout
//! the ledger.

pub mod crypto;

pub use crypto::{current_timestamp, sha256_digest, sha256_hex};
