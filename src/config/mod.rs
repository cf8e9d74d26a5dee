//! Configuration management
//!
//! Basic configuration for the ledger node: the listen address and the
//! RSA key generation parameters used by client sessions.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
