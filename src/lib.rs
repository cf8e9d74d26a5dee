//! # Signet Ledger
//!
//! A proof-of-work-protected hash chain served to remote callers over an
//! RSA-authenticated request/response protocol.
//!
//! ## What's Here
//! - **Hash chain**: append-mostly ledger with per-record proof of work,
//!   full-chain validation, deliberate corruption and in-place repair
//! - **Self-certifying identity**: RSA keypairs whose identifier anyone
//!   can recompute from the public key alone, plus sign/verify for every
//!   remote operation
//! - **Request protocol**: six operation codes, canonical signed messages,
//!   JSON wire types with fixed key names
//! - **Transport**: line-oriented TCP server (one request per connection)
//!   and a menu-driven client session
//!
//! ## Layout
//! - `core/`: records, mining, the ledger and its validation/repair logic
//! - `identity/`: prime search, keypair generation, identifiers, signatures
//! - `protocol/`: canonical messages and request/response wire types
//! - `network/`: TCP server and interactive client
//! - `config/`: env-var-backed settings
//! - `utils/`: digest and timestamp helpers
//! - `cli/`: command-line parsing
//!
//! The ledger lives in memory for the lifetime of the serving process;
//! there is no persistence and no multi-writer story beyond the server's
//! single mutex.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod network;
pub mod protocol;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use core::{hash_target, hashes_per_second, ChainAudit, ChainFault, HashRecord, Ledger};
pub use error::{ChainError, Result};
pub use identity::{authenticate, derive_identifier, sign_message, verify_signature, Keypair};
pub use network::{ClientSession, Server};
pub use protocol::{Operation, Request};
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
