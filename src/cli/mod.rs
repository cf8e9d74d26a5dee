//! Command-line interface
//!
//! Argument parsing for the two entry points: serving the ledger and
//! running an interactive client session against it.

pub mod commands;

pub use commands::{Command, Opt};
