//! Request/response protocol
//!
//! Canonical message construction per operation code and the wire types
//! exchanged with the transport layer: one JSON object per line, one
//! request and one response per connection. Dispatch is stateless; an
//! accepted request performs exactly one ledger operation.

pub mod message;
pub mod response;

pub use message::{Operation, Request};
pub use response::{
    CorruptResponse, ErrorResponse, RecordView, StatusResponse, TimedResponse, VerifyResponse,
    ViewChainResponse, GENERIC_REJECTION,
};
