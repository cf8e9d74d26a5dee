//! Transport layer
//!
//! Line-oriented TCP plumbing around the protocol: the serving side
//! (accept loop, authentication, dispatch) and the interactive client
//! session. One newline-terminated message per direction per connection;
//! any transport failure aborts only the current connection.

pub mod client;
pub mod server;

pub use client::ClientSession;
pub use server::Server;
