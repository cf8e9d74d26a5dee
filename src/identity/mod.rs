//! Self-certifying identity
//!
//! RSA keypair generation, identifier derivation and the sign/verify
//! primitives that authenticate every remote operation. The identifier is
//! derived solely from the public key, so any peer can check it without a
//! trusted registry.

pub mod keypair;
pub mod prime;

pub use keypair::{
    authenticate, derive_identifier, sign_message, verify_signature, Keypair,
};
pub use prime::{is_probable_prime, random_prime, MIN_PRIME_BITS};
