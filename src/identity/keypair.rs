use crate::error::{ChainError, Result};
use crate::identity::prime::random_prime;
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use log::info;
use num_bigint::BigUint;

/// Public exponent fixed by convention.
const PUBLIC_EXPONENT: u32 = 65537;

/// The identifier keeps only the least-significant 20 bytes of the 32-byte
/// SHA-256 digest. The truncation is part of the identity scheme; both
/// sides must reproduce it exactly or no request ever authenticates.
const IDENTIFIER_BYTES: usize = 20;

/// An RSA keypair: public exponent `e`, private exponent `d`, modulus `n`.
///
/// Generated once per client session. The identifier derived from the
/// public half is self-certifying: anyone can recompute it from `(e, n)`
/// without a registry.
#[derive(Debug, Clone)]
pub struct Keypair {
    e: BigUint,
    d: BigUint,
    n: BigUint,
}

impl Keypair {
    /// Generate a fresh keypair from two independent random probable primes
    /// of `bits` bits each.
    ///
    /// Fails when the fixed public exponent has no inverse modulo
    /// (p-1)(q-1); the caller retries with freshly generated primes.
    pub fn generate(bits: u64, certainty: u32) -> Result<Keypair> {
        let p = random_prime(bits, certainty)?;
        let q = random_prime(bits, certainty)?;
        if p == q {
            return Err(ChainError::KeyGeneration(
                "Generated primes collided".to_string(),
            ));
        }

        let n = &p * &q;
        let phi = (&p - 1u32) * (&q - 1u32);
        let e = BigUint::from(PUBLIC_EXPONENT);
        let d = e.modinv(&phi).ok_or_else(|| {
            ChainError::KeyGeneration(
                "Public exponent has no inverse modulo phi(n)".to_string(),
            )
        })?;

        info!("Generated RSA keypair with a {}-bit modulus", n.bits());
        Ok(Keypair { e, d, n })
    }

    /// Generate a keypair, retrying on the rare non-invertible draw.
    pub fn generate_with_retry(bits: u64, certainty: u32) -> Result<Keypair> {
        loop {
            match Keypair::generate(bits, certainty) {
                Ok(keypair) => return Ok(keypair),
                Err(ChainError::KeyGeneration(msg)) => {
                    info!("Retrying key generation: {msg}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The self-certifying identifier of this keypair's public half.
    pub fn identifier(&self) -> String {
        derive_identifier(&self.e, &self.n)
    }

    /// Sign `message` with the private half; decimal-string signature.
    pub fn sign(&self, message: &str) -> String {
        sign_message(message, &self.d, &self.n)
    }

    pub fn public_exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }
}

/// Derive the identifier for a public key: hex encoding of the
/// least-significant [`IDENTIFIER_BYTES`] bytes of
/// SHA-256(decimal(e) ++ decimal(n)). Pure function of `(e, n)`.
pub fn derive_identifier(e: &BigUint, n: &BigUint) -> String {
    let combined = format!("{e}{n}");
    let digest = sha256_digest(combined.as_bytes());
    HEXLOWER.encode(&digest[digest.len() - IDENTIFIER_BYTES..])
}

/// The message digest as a non-negative big integer.
///
/// A single zero byte is prepended to the 32-byte SHA-256 digest before
/// the big-endian interpretation, keeping the most significant byte zero.
/// RSA works on non-negative numbers only, and verification recomputes
/// this exact 33-byte layout.
fn digest_integer(message: &str) -> BigUint {
    let digest = sha256_digest(message.as_bytes());
    let mut padded = Vec::with_capacity(digest.len() + 1);
    padded.push(0u8);
    padded.extend_from_slice(&digest);
    BigUint::from_bytes_be(&padded)
}

/// Textbook modular-exponentiation signature: digest-integer^d mod n,
/// rendered as a decimal string. There is no randomized or standardized
/// padding, so callers must not assume resistance to
/// padding-oracle-class attacks.
pub fn sign_message(message: &str, d: &BigUint, n: &BigUint) -> String {
    digest_integer(message).modpow(d, n).to_str_radix(10)
}

/// Verify a decimal-string signature over `message` against `(e, n)`.
pub fn verify_signature(message: &str, signature: &str, e: &BigUint, n: &BigUint) -> bool {
    let signature = match BigUint::parse_bytes(signature.as_bytes(), 10) {
        Some(value) => value,
        None => return false,
    };
    signature.modpow(e, n) == digest_integer(message)
}

/// Authentication decision for an inbound request: the claimed identifier
/// must match the one derived from `(e, n)` and the signature must verify
/// over the canonical message. Both checks collapse into one boolean so a
/// rejected caller cannot tell which half failed.
pub fn authenticate(
    claimed_id: &str,
    e: &BigUint,
    n: &BigUint,
    message: &str,
    signature: &str,
) -> bool {
    derive_identifier(e, n).eq_ignore_ascii_case(claimed_id)
        && verify_signature(message, signature, e, n)
}
