use crate::error::{ChainError, Result};
use num_bigint::{BigUint, RandBigInt};
use rand::Rng;

/// Primes below this width would make the RSA modulus too small to hold
/// the 33-byte digest integer produced by signing.
pub const MIN_PRIME_BITS: u64 = 136;

/// Small odd primes for the trial-division pre-filter.
const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Generate a random probable prime of exactly `bits` bits.
///
/// The top bit is forced so that the product of two such primes has the
/// full double width, and the low bit is forced to keep candidates odd.
/// The returned number is composite with probability at most 2^-certainty.
pub fn random_prime(bits: u64, certainty: u32) -> Result<BigUint> {
    if bits < MIN_PRIME_BITS {
        return Err(ChainError::KeyGeneration(format!(
            "Prime width {bits} below minimum of {MIN_PRIME_BITS} bits"
        )));
    }

    let mut rng = rand::thread_rng();
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);

        if is_probable_prime(&candidate, certainty, &mut rng) {
            return Ok(candidate);
        }
    }
}

/// Miller-Rabin probabilistic primality test with trial division first.
///
/// Each witness round cuts the error probability by a factor of at least 4,
/// so `certainty` bits of confidence need ceil(certainty / 2) rounds.
pub fn is_probable_prime<R: Rng>(n: &BigUint, certainty: u32, rng: &mut R) -> bool {
    let one = BigUint::from(1u32);
    let two = BigUint::from(2u32);

    if *n < BigUint::from(4u32) {
        return *n >= two;
    }
    if !n.bit(0) {
        return false;
    }

    for &small in SMALL_PRIMES.iter() {
        let small = BigUint::from(small);
        if *n == small {
            return true;
        }
        if (n % &small) == BigUint::from(0u32) {
            return false;
        }
    }

    // Write n-1 as 2^s * d with d odd
    let n_minus_one = n - &one;
    let s = n_minus_one
        .trailing_zeros()
        .expect("n-1 is nonzero for n >= 4");
    let d = &n_minus_one >> s;

    let rounds = certainty.div_ceil(2);
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_small_primes_pass() {
        let mut rng = rand::thread_rng();
        for p in [2u32, 3, 5, 31, 127, 257, 65537] {
            assert!(
                is_probable_prime(&BigUint::from(p), 40, &mut rng),
                "{p} should test prime"
            );
        }
    }

    #[test]
    fn test_known_composites_fail() {
        let mut rng = rand::thread_rng();
        // 67591 = 257 * 263 slips past the trial-division filter
        for c in [1u32, 4, 561, 65535, 67591] {
            assert!(
                !is_probable_prime(&BigUint::from(c), 40, &mut rng),
                "{c} should test composite"
            );
        }
    }

    #[test]
    fn test_random_prime_has_requested_width() {
        let prime = random_prime(160, 20).unwrap();
        assert_eq!(prime.bits(), 160);
        assert!(prime.bit(0));
    }

    #[test]
    fn test_random_prime_rejects_narrow_widths() {
        assert!(random_prime(64, 20).is_err());
    }
}
