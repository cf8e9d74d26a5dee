use crate::core::miner::hash_target;
use crate::error::Result;
use crate::utils::{current_timestamp, sha256_hex};
use num_bigint::BigUint;

/// One entry of the hash chain.
///
/// A record owns its payload, its link to the predecessor, and its
/// proof-of-work fields. It can compute its own digest and mine itself.
/// Outside of the explicit corrupt and repair operations a record is
/// never modified once it is part of a chain.
#[derive(Debug, Clone)]
pub struct HashRecord {
    /// Position on the chain; genesis is at 0
    index: usize,
    /// Hex digest of this record's parent; empty string for genesis
    prev_hash: String,
    /// The record's single transaction text
    payload: String,
    /// Creation time in milliseconds since the Unix epoch; informational,
    /// but its decimal rendering is part of the digest input
    timestamp: i64,
    /// Search variable incremented by the proof-of-work routine
    nonce: BigUint,
    /// Required count of leading hex-zero digits in a proper digest
    difficulty: u32,
}

impl HashRecord {
    pub fn new(index: usize, payload: &str, difficulty: u32) -> Result<HashRecord> {
        Ok(HashRecord {
            index,
            prev_hash: String::new(),
            payload: payload.to_string(),
            timestamp: current_timestamp()?,
            nonce: BigUint::from(0u32),
            difficulty,
        })
    }

    /// Create a record with a fixed timestamp (for testing only)
    #[cfg(test)]
    pub fn new_at(index: usize, timestamp: i64, payload: &str, difficulty: u32) -> HashRecord {
        HashRecord {
            index,
            prev_hash: String::new(),
            payload: payload.to_string(),
            timestamp,
            nonce: BigUint::from(0u32),
            difficulty,
        }
    }

    /// SHA-256 digest of this record as a lowercase hex string.
    ///
    /// The input is the concatenation, in this exact order, of the decimal
    /// index, the decimal timestamp, the payload, the previous hash, the
    /// decimal nonce and the decimal difficulty. The order is load-bearing:
    /// two chains agree on a digest only if they agree on it byte for byte.
    pub fn digest(&self) -> String {
        let input = format!(
            "{}{}{}{}{}{}",
            self.index, self.timestamp, self.payload, self.prev_hash, self.nonce, self.difficulty
        );
        sha256_hex(input.as_bytes())
    }

    /// Does the current digest carry the required number of leading zeroes?
    pub fn meets_target(&self) -> bool {
        self.digest().starts_with(&hash_target(self.difficulty))
    }

    /// Brute-force nonce search until the digest meets the difficulty target.
    ///
    /// The search continues from the current nonce rather than restarting at
    /// zero, so re-mining an already-valid record returns its digest without
    /// touching the nonce; the same holds for difficulty 0. CPU-bound with no
    /// early exit: expected work grows by a factor of 16 per difficulty step.
    pub fn mine(&mut self) -> String {
        let target = hash_target(self.difficulty);
        let mut digest = self.digest();
        while !digest.starts_with(&target) {
            self.nonce += 1u32;
            digest = self.digest();
        }
        digest
    }

    pub fn get_index(&self) -> usize {
        self.index
    }

    pub fn get_prev_hash(&self) -> &str {
        self.prev_hash.as_str()
    }

    pub(crate) fn set_prev_hash(&mut self, prev_hash: String) {
        self.prev_hash = prev_hash;
    }

    pub fn get_payload(&self) -> &str {
        self.payload.as_str()
    }

    pub(crate) fn set_payload(&mut self, payload: &str) {
        self.payload = payload.to_string();
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_nonce(&self) -> &BigUint {
        &self.nonce
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }
}
