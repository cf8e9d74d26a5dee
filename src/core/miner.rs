use crate::utils::sha256_digest;
use std::time::{Duration, Instant};

/// A SHA-256 digest renders as 64 hex digits, so no target beyond 64
/// leading zeroes can ever be met.
pub const MAX_DIFFICULTY: u32 = 64;

/// Input hashed by the throughput probe; mirrors the width of a
/// difficulty-8 target prefix.
const PROBE_INPUT: &[u8] = b"00000000";

/// The hex prefix a digest must carry for the given difficulty.
pub fn hash_target(difficulty: u32) -> String {
    "0".repeat(difficulty as usize)
}

/// Measure how many SHA-256 hashes this machine computes in one second.
///
/// Used by the status operation. This spins a full wall-clock second, so
/// callers should treat it as a slow call, not a cached figure.
pub fn hashes_per_second() -> u64 {
    measure_hash_rate(Duration::from_secs(1))
}

fn measure_hash_rate(window: Duration) -> u64 {
    let start = Instant::now();
    let mut count = 0u64;
    while start.elapsed() < window {
        let _ = sha256_digest(PROBE_INPUT);
        count += 1;
    }
    count
}
