use crate::core::miner::{hash_target, MAX_DIFFICULTY};
use crate::core::HashRecord;
use crate::error::{ChainError, Result};
use log::info;

/// Outcome of a full chain validation.
///
/// Diagnostics travel with the result instead of living in shared mutable
/// state, so concurrent validations cannot trample each other's reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainAudit {
    Valid,
    Invalid(ChainFault),
}

impl ChainAudit {
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainAudit::Valid)
    }
}

/// The first failure found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainFault {
    /// The record's own digest does not carry its required zero prefix;
    /// `target` is the prefix it must begin with
    ProofOfWork { index: usize, target: String },
    /// The record's stored previous hash does not match the recomputed
    /// digest of its parent
    BrokenLink { index: usize, target: String },
    /// Every record checks out but the cached tip hash does not match the
    /// digest of the last record; no single record is at fault
    TipMismatch,
}

impl ChainFault {
    /// Index of the faulted record, where one is attached.
    pub fn index(&self) -> Option<usize> {
        match self {
            ChainFault::ProofOfWork { index, .. } | ChainFault::BrokenLink { index, .. } => {
                Some(*index)
            }
            ChainFault::TipMismatch => None,
        }
    }

    /// Required zero-prefix of the faulted record, where one is attached.
    pub fn target(&self) -> Option<&str> {
        match self {
            ChainFault::ProofOfWork { target, .. } | ChainFault::BrokenLink { target, .. } => {
                Some(target.as_str())
            }
            ChainFault::TipMismatch => None,
        }
    }
}

/// Ordered sequence of [`HashRecord`]s plus the cached digest of the most
/// recently mined record.
///
/// Append order is index order. Records are never removed; the only
/// mutations after append are the explicit corrupt and repair operations.
/// The ledger lives in memory for the lifetime of the serving process and
/// is owned by whoever serves it, never reached through global state.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<HashRecord>,
    tip_hash: String,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger {
            records: Vec::new(),
            tip_hash: String::new(),
        }
    }

    /// Mine and append a new record carrying `payload`.
    ///
    /// The new record's previous hash is the digest of the current tail,
    /// obtained by re-running the tail's proof of work. That re-run is a
    /// no-op returning the existing digest whenever the tail is already
    /// properly mined.
    /// Genesis gets the empty string. The tip hash always ends up as the
    /// digest of the record just mined.
    pub fn append(&mut self, payload: &str, difficulty: u32) -> Result<&HashRecord> {
        if difficulty > MAX_DIFFICULTY {
            return Err(ChainError::Ledger(format!(
                "Difficulty {difficulty} exceeds maximum of {MAX_DIFFICULTY}"
            )));
        }

        let prev_hash = match self.records.last_mut() {
            Some(tail) => tail.mine(),
            None => String::new(),
        };

        let mut record = HashRecord::new(self.records.len(), payload, difficulty)?;
        record.set_prev_hash(prev_hash);

        info!(
            "Mining record {} at difficulty {difficulty}",
            record.get_index()
        );
        self.tip_hash = record.mine();
        info!("Record {} mined: {}", record.get_index(), self.tip_hash);

        self.records.push(record);
        Ok(self
            .records
            .last()
            .expect("Chain cannot be empty after push"))
    }

    /// Walk the chain and report the first broken invariant, if any.
    ///
    /// A single-record chain passes only if the genesis digest meets its
    /// target and the tip hash equals that digest (compared
    /// case-insensitively; intentional bootstrap behavior). Longer chains
    /// check the genesis proof of work, then for every later record the
    /// parent linkage before the record's own proof of work, and finally
    /// that the tip hash equals the last record's digest exactly. Read-only.
    pub fn validate(&self) -> ChainAudit {
        if self.records.is_empty() {
            return ChainAudit::Valid;
        }

        if self.records.len() == 1 {
            let genesis = &self.records[0];
            let digest = genesis.digest();
            let target = hash_target(genesis.get_difficulty());
            if digest.starts_with(&target) && self.tip_hash.eq_ignore_ascii_case(&digest) {
                return ChainAudit::Valid;
            }
            return ChainAudit::Invalid(ChainFault::ProofOfWork { index: 0, target });
        }

        let genesis = &self.records[0];
        if !genesis.meets_target() {
            return ChainAudit::Invalid(ChainFault::ProofOfWork {
                index: 0,
                target: hash_target(genesis.get_difficulty()),
            });
        }

        for i in 1..self.records.len() {
            let current = &self.records[i];
            let target = hash_target(current.get_difficulty());

            if self.records[i - 1].digest() != current.get_prev_hash() {
                return ChainAudit::Invalid(ChainFault::BrokenLink { index: i, target });
            }
            if !current.meets_target() {
                return ChainAudit::Invalid(ChainFault::ProofOfWork { index: i, target });
            }
        }

        let tail = self
            .records
            .last()
            .expect("Chain with more than one record has a tail");
        if self.tip_hash != tail.digest() {
            return ChainAudit::Invalid(ChainFault::TipMismatch);
        }

        ChainAudit::Valid
    }

    /// Replace the payload of the record at `index`, deliberately without
    /// recomputing its digest or re-mining, so the proof-of-work invariant
    /// for that record goes stale. No other field is touched.
    pub fn corrupt(&mut self, index: usize, payload: &str) -> Result<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(ChainError::IndexOutOfRange { index, len })?;
        record.set_payload(payload);
        Ok(())
    }

    /// Re-mine every record whose digest no longer meets its target and
    /// propagate each new digest into the successor's previous hash, or
    /// into the tip hash for the last record. Returns how many records
    /// were re-mined.
    ///
    /// Records are processed in index order: relinking record i changes
    /// record i+1's digest input, so the pass picks i+1 up on the next
    /// step and the chain converges to fully valid in one sweep.
    pub fn repair(&mut self) -> usize {
        let mut repaired = 0;
        for i in 0..self.records.len() {
            if self.records[i].meets_target() {
                continue;
            }

            let digest = self.records[i].mine();
            repaired += 1;
            info!("Re-mined record {i}: {digest}");

            if i + 1 < self.records.len() {
                self.records[i + 1].set_prev_hash(digest);
            } else {
                self.tip_hash = digest;
            }
        }
        repaired
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recently appended record.
    pub fn latest(&self) -> Option<&HashRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[HashRecord] {
        self.records.as_slice()
    }

    /// Cached digest of the most recently mined record.
    pub fn tip_hash(&self) -> &str {
        self.tip_hash.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_chain(payloads: &[&str], difficulty: u32) -> Ledger {
        let mut ledger = Ledger::new();
        for payload in payloads {
            ledger.append(payload, difficulty).unwrap();
        }
        ledger
    }

    #[test]
    fn test_sequential_appends_validate() {
        let ledger = build_chain(&["Genesis", "A", "B"], 1);
        assert_eq!(ledger.validate(), ChainAudit::Valid);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_genesis_has_empty_prev_hash() {
        let ledger = build_chain(&["Genesis"], 1);
        assert_eq!(ledger.records()[0].get_prev_hash(), "");
        assert_eq!(ledger.validate(), ChainAudit::Valid);
    }

    #[test]
    fn test_linkage_and_tip_after_append() {
        let ledger = build_chain(&["Genesis", "A"], 1);
        let records = ledger.records();
        assert_eq!(records[1].get_prev_hash(), records[0].digest());
        assert_eq!(ledger.tip_hash(), records[1].digest());
    }

    #[test]
    fn test_corrupt_reports_index_and_target() {
        let mut ledger = build_chain(&["Genesis", "A", "B"], 2);
        ledger.corrupt(1, "X").unwrap();

        match ledger.validate() {
            ChainAudit::Invalid(ChainFault::ProofOfWork { index, target }) => {
                assert_eq!(index, 1);
                assert_eq!(target, "00");
            }
            other => panic!("expected proof-of-work fault at index 1, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_genesis_of_single_record_chain() {
        let mut ledger = build_chain(&["Genesis"], 2);
        ledger.corrupt(0, "tampered").unwrap();

        match ledger.validate() {
            ChainAudit::Invalid(ChainFault::ProofOfWork { index, target }) => {
                assert_eq!(index, 0);
                assert_eq!(target, "00");
            }
            other => panic!("expected proof-of-work fault at index 0, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_zero_difficulty_tail_breaks_only_tip() {
        // A difficulty-0 record meets its target no matter the payload, so
        // corrupting the tail leaves the per-record checks green and only
        // the cached tip hash disagrees.
        let mut ledger = build_chain(&["Genesis", "A"], 0);
        ledger.corrupt(1, "X").unwrap();
        assert_eq!(ledger.validate(), ChainAudit::Invalid(ChainFault::TipMismatch));
    }

    #[test]
    fn test_corrupt_out_of_range() {
        let mut ledger = build_chain(&["Genesis"], 1);
        match ledger.corrupt(5, "X") {
            Err(ChainError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 5);
                assert_eq!(len, 1);
            }
            other => panic!("expected out-of-range error, got {other:?}"),
        }
    }

    #[test]
    fn test_repair_restores_validity() {
        let mut ledger = build_chain(&["Genesis", "A", "B"], 1);
        ledger.corrupt(1, "X").unwrap();
        assert!(!ledger.validate().is_valid());

        let repaired = ledger.repair();
        assert!(repaired >= 1);
        assert_eq!(ledger.validate(), ChainAudit::Valid);
        assert_eq!(ledger.records()[1].get_payload(), "X");
    }

    #[test]
    fn test_repair_noop_on_valid_chain() {
        let mut ledger = build_chain(&["Genesis", "A"], 1);
        assert_eq!(ledger.repair(), 0);
        assert_eq!(ledger.validate(), ChainAudit::Valid);
    }

    #[test]
    fn test_empty_ledger_is_valid() {
        assert_eq!(Ledger::new().validate(), ChainAudit::Valid);
    }

    #[test]
    fn test_append_rejects_absurd_difficulty() {
        let mut ledger = Ledger::new();
        assert!(ledger.append("Genesis", MAX_DIFFICULTY + 1).is_err());
    }

    #[test]
    fn test_three_record_corruption_scenario() {
        // Difficulty 2 with transactions "A", "B", "C": every digest starts
        // with "00" and the chain validates.
        let mut ledger = build_chain(&["A", "B", "C"], 2);
        for record in ledger.records() {
            assert!(record.digest().starts_with("00"));
        }
        assert_eq!(ledger.validate(), ChainAudit::Valid);

        let digest_1_before = ledger.records()[1].digest();
        let digest_2_before = ledger.records()[2].digest();

        ledger.corrupt(1, "X").unwrap();
        match ledger.validate() {
            ChainAudit::Invalid(ChainFault::ProofOfWork { index, target }) => {
                assert_eq!(index, 1);
                assert_eq!(target, "00");
            }
            other => panic!("expected proof-of-work fault at index 1, got {other:?}"),
        }

        ledger.repair();
        assert_eq!(ledger.validate(), ChainAudit::Valid);
        // Repair re-mined records 1 and 2, so both digests moved.
        assert_ne!(ledger.records()[1].digest(), digest_1_before);
        assert_ne!(ledger.records()[2].digest(), digest_2_before);
        assert_eq!(ledger.tip_hash(), ledger.records()[2].digest());
    }
}
