//! RecordStore trait: pluggable storage backend
//!
//! The registry core only talks to this trait, so backends can be swapped
//! without touching validation or merge code:
//! - `InMemoryStore`: in-memory store for tests and throwaway registries
//! - `SledStore`: durable embedded store (see `sled_store`)

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::codes::{ActiveCodeSet, CodeCatalog, CodeEntry, CodeError, CodeTableKind};
use crate::types::{ActivitySubmission, Well};

/// Trait for pluggable record store backends
///
/// Implementations must be thread-safe (Send + Sync): the registry shares one
/// store across every caller.
pub trait RecordStore: Send + Sync {
    /// Current state of a well, if it exists
    fn load_well(&self, well_tag_number: u64) -> Result<Option<Well>, StoreError>;

    /// Write a well unconditionally (administrative path)
    fn save_well(&self, well: &Well) -> Result<(), StoreError>;

    /// Record a submission in the history and return its filing number
    fn append_submission(&self, submission: &ActivitySubmission) -> Result<u64, StoreError>;

    /// Atomically write `well` and append `submission` to its history.
    ///
    /// `expected_version` is the version the caller read (`None` when the
    /// well must not exist yet). If the stored well no longer has that
    /// version nothing is written and `VersionConflict` is returned.
    /// Returns the filing number assigned to the submission.
    fn commit_submission(
        &self,
        well: &Well,
        expected_version: Option<u64>,
        submission: &ActivitySubmission,
    ) -> Result<u64, StoreError>;

    /// Submissions recorded against a well, in filing order
    fn submissions_for(&self, well_tag_number: u64) -> Result<Vec<ActivitySubmission>, StoreError>;

    /// Reserve the next well tag number. Tags start at `first` on an empty
    /// store and are never reused.
    fn next_well_tag_number(&self, first: u64) -> Result<u64, StoreError>;

    /// Reserve a caller-chosen tag number. Succeeds only for a tag the
    /// counter has not reached yet, and moves the counter past it so it is
    /// never handed out again. Returns whether the tag was claimed.
    fn claim_well_tag_number(&self, tag: u64, first: u64) -> Result<bool, StoreError>;

    /// Codes of one table valid on `as_of`
    fn load_active_codes(
        &self,
        kind: CodeTableKind,
        as_of: NaiveDate,
    ) -> Result<ActiveCodeSet, StoreError>;

    /// Add or replace a code entry
    fn upsert_code(&self, kind: CodeTableKind, entry: CodeEntry) -> Result<(), StoreError>;

    /// Expire a code entry from `at` onward
    fn expire_code(
        &self,
        kind: CodeTableKind,
        code: &str,
        parent: Option<&str>,
        at: NaiveDate,
    ) -> Result<(), StoreError>;

    /// Every entry of a table, active or not, in display order
    fn list_codes(&self, kind: CodeTableKind) -> Result<Vec<CodeEntry>, StoreError>;

    /// Total number of code entries across all tables
    fn code_count(&self) -> Result<usize, StoreError>;

    /// Load every entry of a catalog. Returns the number of entries written.
    fn seed_codes(&self, catalog: &CodeCatalog) -> Result<usize, StoreError> {
        let mut count = 0;
        // Catalog iteration is in table order, so well classes land before
        // the subclasses that reference them.
        for (kind, entry) in catalog.iter() {
            self.upsert_code(kind, entry.clone())?;
            count += 1;
        }
        Ok(count)
    }

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("well {well_tag_number} changed concurrently (expected version {expected:?}, found {found:?})")]
    VersionConflict {
        well_tag_number: u64,
        expected: Option<u64>,
        found: Option<u64>,
    },
    #[error(transparent)]
    Code(#[from] CodeError),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    wells: BTreeMap<u64, Well>,
    submissions: BTreeMap<u64, ActivitySubmission>,
    codes: CodeCatalog,
    next_well_tag_number: Option<u64>,
    next_filing_number: u64,
}

impl MemoryState {
    fn append(&mut self, submission: &ActivitySubmission) -> u64 {
        let filing_number = self.next_filing_number.max(1);
        self.next_filing_number = filing_number + 1;

        let mut recorded = submission.clone();
        recorded.filing_number = Some(filing_number);
        self.submissions.insert(filing_number, recorded);
        filing_number
    }
}

/// In-memory record store
///
/// Thread-safe via a single `RwLock`, which also makes `commit_submission`
/// atomic. Not durable; data is lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }
}

impl RecordStore for InMemoryStore {
    fn load_well(&self, well_tag_number: u64) -> Result<Option<Well>, StoreError> {
        Ok(self.read()?.wells.get(&well_tag_number).cloned())
    }

    fn save_well(&self, well: &Well) -> Result<(), StoreError> {
        self.write()?.wells.insert(well.well_tag_number, well.clone());
        Ok(())
    }

    fn append_submission(&self, submission: &ActivitySubmission) -> Result<u64, StoreError> {
        Ok(self.write()?.append(submission))
    }

    fn commit_submission(
        &self,
        well: &Well,
        expected_version: Option<u64>,
        submission: &ActivitySubmission,
    ) -> Result<u64, StoreError> {
        let mut state = self.write()?;

        let found = state.wells.get(&well.well_tag_number).map(|w| w.version);
        if found != expected_version {
            return Err(StoreError::VersionConflict {
                well_tag_number: well.well_tag_number,
                expected: expected_version,
                found,
            });
        }

        state.wells.insert(well.well_tag_number, well.clone());
        let mut recorded = submission.clone();
        recorded.well_tag_number = Some(well.well_tag_number);
        Ok(state.append(&recorded))
    }

    fn submissions_for(&self, well_tag_number: u64) -> Result<Vec<ActivitySubmission>, StoreError> {
        Ok(self
            .read()?
            .submissions
            .values()
            .filter(|s| s.well_tag_number == Some(well_tag_number))
            .cloned()
            .collect())
    }

    fn next_well_tag_number(&self, first: u64) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let tag = state.next_well_tag_number.unwrap_or(first).max(first);
        state.next_well_tag_number = Some(tag + 1);
        Ok(tag)
    }

    fn claim_well_tag_number(&self, tag: u64, first: u64) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let next = state.next_well_tag_number.unwrap_or(first).max(first);
        if tag < next {
            return Ok(false);
        }
        state.next_well_tag_number = Some(tag.saturating_add(1));
        Ok(true)
    }

    fn load_active_codes(
        &self,
        kind: CodeTableKind,
        as_of: NaiveDate,
    ) -> Result<ActiveCodeSet, StoreError> {
        Ok(self.read()?.codes.active(kind, as_of))
    }

    fn upsert_code(&self, kind: CodeTableKind, entry: CodeEntry) -> Result<(), StoreError> {
        self.write()?.codes.upsert(kind, entry)?;
        Ok(())
    }

    fn expire_code(
        &self,
        kind: CodeTableKind,
        code: &str,
        parent: Option<&str>,
        at: NaiveDate,
    ) -> Result<(), StoreError> {
        self.write()?.codes.expire(kind, code, parent, at)?;
        Ok(())
    }

    fn list_codes(&self, kind: CodeTableKind) -> Result<Vec<CodeEntry>, StoreError> {
        Ok(self.read()?.codes.list(kind))
    }

    fn code_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.codes.iter().count())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
