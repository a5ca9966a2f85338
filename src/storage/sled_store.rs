//! Sled-backed record store
//!
//! Trees:
//! - `wells`: well tag (u64 big-endian) -> Well JSON
//! - `submissions`: filing number (u64 big-endian) -> ActivitySubmission JSON
//! - `well_submissions`: tag ++ filing number -> empty (history index)
//! - `codes`: `table/parent/code` -> CodeEntry JSON
//! - `meta`: counters
//!
//! `commit_submission` runs as one multi-tree transaction, so a well update
//! and its history entry are written together or not at all.

use chrono::NaiveDate;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;
use std::sync::Arc;

use super::persistence::{RecordStore, StoreError};
use crate::codes::{ActiveCodeSet, CodeEntry, CodeError, CodeTable, CodeTableKind};
use crate::types::{ActivitySubmission, Well};

const NEXT_FILING_NUMBER: &[u8] = b"next_filing_number";
const NEXT_WELL_TAG_NUMBER: &[u8] = b"next_well_tag_number";

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<TransactionError<StoreError>> for StoreError {
    fn from(e: TransactionError<StoreError>) -> Self {
        match e {
            TransactionError::Abort(inner) => inner,
            TransactionError::Storage(e) => e.into(),
        }
    }
}

fn decode_u64(bytes: &[u8]) -> Option<u64> {
    bytes.try_into().ok().map(u64::from_be_bytes)
}

fn history_key(well_tag_number: u64, filing_number: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&well_tag_number.to_be_bytes());
    key[8..].copy_from_slice(&filing_number.to_be_bytes());
    key
}

fn code_prefix(kind: CodeTableKind) -> String {
    format!("{}/", kind.table_name())
}

fn code_key(kind: CodeTableKind, parent: Option<&str>, code: &str) -> String {
    format!("{}/{}/{}", kind.table_name(), parent.unwrap_or_default(), code)
}

/// Durable record store on an embedded sled database
#[derive(Clone)]
pub struct SledStore {
    db: Arc<sled::Db>,
    wells: sled::Tree,
    submissions: sled::Tree,
    well_submissions: sled::Tree,
    codes: sled::Tree,
    meta: sled::Tree,
}

impl SledStore {
    /// Open or create the store under `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)?;
        let store = Self::from_db(Arc::new(db))?;

        tracing::info!(path = %path_ref.display(), "Record store opened");
        Ok(store)
    }

    /// Temporary store, removed when dropped
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(Arc::new(db))
    }

    fn from_db(db: Arc<sled::Db>) -> Result<Self, StoreError> {
        Ok(Self {
            wells: db.open_tree("wells")?,
            submissions: db.open_tree("submissions")?,
            well_submissions: db.open_tree("well_submissions")?,
            codes: db.open_tree("codes")?,
            meta: db.open_tree("meta")?,
            db,
        })
    }

    /// Underlying database, shared with the store-backed audit log
    pub fn db(&self) -> Arc<sled::Db> {
        Arc::clone(&self.db)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn load_table(&self, kind: CodeTableKind) -> Result<CodeTable, StoreError> {
        let mut table = CodeTable::default();
        for item in self.codes.scan_prefix(code_prefix(kind)) {
            let (_key, value) = item?;
            match serde_json::from_slice::<CodeEntry>(&value) {
                Ok(entry) => table.upsert(entry),
                Err(e) => tracing::warn!(table = %kind, "Skipping unreadable code entry: {}", e),
            }
        }
        Ok(table)
    }

    fn find_code(
        &self,
        kind: CodeTableKind,
        code: &str,
        parent: Option<&str>,
    ) -> Result<Option<CodeEntry>, StoreError> {
        Ok(self.load_table(kind)?.find(code, parent).cloned())
    }
}

impl RecordStore for SledStore {
    fn load_well(&self, well_tag_number: u64) -> Result<Option<Well>, StoreError> {
        match self.wells.get(well_tag_number.to_be_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn save_well(&self, well: &Well) -> Result<(), StoreError> {
        let value = serde_json::to_vec(well)?;
        self.wells.insert(well.well_tag_number.to_be_bytes(), value)?;
        Ok(())
    }

    fn append_submission(&self, submission: &ActivitySubmission) -> Result<u64, StoreError> {
        let filing_number = (&self.submissions, &self.well_submissions, &self.meta).transaction(
            |(submissions, well_submissions, meta)| {
                let filing_number = meta
                    .get(NEXT_FILING_NUMBER)?
                    .and_then(|v| decode_u64(&v))
                    .unwrap_or(1);
                meta.insert(NEXT_FILING_NUMBER, &(filing_number + 1).to_be_bytes()[..])?;

                let mut recorded = submission.clone();
                recorded.filing_number = Some(filing_number);
                let value = serde_json::to_vec(&recorded)
                    .map_err(|e| ConflictableTransactionError::Abort(StoreError::from(e)))?;
                submissions.insert(&filing_number.to_be_bytes()[..], value)?;

                if let Some(tag) = submission.well_tag_number {
                    well_submissions.insert(&history_key(tag, filing_number)[..], Vec::<u8>::new())?;
                }
                Ok(filing_number)
            },
        )?;
        Ok(filing_number)
    }

    fn commit_submission(
        &self,
        well: &Well,
        expected_version: Option<u64>,
        submission: &ActivitySubmission,
    ) -> Result<u64, StoreError> {
        let tag = well.well_tag_number;
        let well_value = serde_json::to_vec(well)?;

        let filing_number = (
            &self.wells,
            &self.submissions,
            &self.well_submissions,
            &self.meta,
        )
            .transaction(|(wells, submissions, well_submissions, meta)| {
                let found = match wells.get(tag.to_be_bytes())? {
                    Some(value) => {
                        let stored: Well = serde_json::from_slice(&value).map_err(|e| {
                            ConflictableTransactionError::Abort(StoreError::from(e))
                        })?;
                        Some(stored.version)
                    }
                    None => None,
                };
                if found != expected_version {
                    return Err(ConflictableTransactionError::Abort(
                        StoreError::VersionConflict {
                            well_tag_number: tag,
                            expected: expected_version,
                            found,
                        },
                    ));
                }

                wells.insert(&tag.to_be_bytes()[..], well_value.clone())?;

                let filing_number = meta
                    .get(NEXT_FILING_NUMBER)?
                    .and_then(|v| decode_u64(&v))
                    .unwrap_or(1);
                meta.insert(NEXT_FILING_NUMBER, &(filing_number + 1).to_be_bytes()[..])?;

                let mut recorded = submission.clone();
                recorded.filing_number = Some(filing_number);
                recorded.well_tag_number = Some(tag);
                let value = serde_json::to_vec(&recorded)
                    .map_err(|e| ConflictableTransactionError::Abort(StoreError::from(e)))?;
                submissions.insert(&filing_number.to_be_bytes()[..], value)?;
                well_submissions.insert(&history_key(tag, filing_number)[..], Vec::<u8>::new())?;

                Ok(filing_number)
            })?;

        tracing::debug!(
            well_tag_number = tag,
            filing_number,
            version = well.version,
            "Committed submission"
        );
        Ok(filing_number)
    }

    fn submissions_for(&self, well_tag_number: u64) -> Result<Vec<ActivitySubmission>, StoreError> {
        let mut history = Vec::new();
        for item in self.well_submissions.scan_prefix(well_tag_number.to_be_bytes()) {
            let (key, _) = item?;
            let Some(filing_number) = key.get(8..).and_then(decode_u64) else {
                continue;
            };
            if let Some(value) = self.submissions.get(filing_number.to_be_bytes())? {
                history.push(serde_json::from_slice(&value)?);
            }
        }
        Ok(history)
    }

    fn next_well_tag_number(&self, first: u64) -> Result<u64, StoreError> {
        let next = |old: Option<&[u8]>| old.and_then(decode_u64).unwrap_or(first).max(first);

        let previous = self.meta.fetch_and_update(NEXT_WELL_TAG_NUMBER, |old| {
            Some((next(old) + 1).to_be_bytes().to_vec())
        })?;
        Ok(next(previous.as_deref()))
    }

    fn claim_well_tag_number(&self, tag: u64, first: u64) -> Result<bool, StoreError> {
        let next = |old: Option<&[u8]>| old.and_then(decode_u64).unwrap_or(first).max(first);

        let previous = self.meta.fetch_and_update(NEXT_WELL_TAG_NUMBER, |old| {
            let current = next(old);
            let updated = if tag < current { current } else { tag.saturating_add(1) };
            Some(updated.to_be_bytes().to_vec())
        })?;
        Ok(tag >= next(previous.as_deref()))
    }

    fn load_active_codes(
        &self,
        kind: CodeTableKind,
        as_of: NaiveDate,
    ) -> Result<ActiveCodeSet, StoreError> {
        Ok(self.load_table(kind)?.active(kind, as_of))
    }

    fn upsert_code(&self, kind: CodeTableKind, entry: CodeEntry) -> Result<(), StoreError> {
        if kind.has_parent() {
            let parent = entry.parent.clone().ok_or_else(|| CodeError::MissingParent {
                table: kind,
                code: entry.code.clone(),
            })?;
            if self.find_code(CodeTableKind::WellClass, &parent, None)?.is_none() {
                return Err(CodeError::UnknownParent {
                    table: kind,
                    code: entry.code,
                    parent,
                }
                .into());
            }
        }

        let key = code_key(kind, entry.parent.as_deref(), &entry.code);
        self.codes.insert(key.as_bytes(), serde_json::to_vec(&entry)?)?;
        Ok(())
    }

    fn expire_code(
        &self,
        kind: CodeTableKind,
        code: &str,
        parent: Option<&str>,
        at: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .find_code(kind, code, parent)?
            .ok_or_else(|| CodeError::UnknownCode {
                table: kind,
                code: code.to_string(),
            })?;
        entry.expiry_date = Some(at);

        let key = code_key(kind, entry.parent.as_deref(), &entry.code);
        self.codes.insert(key.as_bytes(), serde_json::to_vec(&entry)?)?;
        tracing::info!(table = %kind, code, expiry = %at, "Code expired");
        Ok(())
    }

    fn list_codes(&self, kind: CodeTableKind) -> Result<Vec<CodeEntry>, StoreError> {
        Ok(self.load_table(kind)?.sorted())
    }

    fn code_count(&self) -> Result<usize, StoreError> {
        Ok(self.codes.len())
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
