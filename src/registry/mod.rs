//! Well Registry
//!
//! Holds current well state and applies validated submissions to it. Every
//! write goes through one path:
//!
//! ```text
//! load well -> validate submission -> merge -> re-validate merged well
//!           -> commit (well + submission, version-checked) -> audit
//! ```
//!
//! Applies to one well are serialized by a per-tag mutex. The store's
//! version check catches writers outside this registry instance; on a
//! conflict the apply is re-run against the fresh state a bounded number of
//! times before surfacing `StorageFailure`.

pub mod merge;

pub use merge::merge_submission;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::audit::{
    diff_wells, AuditError, AuditEvent, AuditRecorder, NullAuditRecorder, StoreAuditLog,
    TracingAuditRecorder,
};
use crate::codes::file::{read_code_file, CodeFileError, CodeFileTables};
use crate::codes::seed::default_catalog;
use crate::codes::{CodeEntry, CodeError, CodeTableKind};
use crate::config::{AuditBackend, RegistryConfig, RegistrySettings};
use crate::storage::{InMemoryStore, RecordStore, SledStore, StorageBackend, StoreError};
use crate::types::{ActivitySubmission, ActivityType, Well, WellStatus};
use crate::validation::fields::referenced_tables;
use crate::validation::{
    validate_submission, validate_well, ActiveCodes, IntervalPolicies, RecordView,
    ValidationContext, ValidationError, ValidationOutcome,
};

/// Re-runs of an apply that lost a version race before giving up
const MAX_CONFLICT_RETRIES: usize = 3;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The submission was not applied; every problem found is listed.
    #[error("submission rejected: {}", summarize(.0))]
    Rejected(Vec<ValidationError>),
    /// The store failed; nothing was written.
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),
}

impl RegistryError {
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            RegistryError::Rejected(errors) => errors,
            RegistryError::StorageFailure(_) => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors opening a registry from config
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Codes(#[from] CodeError),
    #[error(transparent)]
    CodeFile(#[from] CodeFileError),
}

// ============================================================================
// Registry
// ============================================================================

pub struct WellRegistry {
    store: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditRecorder>,
    policies: IntervalPolicies,
    settings: RegistrySettings,
    /// One mutex per well that has been written through this registry
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl WellRegistry {
    pub fn new(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditRecorder>) -> Self {
        Self {
            store,
            audit,
            policies: IntervalPolicies::default(),
            settings: RegistrySettings::default(),
            locks: DashMap::new(),
        }
    }

    pub fn with_policies(mut self, policies: IntervalPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registry over a fresh in-memory store seeded with the built-in codes.
    /// Audit events go to the tracing log.
    pub fn in_memory() -> Result<Self, OpenError> {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        store.seed_codes(&default_catalog()?)?;
        Ok(Self::new(store, Arc::new(TracingAuditRecorder)))
    }

    /// Open the store and audit backend named in `config` and load its code
    /// tables.
    pub fn open(config: &RegistryConfig) -> Result<Self, OpenError> {
        let (store, audit): (Arc<dyn RecordStore>, Arc<dyn AuditRecorder>) =
            match config.storage.backend {
                StorageBackend::Sled => {
                    let sled = SledStore::open(&config.storage.path)?;
                    let audit: Arc<dyn AuditRecorder> = match (config.audit.enabled, config.audit.backend) {
                        (false, _) => Arc::new(NullAuditRecorder),
                        (true, AuditBackend::Log) => Arc::new(TracingAuditRecorder),
                        (true, AuditBackend::Store) => Arc::new(StoreAuditLog::open(sled.db())?),
                    };
                    (Arc::new(sled), audit)
                }
                StorageBackend::Memory => {
                    let audit: Arc<dyn AuditRecorder> = if config.audit.enabled {
                        Arc::new(TracingAuditRecorder)
                    } else {
                        Arc::new(NullAuditRecorder)
                    };
                    (Arc::new(InMemoryStore::new()), audit)
                }
            };

        if config.codes.seed_defaults && store.code_count()? == 0 {
            let seeded = store.seed_codes(&default_catalog()?)?;
            info!(entries = seeded, "Seeded empty store with built-in code tables");
        }

        let registry = Self::new(store, audit)
            .with_policies(config.interval_policies())
            .with_settings(config.registry.clone());

        if let Some(path) = &config.codes.path {
            registry.import_code_file(path)?;
        }

        info!(
            backend = registry.store.backend_name(),
            audit = registry.audit.name(),
            first_well_tag_number = registry.settings.first_well_tag_number,
            "Well registry opened"
        );
        Ok(registry)
    }

    // ------------------------------------------------------------------------
    // Submission operations
    // ------------------------------------------------------------------------

    /// Validate a submission against current state without applying it.
    ///
    /// A tag with no well behind it is validated as UNCREATED, so the status
    /// table decides between `NoSuchWell` and a new well and every field
    /// error is still reported.
    pub fn validate(&self, sub: &ActivitySubmission) -> Result<ValidationOutcome, RegistryError> {
        let well = match sub.well_tag_number {
            Some(tag) => self.store.load_well(tag)?,
            None => None,
        };

        let codes = self.active_codes(sub)?;
        Ok(validate_submission(
            sub,
            ValidationContext::new(well.as_ref(), &codes, &self.policies),
        ))
    }

    /// Create a well from a construction submission.
    ///
    /// A submission naming an existing tag is validated against that well
    /// and so rejected as a duplicate construction. One naming an unused tag
    /// creates the well under that tag if the tag counter has not handed it
    /// out yet, otherwise under a freshly assigned tag.
    pub fn create(&self, sub: &ActivitySubmission) -> Result<Well, RegistryError> {
        let existing = match sub.well_tag_number {
            Some(tag) => self.store.load_well(tag)?,
            None => None,
        };

        let codes = self.active_codes(sub)?;
        let ctx = ValidationContext::new(existing.as_ref(), &codes, &self.policies)
            .expecting(ActivityType::Construction);
        let next_status = validate_submission(sub, ctx)
            .into_result()
            .map_err(|errors| self.rejected(sub.well_tag_number, errors))?;
        if let Some(existing) = existing {
            // Unreachable with the status table, kept total
            return Err(self.rejected(
                Some(existing.well_tag_number),
                vec![ValidationError::DuplicateConstruction {
                    well_tag_number: existing.well_tag_number,
                }],
            ));
        }

        let now = Utc::now();
        let mut well = Well::new(0, &sub.submitted_by, now);
        well.well_publication_status = self.settings.default_publication_status;
        merge_submission(&mut well, sub, next_status, now);
        well.version = 1;

        let errors = validate_well(&well, &self.policies);
        if !errors.is_empty() {
            return Err(self.rejected(sub.well_tag_number, errors));
        }

        // Tags are reserved only once the well is known to be acceptable
        well.well_tag_number = self.reserve_tag(sub.well_tag_number)?;
        let tag = well.well_tag_number;

        let lock = self.lock_for(tag);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut recorded = sub.clone();
        recorded.well_tag_number = Some(tag);
        let filing_number = match self.store.commit_submission(&well, None, &recorded) {
            Ok(filing_number) => filing_number,
            // A well was written under the tag outside the registry
            Err(StoreError::VersionConflict { found: Some(_), .. }) => {
                return Err(self.rejected(
                    Some(tag),
                    vec![ValidationError::DuplicateConstruction { well_tag_number: tag }],
                ));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            well_tag_number = tag,
            filing_number,
            status = %well.well_status,
            "Well created"
        );
        self.record_audit(None, &well, &recorded, filing_number);
        Ok(well)
    }

    /// Apply a submission to an existing well.
    pub fn apply(&self, well_tag_number: u64, sub: &ActivitySubmission) -> Result<Well, RegistryError> {
        if sub.well_tag_number != Some(well_tag_number) {
            return Err(self.rejected(
                Some(well_tag_number),
                vec![ValidationError::SubmissionWellMismatch {
                    expected: well_tag_number,
                    found: sub.well_tag_number,
                }],
            ));
        }

        // Construction either creates the well or is a duplicate; both are
        // decided by create
        if sub.well_activity_type == ActivityType::Construction {
            return self.create(sub);
        }

        let lock = self.lock_for(well_tag_number);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let codes = self.active_codes(sub)?;
        let mut attempt = 0;
        loop {
            let Some(base) = self.store.load_well(well_tag_number)? else {
                // UNCREATED: the status table yields NoSuchWell after the
                // field checks
                let ctx = ValidationContext::new(None, &codes, &self.policies);
                let errors = validate_submission(sub, ctx).errors().to_vec();
                return Err(self.rejected(Some(well_tag_number), errors));
            };

            let ctx = ValidationContext::new(Some(&base), &codes, &self.policies);
            let next_status = validate_submission(sub, ctx)
                .into_result()
                .map_err(|errors| self.rejected(Some(well_tag_number), errors))?;

            let merged = self.merged(&base, sub, next_status)?;

            match self.store.commit_submission(&merged, Some(base.version), sub) {
                Ok(filing_number) => {
                    info!(
                        well_tag_number,
                        filing_number,
                        version = merged.version,
                        status = %merged.well_status,
                        activity = %sub.well_activity_type,
                        "Submission applied"
                    );
                    self.record_audit(Some(&base), &merged, sub, filing_number);
                    return Ok(merged);
                }
                Err(StoreError::VersionConflict { found, .. }) if attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                    warn!(
                        well_tag_number,
                        expected = base.version,
                        found = ?found,
                        attempt,
                        "Well changed during apply, re-validating against new state"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn merged(&self, base: &Well, sub: &ActivitySubmission, next_status: WellStatus) -> Result<Well, RegistryError> {
        let mut merged = base.clone();
        merge_submission(&mut merged, sub, next_status, Utc::now());
        merged.version = base.version + 1;

        let errors = validate_well(&merged, &self.policies);
        if errors.is_empty() {
            Ok(merged)
        } else {
            Err(self.rejected(Some(base.well_tag_number), errors))
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn get_well(&self, well_tag_number: u64) -> Result<Option<Well>, RegistryError> {
        Ok(self.store.load_well(well_tag_number)?)
    }

    /// Every submission recorded against a well, in filing order.
    pub fn submissions_for(&self, well_tag_number: u64) -> Result<Vec<ActivitySubmission>, RegistryError> {
        Ok(self.store.submissions_for(well_tag_number)?)
    }

    pub fn list_codes(&self, kind: CodeTableKind) -> Result<Vec<CodeEntry>, RegistryError> {
        Ok(self.store.list_codes(kind)?)
    }

    // ------------------------------------------------------------------------
    // Code administration
    // ------------------------------------------------------------------------

    pub fn upsert_code(&self, kind: CodeTableKind, entry: CodeEntry) -> Result<(), RegistryError> {
        info!(table = %kind, code = %entry.code, "Code upserted");
        Ok(self.store.upsert_code(kind, entry)?)
    }

    /// Expire a code from `at` onward. Records that already use it keep it.
    pub fn expire_code(
        &self,
        kind: CodeTableKind,
        code: &str,
        parent: Option<&str>,
        at: NaiveDate,
    ) -> Result<(), RegistryError> {
        self.store.expire_code(kind, code, parent, at)?;
        info!(table = %kind, code, expiry_date = %at, "Code expired");
        Ok(())
    }

    /// Load every entry of parsed code tables into the store.
    pub fn import_codes(&self, tables: CodeFileTables) -> Result<usize, StoreError> {
        let mut count = 0;
        for (kind, entries) in tables {
            for entry in entries {
                self.store.upsert_code(kind, entry)?;
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn import_code_file(&self, path: &Path) -> Result<usize, OpenError> {
        let count = self.import_codes(read_code_file(path)?)?;
        info!(path = %path.display(), entries = count, "Imported code file");
        Ok(count)
    }

    pub fn policies(&self) -> &IntervalPolicies {
        &self.policies
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// The caller's tag when it is still unissued, else the next free one.
    fn reserve_tag(&self, requested: Option<u64>) -> Result<u64, StoreError> {
        let first = self.settings.first_well_tag_number;
        if let Some(tag) = requested {
            if self.store.claim_well_tag_number(tag, first)? {
                return Ok(tag);
            }
            warn!(requested = tag, "Tag number already issued, assigning a new one");
        }
        self.store.next_well_tag_number(first)
    }

    fn lock_for(&self, well_tag_number: u64) -> Arc<Mutex<()>> {
        self.locks.entry(well_tag_number).or_default().clone()
    }

    /// Active codes of every table the submission references, as of its
    /// code reference date.
    fn active_codes(&self, sub: &ActivitySubmission) -> Result<ActiveCodes, StoreError> {
        let as_of = sub.code_reference_date();
        let mut codes = ActiveCodes::new();
        for kind in referenced_tables(RecordView::from(sub)) {
            codes.insert(self.store.load_active_codes(kind, as_of)?);
        }
        Ok(codes)
    }

    fn rejected(&self, well_tag_number: Option<u64>, errors: Vec<ValidationError>) -> RegistryError {
        debug!(
            well_tag_number = ?well_tag_number,
            errors = errors.len(),
            first = %errors.first().map(ToString::to_string).unwrap_or_default(),
            "Submission rejected"
        );
        RegistryError::Rejected(errors)
    }

    fn record_audit(&self, before: Option<&Well>, after: &Well, sub: &ActivitySubmission, filing_number: u64) {
        let field_diffs = match diff_wells(before, after) {
            Ok(diffs) => diffs,
            Err(e) => {
                warn!(well_tag_number = after.well_tag_number, error = %e, "Failed to diff well for audit");
                Vec::new()
            }
        };

        let event = AuditEvent {
            who: sub.submitted_by.clone(),
            when: after.audit.update_date,
            well_tag_number: after.well_tag_number,
            filing_number: Some(filing_number),
            activity_type: sub.well_activity_type,
            field_diffs,
        };

        if let Err(e) = self.audit.record(&event) {
            warn!(
                well_tag_number = after.well_tag_number,
                filing_number,
                recorder = self.audit.name(),
                error = %e,
                "Audit record failed after commit"
            );
        }
    }
}
