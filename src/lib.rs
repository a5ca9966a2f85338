//! Groundwater Well Registry
//!
//! Authoritative records of physical groundwater wells and the activity
//! reports (construction, alteration, decommission, other work) that change
//! them.
//!
//! ## Architecture
//!
//! - **Validation**: accept/reject decisions for one submission, including
//!   the well lifecycle state machine and interval layout checks
//! - **Registry**: applies accepted submissions atomically, one well at a time
//! - **Storage**: pluggable record store (in-memory or sled)
//! - **Codes**: versioned lookup tables behind every coded field
//! - **Audit**: who changed which fields of which well, and when

pub mod audit;
pub mod codes;
pub mod config;
pub mod registry;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export configuration
pub use config::{ConfigError, RegistryConfig};

// Re-export the data model
pub use types::{
    ActivitySubmission, ActivityType, IntervalKind, IntervalSet, PublicationStatus, Well,
    WellStatus,
};

// Re-export the registry and its collaborators
pub use audit::{AuditEvent, AuditRecorder, FieldDiff};
pub use codes::{CodeCatalog, CodeEntry, CodeTableKind};
pub use registry::{OpenError, RegistryError, WellRegistry};
pub use storage::{InMemoryStore, RecordStore, SledStore, StoreError};
pub use validation::{ValidationError, ValidationOutcome};
