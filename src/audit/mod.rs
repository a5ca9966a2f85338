//! Audit Trail
//!
//! Every accepted submission produces one [`AuditEvent`]: who submitted it,
//! when, which well, and the per-field differences between the well before
//! and after the merge. Recording happens after the store commit; a recorder
//! failure is logged and never undoes the commit.

pub mod log;

pub use log::{MemoryAuditLog, NullAuditRecorder, StoreAuditLog, TracingAuditRecorder};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::types::{ActivityType, Well};

/// Top-level well keys left out of diffs: bookkeeping rather than content
const UNDIFFED_KEYS: &[&str] = &["version", "audit"];

/// Trait for audit trail sinks
pub trait AuditRecorder: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;

    /// Recorder name for logging
    fn name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit serialization error: {0}")]
    Serialization(String),
    #[error("audit storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for AuditError {
    fn from(e: serde_json::Error) -> Self {
        AuditError::Serialization(e.to_string())
    }
}

impl From<sled::Error> for AuditError {
    fn from(e: sled::Error) -> Self {
        AuditError::Storage(e.to_string())
    }
}

/// One changed field. Values are the field's JSON form; `Null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub before: Value,
    pub after: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub who: String,
    pub when: DateTime<Utc>,
    pub well_tag_number: u64,
    pub filing_number: Option<u64>,
    pub activity_type: ActivityType,
    pub field_diffs: Vec<FieldDiff>,
}

impl AuditEvent {
    /// Names of the changed fields, comma separated
    pub fn changed_fields(&self) -> String {
        self.field_diffs
            .iter()
            .map(|d| d.field.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Field-level differences between two states of a well.
///
/// `before` is `None` for a newly created well, in which case every populated
/// field is reported. Interval collections are compared whole.
pub fn diff_wells(before: Option<&Well>, after: &Well) -> Result<Vec<FieldDiff>, AuditError> {
    let before = match before {
        Some(well) => serde_json::to_value(well)?,
        None => Value::Object(serde_json::Map::new()),
    };
    let after = serde_json::to_value(after)?;

    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return Err(AuditError::Serialization(
            "well did not serialize to an object".to_string(),
        ));
    };

    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut diffs = Vec::new();
    for key in keys {
        if UNDIFFED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let old = before.get(key).cloned().unwrap_or(Value::Null);
        let new = after.get(key).cloned().unwrap_or(Value::Null);
        if old != new && !(is_blank(&old) && is_blank(&new)) {
            diffs.push(FieldDiff {
                field: key.clone(),
                before: old,
                after: new,
            });
        }
    }
    Ok(diffs)
}

/// Null and empty arrays both mean "nothing recorded"
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Casing, WellStatus};

    #[test]
    fn test_diff_reports_changed_fields_only() {
        let before = Well::new(1, "driller", Utc::now());
        let mut after = before.clone();
        after.version = 2;
        after.well_status = WellStatus::Alteration;
        after.classification.intended_water_use = Some("IRR".to_string());
        after.audit.touch("other", Utc::now());

        let diffs = diff_wells(Some(&before), &after).unwrap();
        let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["intended_water_use", "well_status"]);
        assert_eq!(diffs[0].before, Value::Null);
        assert_eq!(diffs[0].after, "IRR");
    }

    #[test]
    fn test_diff_for_new_well_lists_populated_fields() {
        let mut well = Well::new(5, "driller", Utc::now());
        well.well_status = WellStatus::New;
        well.intervals.casings.push(Casing {
            start: Some(0.0),
            end: Some(20.0),
            ..Default::default()
        });

        let diffs = diff_wells(None, &well).unwrap();
        let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert!(fields.contains(&"casings"));
        assert!(fields.contains(&"well_tag_number"));
        assert!(!fields.contains(&"screens"), "empty collections are not changes");
        assert!(!fields.contains(&"owner_full_name"));
    }
}
