//! Typed validation errors returned to callers as an itemized list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::CodeTableKind;
use crate::types::{ActivityType, IntervalKind};

/// One interval named in an interval error: its position in the submitted
/// collection and its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalRef {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl std::fmt::Display for IntervalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} ({}..{})", self.index, self.start, self.end)
    }
}

/// Every reason a submission can be rejected.
///
/// All variants are recoverable by the caller: they describe what to correct
/// in the submission. Storage failures are reported separately.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field}: '{value}' is not an active {table} code")]
    InvalidCode {
        field: String,
        value: String,
        table: CodeTableKind,
    },

    #[error("{field} is required")]
    RequiredFieldMissing { field: String },

    #[error("{field}: {value} is out of range (minimum {min})")]
    OutOfRange { field: String, value: f64, min: f64 },

    #[error("{kind} intervals overlap: {first} and {second}")]
    IntervalOverlap {
        kind: IntervalKind,
        first: IntervalRef,
        second: IntervalRef,
    },

    #[error("{kind} interval #{index} extends past total depth {total_depth}")]
    IntervalOutOfBounds {
        kind: IntervalKind,
        index: usize,
        start: Option<f64>,
        end: Option<f64>,
        total_depth: f64,
    },

    #[error("expected a {expected} submission, got {found}")]
    InvalidActivityType {
        expected: ActivityType,
        found: ActivityType,
    },

    #[error("well {well_tag_number} already has a construction report")]
    DuplicateConstruction { well_tag_number: u64 },

    #[error("well {well_tag_number} has been decommissioned")]
    WellAlreadyDecommissioned { well_tag_number: u64 },

    #[error("no such well{}", .well_tag_number.map(|t| format!(" {t}")).unwrap_or_default())]
    NoSuchWell { well_tag_number: Option<u64> },

    #[error("submission references well {found:?} but was applied to well {expected}")]
    SubmissionWellMismatch { expected: u64, found: Option<u64> },

    #[error("{field}: start {start} is after end {end}")]
    InvalidDate {
        field: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl ValidationError {
    /// Field path this error should be shown against, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidCode { field, .. }
            | ValidationError::RequiredFieldMissing { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidDate { field, .. } => Some(field),
            ValidationError::IntervalOverlap { kind, .. }
            | ValidationError::IntervalOutOfBounds { kind, .. } => Some(kind.collection_name()),
            _ => None,
        }
    }

    /// Whether this error comes from the lifecycle state machine rather than
    /// the content of the submission.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidActivityType { .. }
                | ValidationError::DuplicateConstruction { .. }
                | ValidationError::WellAlreadyDecommissioned { .. }
                | ValidationError::NoSuchWell { .. }
                | ValidationError::SubmissionWellMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = ValidationError::OutOfRange {
            field: "casings[0].diameter".to_string(),
            value: 0.25,
            min: 0.5,
        };
        assert_eq!(
            err.to_string(),
            "casings[0].diameter: 0.25 is out of range (minimum 0.5)"
        );
        assert_eq!(err.field(), Some("casings[0].diameter"));
    }

    #[test]
    fn test_no_such_well_message() {
        let known = ValidationError::NoSuchWell {
            well_tag_number: Some(12),
        };
        let unknown = ValidationError::NoSuchWell {
            well_tag_number: None,
        };
        assert_eq!(known.to_string(), "no such well 12");
        assert_eq!(unknown.to_string(), "no such well");
    }

    #[test]
    fn test_serializes_with_error_tag() {
        let err = ValidationError::WellAlreadyDecommissioned { well_tag_number: 3 };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["error"], "well_already_decommissioned");
        assert_eq!(value["well_tag_number"], 3);
        assert!(err.is_lifecycle());
    }
}
