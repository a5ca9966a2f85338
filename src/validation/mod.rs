//! Activity Submission Validator
//!
//! Decides accept/reject for one submission before it touches the registry.
//! Checks run in a fixed order:
//!
//! 1. Structural: the submission must reference the well it is applied to.
//!    A failure here stops validation.
//! 2. Coded fields resolve to active codes
//! 3. Required fields for the activity type
//! 4. Numeric minimums and date ordering
//! 5. Interval consistency for each of the five collections
//! 6. Status state machine
//!
//! Steps 2 to 6 accumulate, so a rejected submission reports every problem in
//! one round trip. Validation is pure: all inputs (well, active codes,
//! policies) are loaded by the caller.

pub mod error;
pub mod fields;
pub mod intervals;
pub mod lifecycle;

pub use error::{IntervalRef, ValidationError};
pub use fields::RecordView;
pub use intervals::{check_intervals, IntervalPolicies, IntervalPolicy};
pub use lifecycle::transition;

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::codes::{ActiveCodeSet, CodeCatalog, CodeTableKind};
use crate::types::{ActivitySubmission, ActivityType, IntervalKind, Well, WellStatus};

// ============================================================================
// Active codes
// ============================================================================

/// Active code sets for the tables a submission references.
///
/// A table that was never loaded is treated as empty, so any code in it is
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct ActiveCodes {
    tables: HashMap<CodeTableKind, ActiveCodeSet>,
}

impl ActiveCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: ActiveCodeSet) {
        self.tables.insert(set.kind, set);
    }

    pub fn get(&self, kind: CodeTableKind) -> Option<&ActiveCodeSet> {
        self.tables.get(&kind)
    }

    pub fn contains(&self, kind: CodeTableKind, code: &str) -> bool {
        self.get(kind).is_some_and(|set| set.contains(code))
    }

    pub fn contains_under(&self, kind: CodeTableKind, code: &str, parent: &str) -> bool {
        self.get(kind).is_some_and(|set| set.contains_under(code, parent))
    }

    /// Snapshot the given tables of a catalog as of a date.
    pub fn from_catalog(catalog: &CodeCatalog, tables: &[CodeTableKind], as_of: NaiveDate) -> Self {
        let mut codes = Self::new();
        for kind in tables {
            codes.insert(catalog.active(*kind, as_of));
        }
        codes
    }
}

// ============================================================================
// Context and outcome
// ============================================================================

/// Everything a submission is validated against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Current state of the target well; `None` when creating
    pub well: Option<&'a Well>,
    pub codes: &'a ActiveCodes,
    pub policies: &'a IntervalPolicies,
    /// When set, a submission of any other type is rejected with
    /// `InvalidActivityType` instead of going through the state machine
    pub expected_activity: Option<ActivityType>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(well: Option<&'a Well>, codes: &'a ActiveCodes, policies: &'a IntervalPolicies) -> Self {
        Self {
            well,
            codes,
            policies,
            expected_activity: None,
        }
    }

    pub fn expecting(mut self, activity: ActivityType) -> Self {
        self.expected_activity = Some(activity);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The submission may be applied; the well moves to `next_status`.
    Accepted { next_status: WellStatus },
    /// Never empty.
    Rejected(Vec<ValidationError>),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationOutcome::Accepted { .. } => &[],
            ValidationOutcome::Rejected(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<WellStatus, Vec<ValidationError>> {
        match self {
            ValidationOutcome::Accepted { next_status } => Ok(next_status),
            ValidationOutcome::Rejected(errors) => Err(errors),
        }
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Validate one submission.
pub fn validate_submission(sub: &ActivitySubmission, ctx: ValidationContext<'_>) -> ValidationOutcome {
    if let Some(well) = ctx.well {
        if sub.well_tag_number != Some(well.well_tag_number) {
            return ValidationOutcome::Rejected(vec![ValidationError::SubmissionWellMismatch {
                expected: well.well_tag_number,
                found: sub.well_tag_number,
            }]);
        }
    }

    let view = RecordView::from(sub);
    let mut errors = Vec::new();

    let fallback_class = ctx.well.and_then(|w| w.classification.well_class.as_deref());
    errors.extend(fields::check_codes(view, fallback_class, ctx.codes));
    errors.extend(fields::check_required(sub));
    errors.extend(fields::check_ranges(view));
    errors.extend(fields::check_dates(&[(
        "work_start_date",
        sub.work_start_date,
        sub.work_end_date,
    )]));

    let total_depth = sub
        .construction
        .total_depth_drilled
        .or_else(|| ctx.well.and_then(Well::total_depth_drilled));
    for kind in IntervalKind::ALL {
        errors.extend(check_intervals(
            kind,
            &sub.intervals.depths(kind),
            ctx.policies.for_kind(kind),
            total_depth,
        ));
    }

    let lifecycle = match ctx.expected_activity {
        Some(expected) if expected != sub.well_activity_type => {
            Err(ValidationError::InvalidActivityType {
                expected,
                found: sub.well_activity_type,
            })
        }
        _ => {
            let current = ctx.well.map_or(WellStatus::Uncreated, |w| w.well_status);
            let tag = ctx.well.map(|w| w.well_tag_number).or(sub.well_tag_number);
            transition(current, sub.well_activity_type, tag)
        }
    };

    match lifecycle {
        Ok(next_status) if errors.is_empty() => ValidationOutcome::Accepted { next_status },
        Ok(_) => ValidationOutcome::Rejected(errors),
        Err(err) => {
            errors.push(err);
            ValidationOutcome::Rejected(errors)
        }
    }
}

/// Re-check a well's own state: interval consistency against its total
/// depth, numeric minimums, date ordering and the CLOSURE invariant.
///
/// Code validity is not re-checked; codes that have since expired stay valid
/// on records that used them while active.
pub fn validate_well(well: &Well, policies: &IntervalPolicies) -> Vec<ValidationError> {
    let mut errors = fields::check_ranges(RecordView::from(well));
    errors.extend(fields::check_dates(&fields::well_date_pairs(well)));
    for kind in IntervalKind::ALL {
        errors.extend(check_intervals(
            kind,
            &well.intervals.depths(kind),
            policies.for_kind(kind),
            well.total_depth_drilled(),
        ));
    }
    errors.extend(fields::check_closure(well));
    errors
}
