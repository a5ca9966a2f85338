//! Interval Consistency Checker
//!
//! Checks one collection of depth intervals (all of one kind, one owner):
//!
//! 1. Sort by start ascending. The sort is stable, so equal starts keep input
//!    order, and intervals without a start go last in input order.
//! 2. Each interval with both bounds must have `end > start`, or
//!    `end >= start` when the kind permits zero-length intervals.
//! 3. No bound may exceed the total depth drilled, when that is known.
//! 4. For kinds that forbid overlap, each interval must start at or below the
//!    deepest end seen so far. Touching intervals (`next.start == end`) are
//!    fine, and gaps are never reported.
//!
//! Negative depths are left to the field range checks.

use serde::{Deserialize, Serialize};

use super::error::{IntervalRef, ValidationError};
use crate::types::{DepthInterval, IntervalKind};

// ============================================================================
// Policy
// ============================================================================

/// How one kind of interval may be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPolicy {
    /// Several records of this kind may cover the same depth
    pub allow_overlap: bool,
    /// A record may have `end == start` (a single-point observation)
    pub allow_zero_length: bool,
}

impl IntervalPolicy {
    pub const fn new(allow_overlap: bool, allow_zero_length: bool) -> Self {
        Self {
            allow_overlap,
            allow_zero_length,
        }
    }

    /// Default layout rules per kind.
    ///
    /// Casings, screens and liner perforations may coexist at the same depth.
    /// Lithology layers and decommission descriptions partition the borehole
    /// and must not overlap; lithology may record a single-point observation.
    pub const fn default_for(kind: IntervalKind) -> Self {
        match kind {
            IntervalKind::Casing | IntervalKind::Screen | IntervalKind::LinerPerforation => {
                Self::new(true, false)
            }
            IntervalKind::Lithology => Self::new(false, true),
            IntervalKind::DecommissionDescription => Self::new(false, false),
        }
    }
}

/// Policies for all five interval kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalPolicies {
    pub casing: IntervalPolicy,
    pub screen: IntervalPolicy,
    pub liner_perforation: IntervalPolicy,
    pub lithology: IntervalPolicy,
    pub decommission_description: IntervalPolicy,
}

impl Default for IntervalPolicies {
    fn default() -> Self {
        Self {
            casing: IntervalPolicy::default_for(IntervalKind::Casing),
            screen: IntervalPolicy::default_for(IntervalKind::Screen),
            liner_perforation: IntervalPolicy::default_for(IntervalKind::LinerPerforation),
            lithology: IntervalPolicy::default_for(IntervalKind::Lithology),
            decommission_description: IntervalPolicy::default_for(
                IntervalKind::DecommissionDescription,
            ),
        }
    }
}

impl IntervalPolicies {
    pub fn for_kind(&self, kind: IntervalKind) -> IntervalPolicy {
        match kind {
            IntervalKind::Casing => self.casing,
            IntervalKind::Screen => self.screen,
            IntervalKind::LinerPerforation => self.liner_perforation,
            IntervalKind::Lithology => self.lithology,
            IntervalKind::DecommissionDescription => self.decommission_description,
        }
    }
}

// ============================================================================
// Checker
// ============================================================================

/// Check one interval collection. Returns every problem found, in sorted
/// interval order; an empty result means the collection is consistent.
pub fn check_intervals(
    kind: IntervalKind,
    intervals: &[DepthInterval],
    policy: IntervalPolicy,
    total_depth: Option<f64>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by(|&a, &b| match (intervals[a].start, intervals[b].start) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    // Deepest well-formed interval seen so far, for the overlap sweep
    let mut reach: Option<IntervalRef> = None;

    for index in order {
        let interval = intervals[index];

        if let Some(td) = total_depth {
            let past_bottom = interval.start.is_some_and(|s| s > td)
                || interval.end.is_some_and(|e| e > td);
            if past_bottom {
                errors.push(ValidationError::IntervalOutOfBounds {
                    kind,
                    index,
                    start: interval.start,
                    end: interval.end,
                    total_depth: td,
                });
            }
        }

        let Some((start, end)) = interval.bounds() else {
            continue;
        };

        let well_formed = if policy.allow_zero_length {
            end >= start
        } else {
            end > start
        };
        if !well_formed {
            errors.push(ValidationError::OutOfRange {
                field: format!("{}[{index}].end", kind.collection_name()),
                value: end,
                min: start,
            });
            continue;
        }

        let current = IntervalRef { index, start, end };
        if policy.allow_overlap {
            continue;
        }
        match reach {
            Some(prev) if start < prev.end => {
                errors.push(ValidationError::IntervalOverlap {
                    kind,
                    first: prev,
                    second: current,
                });
                if end > prev.end {
                    reach = Some(current);
                }
            }
            _ => reach = Some(current),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pairs: &[(f64, f64)]) -> Vec<DepthInterval> {
        pairs.iter().map(|&(s, e)| DepthInterval::new(s, e)).collect()
    }

    fn check(kind: IntervalKind, pairs: &[(f64, f64)], td: Option<f64>) -> Vec<ValidationError> {
        check_intervals(kind, &spans(pairs), IntervalPolicy::default_for(kind), td)
    }

    #[test]
    fn test_casing_overlap_permitted() {
        assert!(check(IntervalKind::Casing, &[(0.0, 10.0), (5.0, 15.0)], None).is_empty());
    }

    #[test]
    fn test_lithology_overlap_reported() {
        let errors = check(IntervalKind::Lithology, &[(0.0, 10.0), (5.0, 15.0)], None);
        assert_eq!(
            errors,
            vec![ValidationError::IntervalOverlap {
                kind: IntervalKind::Lithology,
                first: IntervalRef { index: 0, start: 0.0, end: 10.0 },
                second: IntervalRef { index: 1, start: 5.0, end: 15.0 },
            }]
        );
    }

    #[test]
    fn test_touching_lithology_accepted() {
        assert!(check(IntervalKind::Lithology, &[(0.0, 5.0), (5.0, 10.0)], None).is_empty());
    }

    #[test]
    fn test_gaps_not_reported() {
        assert!(check(IntervalKind::Lithology, &[(0.0, 5.0), (8.0, 10.0)], None).is_empty());
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        assert!(check(
            IntervalKind::DecommissionDescription,
            &[(10.0, 20.0), (0.0, 10.0)],
            None
        )
        .is_empty());
    }

    #[test]
    fn test_overlap_with_non_adjacent_earlier_interval() {
        // (2,3) sits inside (0,10); (5,6) also overlaps (0,10) even though
        // its sorted neighbour is (2,3).
        let errors = check(IntervalKind::Lithology, &[(0.0, 10.0), (2.0, 3.0), (5.0, 6.0)], None);
        assert_eq!(errors.len(), 2);
        for err in &errors {
            match err {
                ValidationError::IntervalOverlap { first, .. } => assert_eq!(first.index, 0),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_length_depends_on_kind() {
        let errors = check(IntervalKind::Casing, &[(5.0, 5.0)], None);
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::OutOfRange { field, value, min }]
                if field == "casings[0].end" && *value == 5.0 && *min == 5.0
        ));

        assert!(check(IntervalKind::Lithology, &[(5.0, 5.0)], None).is_empty());
    }

    #[test]
    fn test_inverted_interval_rejected_for_every_kind() {
        for kind in IntervalKind::ALL {
            let errors = check(kind, &[(10.0, 4.0)], None);
            assert!(
                matches!(errors.as_slice(), [ValidationError::OutOfRange { .. }]),
                "{kind}: {errors:?}"
            );
        }
    }

    #[test]
    fn test_bounds_against_total_depth() {
        let errors = check(IntervalKind::Screen, &[(80.0, 95.0), (90.0, 105.0)], Some(100.0));
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::IntervalOutOfBounds { index: 1, total_depth, .. } if total_depth == 100.0
        ));

        assert!(check(IntervalKind::Screen, &[(90.0, 100.0)], Some(100.0)).is_empty());
        assert!(check(IntervalKind::Screen, &[(90.0, 105.0)], None).is_empty());
    }

    #[test]
    fn test_partial_intervals_only_bounds_checked() {
        let intervals = vec![
            DepthInterval { start: None, end: Some(120.0) },
            DepthInterval { start: Some(0.0), end: None },
        ];
        let errors = check_intervals(
            IntervalKind::Casing,
            &intervals,
            IntervalPolicy::default_for(IntervalKind::Casing),
            Some(100.0),
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::IntervalOutOfBounds { index: 0, .. }));
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let errors = check(IntervalKind::Lithology, &[(0.0, 4.0), (0.0, 6.0)], None);
        match &errors[..] {
            [ValidationError::IntervalOverlap { first, second, .. }] => {
                assert_eq!(first.index, 0);
                assert_eq!(second.index, 1);
            }
            other => panic!("unexpected errors {other:?}"),
        }
    }

    #[test]
    fn test_policy_override_allows_lithology_overlap() {
        let policy = IntervalPolicy::new(true, true);
        let errors = check_intervals(
            IntervalKind::Lithology,
            &spans(&[(0.0, 10.0), (5.0, 15.0)]),
            policy,
            None,
        );
        assert!(errors.is_empty());
    }
}
