//! Interval Consistency Tests
//!
//! Layout rules per interval kind, checked directly and through the
//! registry's submission path.

use std::sync::Arc;

use well_registry::audit::NullAuditRecorder;
use well_registry::codes::seed::default_catalog;
use well_registry::types::{Casing, DecommissionDescription, DepthInterval, LithologyDescription, Screen};
use well_registry::validation::{check_intervals, IntervalPolicies, IntervalPolicy};
use well_registry::{
    ActivitySubmission, ActivityType, InMemoryStore, IntervalKind, RecordStore, ValidationError,
    WellRegistry,
};

fn check(kind: IntervalKind, pairs: &[(f64, f64)]) -> Vec<ValidationError> {
    let intervals: Vec<DepthInterval> = pairs.iter().map(|&(s, e)| DepthInterval::new(s, e)).collect();
    check_intervals(kind, &intervals, IntervalPolicy::default_for(kind), None)
}

fn lithology(from: f64, to: f64) -> LithologyDescription {
    LithologyDescription {
        lithology_from: Some(from),
        lithology_to: Some(to),
        ..Default::default()
    }
}

fn casing(start: f64, end: f64) -> Casing {
    Casing {
        start: Some(start),
        end: Some(end),
        ..Default::default()
    }
}

fn registry() -> WellRegistry {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    store.seed_codes(&default_catalog().unwrap()).unwrap();
    WellRegistry::new(store, Arc::new(NullAuditRecorder))
}

fn construction() -> ActivitySubmission {
    let mut sub = ActivitySubmission::new(ActivityType::Construction, "driller");
    sub.classification.well_class = Some("WATR_SPPLY".to_string());
    sub.classification.intended_water_use = Some("DOM".to_string());
    sub
}

// ============================================================================
// Overlap
// ============================================================================

#[test]
fn overlapping_casings_are_accepted() {
    assert!(check(IntervalKind::Casing, &[(0.0, 10.0), (5.0, 15.0)]).is_empty());
    assert!(check(IntervalKind::Screen, &[(0.0, 10.0), (5.0, 15.0)]).is_empty());
    assert!(check(IntervalKind::LinerPerforation, &[(0.0, 10.0), (5.0, 15.0)]).is_empty());
}

#[test]
fn overlapping_lithology_names_both_intervals() {
    let errors = check(IntervalKind::Lithology, &[(0.0, 10.0), (5.0, 15.0)]);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ValidationError::IntervalOverlap { kind, first, second } => {
            assert_eq!(*kind, IntervalKind::Lithology);
            assert_eq!((first.index, first.start, first.end), (0, 0.0, 10.0));
            assert_eq!((second.index, second.start, second.end), (1, 5.0, 15.0));
        }
        other => panic!("expected IntervalOverlap, got {other:?}"),
    }
}

#[test]
fn overlapping_decommission_descriptions_rejected() {
    let errors = check(IntervalKind::DecommissionDescription, &[(0.0, 3.0), (2.0, 6.0)]);
    assert!(matches!(errors[..], [ValidationError::IntervalOverlap { .. }]));
}

#[test]
fn touching_and_gapped_lithology_accepted() {
    assert!(check(IntervalKind::Lithology, &[(0.0, 5.0), (5.0, 10.0)]).is_empty());
    assert!(check(IntervalKind::Lithology, &[(0.0, 5.0), (8.0, 10.0)]).is_empty());
}

#[test]
fn unsorted_input_is_sorted_before_sweep() {
    assert!(check(IntervalKind::Lithology, &[(5.0, 10.0), (0.0, 5.0)]).is_empty());

    let errors = check(IntervalKind::Lithology, &[(20.0, 30.0), (0.0, 25.0)]);
    match &errors[..] {
        [ValidationError::IntervalOverlap { first, second, .. }] => {
            assert_eq!(first.index, 1, "indices refer to input positions");
            assert_eq!(second.index, 0);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn overlap_is_detected_past_a_short_neighbour() {
    // (2, 4) sits inside (0, 20); (10, 12) still overlaps (0, 20)
    let errors = check(IntervalKind::Lithology, &[(0.0, 20.0), (2.0, 4.0), (10.0, 12.0)]);
    assert_eq!(errors.len(), 2);
}

// ============================================================================
// Zero length
// ============================================================================

#[test]
fn zero_length_follows_policy() {
    let errors = check(IntervalKind::Casing, &[(10.0, 10.0)]);
    assert!(matches!(
        &errors[..],
        [ValidationError::OutOfRange { field, value, min }]
            if field == "casings[0].end" && *value == 10.0 && *min == 10.0
    ));

    assert!(check(IntervalKind::Lithology, &[(10.0, 10.0)]).is_empty());
}

#[test]
fn inverted_interval_is_out_of_range_for_every_kind() {
    for kind in IntervalKind::ALL {
        let errors = check(kind, &[(10.0, 4.0)]);
        assert!(
            matches!(errors[..], [ValidationError::OutOfRange { .. }]),
            "{kind}: {errors:?}"
        );
    }
}

#[test]
fn configured_policy_overrides_default() {
    let intervals = vec![DepthInterval::new(0.0, 10.0), DepthInterval::new(5.0, 15.0)];
    let strict = IntervalPolicy::new(false, false);
    assert_eq!(check_intervals(IntervalKind::Casing, &intervals, strict, None).len(), 1);

    let mut policies = IntervalPolicies::default();
    policies.lithology = IntervalPolicy::new(true, true);
    let errors = check_intervals(
        IntervalKind::Lithology,
        &intervals,
        policies.for_kind(IntervalKind::Lithology),
        None,
    );
    assert!(errors.is_empty());
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn intervals_must_lie_within_total_depth() {
    let intervals = vec![DepthInterval::new(0.0, 40.0), DepthInterval::new(30.0, 55.0)];
    let errors = check_intervals(
        IntervalKind::Screen,
        &intervals,
        IntervalPolicy::default_for(IntervalKind::Screen),
        Some(50.0),
    );
    assert!(matches!(
        &errors[..],
        [ValidationError::IntervalOutOfBounds { index: 1, total_depth, .. }] if *total_depth == 50.0
    ));

    // Ending exactly at the bottom is inside the well
    let flush = vec![DepthInterval::new(0.0, 50.0)];
    assert!(check_intervals(
        IntervalKind::Casing,
        &flush,
        IntervalPolicy::default_for(IntervalKind::Casing),
        Some(50.0)
    )
    .is_empty());
}

#[test]
fn unknown_total_depth_skips_bounds() {
    assert!(check(IntervalKind::Casing, &[(0.0, 5000.0)]).is_empty());
}

// ============================================================================
// Through the registry
// ============================================================================

#[test]
fn registry_accepts_overlapping_casings_and_rejects_overlapping_lithology() {
    let registry = registry();

    let mut sub = construction();
    sub.construction.total_depth_drilled = Some(20.0);
    sub.intervals.casings = vec![casing(0.0, 10.0), casing(5.0, 15.0)];
    sub.intervals.lithology = vec![lithology(0.0, 5.0), lithology(5.0, 20.0)];
    let well = registry.create(&sub).unwrap();
    assert_eq!(well.intervals.casings.len(), 2);

    let mut bad = ActivitySubmission::for_well(well.well_tag_number, ActivityType::Alteration, "driller");
    bad.intervals.lithology = vec![lithology(0.0, 10.0), lithology(5.0, 15.0)];
    let err = registry.apply(well.well_tag_number, &bad).unwrap_err();
    assert!(err
        .validation_errors()
        .iter()
        .any(|e| matches!(e, ValidationError::IntervalOverlap { .. })));
}

#[test]
fn submission_bounds_use_well_depth_when_not_reported() {
    let registry = registry();
    let mut sub = construction();
    sub.construction.total_depth_drilled = Some(30.0);
    let tag = registry.create(&sub).unwrap().well_tag_number;

    let mut alter = ActivitySubmission::for_well(tag, ActivityType::Alteration, "driller");
    alter.intervals.screens = vec![Screen {
        start: Some(25.0),
        end: Some(35.0),
        ..Default::default()
    }];
    let err = registry.apply(tag, &alter).unwrap_err();
    assert!(err
        .validation_errors()
        .iter()
        .any(|e| matches!(e, ValidationError::IntervalOutOfBounds { kind: IntervalKind::Screen, .. })));

    // Deepening the well in the same report makes the screen fit
    alter.construction.total_depth_drilled = Some(40.0);
    assert!(registry.apply(tag, &alter).is_ok());
}

#[test]
fn decommission_descriptions_need_bounds_and_material() {
    let registry = registry();
    let tag = registry.create(&construction()).unwrap().well_tag_number;

    let mut sub = ActivitySubmission::for_well(tag, ActivityType::Decommission, "driller");
    sub.decommission.decommission_method = Some("BAIL".to_string());
    sub.decommission.decommission_reason = Some("abandoned".to_string());
    sub.intervals.decommission_descriptions = vec![DecommissionDescription {
        start: Some(0.0),
        ..Default::default()
    }];

    let err = registry.apply(tag, &sub).unwrap_err();
    let fields: Vec<&str> = err.validation_errors().iter().filter_map(ValidationError::field).collect();
    assert!(fields.contains(&"decommission_descriptions[0].end"));
    assert!(fields.contains(&"decommission_descriptions[0].material"));
}
