//! Field merge: folds an accepted submission into a well.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{ActivityDates, ActivitySubmission, ActivityType, Well, WellStatus};

/// Merge `sub` into `well` and move it to `next_status`.
///
/// Reported scalars overwrite, unreported ones leave the well alone. A
/// non-empty interval collection replaces the well's collection of that type.
/// Hydraulic properties accumulate. Does not touch `version`.
pub fn merge_submission(well: &mut Well, sub: &ActivitySubmission, next_status: WellStatus, at: DateTime<Utc>) {
    well.classification.merge_from(&sub.classification);
    well.owner.merge_from(&sub.owner);
    well.location.merge_from(&sub.location);
    well.construction.merge_from(&sub.construction);
    well.screen.merge_from(&sub.screen);
    well.production.merge_from(&sub.production);
    well.decommission.merge_from(&sub.decommission);
    well.personnel.merge_from(&sub.personnel);

    if let Some(status) = sub.well_publication_status {
        well.well_publication_status = status;
    }
    if sub.comments.is_some() {
        well.comments.clone_from(&sub.comments);
    }
    if sub.internal_comments.is_some() {
        well.internal_comments.clone_from(&sub.internal_comments);
    }

    well.intervals.replace_from(&sub.intervals);
    well.hydraulic_properties
        .extend(sub.hydraulic_properties.iter().cloned());

    record_activity_dates(&mut well.dates, sub);
    well.well_status = next_status;
    well.audit.touch(&sub.submitted_by, at);
}

/// Copy the submission's work dates into the date pair of its activity.
fn record_activity_dates(dates: &mut ActivityDates, sub: &ActivitySubmission) {
    let start = sub.work_start_date;
    let end = sub.work_end_date;
    match sub.well_activity_type {
        ActivityType::Construction => {
            keep_reported(&mut dates.construction_start_date, start);
            keep_reported(&mut dates.construction_end_date, end);
        }
        ActivityType::Alteration => {
            keep_reported(&mut dates.alteration_start_date, start);
            keep_reported(&mut dates.alteration_end_date, end);
        }
        ActivityType::Decommission => {
            keep_reported(&mut dates.decommission_start_date, start);
            // A closed well always carries its closing date
            dates.decommission_end_date = Some(decommission_end(sub));
        }
        ActivityType::Other => {}
    }
}

fn decommission_end(sub: &ActivitySubmission) -> NaiveDate {
    sub.work_end_date
        .unwrap_or_else(|| sub.submitted_at.date_naive())
}

fn keep_reported(slot: &mut Option<NaiveDate>, reported: Option<NaiveDate>) {
    if reported.is_some() {
        *slot = reported;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Casing, HydraulicProperty, LithologyDescription};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn well_with_history() -> Well {
        let mut well = Well::new(10, "driller", Utc::now());
        well.well_status = WellStatus::New;
        well.classification.well_class = Some("WATR_SPPLY".to_string());
        well.classification.intended_water_use = Some("DOM".to_string());
        well.owner.owner_full_name = Some("A. Owner".to_string());
        well.intervals.casings.push(Casing {
            start: Some(0.0),
            end: Some(30.0),
            ..Default::default()
        });
        well.intervals.lithology.push(LithologyDescription {
            lithology_from: Some(0.0),
            lithology_to: Some(5.0),
            ..Default::default()
        });
        well
    }

    #[test]
    fn test_unreported_fields_survive() {
        let mut well = well_with_history();
        let mut sub = ActivitySubmission::for_well(10, ActivityType::Alteration, "driller");
        sub.classification.intended_water_use = Some("IRR".to_string());

        merge_submission(&mut well, &sub, WellStatus::Alteration, Utc::now());

        assert_eq!(well.classification.well_class.as_deref(), Some("WATR_SPPLY"));
        assert_eq!(well.classification.intended_water_use.as_deref(), Some("IRR"));
        assert_eq!(well.owner.owner_full_name.as_deref(), Some("A. Owner"));
        assert_eq!(well.well_status, WellStatus::Alteration);
    }

    #[test]
    fn test_non_empty_collection_replaces_empty_one_keeps() {
        let mut well = well_with_history();
        let mut sub = ActivitySubmission::for_well(10, ActivityType::Alteration, "driller");
        sub.intervals.casings.push(Casing {
            start: Some(0.0),
            end: Some(45.0),
            ..Default::default()
        });

        merge_submission(&mut well, &sub, WellStatus::Alteration, Utc::now());

        assert_eq!(well.intervals.casings.len(), 1);
        assert_eq!(well.intervals.casings[0].end, Some(45.0));
        assert_eq!(well.intervals.lithology.len(), 1, "unreported collection kept");
    }

    #[test]
    fn test_hydraulic_properties_append() {
        let mut well = well_with_history();
        well.hydraulic_properties.push(HydraulicProperty::default());
        let mut sub = ActivitySubmission::for_well(10, ActivityType::Other, "hydrogeologist");
        sub.hydraulic_properties.push(HydraulicProperty {
            transmissivity: Some(12.5),
            ..Default::default()
        });

        merge_submission(&mut well, &sub, WellStatus::Other, Utc::now());

        assert_eq!(well.hydraulic_properties.len(), 2);
        assert_eq!(well.audit.update_user, "hydrogeologist");
        assert_eq!(well.audit.create_user, "driller");
    }

    #[test]
    fn test_work_dates_land_on_activity_pair() {
        let mut well = well_with_history();
        let mut sub = ActivitySubmission::for_well(10, ActivityType::Alteration, "driller");
        sub.work_start_date = Some(date(2021, 3, 1));
        sub.work_end_date = Some(date(2021, 3, 4));

        merge_submission(&mut well, &sub, WellStatus::Alteration, Utc::now());

        assert_eq!(well.dates.alteration_start_date, Some(date(2021, 3, 1)));
        assert_eq!(well.dates.alteration_end_date, Some(date(2021, 3, 4)));
        assert_eq!(well.dates.construction_start_date, None);
    }

    #[test]
    fn test_decommission_end_defaults_to_submission_day() {
        let mut well = well_with_history();
        let mut sub = ActivitySubmission::for_well(10, ActivityType::Decommission, "driller");
        sub.decommission.decommission_method = Some("BAIL".to_string());

        merge_submission(&mut well, &sub, WellStatus::Closure, Utc::now());

        assert_eq!(well.dates.decommission_end_date, Some(sub.submitted_at.date_naive()));
        assert!(well.is_decommissioned());
    }
}
