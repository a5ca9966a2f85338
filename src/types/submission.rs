//! Activity submissions: immutable reports of work performed on a well.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::details::{
    Classification, ConstructionDetails, DecommissionDetails, HydraulicProperty, OwnerInfo,
    PersonnelInfo, ProductionDetails, ScreenDetails, WellLocation,
};
use super::intervals::IntervalSet;
use super::status::{ActivityType, PublicationStatus};

/// A report of construction, alteration, decommission or other work.
///
/// `filing_number` is assigned by the store when the submission is recorded;
/// after that the submission is an append-only history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySubmission {
    #[serde(default)]
    pub filing_number: Option<u64>,
    #[serde(default = "Uuid::new_v4")]
    pub activity_submission_guid: Uuid,
    /// Absent only for the construction report that creates the well
    #[serde(default)]
    pub well_tag_number: Option<u64>,
    pub well_activity_type: ActivityType,

    pub submitted_by: String,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub work_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub work_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub well_publication_status: Option<PublicationStatus>,

    #[serde(flatten)]
    pub classification: Classification,
    #[serde(flatten)]
    pub owner: OwnerInfo,
    #[serde(flatten)]
    pub location: WellLocation,
    #[serde(flatten)]
    pub construction: ConstructionDetails,
    #[serde(flatten)]
    pub screen: ScreenDetails,
    #[serde(flatten)]
    pub production: ProductionDetails,
    #[serde(flatten)]
    pub decommission: DecommissionDetails,
    #[serde(flatten)]
    pub personnel: PersonnelInfo,

    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub internal_comments: Option<String>,

    #[serde(flatten)]
    pub intervals: IntervalSet,
    #[serde(default)]
    pub hydraulic_properties: Vec<HydraulicProperty>,
}

impl ActivitySubmission {
    /// A blank submission of the given type.
    pub fn new(well_activity_type: ActivityType, submitted_by: &str) -> Self {
        Self {
            filing_number: None,
            activity_submission_guid: Uuid::new_v4(),
            well_tag_number: None,
            well_activity_type,
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now(),
            work_start_date: None,
            work_end_date: None,
            well_publication_status: None,
            classification: Classification::default(),
            owner: OwnerInfo::default(),
            location: WellLocation::default(),
            construction: ConstructionDetails::default(),
            screen: ScreenDetails::default(),
            production: ProductionDetails::default(),
            decommission: DecommissionDetails::default(),
            personnel: PersonnelInfo::default(),
            comments: None,
            internal_comments: None,
            intervals: IntervalSet::default(),
            hydraulic_properties: Vec::new(),
        }
    }

    /// Same as `new` but targeting an existing well.
    pub fn for_well(well_tag_number: u64, well_activity_type: ActivityType, submitted_by: &str) -> Self {
        Self {
            well_tag_number: Some(well_tag_number),
            ..Self::new(well_activity_type, submitted_by)
        }
    }

    /// Date against which code-table validity is judged.
    ///
    /// Work start date, else work end date, else the day of submission.
    pub fn code_reference_date(&self) -> NaiveDate {
        self.work_start_date
            .or(self.work_end_date)
            .unwrap_or_else(|| self.submitted_at.date_naive())
    }
}
