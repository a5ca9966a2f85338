//! The authoritative Well record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::details::{
    ActivityDates, Classification, ConstructionDetails, DecommissionDetails, HydraulicProperty,
    OwnerInfo, PersonnelInfo, ProductionDetails, ScreenDetails, WellLocation,
};
use super::intervals::IntervalSet;
use super::status::{PublicationStatus, WellStatus};

/// Who created and last updated a record, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub create_user: String,
    pub create_date: DateTime<Utc>,
    pub update_user: String,
    pub update_date: DateTime<Utc>,
}

impl AuditStamp {
    pub fn created(user: &str, at: DateTime<Utc>) -> Self {
        Self {
            create_user: user.to_string(),
            create_date: at,
            update_user: user.to_string(),
            update_date: at,
        }
    }

    pub fn touch(&mut self, user: &str, at: DateTime<Utc>) {
        self.update_user = user.to_string();
        self.update_date = at;
    }
}

/// Current state of a physical well.
///
/// Created by an accepted construction submission, mutated by every later
/// accepted submission, never deleted. `version` increases by one on each
/// accepted submission and backs the store's optimistic write check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    /// Permanent primary identity, assigned once
    pub well_tag_number: u64,
    /// Stable identity token for cross-system reference
    pub well_guid: Uuid,
    #[serde(default)]
    pub version: u64,

    pub well_status: WellStatus,
    #[serde(default)]
    pub well_publication_status: PublicationStatus,

    #[serde(flatten)]
    pub classification: Classification,
    #[serde(flatten)]
    pub owner: OwnerInfo,
    #[serde(flatten)]
    pub location: WellLocation,
    #[serde(flatten)]
    pub dates: ActivityDates,
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

    pub audit: AuditStamp,
}

impl Well {
    /// An empty well shell for a freshly assigned tag number.
    pub fn new(well_tag_number: u64, created_by: &str, at: DateTime<Utc>) -> Self {
        Self {
            well_tag_number,
            well_guid: Uuid::new_v4(),
            version: 0,
            well_status: WellStatus::Uncreated,
            well_publication_status: PublicationStatus::default(),
            classification: Classification::default(),
            owner: OwnerInfo::default(),
            location: WellLocation::default(),
            dates: ActivityDates::default(),
            construction: ConstructionDetails::default(),
            screen: ScreenDetails::default(),
            production: ProductionDetails::default(),
            decommission: DecommissionDetails::default(),
            personnel: PersonnelInfo::default(),
            comments: None,
            internal_comments: None,
            intervals: IntervalSet::default(),
            hydraulic_properties: Vec::new(),
            audit: AuditStamp::created(created_by, at),
        }
    }

    pub fn total_depth_drilled(&self) -> Option<f64> {
        self.construction.total_depth_drilled
    }

    pub fn is_decommissioned(&self) -> bool {
        self.well_status.is_terminal()
    }
}

impl std::fmt::Display for Well {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location.street_address {
            Some(addr) => write!(f, "{} {}", self.well_tag_number, addr),
            None => write!(f, "{}", self.well_tag_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::intervals::Casing;

    #[test]
    fn test_well_json_is_flat() {
        let mut well = Well::new(42, "tester", Utc::now());
        well.classification.well_class = Some("WATR_SPPLY".to_string());
        well.intervals.casings.push(Casing {
            start: Some(0.0),
            end: Some(10.0),
            ..Default::default()
        });

        let value = serde_json::to_value(&well).unwrap();
        assert_eq!(value["well_class"], "WATR_SPPLY");
        assert_eq!(value["casings"][0]["end"], 10.0);

        let back: Well = serde_json::from_value(value).unwrap();
        assert_eq!(back, well);
    }

    #[test]
    fn test_display_includes_address_when_known() {
        let mut well = Well::new(7, "tester", Utc::now());
        assert_eq!(well.to_string(), "7");
        well.location.street_address = Some("1 Main St".to_string());
        assert_eq!(well.to_string(), "7 1 Main St");
    }
}
