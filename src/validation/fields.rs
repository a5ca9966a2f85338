//! Field-level rules: coded-field references, required fields, numeric
//! minimums and date ordering.
//!
//! Wells and submissions share their field groups, so every rule runs over a
//! [`RecordView`] borrowed from either.

use chrono::NaiveDate;

use super::error::ValidationError;
use super::ActiveCodes;
use crate::codes::CodeTableKind;
use crate::types::{
    ActivitySubmission, ActivityType, Classification, ConstructionDetails, DecommissionDetails,
    IntervalKind, IntervalSet, OwnerInfo, ProductionDetails, ScreenDetails, Well, WellLocation,
};

// ============================================================================
// Record View
// ============================================================================

/// Borrowed view of the field groups common to wells and submissions.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    pub classification: &'a Classification,
    pub owner: &'a OwnerInfo,
    pub location: &'a WellLocation,
    pub construction: &'a ConstructionDetails,
    pub screen: &'a ScreenDetails,
    pub production: &'a ProductionDetails,
    pub decommission: &'a DecommissionDetails,
    pub intervals: &'a IntervalSet,
}

impl<'a> From<&'a ActivitySubmission> for RecordView<'a> {
    fn from(sub: &'a ActivitySubmission) -> Self {
        Self {
            classification: &sub.classification,
            owner: &sub.owner,
            location: &sub.location,
            construction: &sub.construction,
            screen: &sub.screen,
            production: &sub.production,
            decommission: &sub.decommission,
            intervals: &sub.intervals,
        }
    }
}

impl<'a> From<&'a Well> for RecordView<'a> {
    fn from(well: &'a Well) -> Self {
        Self {
            classification: &well.classification,
            owner: &well.owner,
            location: &well.location,
            construction: &well.construction,
            screen: &well.screen,
            production: &well.production,
            decommission: &well.decommission,
            intervals: &well.intervals,
        }
    }
}

// ============================================================================
// Coded fields
// ============================================================================

/// One populated coded field: its path, its value and the table it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedField<'a> {
    pub field: String,
    pub value: &'a str,
    pub table: CodeTableKind,
}

struct CodedFields<'a> {
    out: Vec<CodedField<'a>>,
}

impl<'a> CodedFields<'a> {
    fn scalar(&mut self, field: &str, value: &'a Option<String>, table: CodeTableKind) {
        if let Some(value) = value {
            self.out.push(CodedField {
                field: field.to_string(),
                value,
                table,
            });
        }
    }

    fn list(&mut self, field: &str, values: &'a [String], table: CodeTableKind) {
        for (i, value) in values.iter().enumerate() {
            self.out.push(CodedField {
                field: format!("{field}[{i}]"),
                value,
                table,
            });
        }
    }

    fn child(&mut self, collection: &str, index: usize, field: &str, value: &'a Option<String>, table: CodeTableKind) {
        if let Some(value) = value {
            self.out.push(CodedField {
                field: format!("{collection}[{index}].{field}"),
                value,
                table,
            });
        }
    }
}

/// Every populated coded field of a record, well subclass excluded (it is
/// checked against its parent class separately).
pub fn coded_fields<'a>(view: RecordView<'a>) -> Vec<CodedField<'a>> {
    use CodeTableKind as T;

    let mut f = CodedFields { out: Vec::new() };

    let c = view.classification;
    f.scalar("well_class", &c.well_class, T::WellClass);
    f.scalar("intended_water_use", &c.intended_water_use, T::IntendedWaterUse);
    f.scalar("licenced_status", &c.licenced_status, T::LicencedStatus);

    f.scalar("owner_province_state", &view.owner.owner_province_state, T::ProvinceState);

    let l = view.location;
    f.scalar("land_district", &l.land_district, T::LandDistrict);
    f.scalar("coordinate_acquisition_code", &l.coordinate_acquisition_code, T::CoordinateAcquisition);
    f.scalar("ground_elevation_method", &l.ground_elevation_method, T::GroundElevationMethod);

    let k = view.construction;
    f.list("drilling_methods", &k.drilling_methods, T::DrillingMethod);
    f.scalar("surface_seal_material", &k.surface_seal_material, T::SurfaceSealMaterial);
    f.scalar("surface_seal_method", &k.surface_seal_method, T::SurfaceSealMethod);
    f.scalar("liner_material", &k.liner_material, T::LinerMaterial);

    let s = view.screen;
    f.scalar("screen_intake_method", &s.screen_intake_method, T::ScreenIntakeMethod);
    f.scalar("screen_type", &s.screen_type, T::ScreenType);
    f.scalar("screen_material", &s.screen_material, T::ScreenMaterial);
    f.scalar("screen_opening", &s.screen_opening, T::ScreenOpening);
    f.scalar("screen_bottom", &s.screen_bottom, T::ScreenBottom);
    f.scalar("filter_pack_material", &s.filter_pack_material, T::FilterPackMaterial);
    f.scalar("filter_pack_material_size", &s.filter_pack_material_size, T::FilterPackMaterialSize);
    f.list("development_methods", &s.development_methods, T::DevelopmentMethod);

    let p = view.production;
    f.scalar("well_yield_unit", &p.well_yield_unit, T::WellYieldUnit);
    f.scalar("yield_estimation_method", &p.yield_estimation_method, T::YieldEstimationMethod);
    f.list("water_quality_characteristics", &p.water_quality_characteristics, T::WaterQualityCharacteristic);
    f.scalar("water_quality_colour", &p.water_quality_colour, T::WaterQualityColour);
    f.scalar("observation_well_status", &p.observation_well_status, T::ObsWellStatus);

    let d = view.decommission;
    f.scalar("decommission_method", &d.decommission_method, T::DecommissionMethod);
    f.scalar("decommission_sealant_material", &d.decommission_sealant_material, T::DecommissionMaterial);
    f.scalar("decommission_backfill_material", &d.decommission_backfill_material, T::DecommissionMaterial);

    let iv = view.intervals;
    for (i, casing) in iv.casings.iter().enumerate() {
        f.child("casings", i, "casing_code", &casing.casing_code, T::CasingCode);
        f.child("casings", i, "casing_material", &casing.casing_material, T::CasingMaterial);
    }
    for (i, screen) in iv.screens.iter().enumerate() {
        f.child("screens", i, "assembly_type", &screen.assembly_type, T::ScreenAssemblyType);
    }
    for (i, layer) in iv.lithology.iter().enumerate() {
        f.child("lithology", i, "lithology_description", &layer.lithology_description, T::LithologyDescription);
        f.child("lithology", i, "lithology_colour", &layer.lithology_colour, T::LithologyColour);
        f.child("lithology", i, "lithology_hardness", &layer.lithology_hardness, T::LithologyHardness);
        f.child("lithology", i, "lithology_material", &layer.lithology_material, T::LithologyMaterial);
        f.child("lithology", i, "lithology_moisture", &layer.lithology_moisture, T::LithologyMoisture);
        f.child("lithology", i, "lithology_structure", &layer.lithology_structure, T::LithologyStructure);
        f.child("lithology", i, "bedrock_material", &layer.bedrock_material, T::BedrockMaterial);
        f.child("lithology", i, "bedrock_material_descriptor", &layer.bedrock_material_descriptor, T::BedrockMaterialDescriptor);
        f.child("lithology", i, "surficial_material", &layer.surficial_material, T::SurficialMaterial);
        f.child("lithology", i, "secondary_surficial_material", &layer.secondary_surficial_material, T::SurficialMaterial);
        f.child("lithology", i, "water_bearing_estimated_flow_units", &layer.water_bearing_estimated_flow_units, T::WellYieldUnit);
    }
    for (i, desc) in iv.decommission_descriptions.iter().enumerate() {
        f.child("decommission_descriptions", i, "material", &desc.material, T::DecommissionMaterial);
    }

    f.out
}

/// Code tables that must be loaded to validate this record.
pub fn referenced_tables(view: RecordView<'_>) -> Vec<CodeTableKind> {
    let mut tables: Vec<CodeTableKind> = coded_fields(view).into_iter().map(|f| f.table).collect();
    if view.classification.well_subclass.is_some() {
        tables.push(CodeTableKind::WellSubclass);
    }
    tables.sort();
    tables.dedup();
    tables
}

/// Every coded field must name an active code. The well subclass must be
/// active under the submission's well class, or the well's when the
/// submission does not report one.
pub fn check_codes(
    view: RecordView<'_>,
    fallback_class: Option<&str>,
    codes: &ActiveCodes,
) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = coded_fields(view)
        .into_iter()
        .filter(|f| !codes.contains(f.table, f.value))
        .map(|f| ValidationError::InvalidCode {
            field: f.field,
            value: f.value.to_string(),
            table: f.table,
        })
        .collect();

    if let Some(subclass) = &view.classification.well_subclass {
        let class = view.classification.well_class.as_deref().or(fallback_class);
        let valid = class.is_some_and(|class| codes.contains_under(CodeTableKind::WellSubclass, subclass, class));
        if !valid {
            errors.push(ValidationError::InvalidCode {
                field: "well_subclass".to_string(),
                value: subclass.clone(),
                table: CodeTableKind::WellSubclass,
            });
        }
    }

    errors
}

// ============================================================================
// Required fields
// ============================================================================

fn require<T>(errors: &mut Vec<ValidationError>, field: &str, value: &Option<T>) {
    if value.is_none() {
        errors.push(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
}

/// Fields required by the activity type, plus the fields every liner
/// perforation and decommission description must carry.
pub fn check_required(sub: &ActivitySubmission) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match sub.well_activity_type {
        ActivityType::Construction => {
            require(&mut errors, "well_class", &sub.classification.well_class);
            require(&mut errors, "intended_water_use", &sub.classification.intended_water_use);
        }
        ActivityType::Decommission => {
            require(&mut errors, "decommission_method", &sub.decommission.decommission_method);
            require(&mut errors, "decommission_reason", &sub.decommission.decommission_reason);
        }
        ActivityType::Alteration | ActivityType::Other => {}
    }

    errors.extend(check_interval_bounds_present(&sub.intervals));
    errors
}

fn check_interval_bounds_present(intervals: &IntervalSet) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for kind in IntervalKind::ALL.into_iter().filter(IntervalKind::requires_bounds) {
        for (i, depth) in intervals.depths(kind).iter().enumerate() {
            let name = kind.collection_name();
            require(&mut errors, &format!("{name}[{i}].start"), &depth.start);
            require(&mut errors, &format!("{name}[{i}].end"), &depth.end);
        }
    }
    for (i, desc) in intervals.decommission_descriptions.iter().enumerate() {
        require(&mut errors, &format!("decommission_descriptions[{i}].material"), &desc.material);
    }
    errors
}

/// A well in CLOSURE must record how and when it was decommissioned.
pub fn check_closure(well: &Well) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if well.is_decommissioned() {
        require(&mut errors, "decommission_method", &well.decommission.decommission_method);
        require(&mut errors, "decommission_end_date", &well.dates.decommission_end_date);
    }
    errors
}

// ============================================================================
// Numeric ranges
// ============================================================================

fn at_least(errors: &mut Vec<ValidationError>, field: &str, value: Option<f64>, min: f64) {
    if let Some(value) = value {
        if value < min {
            errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min,
            });
        }
    }
}

/// Declared minimums for depth, length, diameter and rate fields.
pub fn check_ranges(view: RecordView<'_>) -> Vec<ValidationError> {
    let mut e = Vec::new();

    let k = view.construction;
    at_least(&mut e, "total_depth_drilled", k.total_depth_drilled, 0.0);
    at_least(&mut e, "finished_well_depth", k.finished_well_depth, 0.0);
    at_least(&mut e, "bedrock_depth", k.bedrock_depth, 0.0);
    at_least(&mut e, "surface_seal_length", k.surface_seal_length, 0.0);
    at_least(&mut e, "surface_seal_depth", k.surface_seal_depth, 0.0);
    at_least(&mut e, "surface_seal_thickness", k.surface_seal_thickness, 1.0);
    at_least(&mut e, "backfill_depth", k.backfill_depth, 0.0);
    at_least(&mut e, "liner_diameter", k.liner_diameter, 0.0);
    at_least(&mut e, "liner_thickness", k.liner_thickness, 0.0);
    at_least(&mut e, "liner_from", k.liner_from, 0.0);
    at_least(&mut e, "liner_to", k.liner_to, 0.01);

    let s = view.screen;
    at_least(&mut e, "filter_pack_from", s.filter_pack_from, 0.0);
    at_least(&mut e, "filter_pack_to", s.filter_pack_to, 0.01);
    at_least(&mut e, "filter_pack_thickness", s.filter_pack_thickness, 0.0);
    at_least(&mut e, "development_hours", s.development_hours, 0.0);

    let p = view.production;
    at_least(&mut e, "static_water_level", p.static_water_level, 0.0);
    at_least(&mut e, "well_yield", p.well_yield, 0.0);
    at_least(&mut e, "yield_estimation_rate", p.yield_estimation_rate, 0.0);
    at_least(&mut e, "yield_estimation_duration", p.yield_estimation_duration, 0.01);
    at_least(&mut e, "static_level_before_test", p.static_level_before_test, 0.0);
    at_least(&mut e, "drawdown", p.drawdown, 0.0);
    at_least(&mut e, "hydro_fracturing_yield_increase", p.hydro_fracturing_yield_increase, 0.0);
    at_least(&mut e, "recommended_pump_depth", p.recommended_pump_depth, 0.0);
    at_least(&mut e, "recommended_pump_rate", p.recommended_pump_rate, 0.0);

    let iv = view.intervals;
    for (i, c) in iv.casings.iter().enumerate() {
        at_least(&mut e, &format!("casings[{i}].start"), c.start, 0.0);
        at_least(&mut e, &format!("casings[{i}].end"), c.end, 0.01);
        at_least(&mut e, &format!("casings[{i}].diameter"), c.diameter, 0.5);
        at_least(&mut e, &format!("casings[{i}].wall_thickness"), c.wall_thickness, 0.01);
    }
    for (i, s) in iv.screens.iter().enumerate() {
        at_least(&mut e, &format!("screens[{i}].start"), s.start, 0.0);
        at_least(&mut e, &format!("screens[{i}].end"), s.end, 0.01);
        at_least(&mut e, &format!("screens[{i}].internal_diameter"), s.internal_diameter, 0.0);
        at_least(&mut e, &format!("screens[{i}].slot_size"), s.slot_size, 0.0);
    }
    for (i, lp) in iv.liner_perforations.iter().enumerate() {
        at_least(&mut e, &format!("liner_perforations[{i}].start"), lp.start, 0.0);
        at_least(&mut e, &format!("liner_perforations[{i}].end"), lp.end, 0.01);
    }
    for (i, layer) in iv.lithology.iter().enumerate() {
        at_least(&mut e, &format!("lithology[{i}].lithology_from"), layer.lithology_from, 0.0);
        at_least(&mut e, &format!("lithology[{i}].lithology_to"), layer.lithology_to, 0.01);
        at_least(
            &mut e,
            &format!("lithology[{i}].water_bearing_estimated_flow"),
            layer.water_bearing_estimated_flow,
            0.0,
        );
    }
    for (i, d) in iv.decommission_descriptions.iter().enumerate() {
        at_least(&mut e, &format!("decommission_descriptions[{i}].start"), d.start, 0.0);
        at_least(&mut e, &format!("decommission_descriptions[{i}].end"), d.end, 0.01);
    }

    e
}

// ============================================================================
// Dates
// ============================================================================

/// Each (field, start, end) pair with both dates set must not end before it
/// starts. The error is reported against the start field.
pub fn check_dates(pairs: &[(&str, Option<NaiveDate>, Option<NaiveDate>)]) -> Vec<ValidationError> {
    pairs
        .iter()
        .filter_map(|&(field, start, end)| match (start, end) {
            (Some(start), Some(end)) if start > end => Some(ValidationError::InvalidDate {
                field: field.to_string(),
                start,
                end,
            }),
            _ => None,
        })
        .collect()
}

/// Date pairs recorded on a well.
pub fn well_date_pairs(well: &Well) -> [(&'static str, Option<NaiveDate>, Option<NaiveDate>); 3] {
    let d = well.dates;
    [
        ("construction_start_date", d.construction_start_date, d.construction_end_date),
        ("alteration_start_date", d.alteration_start_date, d.alteration_end_date),
        ("decommission_start_date", d.decommission_start_date, d.decommission_end_date),
    ]
}
