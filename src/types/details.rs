//! Field groups shared by wells and activity submissions.
//!
//! Every scalar is optional. On a submission `None` means "not reported"; on a
//! well it means "unknown". Merging copies each reported value onto the well.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Copy every `Some` field of `$src` onto `$dst`.
macro_rules! merge_reported {
    ($dst:expr, $src:expr; $($field:ident),+ $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field.clone_from(&$src.$field);
            }
        )+
    };
}

/// Replace each list of `$dst` whose `$src` counterpart is non-empty.
macro_rules! merge_lists {
    ($dst:expr, $src:expr; $($field:ident),+ $(,)?) => {
        $(
            if !$src.$field.is_empty() {
                $dst.$field.clone_from(&$src.$field);
            }
        )+
    };
}

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Classification {
    pub well_class: Option<String>,
    pub well_subclass: Option<String>,
    pub intended_water_use: Option<String>,
    pub licenced_status: Option<String>,
}

impl Classification {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src; well_class, well_subclass, intended_water_use, licenced_status);
    }
}

// ============================================================================
// Owner
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OwnerInfo {
    pub owner_full_name: Option<String>,
    pub owner_mailing_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_province_state: Option<String>,
    pub owner_postal_code: Option<String>,
    pub owner_email: Option<String>,
    pub owner_tel: Option<String>,
}

impl OwnerInfo {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            owner_full_name, owner_mailing_address, owner_city, owner_province_state,
            owner_postal_code, owner_email, owner_tel,
        );
    }
}

// ============================================================================
// Location
// ============================================================================

/// Geographic position and legal land description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WellLocation {
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub legal_lot: Option<String>,
    pub legal_plan: Option<String>,
    pub legal_district_lot: Option<String>,
    pub legal_block: Option<String>,
    pub legal_section: Option<String>,
    pub legal_township: Option<String>,
    pub legal_range: Option<String>,
    pub land_district: Option<String>,
    pub legal_pid: Option<u64>,
    pub well_location_description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Location accuracy code
    pub coordinate_acquisition_code: Option<String>,
    pub ground_elevation: Option<f64>,
    pub ground_elevation_method: Option<String>,
}

impl WellLocation {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            street_address, city, legal_lot, legal_plan, legal_district_lot, legal_block,
            legal_section, legal_township, legal_range, land_district, legal_pid,
            well_location_description, latitude, longitude, coordinate_acquisition_code,
            ground_elevation, ground_elevation_method,
        );
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Borehole, surface seal, backfill and liner details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConstructionDetails {
    pub identification_plate_number: Option<u64>,
    pub well_identification_plate_attached: Option<String>,
    pub id_plate_attached_by: Option<String>,
    pub drilling_methods: Vec<String>,
    /// true = vertical, false = horizontal
    pub well_orientation_vertical: Option<bool>,
    pub total_depth_drilled: Option<f64>,
    pub finished_well_depth: Option<f64>,
    pub final_casing_stick_up: Option<f64>,
    pub bedrock_depth: Option<f64>,
    pub surface_seal_material: Option<String>,
    pub surface_seal_method: Option<String>,
    pub surface_seal_length: Option<f64>,
    pub surface_seal_depth: Option<f64>,
    pub surface_seal_thickness: Option<f64>,
    pub backfill_type: Option<String>,
    pub backfill_depth: Option<f64>,
    pub liner_material: Option<String>,
    pub liner_diameter: Option<f64>,
    pub liner_thickness: Option<f64>,
    pub liner_from: Option<f64>,
    pub liner_to: Option<f64>,
}

impl ConstructionDetails {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            identification_plate_number, well_identification_plate_attached,
            id_plate_attached_by, well_orientation_vertical, total_depth_drilled,
            finished_well_depth, final_casing_stick_up, bedrock_depth, surface_seal_material,
            surface_seal_method, surface_seal_length, surface_seal_depth, surface_seal_thickness,
            backfill_type, backfill_depth, liner_material, liner_diameter, liner_thickness,
            liner_from, liner_to,
        );
        merge_lists!(self, src; drilling_methods);
    }
}

// ============================================================================
// Screen, filter pack, development
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScreenDetails {
    pub screen_intake_method: Option<String>,
    pub screen_type: Option<String>,
    pub screen_material: Option<String>,
    pub other_screen_material: Option<String>,
    pub screen_opening: Option<String>,
    pub screen_bottom: Option<String>,
    pub other_screen_bottom: Option<String>,
    pub screen_information: Option<String>,
    pub filter_pack_from: Option<f64>,
    pub filter_pack_to: Option<f64>,
    pub filter_pack_thickness: Option<f64>,
    pub filter_pack_material: Option<String>,
    pub filter_pack_material_size: Option<String>,
    pub development_methods: Vec<String>,
    pub development_hours: Option<f64>,
    pub development_notes: Option<String>,
}

impl ScreenDetails {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            screen_intake_method, screen_type, screen_material, other_screen_material,
            screen_opening, screen_bottom, other_screen_bottom, screen_information,
            filter_pack_from, filter_pack_to, filter_pack_thickness, filter_pack_material,
            filter_pack_material_size, development_hours, development_notes,
        );
        merge_lists!(self, src; development_methods);
    }
}

// ============================================================================
// Production / yield
// ============================================================================

/// Yield test, water level and water quality observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProductionDetails {
    pub static_water_level: Option<f64>,
    pub well_yield: Option<f64>,
    pub well_yield_unit: Option<String>,
    pub artesian_flow: Option<f64>,
    pub artesian_pressure: Option<f64>,
    pub well_cap_type: Option<String>,
    pub well_disinfected: Option<bool>,
    pub yield_estimation_method: Option<String>,
    pub yield_estimation_rate: Option<f64>,
    pub yield_estimation_duration: Option<f64>,
    pub static_level_before_test: Option<f64>,
    pub drawdown: Option<f64>,
    pub hydro_fracturing_performed: Option<bool>,
    pub hydro_fracturing_yield_increase: Option<f64>,
    pub recommended_pump_depth: Option<f64>,
    pub recommended_pump_rate: Option<f64>,
    pub water_quality_characteristics: Vec<String>,
    pub water_quality_colour: Option<String>,
    pub water_quality_odour: Option<String>,
    pub observation_well_number: Option<String>,
    pub observation_well_status: Option<String>,
    pub aquifer_id: Option<u64>,
}

impl ProductionDetails {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            static_water_level, well_yield, well_yield_unit, artesian_flow, artesian_pressure,
            well_cap_type, well_disinfected, yield_estimation_method, yield_estimation_rate,
            yield_estimation_duration, static_level_before_test, drawdown,
            hydro_fracturing_performed, hydro_fracturing_yield_increase, recommended_pump_depth,
            recommended_pump_rate, water_quality_colour, water_quality_odour,
            observation_well_number, observation_well_status, aquifer_id,
        );
        merge_lists!(self, src; water_quality_characteristics);
    }
}

// ============================================================================
// Decommission
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DecommissionDetails {
    pub decommission_reason: Option<String>,
    pub decommission_method: Option<String>,
    pub decommission_sealant_material: Option<String>,
    pub decommission_backfill_material: Option<String>,
    pub decommission_details: Option<String>,
}

impl DecommissionDetails {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            decommission_reason, decommission_method, decommission_sealant_material,
            decommission_backfill_material, decommission_details,
        );
    }
}

// ============================================================================
// Personnel
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PersonnelInfo {
    pub person_responsible: Option<String>,
    pub company_of_person_responsible: Option<String>,
    pub driller_name: Option<String>,
    pub consultant_name: Option<String>,
    pub consultant_company: Option<String>,
}

impl PersonnelInfo {
    pub fn merge_from(&mut self, src: &Self) {
        merge_reported!(self, src;
            person_responsible, company_of_person_responsible, driller_name,
            consultant_name, consultant_company,
        );
    }
}

// ============================================================================
// Activity dates
// ============================================================================

/// Start/end dates of each kind of work recorded on a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ActivityDates {
    pub construction_start_date: Option<NaiveDate>,
    pub construction_end_date: Option<NaiveDate>,
    pub alteration_start_date: Option<NaiveDate>,
    pub alteration_end_date: Option<NaiveDate>,
    pub decommission_start_date: Option<NaiveDate>,
    pub decommission_end_date: Option<NaiveDate>,
}

// ============================================================================
// Hydraulic properties
// ============================================================================

/// Aquifer hydraulic properties determined by tests on a well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HydraulicProperty {
    /// Aquifer vulnerability index
    pub avi: Option<f64>,
    pub storativity: Option<f64>,
    pub transmissivity: Option<f64>,
    pub hydraulic_conductivity: Option<String>,
    pub specific_storage: Option<String>,
    pub specific_yield: Option<f64>,
    pub testing_method: Option<String>,
    pub testing_duration: Option<u32>,
    pub analytic_solution_type: Option<f64>,
    pub boundary_effect: Option<f64>,
}
