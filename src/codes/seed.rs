//! Built-in code catalog.
//!
//! Loaded into an empty store so a fresh registry can accept submissions
//! without an administrator first populating every table. Additional or
//! replacement entries come from a code file (see `codes::file`).

use super::{CodeCatalog, CodeEntry, CodeError, CodeTableKind};

type SeedTable = (CodeTableKind, &'static [(&'static str, &'static str)]);

const SEED_TABLES: &[SeedTable] = &[
    (
        CodeTableKind::WellClass,
        &[
            ("WATR_SPPLY", "Water Supply"),
            ("MONITOR", "Monitoring"),
            ("INJECTION", "Injection"),
            ("GEOTECH", "Geotechnical"),
            ("DRAINAGE", "Drainage"),
            ("DEWATERING", "Dewatering"),
            ("REMEDIATE", "Remediation"),
            ("CLS_LP_GEO", "Closed-Loop Geoexchange"),
            ("DRIL", "Drilled"),
            ("UNK", "Unknown"),
        ],
    ),
    (
        CodeTableKind::IntendedWaterUse,
        &[
            ("DOM", "Private Domestic"),
            ("DWS", "Water Supply System"),
            ("IRR", "Irrigation"),
            ("COM", "Commercial and Industrial"),
            ("OBS", "Monitoring"),
            ("OTHER", "Other"),
            ("NA", "Not Applicable"),
            ("UNK", "Unknown Well Use"),
        ],
    ),
    (
        CodeTableKind::LicencedStatus,
        &[("LICENSED", "Licensed"), ("UNLICENSED", "Unlicensed")],
    ),
    (
        CodeTableKind::ProvinceState,
        &[("BC", "British Columbia"), ("AB", "Alberta"), ("WASH_STATE", "Washington State")],
    ),
    (
        CodeTableKind::LandDistrict,
        &[("01", "Alberni"), ("02", "Barclay"), ("03", "Bright"), ("04", "Cariboo")],
    ),
    (
        CodeTableKind::CoordinateAcquisition,
        &[
            ("A", "(10 m accuracy) ICF cadastre and good location sketch"),
            ("B", "(20 m accuracy) Digitized from 1:5,000 mapping"),
            ("C", "(50 m accuracy) Digitized from 1:20,000 mapping"),
            ("D", "(100 m accuracy) Digitized from old Dept. of Lands, Forests and Water Resources maps"),
            ("E", "(200 m accuracy) Digitized from 1:50,000 maps"),
            ("F", "(1 m accuracy) CDGPS"),
            ("G", "(unknown, accuracy based on parcel size) No ICF cadastre, poor or no location sketch"),
            ("H", "(10 m accuracy) Handheld GPS with accuracy of +/- 10 metres"),
        ],
    ),
    (
        CodeTableKind::GroundElevationMethod,
        &[
            ("ALTIMETER", "Altimeter"),
            ("DEM", "Digital Elevation Model"),
            ("GPS", "GPS"),
            ("LEVEL", "Level"),
            ("MAP", "Map"),
            ("SURVEY", "Survey"),
        ],
    ),
    (
        CodeTableKind::DrillingMethod,
        &[
            ("AIR_ROTARY", "Air Rotary"),
            ("AUGER", "Auger"),
            ("CABLE_TOOL", "Cable Tool"),
            ("DRIVING", "Driving"),
            ("DUAL_ROTARY", "Dual Rotary"),
            ("EXCAVATING", "Excavating"),
            ("JETTING", "Jetting"),
            ("MUD_ROTARY", "Mud Rotary"),
            ("SONIC", "Sonic"),
            ("OTHER", "Other"),
        ],
    ),
    (
        CodeTableKind::SurfaceSealMaterial,
        &[
            ("BNTITE_CLY", "Bentonite clay"),
            ("CMNT_GROUT", "Cement grout"),
            ("NEAT_CEMENT", "Neat cement"),
            ("SND_CMT_GRT", "Sand-cement grout"),
            ("OTHER", "Other"),
        ],
    ),
    (
        CodeTableKind::SurfaceSealMethod,
        &[
            ("GRAVITY", "Poured by gravity"),
            ("PUMPED", "Pumped through tremie"),
            ("TREMIE", "Tremie pipe"),
            ("OTHER", "Other"),
        ],
    ),
    (
        CodeTableKind::LinerMaterial,
        &[("PVC", "PVC"), ("STEEL", "Steel"), ("OTHER", "Other")],
    ),
    (
        CodeTableKind::ScreenIntakeMethod,
        &[
            ("OPEN_BTM", "Open bottom"),
            ("SCREEN", "Screen"),
            ("UNCASED", "Uncased hole"),
        ],
    ),
    (
        CodeTableKind::ScreenType,
        &[("PIPE_SIZE", "Pipe size"), ("TELESCOPE", "Telescope")],
    ),
    (
        CodeTableKind::ScreenMaterial,
        &[("PLASTIC", "Plastic"), ("STAINLESS", "Stainless Steel"), ("OTHER", "Other")],
    ),
    (
        CodeTableKind::ScreenOpening,
        &[("CONT_SLOT", "Continuous Slot"), ("PERFORATED", "Perforated"), ("SLOTTED", "Slotted")],
    ),
    (
        CodeTableKind::ScreenBottom,
        &[("BAIL", "Bail"), ("PLATE", "Plate"), ("PLUG", "Plug"), ("OTHER", "Other")],
    ),
    (
        CodeTableKind::ScreenAssemblyType,
        &[
            ("SCREEN", "Screen"),
            ("BLANK", "Blank"),
            ("K_PACKER", "K Packer"),
            ("LEAD_PACKR", "Lead Packer"),
            ("RISER_PIPE", "Riser Pipe"),
            ("TAIL_PIPE", "Tail Pipe"),
        ],
    ),
    (
        CodeTableKind::FilterPackMaterial,
        &[("GRAVEL", "Gravel"), ("SAND", "Sand"), ("OTHER", "Other")],
    ),
    (
        CodeTableKind::FilterPackMaterialSize,
        &[("1.0-2.0_MM", "1.0 - 2.0 mm"), ("2.0-4.0_MM", "2.0 - 4.0 mm"), ("OTHER", "Other")],
    ),
    (
        CodeTableKind::DevelopmentMethod,
        &[
            ("AIR_LIFT", "Air Lifting"),
            ("BAILING", "Bailing"),
            ("JETTING", "Jetting"),
            ("PUMPING", "Pumping"),
            ("SURGING", "Surging"),
        ],
    ),
    (
        CodeTableKind::WellYieldUnit,
        &[
            ("GPM", "US Gallons per Minute"),
            ("IGM", "Imperial Gallons per Minute"),
            ("DRY", "Dry Hole"),
            ("UNK", "Unknown"),
        ],
    ),
    (
        CodeTableKind::YieldEstimationMethod,
        &[("AIR_LIFTING", "Air Lifting"), ("BAILING", "Bailing"), ("PUMPING", "Pumping")],
    ),
    (
        CodeTableKind::WaterQualityCharacteristic,
        &[
            ("CLOUDY", "Cloudy"),
            ("FRESH", "Fresh"),
            ("GAS", "Gas"),
            ("SALTY", "Salty"),
            ("SULPHUR", "Sulphur"),
        ],
    ),
    (
        CodeTableKind::WaterQualityColour,
        &[("BROWN", "Brown"), ("CLEAR", "Clear"), ("CLOUDY", "Cloudy"), ("ORANGE", "Orange")],
    ),
    (
        CodeTableKind::ObsWellStatus,
        &[("Active", "Active"), ("Inactive", "Inactive")],
    ),
    (
        CodeTableKind::DecommissionMethod,
        &[
            ("BAIL", "Bailed and backfilled"),
            ("GRAVITY", "Poured by gravity"),
            ("PUMPED", "Pumped through tremie pipe"),
            ("SCREEN_PULLED", "Screen pulled and hole backfilled"),
            ("OTHER", "Other"),
        ],
    ),
    (
        CodeTableKind::DecommissionMaterial,
        &[
            ("BENTONITE_CHIPS", "Bentonite chips"),
            ("CEMENT_GROUT", "Cement grout"),
            ("DRILL_CUTTINGS", "Drill cuttings"),
            ("NEAT_CEMENT", "Neat cement"),
            ("PEA_GRAVEL", "Pea gravel"),
            ("OTHER", "Other"),
        ],
    ),
    (
        CodeTableKind::CasingCode,
        &[("SURFACE", "Surface"), ("LINER", "Liner"), ("OPEN", "Open Hole")],
    ),
    (
        CodeTableKind::CasingMaterial,
        &[
            ("CEMENT", "Cement"),
            ("PLASTIC", "Plastic"),
            ("STEEL", "Steel"),
            ("OTHER", "Other"),
        ],
    ),
    (
        CodeTableKind::LithologyDescription,
        &[
            ("BEDROCK", "Bedrock"),
            ("CLAY", "Clay"),
            ("GRAVEL", "Gravel"),
            ("SAND", "Sand"),
            ("SILT", "Silt"),
            ("TILL", "Till"),
        ],
    ),
    (
        CodeTableKind::LithologyColour,
        &[("BLACK", "Black"), ("BROWN", "Brown"), ("GREY", "Grey"), ("RED", "Red")],
    ),
    (
        CodeTableKind::LithologyHardness,
        &[("HARD", "Hard"), ("MEDIUM", "Medium"), ("SOFT", "Soft"), ("VERY_HARD", "Very hard")],
    ),
    (
        CodeTableKind::LithologyMaterial,
        &[
            ("BOULDERS", "Boulders"),
            ("CLAY", "Clay"),
            ("COBBLES", "Cobbles"),
            ("GRAVEL", "Gravel"),
            ("SAND", "Sand"),
            ("SILT", "Silt"),
        ],
    ),
    (
        CodeTableKind::LithologyMoisture,
        &[("DAMP", "Damp"), ("DRY", "Dry"), ("MOIST", "Moist"), ("WET", "Wet")],
    ),
    (
        CodeTableKind::LithologyStructure,
        &[("FRACTURED", "Fractured"), ("LAYERED", "Layered"), ("MASSIVE", "Massive")],
    ),
    (
        CodeTableKind::BedrockMaterial,
        &[
            ("BASALT", "Basalt"),
            ("GRANITE", "Granite"),
            ("LIMESTONE", "Limestone"),
            ("SANDSTONE", "Sandstone"),
            ("SHALE", "Shale"),
        ],
    ),
    (
        CodeTableKind::BedrockMaterialDescriptor,
        &[("FRACTURED", "Fractured"), ("WEATHERED", "Weathered"), ("VOLCANIC", "Volcanic")],
    ),
    (
        CodeTableKind::SurficialMaterial,
        &[
            ("CLAY", "Clay"),
            ("GRAVEL", "Gravel"),
            ("SAND", "Sand"),
            ("SILT", "Silt"),
            ("TILL", "Till"),
        ],
    ),
];

/// Well subclasses as (parent well class, code, description).
const SEED_SUBCLASSES: &[(&str, &str, &str)] = &[
    ("WATR_SPPLY", "DOMESTIC", "Domestic"),
    ("WATR_SPPLY", "NON_DOMEST", "Non-domestic"),
    ("MONITOR", "PERMANENT", "Permanent"),
    ("MONITOR", "TEMPORARY", "Temporary"),
    ("GEOTECH", "BOREHOLE", "Borehole"),
    ("GEOTECH", "TEST_PIT", "Test pit"),
    ("CLS_LP_GEO", "VERTICAL", "Vertical loop"),
    ("CLS_LP_GEO", "HORIZONTAL", "Horizontal loop"),
    ("DRIL", "DOMESTIC", "Domestic"),
];

/// Build the built-in catalog. Display order follows list position in steps
/// of ten so administrators can slot new codes between seeded ones.
pub fn default_catalog() -> Result<CodeCatalog, CodeError> {
    let mut catalog = CodeCatalog::new();

    for (kind, entries) in SEED_TABLES {
        for (order, (code, description)) in (1u32..).zip(entries.iter()) {
            catalog.upsert(*kind, CodeEntry::new(code, description, order * 10))?;
        }
    }

    for (order, (parent, code, description)) in (1u32..).zip(SEED_SUBCLASSES.iter()) {
        catalog.upsert(
            CodeTableKind::WellSubclass,
            CodeEntry::new(code, description, order * 10).with_parent(parent),
        )?;
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_every_table_is_seeded() {
        let catalog = default_catalog().unwrap();
        for kind in CodeTableKind::ALL {
            assert!(
                !catalog.list(kind).is_empty(),
                "table {kind} has no seed entries"
            );
        }
    }

    #[test]
    fn test_seed_contains_lifecycle_codes() {
        let catalog = default_catalog().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(catalog.active(CodeTableKind::WellClass, today).contains("DRIL"));
        assert!(catalog.active(CodeTableKind::IntendedWaterUse, today).contains("DOM"));
        assert!(catalog.active(CodeTableKind::DecommissionMethod, today).contains("BAIL"));
        assert!(catalog
            .active(CodeTableKind::WellSubclass, today)
            .contains_under("DOMESTIC", "WATR_SPPLY"));
    }
}
