//! Versioned Code Tables
//!
//! Every coded field on a well or submission (well class, casing material,
//! lithology colour, ...) refers to an entry in one of these tables. Tables are
//! administered at runtime, so they are lookup sets rather than closed enums.
//!
//! ## Validity
//!
//! An entry is usable on a record dated `as_of` when
//! `effective_date <= as_of < expiry_date`. A missing effective date means the
//! entry has always been effective; a missing expiry date means it is still
//! active. Entries are never deleted, only expired.
//!
//! ## Subclasses
//!
//! Well subclass entries carry their well class as `parent`. A subclass code is
//! unique per parent, not globally.

pub mod file;
pub mod seed;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Table Kinds
// ============================================================================

/// Every code table referenced by the data model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CodeTableKind {
    WellClass,
    WellSubclass,
    IntendedWaterUse,
    LicencedStatus,
    ProvinceState,
    LandDistrict,
    CoordinateAcquisition,
    GroundElevationMethod,
    DrillingMethod,
    SurfaceSealMaterial,
    SurfaceSealMethod,
    LinerMaterial,
    ScreenIntakeMethod,
    ScreenType,
    ScreenMaterial,
    ScreenOpening,
    ScreenBottom,
    ScreenAssemblyType,
    FilterPackMaterial,
    FilterPackMaterialSize,
    DevelopmentMethod,
    WellYieldUnit,
    YieldEstimationMethod,
    WaterQualityCharacteristic,
    WaterQualityColour,
    ObsWellStatus,
    DecommissionMethod,
    DecommissionMaterial,
    CasingCode,
    CasingMaterial,
    LithologyDescription,
    LithologyColour,
    LithologyHardness,
    LithologyMaterial,
    LithologyMoisture,
    LithologyStructure,
    BedrockMaterial,
    BedrockMaterialDescriptor,
    SurficialMaterial,
}

impl CodeTableKind {
    pub const ALL: [CodeTableKind; 39] = [
        CodeTableKind::WellClass,
        CodeTableKind::WellSubclass,
        CodeTableKind::IntendedWaterUse,
        CodeTableKind::LicencedStatus,
        CodeTableKind::ProvinceState,
        CodeTableKind::LandDistrict,
        CodeTableKind::CoordinateAcquisition,
        CodeTableKind::GroundElevationMethod,
        CodeTableKind::DrillingMethod,
        CodeTableKind::SurfaceSealMaterial,
        CodeTableKind::SurfaceSealMethod,
        CodeTableKind::LinerMaterial,
        CodeTableKind::ScreenIntakeMethod,
        CodeTableKind::ScreenType,
        CodeTableKind::ScreenMaterial,
        CodeTableKind::ScreenOpening,
        CodeTableKind::ScreenBottom,
        CodeTableKind::ScreenAssemblyType,
        CodeTableKind::FilterPackMaterial,
        CodeTableKind::FilterPackMaterialSize,
        CodeTableKind::DevelopmentMethod,
        CodeTableKind::WellYieldUnit,
        CodeTableKind::YieldEstimationMethod,
        CodeTableKind::WaterQualityCharacteristic,
        CodeTableKind::WaterQualityColour,
        CodeTableKind::ObsWellStatus,
        CodeTableKind::DecommissionMethod,
        CodeTableKind::DecommissionMaterial,
        CodeTableKind::CasingCode,
        CodeTableKind::CasingMaterial,
        CodeTableKind::LithologyDescription,
        CodeTableKind::LithologyColour,
        CodeTableKind::LithologyHardness,
        CodeTableKind::LithologyMaterial,
        CodeTableKind::LithologyMoisture,
        CodeTableKind::LithologyStructure,
        CodeTableKind::BedrockMaterial,
        CodeTableKind::BedrockMaterialDescriptor,
        CodeTableKind::SurficialMaterial,
    ];

    /// Table name used in code files, storage keys and the CLI.
    pub fn table_name(&self) -> &'static str {
        match self {
            CodeTableKind::WellClass => "well_class",
            CodeTableKind::WellSubclass => "well_subclass",
            CodeTableKind::IntendedWaterUse => "intended_water_use",
            CodeTableKind::LicencedStatus => "licenced_status",
            CodeTableKind::ProvinceState => "province_state",
            CodeTableKind::LandDistrict => "land_district",
            CodeTableKind::CoordinateAcquisition => "coordinate_acquisition",
            CodeTableKind::GroundElevationMethod => "ground_elevation_method",
            CodeTableKind::DrillingMethod => "drilling_method",
            CodeTableKind::SurfaceSealMaterial => "surface_seal_material",
            CodeTableKind::SurfaceSealMethod => "surface_seal_method",
            CodeTableKind::LinerMaterial => "liner_material",
            CodeTableKind::ScreenIntakeMethod => "screen_intake_method",
            CodeTableKind::ScreenType => "screen_type",
            CodeTableKind::ScreenMaterial => "screen_material",
            CodeTableKind::ScreenOpening => "screen_opening",
            CodeTableKind::ScreenBottom => "screen_bottom",
            CodeTableKind::ScreenAssemblyType => "screen_assembly_type",
            CodeTableKind::FilterPackMaterial => "filter_pack_material",
            CodeTableKind::FilterPackMaterialSize => "filter_pack_material_size",
            CodeTableKind::DevelopmentMethod => "development_method",
            CodeTableKind::WellYieldUnit => "well_yield_unit",
            CodeTableKind::YieldEstimationMethod => "yield_estimation_method",
            CodeTableKind::WaterQualityCharacteristic => "water_quality_characteristic",
            CodeTableKind::WaterQualityColour => "water_quality_colour",
            CodeTableKind::ObsWellStatus => "obs_well_status",
            CodeTableKind::DecommissionMethod => "decommission_method",
            CodeTableKind::DecommissionMaterial => "decommission_material",
            CodeTableKind::CasingCode => "casing_code",
            CodeTableKind::CasingMaterial => "casing_material",
            CodeTableKind::LithologyDescription => "lithology_description",
            CodeTableKind::LithologyColour => "lithology_colour",
            CodeTableKind::LithologyHardness => "lithology_hardness",
            CodeTableKind::LithologyMaterial => "lithology_material",
            CodeTableKind::LithologyMoisture => "lithology_moisture",
            CodeTableKind::LithologyStructure => "lithology_structure",
            CodeTableKind::BedrockMaterial => "bedrock_material",
            CodeTableKind::BedrockMaterialDescriptor => "bedrock_material_descriptor",
            CodeTableKind::SurficialMaterial => "surficial_material",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.table_name() == name)
    }

    /// Whether entries of this table must name a parent entry.
    pub fn has_parent(&self) -> bool {
        matches!(self, CodeTableKind::WellSubclass)
    }
}

impl std::fmt::Display for CodeTableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

// ============================================================================
// Entries
// ============================================================================

/// One row of a code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    /// Parent code (well class of a well subclass)
    #[serde(default)]
    pub parent: Option<String>,
}

impl CodeEntry {
    pub fn new(code: &str, description: &str, display_order: u32) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            display_order,
            effective_date: None,
            expiry_date: None,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_window(mut self, effective: Option<NaiveDate>, expiry: Option<NaiveDate>) -> Self {
        self.effective_date = effective;
        self.expiry_date = expiry;
        self
    }

    /// Half-open validity window check.
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        let started = self.effective_date.map_or(true, |eff| eff <= as_of);
        let not_expired = self.expiry_date.map_or(true, |exp| as_of < exp);
        started && not_expired
    }

    fn key(&self) -> (Option<&str>, &str) {
        (self.parent.as_deref(), self.code.as_str())
    }
}

/// Code table errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("{table}: entry '{code}' requires a parent code")]
    MissingParent { table: CodeTableKind, code: String },
    #[error("{table}: parent '{parent}' of '{code}' does not exist")]
    UnknownParent {
        table: CodeTableKind,
        code: String,
        parent: String,
    },
    #[error("{table}: no entry '{code}'")]
    UnknownCode { table: CodeTableKind, code: String },
}

// ============================================================================
// Tables
// ============================================================================

/// All entries of one code table, active or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

impl CodeTable {
    /// Insert or replace the entry with the same (parent, code).
    pub fn upsert(&mut self, entry: CodeEntry) {
        match self.entries.iter_mut().find(|e| e.key() == entry.key()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Entries in display order, ties broken by description.
    pub fn sorted(&self) -> Vec<CodeEntry> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.description.cmp(&b.description))
        });
        out
    }

    pub fn find(&self, code: &str, parent: Option<&str>) -> Option<&CodeEntry> {
        self.entries
            .iter()
            .find(|e| e.code == code && (parent.is_none() || e.parent.as_deref() == parent))
    }

    fn find_mut(&mut self, code: &str, parent: Option<&str>) -> Option<&mut CodeEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.code == code && (parent.is_none() || e.parent.as_deref() == parent))
    }

    pub fn active(&self, kind: CodeTableKind, as_of: NaiveDate) -> ActiveCodeSet {
        ActiveCodeSet {
            kind,
            as_of,
            entries: self
                .entries
                .iter()
                .filter(|e| e.is_active(as_of))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The entries of one table that are valid on a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCodeSet {
    pub kind: CodeTableKind,
    pub as_of: NaiveDate,
    pub entries: Vec<CodeEntry>,
}

impl ActiveCodeSet {
    pub fn empty(kind: CodeTableKind, as_of: NaiveDate) -> Self {
        Self {
            kind,
            as_of,
            entries: Vec::new(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    /// Whether `code` is active under `parent` (subclass under well class).
    pub fn contains_under(&self, code: &str, parent: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.code == code && e.parent.as_deref() == Some(parent))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Every code table, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCatalog {
    tables: BTreeMap<CodeTableKind, CodeTable>,
}

impl CodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, kind: CodeTableKind) -> Option<&CodeTable> {
        self.tables.get(&kind)
    }

    /// Add or replace an entry, enforcing parent rules for subclass tables.
    pub fn upsert(&mut self, kind: CodeTableKind, entry: CodeEntry) -> Result<(), CodeError> {
        if kind.has_parent() {
            let parent = entry.parent.clone().ok_or_else(|| CodeError::MissingParent {
                table: kind,
                code: entry.code.clone(),
            })?;
            let parent_exists = self
                .tables
                .get(&CodeTableKind::WellClass)
                .is_some_and(|t| t.find(&parent, None).is_some());
            if !parent_exists {
                return Err(CodeError::UnknownParent {
                    table: kind,
                    code: entry.code,
                    parent,
                });
            }
        }
        self.tables.entry(kind).or_default().upsert(entry);
        Ok(())
    }

    /// Expire an entry from `at` onward. Codes are never removed.
    pub fn expire(
        &mut self,
        kind: CodeTableKind,
        code: &str,
        parent: Option<&str>,
        at: NaiveDate,
    ) -> Result<(), CodeError> {
        let entry = self
            .tables
            .get_mut(&kind)
            .and_then(|t| t.find_mut(code, parent))
            .ok_or_else(|| CodeError::UnknownCode {
                table: kind,
                code: code.to_string(),
            })?;
        entry.expiry_date = Some(at);
        Ok(())
    }

    pub fn active(&self, kind: CodeTableKind, as_of: NaiveDate) -> ActiveCodeSet {
        self.tables
            .get(&kind)
            .map_or_else(|| ActiveCodeSet::empty(kind, as_of), |t| t.active(kind, as_of))
    }

    pub fn list(&self, kind: CodeTableKind) -> Vec<CodeEntry> {
        self.tables.get(&kind).map(CodeTable::sorted).unwrap_or_default()
    }

    /// Merge every entry of `other` into this catalog, parents first.
    pub fn extend(&mut self, other: &CodeCatalog) -> Result<(), CodeError> {
        for (kind, table) in &other.tables {
            for entry in &table.entries {
                self.upsert(*kind, entry.clone())?;
            }
        }
        Ok(())
    }

    /// Iterate every (kind, entry) pair.
    pub fn iter(&self) -> impl Iterator<Item = (CodeTableKind, &CodeEntry)> {
        self.tables
            .iter()
            .flat_map(|(kind, table)| table.entries.iter().map(move |e| (*kind, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_is_half_open() {
        let entry = CodeEntry::new("OLD", "Old code", 10)
            .with_window(Some(date(2010, 1, 1)), Some(date(2020, 1, 1)));

        assert!(!entry.is_active(date(2009, 12, 31)));
        assert!(entry.is_active(date(2010, 1, 1)));
        assert!(entry.is_active(date(2019, 12, 31)));
        assert!(!entry.is_active(date(2020, 1, 1)), "expiry date is exclusive");
    }

    #[test]
    fn test_open_window_always_active() {
        let entry = CodeEntry::new("DOM", "Domestic", 10);
        assert!(entry.is_active(date(1900, 1, 1)));
        assert!(entry.is_active(date(2999, 1, 1)));
    }

    #[test]
    fn test_subclass_requires_known_parent() {
        let mut catalog = CodeCatalog::new();
        let orphan = CodeEntry::new("DOMESTIC", "Domestic", 10);
        assert!(matches!(
            catalog.upsert(CodeTableKind::WellSubclass, orphan),
            Err(CodeError::MissingParent { .. })
        ));

        let dangling = CodeEntry::new("DOMESTIC", "Domestic", 10).with_parent("WATR_SPPLY");
        assert!(matches!(
            catalog.upsert(CodeTableKind::WellSubclass, dangling.clone()),
            Err(CodeError::UnknownParent { .. })
        ));

        catalog
            .upsert(CodeTableKind::WellClass, CodeEntry::new("WATR_SPPLY", "Water Supply", 10))
            .unwrap();
        catalog.upsert(CodeTableKind::WellSubclass, dangling).unwrap();
        assert_eq!(catalog.list(CodeTableKind::WellSubclass).len(), 1);
    }

    #[test]
    fn test_subclass_code_unique_per_class() {
        let mut catalog = CodeCatalog::new();
        for class in ["WATR_SPPLY", "MONITOR"] {
            catalog
                .upsert(CodeTableKind::WellClass, CodeEntry::new(class, class, 10))
                .unwrap();
        }
        let a = CodeEntry::new("PERMANENT", "Permanent", 10).with_parent("WATR_SPPLY");
        let b = CodeEntry::new("PERMANENT", "Permanent", 10).with_parent("MONITOR");
        catalog.upsert(CodeTableKind::WellSubclass, a.clone()).unwrap();
        catalog.upsert(CodeTableKind::WellSubclass, b).unwrap();
        catalog.upsert(CodeTableKind::WellSubclass, a).unwrap();

        assert_eq!(catalog.list(CodeTableKind::WellSubclass).len(), 2);
        let active = catalog.active(CodeTableKind::WellSubclass, date(2024, 1, 1));
        assert!(active.contains_under("PERMANENT", "MONITOR"));
        assert!(!active.contains_under("PERMANENT", "GEOTECH"));
    }

    #[test]
    fn test_expire_removes_from_active_set() {
        let mut catalog = CodeCatalog::new();
        catalog
            .upsert(CodeTableKind::CasingMaterial, CodeEntry::new("STEEL", "Steel", 10))
            .unwrap();
        catalog
            .expire(CodeTableKind::CasingMaterial, "STEEL", None, date(2021, 6, 1))
            .unwrap();

        assert!(catalog
            .active(CodeTableKind::CasingMaterial, date(2021, 5, 31))
            .contains("STEEL"));
        assert!(!catalog
            .active(CodeTableKind::CasingMaterial, date(2021, 6, 1))
            .contains("STEEL"));
        assert_eq!(catalog.list(CodeTableKind::CasingMaterial).len(), 1, "never deleted");
    }

    #[test]
    fn test_list_orders_by_display_order_then_description() {
        let mut table = CodeTable::default();
        table.upsert(CodeEntry::new("B", "Bravo", 20));
        table.upsert(CodeEntry::new("Z", "Zulu", 10));
        table.upsert(CodeEntry::new("A", "Alpha", 20));
        let codes: Vec<_> = table.sorted().into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["Z", "A", "B"]);
    }

    #[test]
    fn test_table_names_round_trip() {
        for kind in CodeTableKind::ALL {
            assert_eq!(CodeTableKind::from_table_name(kind.table_name()), Some(kind));
        }
    }
}
