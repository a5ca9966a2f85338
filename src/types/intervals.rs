//! Depth-interval child records owned by a well or an activity submission.
//!
//! Depths are in feet below ground. Start and end are optional on casing,
//! screen and lithology records because legacy data often lacks them; liner
//! perforations and decommission descriptions require both (enforced by the
//! validator, not by the type, so incomplete reports produce itemized errors
//! instead of deserialization failures).

use serde::{Deserialize, Serialize};

// ============================================================================
// Interval Kind
// ============================================================================

/// The five kinds of depth-interval child record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Casing,
    Screen,
    LinerPerforation,
    Lithology,
    DecommissionDescription,
}

impl IntervalKind {
    pub const ALL: [IntervalKind; 5] = [
        IntervalKind::Casing,
        IntervalKind::Screen,
        IntervalKind::LinerPerforation,
        IntervalKind::Lithology,
        IntervalKind::DecommissionDescription,
    ];

    /// Collection name used in error field paths, e.g. `casings[2].end`
    pub fn collection_name(&self) -> &'static str {
        match self {
            IntervalKind::Casing => "casings",
            IntervalKind::Screen => "screens",
            IntervalKind::LinerPerforation => "liner_perforations",
            IntervalKind::Lithology => "lithology",
            IntervalKind::DecommissionDescription => "decommission_descriptions",
        }
    }

    /// Config section key under `[intervals]`
    pub fn config_key(&self) -> &'static str {
        match self {
            IntervalKind::Casing => "casing",
            IntervalKind::Screen => "screen",
            IntervalKind::LinerPerforation => "liner_perforation",
            IntervalKind::Lithology => "lithology",
            IntervalKind::DecommissionDescription => "decommission_description",
        }
    }

    /// Whether both bounds must be present on every record of this kind.
    pub fn requires_bounds(&self) -> bool {
        matches!(
            self,
            IntervalKind::LinerPerforation | IntervalKind::DecommissionDescription
        )
    }
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalKind::Casing => write!(f, "casing"),
            IntervalKind::Screen => write!(f, "screen"),
            IntervalKind::LinerPerforation => write!(f, "liner perforation"),
            IntervalKind::Lithology => write!(f, "lithology"),
            IntervalKind::DecommissionDescription => write!(f, "decommission description"),
        }
    }
}

/// A (start, end) depth pair taken from any interval record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DepthInterval {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl DepthInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both bounds, if both are set.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.start?, self.end?))
    }
}

/// Implemented by every depth-interval child record.
pub trait Interval {
    const KIND: IntervalKind;

    fn depth(&self) -> DepthInterval;
}

// ============================================================================
// Casing
// ============================================================================

/// Casing installed in a well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Casing {
    pub start: Option<f64>,
    pub end: Option<f64>,
    /// Diameter in inches
    pub diameter: Option<f64>,
    /// Casing type code (surface, liner, open hole, ...)
    pub casing_code: Option<String>,
    pub casing_material: Option<String>,
    /// Wall thickness in inches
    pub wall_thickness: Option<f64>,
    #[serde(default)]
    pub drive_shoe: Option<bool>,
}

impl Interval for Casing {
    const KIND: IntervalKind = IntervalKind::Casing;

    fn depth(&self) -> DepthInterval {
        DepthInterval {
            start: self.start,
            end: self.end,
        }
    }
}

// ============================================================================
// Screen
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Screen {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub internal_diameter: Option<f64>,
    pub assembly_type: Option<String>,
    pub slot_size: Option<f64>,
}

impl Interval for Screen {
    const KIND: IntervalKind = IntervalKind::Screen;

    fn depth(&self) -> DepthInterval {
        DepthInterval {
            start: self.start,
            end: self.end,
        }
    }
}

// ============================================================================
// Liner Perforation
// ============================================================================

/// Perforated section of a well liner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LinerPerforation {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl Interval for LinerPerforation {
    const KIND: IntervalKind = IntervalKind::LinerPerforation;

    fn depth(&self) -> DepthInterval {
        DepthInterval {
            start: self.start,
            end: self.end,
        }
    }
}

// ============================================================================
// Lithology
// ============================================================================

/// Ground material observed between two depths while drilling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LithologyDescription {
    pub lithology_from: Option<f64>,
    pub lithology_to: Option<f64>,
    pub lithology_raw_data: Option<String>,
    pub lithology_description: Option<String>,
    pub lithology_colour: Option<String>,
    pub lithology_hardness: Option<String>,
    pub lithology_material: Option<String>,
    pub lithology_moisture: Option<String>,
    pub lithology_structure: Option<String>,
    pub bedrock_material: Option<String>,
    pub bedrock_material_descriptor: Option<String>,
    pub surficial_material: Option<String>,
    pub secondary_surficial_material: Option<String>,
    pub water_bearing_estimated_flow: Option<f64>,
    pub water_bearing_estimated_flow_units: Option<String>,
    pub lithology_observation: Option<String>,
    pub lithology_sequence_number: Option<i64>,
}

impl Interval for LithologyDescription {
    const KIND: IntervalKind = IntervalKind::Lithology;

    fn depth(&self) -> DepthInterval {
        DepthInterval {
            start: self.lithology_from,
            end: self.lithology_to,
        }
    }
}

// ============================================================================
// Decommission Description
// ============================================================================

/// Material placed between two depths while decommissioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecommissionDescription {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub material: Option<String>,
    pub observations: Option<String>,
}

impl Interval for DecommissionDescription {
    const KIND: IntervalKind = IntervalKind::DecommissionDescription;

    fn depth(&self) -> DepthInterval {
        DepthInterval {
            start: self.start,
            end: self.end,
        }
    }
}

// ============================================================================
// Collections
// ============================================================================

/// The five interval collections carried by both wells and submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IntervalSet {
    pub casings: Vec<Casing>,
    pub screens: Vec<Screen>,
    pub liner_perforations: Vec<LinerPerforation>,
    pub lithology: Vec<LithologyDescription>,
    pub decommission_descriptions: Vec<DecommissionDescription>,
}

impl IntervalSet {
    /// Depth pairs of one collection, in input order.
    pub fn depths(&self, kind: IntervalKind) -> Vec<DepthInterval> {
        fn collect<T: Interval>(items: &[T]) -> Vec<DepthInterval> {
            items.iter().map(Interval::depth).collect()
        }
        match kind {
            IntervalKind::Casing => collect(&self.casings),
            IntervalKind::Screen => collect(&self.screens),
            IntervalKind::LinerPerforation => collect(&self.liner_perforations),
            IntervalKind::Lithology => collect(&self.lithology),
            IntervalKind::DecommissionDescription => collect(&self.decommission_descriptions),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.casings.is_empty()
            && self.screens.is_empty()
            && self.liner_perforations.is_empty()
            && self.lithology.is_empty()
            && self.decommission_descriptions.is_empty()
    }

    /// Replace each collection of `self` with the matching collection of
    /// `incoming` when the incoming one is non-empty.
    pub fn replace_from(&mut self, incoming: &IntervalSet) {
        if !incoming.casings.is_empty() {
            self.casings.clone_from(&incoming.casings);
        }
        if !incoming.screens.is_empty() {
            self.screens.clone_from(&incoming.screens);
        }
        if !incoming.liner_perforations.is_empty() {
            self.liner_perforations.clone_from(&incoming.liner_perforations);
        }
        if !incoming.lithology.is_empty() {
            self.lithology.clone_from(&incoming.lithology);
        }
        if !incoming.decommission_descriptions.is_empty() {
            self.decommission_descriptions
                .clone_from(&incoming.decommission_descriptions);
        }
    }
}
