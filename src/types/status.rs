//! Lifecycle types: WellStatus, ActivityType, PublicationStatus

use serde::{Deserialize, Serialize};

// ============================================================================
// Well Status
// ============================================================================

/// Lifecycle stage of a well.
///
/// `Uncreated` is never persisted; it is the status the state machine uses for
/// a tag number that has no well record yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WellStatus {
    #[default]
    Uncreated,
    New,
    Alteration,
    Closure,
    Other,
}

impl WellStatus {
    /// Stable code as stored in the well status code table
    pub fn code(&self) -> &'static str {
        match self {
            WellStatus::Uncreated => "UNCREATED",
            WellStatus::New => "NEW",
            WellStatus::Alteration => "ALTERATION",
            WellStatus::Closure => "CLOSURE",
            WellStatus::Other => "OTHER",
        }
    }

    /// CLOSURE is terminal for normal submissions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WellStatus::Closure)
    }

    /// Look up a status by its stored code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "UNCREATED" => Some(WellStatus::Uncreated),
            "NEW" => Some(WellStatus::New),
            "ALTERATION" => Some(WellStatus::Alteration),
            "CLOSURE" => Some(WellStatus::Closure),
            "OTHER" => Some(WellStatus::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for WellStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Activity Type
// ============================================================================

/// Type of work reported by an activity submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Construction,
    Alteration,
    Decommission,
    Other,
}

impl ActivityType {
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Construction,
        ActivityType::Alteration,
        ActivityType::Decommission,
        ActivityType::Other,
    ];

    /// Well status this activity drives the well into when accepted.
    ///
    /// Replaces the lookup-by-fixed-code status queries: construction reports
    /// correspond to NEW, decommission reports trigger CLOSURE, and so on.
    pub fn resulting_status(&self) -> WellStatus {
        match self {
            ActivityType::Construction => WellStatus::New,
            ActivityType::Alteration => WellStatus::Alteration,
            ActivityType::Decommission => WellStatus::Closure,
            ActivityType::Other => WellStatus::Other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ActivityType::Construction => "CON",
            ActivityType::Alteration => "ALT",
            ActivityType::Decommission => "DEC",
            ActivityType::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityType::Construction => write!(f, "construction"),
            ActivityType::Alteration => write!(f, "alteration"),
            ActivityType::Decommission => write!(f, "decommission"),
            ActivityType::Other => write!(f, "other"),
        }
    }
}

// ============================================================================
// Publication Status
// ============================================================================

/// Controls external visibility of a well, independent of its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PublicationStatus {
    #[default]
    Published,
    Unpublished,
    Pending,
}

impl PublicationStatus {
    pub fn code(&self) -> &'static str {
        match self {
            PublicationStatus::Published => "Published",
            PublicationStatus::Unpublished => "Unpublished",
            PublicationStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for PublicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Published" => Ok(PublicationStatus::Published),
            "Unpublished" => Ok(PublicationStatus::Unpublished),
            "Pending" => Ok(PublicationStatus::Pending),
            other => Err(format!("unknown publication status '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_drives_expected_status() {
        assert_eq!(ActivityType::Construction.resulting_status(), WellStatus::New);
        assert_eq!(ActivityType::Alteration.resulting_status(), WellStatus::Alteration);
        assert_eq!(ActivityType::Decommission.resulting_status(), WellStatus::Closure);
        assert_eq!(ActivityType::Other.resulting_status(), WellStatus::Other);
    }

    #[test]
    fn test_status_code_round_trip() {
        for status in [
            WellStatus::New,
            WellStatus::Alteration,
            WellStatus::Closure,
            WellStatus::Other,
        ] {
            assert_eq!(WellStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(WellStatus::from_code("BOGUS"), None);
    }

    #[test]
    fn test_only_closure_is_terminal() {
        assert!(WellStatus::Closure.is_terminal());
        assert!(!WellStatus::New.is_terminal());
        assert!(!WellStatus::Uncreated.is_terminal());
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&WellStatus::Closure).unwrap();
        assert_eq!(json, "\"CLOSURE\"");
        let json = serde_json::to_string(&ActivityType::Decommission).unwrap();
        assert_eq!(json, "\"decommission\"");
    }
}
