//! Well status state machine.
//!
//! | current                  | activity                        | result      |
//! |--------------------------|---------------------------------|-------------|
//! | UNCREATED                | construction                    | NEW         |
//! | UNCREATED                | alteration/decommission/other   | NoSuchWell  |
//! | NEW, ALTERATION, OTHER   | alteration                      | ALTERATION  |
//! | NEW, ALTERATION, OTHER   | decommission                    | CLOSURE     |
//! | NEW, ALTERATION, OTHER   | other                           | OTHER       |
//! | NEW, ALTERATION, OTHER   | construction                    | DuplicateConstruction |
//! | CLOSURE                  | any                             | WellAlreadyDecommissioned |
//!
//! Leaving CLOSURE is an administrative correction outside this flow.

use super::error::ValidationError;
use crate::types::{ActivityType, WellStatus};

/// Resulting status for `activity` applied to a well in `current` status.
///
/// `well_tag_number` is only used to label the error.
pub fn transition(
    current: WellStatus,
    activity: ActivityType,
    well_tag_number: Option<u64>,
) -> Result<WellStatus, ValidationError> {
    match (current, activity) {
        (WellStatus::Uncreated, ActivityType::Construction) => Ok(WellStatus::New),
        (WellStatus::Uncreated, _) => Err(ValidationError::NoSuchWell { well_tag_number }),
        (WellStatus::Closure, _) => Err(ValidationError::WellAlreadyDecommissioned {
            well_tag_number: well_tag_number.unwrap_or_default(),
        }),
        (_, ActivityType::Construction) => Err(ValidationError::DuplicateConstruction {
            well_tag_number: well_tag_number.unwrap_or_default(),
        }),
        (WellStatus::New | WellStatus::Alteration | WellStatus::Other, activity) => {
            Ok(activity.resulting_status())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE: [WellStatus; 3] = [WellStatus::New, WellStatus::Alteration, WellStatus::Other];

    #[test]
    fn test_uncreated_only_accepts_construction() {
        assert_eq!(
            transition(WellStatus::Uncreated, ActivityType::Construction, None),
            Ok(WellStatus::New)
        );
        for activity in [ActivityType::Alteration, ActivityType::Decommission, ActivityType::Other] {
            assert_eq!(
                transition(WellStatus::Uncreated, activity, Some(9)),
                Err(ValidationError::NoSuchWell { well_tag_number: Some(9) })
            );
        }
    }

    #[test]
    fn test_live_wells_follow_activity() {
        for current in LIVE {
            assert_eq!(
                transition(current, ActivityType::Alteration, Some(1)),
                Ok(WellStatus::Alteration)
            );
            assert_eq!(
                transition(current, ActivityType::Decommission, Some(1)),
                Ok(WellStatus::Closure)
            );
            assert_eq!(transition(current, ActivityType::Other, Some(1)), Ok(WellStatus::Other));
            assert_eq!(
                transition(current, ActivityType::Construction, Some(1)),
                Err(ValidationError::DuplicateConstruction { well_tag_number: 1 })
            );
        }
    }

    #[test]
    fn test_closure_is_terminal() {
        for activity in ActivityType::ALL {
            assert_eq!(
                transition(WellStatus::Closure, activity, Some(4)),
                Err(ValidationError::WellAlreadyDecommissioned { well_tag_number: 4 })
            );
        }
    }
}
