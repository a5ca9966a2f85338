//! Data model for the well registry
//!
//! - `status`: well lifecycle status, activity types, publication status
//! - `intervals`: casing, screen, liner perforation, lithology and
//!   decommission description depth records
//! - `details`: scalar field groups shared by wells and submissions
//! - `well` / `submission`: the two top-level records

mod status;
mod intervals;
mod details;
mod well;
mod submission;

pub use status::*;
pub use intervals::*;
pub use details::*;
pub use well::*;
pub use submission::*;
