//! Registry Configuration Module
//!
//! ## Loading Order
//!
//! 1. `WELL_REGISTRY_CONFIG` environment variable (path to TOML file)
//! 2. `well_registry.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```toml
//! [storage]
//! backend = "sled"
//! path = "/var/lib/well_registry"
//!
//! [registry]
//! first_well_tag_number = 100000
//!
//! [intervals.lithology]
//! allow_zero_length = false
//!
//! [audit]
//! backend = "store"
//! ```

mod registry_config;
pub mod validation;

pub use registry_config::*;
