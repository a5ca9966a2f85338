//! Registry Configuration - storage, numbering, interval policy, audit and
//! code-table settings as TOML values.
//!
//! Every section implements `Default`, so an empty file (or no file) gives a
//! working registry with the standard interval layout rules.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::storage::StorageBackend;
use crate::types::{IntervalKind, PublicationStatus};
use crate::validation::{IntervalPolicies, IntervalPolicy};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "WELL_REGISTRY_CONFIG";

/// Config file looked for in the working directory
pub const LOCAL_CONFIG_FILE: &str = "well_registry.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a registry deployment.
///
/// Load with `RegistryConfig::load()` which searches:
/// 1. `$WELL_REGISTRY_CONFIG` env var
/// 2. `./well_registry.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub registry: RegistrySettings,

    /// Per-kind interval layout overrides
    #[serde(default)]
    pub intervals: IntervalSettings,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub codes: CodesConfig,
}

impl RegistryConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WELL_REGISTRY_CONFIG` environment variable
    /// 2. `./well_registry.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded registry config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded registry config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Unknown keys are logged as warnings with spelling suggestions; they
    /// never fail the load.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate config text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.storage.backend == StorageBackend::Sled
            && self.storage.path.as_os_str().is_empty()
        {
            errors.push("storage.path must not be empty for the sled backend".to_string());
        }

        if self.registry.first_well_tag_number == 0 {
            errors.push("registry.first_well_tag_number must be at least 1".to_string());
        }

        if self.audit.enabled
            && self.audit.backend == AuditBackend::Store
            && self.storage.backend != StorageBackend::Sled
        {
            errors.push("audit.backend = \"store\" requires storage.backend = \"sled\"".to_string());
        }

        if let Some(path) = &self.codes.path {
            if path.as_os_str().is_empty() {
                errors.push("codes.path must not be empty when set".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Effective interval policies: built-in defaults with overrides applied.
    pub fn interval_policies(&self) -> IntervalPolicies {
        self.intervals.policies()
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Data directory for the sled backend
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/well_registry")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Tag number assigned to the first well of an empty store
    #[serde(default = "default_first_well_tag_number")]
    pub first_well_tag_number: u64,

    /// Publication status of new wells whose construction report sets none
    #[serde(default)]
    pub default_publication_status: PublicationStatus,
}

fn default_first_well_tag_number() -> u64 {
    1
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            first_well_tag_number: default_first_well_tag_number(),
            default_publication_status: PublicationStatus::default(),
        }
    }
}

// ============================================================================
// Intervals
// ============================================================================

/// Partial override of one interval kind's layout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_overlap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_zero_length: Option<bool>,
}

impl PolicyOverride {
    fn apply(&self, base: IntervalPolicy) -> IntervalPolicy {
        IntervalPolicy {
            allow_overlap: self.allow_overlap.unwrap_or(base.allow_overlap),
            allow_zero_length: self.allow_zero_length.unwrap_or(base.allow_zero_length),
        }
    }
}

/// `[intervals.<kind>]` sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntervalSettings {
    #[serde(default)]
    pub casing: PolicyOverride,
    #[serde(default)]
    pub screen: PolicyOverride,
    #[serde(default)]
    pub liner_perforation: PolicyOverride,
    #[serde(default)]
    pub lithology: PolicyOverride,
    #[serde(default)]
    pub decommission_description: PolicyOverride,
}

impl IntervalSettings {
    fn for_kind(&self, kind: IntervalKind) -> PolicyOverride {
        match kind {
            IntervalKind::Casing => self.casing,
            IntervalKind::Screen => self.screen,
            IntervalKind::LinerPerforation => self.liner_perforation,
            IntervalKind::Lithology => self.lithology,
            IntervalKind::DecommissionDescription => self.decommission_description,
        }
    }

    pub fn policies(&self) -> IntervalPolicies {
        let policy = |kind| self.for_kind(kind).apply(IntervalPolicy::default_for(kind));
        IntervalPolicies {
            casing: policy(IntervalKind::Casing),
            screen: policy(IntervalKind::Screen),
            liner_perforation: policy(IntervalKind::LinerPerforation),
            lithology: policy(IntervalKind::Lithology),
            decommission_description: policy(IntervalKind::DecommissionDescription),
        }
    }
}

// ============================================================================
// Audit
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    /// Structured log events on target `well_registry::audit`
    #[default]
    Log,
    /// `audit` tree in the sled database
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: AuditBackend,
}

fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: AuditBackend::default(),
        }
    }
}

// ============================================================================
// Codes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodesConfig {
    /// Load the built-in code catalog into an empty store
    #[serde(default = "default_true")]
    pub seed_defaults: bool,

    /// Code file applied over the store at startup
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for CodesConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            path: None,
        }
    }
}
