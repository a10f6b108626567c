//! Search settings loaded from TOML.
//!
//! The defaults ship embedded from `config/default.toml`. A deployment
//! can point `CAFE_SCOUT_SEARCH_CONFIG` at its own file; any key it
//! leaves out keeps the default value.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::expander::ExpansionPolicy;

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

/// Environment variable naming an override config file.
pub const CONFIG_ENV_VAR: &str = "CAFE_SCOUT_SEARCH_CONFIG";

/// Errors from loading search settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Invalid search config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Radius expansion settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius used when a request does not specify one.
    pub default_radius_m: u32,
    /// Stop expanding once at least this many open cafes are found.
    pub min_results: usize,
    /// Multiplier applied to the radius on each expansion.
    pub growth_factor: f64,
    /// Minimum growth per expansion, in meters.
    pub min_step_m: u32,
    /// Radius ceiling, in meters.
    pub max_radius_m: u32,
    /// Maximum number of expansions after the first query.
    pub max_expansions: u32,
    /// Ignore `max_expansions` and keep expanding until the radius
    /// ceiling or `min_results` is reached.
    pub unlimited_expansions: bool,
    /// Pause between expansions, in milliseconds.
    pub expansion_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 4000,
            min_results: 10,
            growth_factor: 2.0,
            min_step_m: 4000,
            max_radius_m: 15_000,
            max_expansions: 2,
            unlimited_expansions: false,
            expansion_delay_ms: 2000,
        }
    }
}

impl SearchConfig {
    /// Returns the settings embedded at compile time.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (guarded by tests).
    #[must_use]
    pub fn embedded() -> Self {
        Self::parse(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded search config: {e}"))
    }

    /// Parses settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the embedded
    /// defaults when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the override file cannot be read or
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => {
                log::info!("Loading search config from {path}");
                Self::load(Path::new(&path))
            }
            Err(_) => Ok(Self::embedded()),
        }
    }

    /// The expansion policy described by these settings.
    #[must_use]
    pub const fn policy(&self) -> ExpansionPolicy {
        ExpansionPolicy {
            min_results: self.min_results,
            growth_factor: self.growth_factor,
            min_step_m: self.min_step_m,
            max_radius_m: self.max_radius_m,
            max_expansions: if self.unlimited_expansions {
                None
            } else {
                Some(self.max_expansions)
            },
            expansion_delay: Duration::from_millis(self.expansion_delay_ms),
        }
    }
}
