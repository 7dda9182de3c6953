//! Start-up settings
//!
//! Defines every configurable constant of the loader and the replay engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::replay::{Projection, ReplayTiming};
use crate::trajectory::PathFilter;

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Recording of `x,y,elapsed_ms` samples to build paths from
    pub recording_path: PathBuf,
    /// Exclusive ceiling on indexed path displacement
    pub max_distance: u32,
    /// Consecutive identical samples that end a movement
    pub dwell_threshold: u32,
    /// Plausibility windows for recorded paths
    pub filter: PathFilter,
    /// Replay behaviour
    pub replay: ReplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recording_path: PathBuf::from("coordinates.txt"),
            max_distance: 1000,
            dwell_threshold: 20,
            filter: PathFilter::default(),
            replay: ReplaySettings::default(),
        }
    }
}

impl Settings {
    /// Replay recorded delays exactly (the default)
    pub fn recorded() -> Self {
        Self::default()
    }

    /// Ignore recorded delays and step every 50 ms
    pub fn fixed_step() -> Self {
        Self {
            replay: ReplaySettings {
                timing: ReplayTiming::FixedInterval { step_ms: 50 },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations the loader cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dwell_threshold == 0 {
            return Err(ConfigError::Invalid(
                "dwell_threshold must be at least 1".to_string(),
            ));
        }

        if self.filter.max_displacement > self.max_distance {
            return Err(ConfigError::Invalid(format!(
                "filter.max_displacement ({}) exceeds max_distance ({})",
                self.filter.max_displacement, self.max_distance
            )));
        }

        Ok(())
    }
}

/// Replay behaviour settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Where step delays come from
    pub timing: ReplayTiming,
    /// How recorded paths are reoriented toward the goal
    pub projection: Projection,
    /// Fixed seed for path selection (random when unset)
    pub seed: Option<u64>,
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}
