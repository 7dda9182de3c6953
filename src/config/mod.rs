//! Configuration module
//!
//! Handles recording location, index ceiling, segmentation and replay settings.

pub mod settings;

pub use settings::{ConfigError, ReplaySettings, Settings};
