//! Configuration structures for the thread measurement workflow.
//!
//! This module defines the tunable parameters for a measurement session,
//! organized into groups for the reference object, display, calibration,
//! the interactive gauge, and standards matching.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use scan_threads::MeasureConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = MeasureConfig::from_json_file(Path::new("measure.json"))?;
//!
//! // Or use defaults
//! let config = MeasureConfig::default();
//! # Ok::<(), scan_threads::MeasureError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`ReferenceConfig`]: physical size of the calibration coin
//! - [`DisplayConfig`]: display fit and object magnification
//! - [`CalibrationConfig`]: median blur and Hough transform parameters
//! - [`GaugeConfig`]: initial gauge geometry and adjustment steps
//! - [`MatchingConfig`]: default tolerance bands

use crate::constants::{calibration, display, gauge, matching, reference};
use crate::error::{MeasureError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration for a measurement session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MeasureConfig {
    pub reference: ReferenceConfig,
    pub display: DisplayConfig,
    pub calibration: CalibrationConfig,
    pub gauge: GaugeConfig,
    pub matching: MatchingConfig,
}

/// Reference object of known size used for scale calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Physical diameter of the reference object in millimetres
    pub diameter_mm: f64,
}

/// Display parameters for region selection and gauge adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum width of the downscaled photograph during region selection
    pub max_width: u32,

    /// Maximum height of the downscaled photograph during region selection
    pub max_height: u32,

    /// Magnification of the object crop in the gauge working frame
    pub magnification: f64,
}

/// Circle detection parameters.
///
/// Radii and separation are expressed as fractions of the shorter side of
/// the reference crop, so one configuration serves any crop size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Median blur kernel size (must be odd and > 1)
    pub median_kernel_size: i32,

    /// Inverse ratio of accumulator resolution to image resolution
    pub accumulator_dp: f64,

    /// Canny high threshold for edge voting
    pub edge_threshold: f64,

    /// Minimum accumulator votes for an accepted circle
    pub vote_threshold: f64,

    pub min_radius_ratio: f64,
    pub max_radius_ratio: f64,
    pub min_separation_ratio: f64,
}

/// Initial gauge geometry and adjustment steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Initial rectangle corners `[x1, y1, x2, y2]` in working-frame pixels
    pub initial_rect: [f64; 4],
    pub initial_ridge_count: f64,
    pub initial_amplitude: f64,

    /// Pointer distance within which an edge is grabbed
    pub edge_hit_threshold: f64,

    /// Ridge count, amplitude and phase change per key press
    pub adjust_step: f64,

    /// Rotation per key press, in degrees
    pub rotation_step_deg: f64,
}

/// Default tolerance bands for standards matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub diameter_tolerance_mm: f64,
    pub pitch_tolerance_mm: f64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            diameter_mm: reference::COIN_DIAMETER_MM,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_width: display::MAX_WIDTH,
            max_height: display::MAX_HEIGHT,
            magnification: display::OBJECT_MAGNIFICATION,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            median_kernel_size: calibration::MEDIAN_KERNEL_SIZE,
            accumulator_dp: calibration::ACCUMULATOR_DP,
            edge_threshold: calibration::EDGE_THRESHOLD,
            vote_threshold: calibration::VOTE_THRESHOLD,
            min_radius_ratio: calibration::MIN_RADIUS_RATIO,
            max_radius_ratio: calibration::MAX_RADIUS_RATIO,
            min_separation_ratio: calibration::MIN_SEPARATION_RATIO,
        }
    }
}

impl Default for GaugeConfig {
    fn default() -> Self {
        let (x1, y1, x2, y2) = gauge::INITIAL_RECT;
        Self {
            initial_rect: [x1, y1, x2, y2],
            initial_ridge_count: gauge::INITIAL_RIDGE_COUNT,
            initial_amplitude: gauge::INITIAL_AMPLITUDE,
            edge_hit_threshold: gauge::EDGE_HIT_THRESHOLD,
            adjust_step: gauge::ADJUST_STEP,
            rotation_step_deg: gauge::ROTATION_STEP_DEG,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            diameter_tolerance_mm: matching::DIAMETER_TOLERANCE_MM,
            pitch_tolerance_mm: matching::PITCH_TOLERANCE_MM,
        }
    }
}

impl MeasureConfig {
    /// Parse configuration from a JSON string and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MeasureError::config("Invalid configuration JSON", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeasureError::config(format!("Failed to read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MeasureError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            MeasureError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        positive("reference.diameter_mm", self.reference.diameter_mm)?;
        positive("display.magnification", self.display.magnification)?;
        if self.display.max_width == 0 || self.display.max_height == 0 {
            return Err(MeasureError::invalid(
                "display.max_width x max_height",
                format!("{}x{}", self.display.max_width, self.display.max_height),
            ));
        }

        let cal = &self.calibration;
        if cal.median_kernel_size < 3 || cal.median_kernel_size % 2 == 0 {
            return Err(MeasureError::invalid(
                "calibration.median_kernel_size",
                cal.median_kernel_size,
            ));
        }
        positive("calibration.accumulator_dp", cal.accumulator_dp)?;
        positive("calibration.edge_threshold", cal.edge_threshold)?;
        positive("calibration.vote_threshold", cal.vote_threshold)?;
        positive("calibration.min_radius_ratio", cal.min_radius_ratio)?;
        positive("calibration.min_separation_ratio", cal.min_separation_ratio)?;
        if cal.max_radius_ratio <= cal.min_radius_ratio || cal.max_radius_ratio > 0.5 {
            return Err(MeasureError::invalid(
                "calibration.max_radius_ratio",
                cal.max_radius_ratio,
            ));
        }

        positive("gauge.edge_hit_threshold", self.gauge.edge_hit_threshold)?;
        positive("gauge.adjust_step", self.gauge.adjust_step)?;
        positive("gauge.rotation_step_deg", self.gauge.rotation_step_deg)?;
        non_negative("matching.diameter_tolerance_mm", self.matching.diameter_tolerance_mm)?;
        non_negative("matching.pitch_tolerance_mm", self.matching.pitch_tolerance_mm)?;
        Ok(())
    }
}

fn positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::invalid(parameter, value))
    }
}

fn non_negative(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MeasureError::invalid(parameter, value))
    }
}
