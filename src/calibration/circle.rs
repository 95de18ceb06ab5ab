//! Circle detection seam
//!
//! The detector itself is an external primitive: it receives a single-channel
//! image plus the search constraints below and reports zero or more circles
//! in its own ranking order. [`crate::calibration::Calibrator`] decides what
//! to do with that ranking.

use crate::config::CalibrationConfig;
use crate::error::Result;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Circle candidate in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }
}

/// Constraints handed to the circle detector for one reference crop
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSearch {
    /// Median blur window applied before voting
    pub median_kernel_size: i32,
    /// Inverse accumulator resolution
    pub accumulator_dp: f64,
    /// Minimum distance between accepted centres
    pub min_separation: f64,
    /// Canny high threshold
    pub edge_threshold: f64,
    /// Accumulator vote threshold
    pub vote_threshold: f64,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl CircleSearch {
    /// Derive the search constraints for a `width x height` crop.
    ///
    /// The coin is assumed to span roughly half of the shorter side and never
    /// to be clipped, hence the radius band and the separation that keeps a
    /// coin's inner and outer rims from both being reported.
    pub fn for_image(width: u32, height: u32, config: &CalibrationConfig) -> Self {
        let min_dim = width.min(height);
        let min_dim_f = f64::from(min_dim);
        Self {
            median_kernel_size: config.median_kernel_size,
            accumulator_dp: config.accumulator_dp,
            min_separation: (min_dim_f * config.min_separation_ratio).floor(),
            edge_threshold: config.edge_threshold,
            vote_threshold: config.vote_threshold,
            min_radius: (min_dim_f * config.min_radius_ratio) as i32,
            max_radius: (min_dim_f * config.max_radius_ratio) as i32,
        }
    }

    /// Whether a candidate lies inside the admissible radius band
    pub fn admits_radius(&self, radius: f64) -> bool {
        radius >= f64::from(self.min_radius) && radius <= f64::from(self.max_radius)
    }
}

/// Circle-detection primitive
pub trait CircleDetector {
    /// Detect circles in a single-channel image, in the detector's own order
    fn detect(&self, gray: &GrayImage, search: &CircleSearch) -> Result<Vec<Circle>>;
}

impl<F> CircleDetector for F
where
    F: Fn(&GrayImage, &CircleSearch) -> Result<Vec<Circle>>,
{
    fn detect(&self, gray: &GrayImage, search: &CircleSearch) -> Result<Vec<Circle>> {
        self(gray, search)
    }
}
