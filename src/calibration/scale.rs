//! Millimetres-per-pixel calibration against a reference coin
//!
//! The coin crop must be taken from the full-resolution photograph: the scale
//! is only valid for pixels of that resolution, and every working frame is
//! mapped back to it before the scale is applied.

use crate::calibration::circle::{Circle, CircleDetector, CircleSearch};
use crate::config::CalibrationConfig;
use crate::error::{MeasureError, Result};
use image::{imageops, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Outcome of a successful calibration; detection failure is an error instead
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Known physical diameter of the reference object
    pub reference_diameter_mm: f64,
    /// The accepted circle, in reference-crop pixels
    pub circle: Circle,
    /// Physical millimetres per original-resolution pixel
    pub mm_per_pixel: f64,
}

impl CalibrationResult {
    /// Scale from a known diameter and a detected radius
    pub fn from_radius(reference_diameter_mm: f64, circle: Circle) -> Result<Self> {
        if !(reference_diameter_mm.is_finite() && reference_diameter_mm > 0.0) {
            return Err(MeasureError::invalid(
                "reference_diameter_mm",
                reference_diameter_mm,
            ));
        }
        if !(circle.radius.is_finite() && circle.radius > 0.0) {
            return Err(MeasureError::invalid("detected radius", circle.radius));
        }
        Ok(Self {
            reference_diameter_mm,
            circle,
            mm_per_pixel: reference_diameter_mm / circle.diameter(),
        })
    }

    /// Physical length of a span measured in original-resolution pixels
    pub fn to_mm(&self, pixels: f64) -> f64 {
        pixels * self.mm_per_pixel
    }
}

/// Reference-coin calibrator
#[derive(Debug, Clone)]
pub struct Calibrator<D> {
    reference_diameter_mm: f64,
    config: CalibrationConfig,
    detector: D,
}

impl<D: CircleDetector> Calibrator<D> {
    /// Create a calibrator with default detection parameters
    pub fn new(reference_diameter_mm: f64, detector: D) -> Result<Self> {
        Self::with_config(reference_diameter_mm, CalibrationConfig::default(), detector)
    }

    /// Create a calibrator with custom detection parameters
    pub fn with_config(
        reference_diameter_mm: f64,
        config: CalibrationConfig,
        detector: D,
    ) -> Result<Self> {
        if !(reference_diameter_mm.is_finite() && reference_diameter_mm > 0.0) {
            return Err(MeasureError::invalid(
                "reference_diameter_mm",
                reference_diameter_mm,
            ));
        }
        Ok(Self {
            reference_diameter_mm,
            config,
            detector,
        })
    }

    pub fn reference_diameter_mm(&self) -> f64 {
        self.reference_diameter_mm
    }

    /// Calibrate from a color crop containing the whole reference coin
    ///
    /// # Errors
    ///
    /// - `EmptyImage` if the crop has no pixels
    /// - `NoCircleDetected` if no circle lies in the admissible radius band;
    ///   the caller must abort the session rather than guess a scale
    pub fn calibrate(&self, piece: &RgbImage) -> Result<CalibrationResult> {
        let (width, height) = piece.dimensions();
        if width == 0 || height == 0 {
            return Err(MeasureError::EmptyImage { width, height });
        }
        let gray = imageops::grayscale(piece);
        self.calibrate_gray(&gray)
    }

    /// Calibrate from an already single-channel crop
    pub fn calibrate_gray(&self, gray: &GrayImage) -> Result<CalibrationResult> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(MeasureError::EmptyImage { width, height });
        }

        let search = CircleSearch::for_image(width, height, &self.config);
        // A zero upper bound would mean "unbounded" to the Hough transform
        if search.max_radius < 1 {
            return Err(MeasureError::invalid(
                "reference crop size",
                format!("{}x{}", width, height),
            ));
        }
        let candidates = self.detector.detect(gray, &search)?;
        tracing::debug!(
            candidates = candidates.len(),
            min_radius = search.min_radius,
            max_radius = search.max_radius,
            "circle detection finished"
        );

        // First in-band candidate in detector order wins; no re-ranking by votes.
        let Some(&circle) = candidates.iter().find(|c| search.admits_radius(c.radius)) else {
            tracing::warn!(width, height, "no reference coin detected for calibration");
            return Err(MeasureError::NoCircleDetected {
                width,
                height,
                min_radius: search.min_radius,
                max_radius: search.max_radius,
            });
        };

        let result = CalibrationResult::from_radius(self.reference_diameter_mm, circle)?;
        tracing::info!(
            diameter_px = circle.diameter(),
            mm_per_pixel = result.mm_per_pixel,
            "calibrated against reference coin"
        );
        Ok(result)
    }
}
