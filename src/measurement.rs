//! Physical measurement from gauge readings
//!
//! Gauge pixels live in the magnified working frame. They are first brought
//! back to crop pixels (undo the magnification), then to original-photo
//! pixels (undo the crop's own rescale, if any), and only then multiplied by
//! the calibration scale, which was computed at original resolution.

use crate::error::{MeasureError, Result};
use crate::frames::{CropRegion, FrameChain, Point2};
use crate::gauge::{GaugeMetrics, GaugeState};
use serde::{Deserialize, Serialize};

/// Non-fatal condition attached to a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementCaveat {
    /// Ridge count was not positive, so pitch is reported as zero
    DegenerateGauge,
}

/// Final physical measurement of a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// Major diameter from the gauge height
    pub diameter_mm: f64,
    /// Axial length spanned by the gauge width
    pub length_mm: f64,
    /// Length per ridge; 0 when the gauge is degenerate
    pub pitch_mm: f64,
    pub ridge_count: f64,
    /// Gauge centre in original-photo pixels, when known
    pub center_px: Option<Point2>,
    pub caveat: Option<MeasurementCaveat>,
}

impl MeasurementResult {
    pub fn is_degenerate(&self) -> bool {
        self.caveat == Some(MeasurementCaveat::DegenerateGauge)
    }

    /// Human-readable report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Diameter : {:.2} mm", self.diameter_mm),
            format!("Length   : {:.2} mm", self.length_mm),
            format!("Ridges   : {}", self.ridge_count),
            format!("Pitch    : {:.3} mm", self.pitch_mm),
        ];
        if self.is_degenerate() {
            lines.push("Warning  : ridge count must be positive, pitch unavailable".to_string());
        }
        lines.join("\n")
    }
}

fn working_chain(crop: CropRegion, magnification: f64) -> Result<FrameChain> {
    Ok(FrameChain::new()
        .then(crop)
        .then(CropRegion::magnification(magnification)?))
}

fn check_scale(mm_per_pixel: f64) -> Result<()> {
    if mm_per_pixel.is_finite() && mm_per_pixel > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::invalid("mm_per_pixel", mm_per_pixel))
    }
}

/// Convert raw gauge readings into millimetres.
///
/// # Arguments
///
/// * `metrics` - Width, height and ridge count in the working frame
/// * `crop` - How the object crop relates to the original photograph
/// * `magnification` - Working pixels per crop pixel
/// * `mm_per_pixel` - Calibration scale at original resolution
///
/// # Errors
///
/// `InvalidParameter` for a non-positive magnification or scale. A
/// non-positive ridge count is not an error: the result carries
/// [`MeasurementCaveat::DegenerateGauge`] and a zero pitch.
pub fn derive_from_metrics(
    metrics: GaugeMetrics,
    crop: CropRegion,
    magnification: f64,
    mm_per_pixel: f64,
) -> Result<MeasurementResult> {
    check_scale(mm_per_pixel)?;
    let chain = working_chain(crop, magnification)?;

    let diameter_mm = chain.length_to_original(metrics.height_px.abs()) * mm_per_pixel;
    let length_mm = chain.length_to_original(metrics.width_px.abs()) * mm_per_pixel;

    let (pitch_mm, caveat) = if metrics.ridge_count > 0.0 {
        (length_mm / metrics.ridge_count, None)
    } else {
        tracing::warn!(
            ridge_count = metrics.ridge_count,
            "degenerate gauge, reporting zero pitch"
        );
        (0.0, Some(MeasurementCaveat::DegenerateGauge))
    };

    Ok(MeasurementResult {
        diameter_mm,
        length_mm,
        pitch_mm,
        ridge_count: metrics.ridge_count,
        center_px: None,
        caveat,
    })
}

/// Measure the current gauge state; reads the gauge, never mutates it
pub fn derive_measurement(
    gauge: &GaugeState,
    crop: CropRegion,
    magnification: f64,
    mm_per_pixel: f64,
) -> Result<MeasurementResult> {
    let mut result = derive_from_metrics(gauge.metrics(), crop, magnification, mm_per_pixel)?;
    result.center_px = Some(working_chain(crop, magnification)?.to_original(gauge.center()));

    tracing::info!(
        diameter_mm = result.diameter_mm,
        length_mm = result.length_mm,
        pitch_mm = result.pitch_mm,
        "measurement derived"
    );
    Ok(result)
}
