//! # Scan Threads
//!
//! A Rust crate for measuring screw threads from a single photograph.
//!
//! The photograph must also show a reference coin of known diameter. The
//! library:
//! - Calibrates a millimetres-per-pixel scale from the coin
//! - Maps gauge readings from magnified working crops back to original pixels
//! - Keeps an interactive gauge (rectangle plus sinusoidal ridge pattern)
//!   consistent under pointer and key input
//! - Matches the measured diameter and pitch against metric and imperial
//!   thread standards
//!
//! Image decoding, rendering and the event loop belong to the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scan_threads::{
//!     DisplayDrag, HoughCircleDetector, MeasureConfig, MeasurementSession, StandardsCatalog,
//! };
//! use std::path::Path;
//!
//! # fn run(photo: image::RgbImage) -> scan_threads::Result<()> {
//! let mut session = MeasurementSession::new(MeasureConfig::default(), HoughCircleDetector::new())?;
//! session.select_regions(
//!     photo.width(),
//!     photo.height(),
//!     DisplayDrag::new((40, 40), (220, 220)),
//!     DisplayDrag::new((300, 120), (900, 400)),
//! )?;
//! let calibration = session.calibrate(&photo)?;
//! println!("{:.5} mm/px", calibration.mm_per_pixel);
//!
//! let _working = session.open_gauge(&photo)?;
//! // ... feed pointer and key events to session.gauge_mut()? ...
//! let result = session.finish()?;
//! println!("{}", result.summary());
//!
//! let catalog = StandardsCatalog::from_json_file(Path::new("Dimensions.json"))?;
//! println!("{:?}", session.find_matches(&catalog)?);
//! # Ok(())
//! # }
//! ```

use image::RgbImage;

pub mod calibration;
pub mod config;
pub mod constants;
pub mod error;
pub mod frames;
pub mod gauge;
pub mod measurement;
pub mod session;
pub mod standards;

pub use calibration::{CalibrationResult, Calibrator, Circle, CircleDetector, CircleSearch};
pub use config::MeasureConfig;
pub use error::{MeasureError, Result};
pub use frames::{CropRegion, DisplayFit, FrameChain, PixelRect, Point2};
pub use gauge::{Gauge, GaugeState, KeyAction, KeyCommand, PointerEvent};
pub use measurement::{derive_from_metrics, derive_measurement, MeasurementCaveat, MeasurementResult};
pub use session::{DisplayDrag, MeasurementSession, RegionSelection};
pub use standards::{
    match_catalog, match_standards, StandardsCatalog, StandardsRepository, ThreadStandardEntry,
    ThreadUnit, Tolerance,
};

#[cfg(feature = "opencv")]
pub use calibration::HoughCircleDetector;

/// Calibrate a scale from a crop containing the reference coin
///
/// This is the one-shot form of [`Calibrator::calibrate`] with default
/// detection parameters.
///
/// # Arguments
///
/// * `piece` - Crop of the original-resolution photograph around the coin
/// * `reference_diameter_mm` - Physical diameter of the coin
/// * `detector` - Circle-detection primitive
///
/// # Errors
///
/// Returns `MeasureError` if:
/// - The reference diameter is not a positive number
/// - The crop is empty
/// - The crop is too small to hold an admissible radius band
/// - No circle lies in the admissible radius band (`NoCircleDetected`)
pub fn calibrate<D: CircleDetector>(
    piece: &RgbImage,
    reference_diameter_mm: f64,
    detector: D,
) -> Result<CalibrationResult> {
    Calibrator::new(reference_diameter_mm, detector)?.calibrate(piece)
}
