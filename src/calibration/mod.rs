//! Scale calibration from a reference coin
//!
//! This module detects the circular reference object in a cropped region of
//! the photograph and converts its known physical diameter into a
//! millimetres-per-pixel scale for the rest of the measurement.

pub mod circle;
pub mod scale;

#[cfg(feature = "opencv")]
pub mod hough;

pub use circle::{Circle, CircleDetector, CircleSearch};
pub use scale::{CalibrationResult, Calibrator};

#[cfg(feature = "opencv")]
pub use hough::HoughCircleDetector;
