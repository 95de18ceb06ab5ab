//! Reference values and default parameters for thread measurement
//!
//! Compile-time defaults for calibration, display, the interactive gauge and
//! standards matching. Runtime overrides live in [`crate::config`].

/// Millimetres per inch, used for threads-per-inch conversion
pub const MM_PER_INCH: f64 = 25.4;

/// Reference object defaults
pub mod reference {
    /// Diameter of the reference coin (50 euro cents), in millimetres
    pub const COIN_DIAMETER_MM: f64 = 24.25;
}

/// Circle detection parameters for scale calibration
pub mod calibration {
    /// Median blur window; wide enough to erase coin relief, narrow enough to keep the rim
    pub const MEDIAN_KERNEL_SIZE: i32 = 7;

    /// Inverse accumulator resolution of the Hough gradient transform
    pub const ACCUMULATOR_DP: f64 = 1.2;

    /// Canny high threshold: only strong edges vote
    pub const EDGE_THRESHOLD: f64 = 80.0;

    /// Accumulator votes required to accept a circle
    pub const VOTE_THRESHOLD: f64 = 20.0;

    /// Smallest admissible radius as a fraction of the shorter image side
    pub const MIN_RADIUS_RATIO: f64 = 0.25;

    /// Largest admissible radius as a fraction of the shorter image side
    pub const MAX_RADIUS_RATIO: f64 = 0.45;

    /// Minimum centre separation as a fraction of the shorter image side
    pub const MIN_SEPARATION_RATIO: f64 = 0.5;
}

/// Display parameters
pub mod display {
    /// Maximum width of the photograph while selecting regions
    pub const MAX_WIDTH: u32 = 1200;

    /// Maximum height of the photograph while selecting regions
    pub const MAX_HEIGHT: u32 = 800;

    /// Magnification applied to the object crop before gauge adjustment
    pub const OBJECT_MAGNIFICATION: f64 = 0.8;
}

/// Interactive gauge parameters
pub mod gauge {
    /// Initial rectangle corners (x1, y1, x2, y2) in working-frame pixels
    pub const INITIAL_RECT: (f64, f64, f64, f64) = (100.0, 100.0, 400.0, 180.0);

    pub const INITIAL_RIDGE_COUNT: f64 = 10.0;
    pub const INITIAL_AMPLITUDE: f64 = 4.0;

    /// Floor shared by ridge count and amplitude
    pub const MIN_RIDGE_COUNT: f64 = 1.0;
    pub const MIN_AMPLITUDE: f64 = 1.0;

    /// Increment applied by ridge, amplitude and phase key commands
    pub const ADJUST_STEP: f64 = 0.5;

    /// Rotation increment in degrees
    pub const ROTATION_STEP_DEG: f64 = 1.0;

    /// Pointer distance (px) within which an edge is grabbed for resizing
    pub const EDGE_HIT_THRESHOLD: f64 = 10.0;
}

/// Standards matching parameters
pub mod matching {
    /// Default diameter tolerance in millimetres
    pub const DIAMETER_TOLERANCE_MM: f64 = 0.1;

    /// Default pitch tolerance in millimetres
    pub const PITCH_TOLERANCE_MM: f64 = 0.1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_band_is_ordered() {
        assert!(calibration::MIN_RADIUS_RATIO < calibration::MAX_RADIUS_RATIO);
        // a coin filling the band can never be clipped by the crop
        assert!(calibration::MAX_RADIUS_RATIO < 0.5);
    }

    #[test]
    fn test_median_kernel_is_odd() {
        assert_eq!(calibration::MEDIAN_KERNEL_SIZE % 2, 1);
    }

    #[test]
    fn test_gauge_initial_values_respect_floors() {
        assert!(gauge::INITIAL_RIDGE_COUNT >= gauge::MIN_RIDGE_COUNT);
        assert!(gauge::INITIAL_AMPLITUDE >= gauge::MIN_AMPLITUDE);
        let (x1, y1, x2, y2) = gauge::INITIAL_RECT;
        assert!(x1 < x2 && y1 < y2);
    }
}
