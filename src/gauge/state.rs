//! Gauge geometry
//!
//! Corners are stored unordered: a resize may drag one edge past the other,
//! so every reader goes through `abs()` widths or `min`/`max` bounds.

use crate::constants::gauge::{MIN_AMPLITUDE, MIN_RIDGE_COUNT};
use crate::config::GaugeConfig;
use crate::frames::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Raw pixel readings taken from the gauge in its working frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeMetrics {
    /// Rectangle width: the measured span along the thread axis
    pub width_px: f64,
    /// Rectangle height: the major diameter
    pub height_px: f64,
    pub ridge_count: f64,
}

/// Which long edge a ridge trace follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidgeBoundary {
    Top,
    Bottom,
}

/// Mutable overlay state.
///
/// Fields are private so that `ridge_count` and `amplitude` can only change
/// through paths that enforce their floor. Serialize-only for the same reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeState {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    angle_deg: f64,
    ridge_count: f64,
    amplitude: f64,
    phase: f64,
}

impl GaugeState {
    /// Create a gauge; ridge count and amplitude are raised to their floor
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, ridge_count: f64, amplitude: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            angle_deg: 0.0,
            ridge_count: ridge_count.max(MIN_RIDGE_COUNT),
            amplitude: amplitude.max(MIN_AMPLITUDE),
            phase: 0.0,
        }
    }

    pub fn from_config(config: &GaugeConfig) -> Self {
        let [x1, y1, x2, y2] = config.initial_rect;
        Self::new(
            x1,
            y1,
            x2,
            y2,
            config.initial_ridge_count,
            config.initial_amplitude,
        )
    }

    pub fn x1(&self) -> f64 {
        self.x1
    }

    pub fn y1(&self) -> f64 {
        self.y1
    }

    pub fn x2(&self) -> f64 {
        self.x2
    }

    pub fn y2(&self) -> f64 {
        self.y2
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn ridge_count(&self) -> f64 {
        self.ridge_count
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    pub fn center(&self) -> Point2 {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Width, height and ridge count for measurement derivation
    pub fn metrics(&self) -> GaugeMetrics {
        GaugeMetrics {
            width_px: self.width(),
            height_px: self.height(),
            ridge_count: self.ridge_count,
        }
    }

    /// Whether `(x, y)` lies strictly inside the unrotated rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (left, right) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (top, bottom) = (self.y1.min(self.y2), self.y1.max(self.y2));
        left < x && x < right && top < y && y < bottom
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        self.x1 += dx;
        self.x2 += dx;
        self.y1 += dy;
        self.y2 += dy;
    }

    pub(crate) fn set_x1(&mut self, x: f64) {
        self.x1 = x;
    }

    pub(crate) fn set_x2(&mut self, x: f64) {
        self.x2 = x;
    }

    pub(crate) fn set_y1(&mut self, y: f64) {
        self.y1 = y;
    }

    pub(crate) fn set_y2(&mut self, y: f64) {
        self.y2 = y;
    }

    pub(crate) fn rotate(&mut self, delta_deg: f64) {
        self.angle_deg = (self.angle_deg + delta_deg).rem_euclid(360.0);
    }

    pub(crate) fn adjust_ridge_count(&mut self, delta: f64) {
        self.ridge_count = (self.ridge_count + delta).max(MIN_RIDGE_COUNT);
    }

    pub(crate) fn adjust_amplitude(&mut self, delta: f64) {
        self.amplitude = (self.amplitude + delta).max(MIN_AMPLITUDE);
    }

    pub(crate) fn adjust_phase(&mut self, delta: f64) {
        self.phase += delta;
    }

    /// Rotate a point of the unrotated rectangle about its centre.
    ///
    /// Positive angles turn counter-clockwise on screen (y grows downwards).
    pub fn rotate_point(&self, point: Point2) -> Point2 {
        let c = self.center();
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        let (dx, dy) = (point.x - c.x, point.y - c.y);
        Point2::new(c.x + dx * cos + dy * sin, c.y - dx * sin + dy * cos)
    }

    /// Rectangle corners after rotation, clockwise from `(x1, y1)`
    pub fn corners(&self) -> [Point2; 4] {
        [
            Point2::new(self.x1, self.y1),
            Point2::new(self.x2, self.y1),
            Point2::new(self.x2, self.y2),
            Point2::new(self.x1, self.y2),
        ]
        .map(|p| self.rotate_point(p))
    }

    /// Sinusoid traced along one long edge, one sample per pixel of width.
    ///
    /// Empty when `x2 <= x1`.
    pub fn ridge_trace(&self, boundary: RidgeBoundary) -> Vec<Point2> {
        let length = self.x2 - self.x1;
        if length <= 0.0 {
            return Vec::new();
        }
        let base_y = match boundary {
            RidgeBoundary::Top => self.y1,
            RidgeBoundary::Bottom => self.y2,
        };

        let samples = length.floor() as usize;
        (0..=samples)
            .map(|s| {
                let s = s as f64;
                let theta = 2.0 * PI * (s / length) * self.ridge_count + self.phase;
                let y = base_y + self.amplitude * theta.sin();
                self.rotate_point(Point2::new(self.x1 + s, y))
            })
            .collect()
    }
}

impl Default for GaugeState {
    fn default() -> Self {
        Self::from_config(&GaugeConfig::default())
    }
}
