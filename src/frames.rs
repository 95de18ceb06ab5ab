//! Coordinate frames between the original photograph and working buffers
//!
//! Every buffer the user interacts with is derived from the full-resolution
//! photograph by a sequence of crops and rescales. Each step is one immutable
//! [`CropRegion`] satisfying
//!
//! ```text
//! original = working / scale_factor + origin
//! ```
//!
//! and a [`FrameChain`] stacks them outermost-first. Chains are extended by
//! value ([`FrameChain::then`]) and never mutated in place, so the order in
//! which scale factors are undone is always the order they were applied in.

use crate::error::{MeasureError, Result};
use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

/// Point in some pixel frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One crop-and-rescale step from a parent frame to a working frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Position of the working frame's origin in the parent frame
    pub origin_x: i32,
    pub origin_y: i32,
    /// Working pixels per parent pixel (> 0)
    pub scale_factor: f64,
}

impl CropRegion {
    /// Create a crop region, rejecting non-positive or non-finite scales
    pub fn new(origin_x: i32, origin_y: i32, scale_factor: f64) -> Result<Self> {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(MeasureError::invalid("crop scale_factor", scale_factor));
        }
        Ok(Self {
            origin_x,
            origin_y,
            scale_factor,
        })
    }

    pub fn identity() -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            scale_factor: 1.0,
        }
    }

    /// A 1:1 crop whose top-left corner sits at `(x, y)` in the parent
    pub fn offset(x: i32, y: i32) -> Self {
        Self {
            origin_x: x,
            origin_y: y,
            scale_factor: 1.0,
        }
    }

    /// A pure rescale, e.g. the display magnification of an object crop
    pub fn magnification(factor: f64) -> Result<Self> {
        Self::new(0, 0, factor)
    }

    /// Map a working-frame point into the parent frame
    pub fn to_parent(&self, point: Point2) -> Point2 {
        Point2 {
            x: point.x / self.scale_factor + f64::from(self.origin_x),
            y: point.y / self.scale_factor + f64::from(self.origin_y),
        }
    }

    /// Map a working-frame length into the parent frame; lengths ignore the origin
    pub fn length_to_parent(&self, length: f64) -> f64 {
        length / self.scale_factor
    }
}

impl Default for CropRegion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Affine map from a working frame back to the original photograph.
///
/// Unlike [`CropRegion`] the origin is fractional, since composing a crop
/// below a rescale places it between original pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposedFrame {
    pub origin: Point2,
    pub scale_factor: f64,
}

impl ComposedFrame {
    pub fn to_original(&self, point: Point2) -> Point2 {
        Point2 {
            x: point.x / self.scale_factor + self.origin.x,
            y: point.y / self.scale_factor + self.origin.y,
        }
    }
}

/// Ordered stack of frame layers, outermost (closest to the photograph) first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameChain {
    layers: Vec<CropRegion>,
}

impl FrameChain {
    /// Chain whose working frame is the original photograph
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the chain with a layer applied on top of the current working frame
    pub fn then(&self, layer: CropRegion) -> Self {
        let mut layers = self.layers.clone();
        layers.push(layer);
        Self { layers }
    }

    pub fn layers(&self) -> &[CropRegion] {
        &self.layers
    }

    /// Map a point from the innermost working frame to original pixels
    pub fn to_original(&self, point: Point2) -> Point2 {
        self.layers
            .iter()
            .rev()
            .fold(point, |p, layer| layer.to_parent(p))
    }

    /// Map a length from the innermost working frame to original pixels
    pub fn length_to_original(&self, length: f64) -> f64 {
        self.layers
            .iter()
            .rev()
            .fold(length, |len, layer| layer.length_to_parent(len))
    }

    /// Collapse the chain into one equivalent transform
    pub fn compose(&self) -> ComposedFrame {
        // x_parent = x_child / s_child + o_child, folded from the photograph inwards
        self.layers.iter().fold(
            ComposedFrame {
                origin: Point2::default(),
                scale_factor: 1.0,
            },
            |outer, layer| ComposedFrame {
                origin: Point2 {
                    x: f64::from(layer.origin_x) / outer.scale_factor + outer.origin.x,
                    y: f64::from(layer.origin_y) / outer.scale_factor + outer.origin.y,
                },
                scale_factor: outer.scale_factor * layer.scale_factor,
            },
        )
    }
}

/// Axis-aligned pixel rectangle in the original photograph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Rectangle spanning two corners given in any order
    pub fn from_corners(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        let (x0, x1) = if ax <= bx { (ax, bx) } else { (bx, ax) };
        let (y0, y1) = if ay <= by { (ay, by) } else { (by, ay) };
        Self {
            x: x0,
            y: y0,
            width: x0.abs_diff(x1),
            height: y0.abs_diff(y1),
        }
    }

    /// Intersect with `[0, width) x [0, height)`; may produce an empty rectangle
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let clamp = |v: i64, hi: u32| v.clamp(0, i64::from(hi));
        let x0 = clamp(i64::from(self.x), width);
        let y0 = clamp(i64::from(self.y), height);
        let x1 = clamp(i64::from(self.x) + i64::from(self.width), width);
        let y1 = clamp(i64::from(self.y) + i64::from(self.height), height);
        Self {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The layer mapping this crop's pixels back to its parent frame
    pub fn crop_region(&self) -> CropRegion {
        CropRegion::offset(self.x, self.y)
    }
}

/// Downscale used to show the full photograph during region selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFit {
    pub scale: f64,
}

impl DisplayFit {
    /// Fit a `width x height` photograph inside `max_width x max_height`, never enlarging it
    pub fn for_image(width: u32, height: u32, max_width: u32, max_height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MeasureError::EmptyImage { width, height });
        }
        let scale = (f64::from(max_width) / f64::from(width))
            .min(f64::from(max_height) / f64::from(height))
            .min(1.0);
        if scale <= 0.0 {
            return Err(MeasureError::invalid(
                "display max size",
                format!("{}x{}", max_width, max_height),
            ));
        }
        Ok(Self { scale })
    }

    /// Size of the downscaled photograph
    pub fn display_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            (f64::from(width) * self.scale) as u32,
            (f64::from(height) * self.scale) as u32,
        )
    }

    /// Convert a rectangle dragged on the display into original pixels.
    ///
    /// Corners may come in any order; coordinates are truncated toward zero.
    pub fn to_original_rect(&self, ax: i32, ay: i32, bx: i32, by: i32) -> PixelRect {
        let to_original = |v: i32| (f64::from(v) / self.scale) as i32;
        let (x0, x1) = (ax.min(bx), ax.max(bx));
        let (y0, y1) = (ay.min(by), ay.max(by));
        PixelRect::from_corners(
            to_original(x0),
            to_original(y0),
            to_original(x1),
            to_original(y1),
        )
    }

    /// The display as a frame layer over the photograph
    pub fn as_crop_region(&self) -> CropRegion {
        CropRegion {
            origin_x: 0,
            origin_y: 0,
            scale_factor: self.scale,
        }
    }
}

/// Cut `rect` out of `image`, clamped to the image bounds
pub fn crop_image(image: &RgbImage, rect: PixelRect) -> Result<RgbImage> {
    let clamped = rect.clamp_to(image.width(), image.height());
    if clamped.is_empty() {
        return Err(MeasureError::EmptyImage {
            width: clamped.width,
            height: clamped.height,
        });
    }
    Ok(imageops::crop_imm(
        image,
        clamped.x as u32,
        clamped.y as u32,
        clamped.width,
        clamped.height,
    )
    .to_image())
}

/// Rescale a crop by `factor` to produce the gauge working buffer
pub fn magnify_image(image: &RgbImage, factor: f64) -> Result<RgbImage> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(MeasureError::invalid("magnification", factor));
    }
    let width = (f64::from(image.width()) * factor) as u32;
    let height = (f64::from(image.height()) * factor) as u32;
    if width == 0 || height == 0 {
        return Err(MeasureError::EmptyImage { width, height });
    }
    Ok(imageops::resize(
        image,
        width,
        height,
        imageops::FilterType::Triangle,
    ))
}
