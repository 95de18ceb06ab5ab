//! OpenCV-backed circle detection
//!
//! Median blur followed by the Hough gradient transform. Candidates are
//! returned in OpenCV's accumulator order.

use crate::calibration::circle::{Circle, CircleDetector, CircleSearch};
use crate::error::{MeasureError, Result};
use image::GrayImage;
use opencv::{
    core::{Mat, Vec3f, Vector, CV_8UC1},
    imgproc::{hough_circles, median_blur, HOUGH_GRADIENT},
    prelude::*,
};

/// Hough gradient circle detector
#[derive(Debug, Clone, Copy, Default)]
pub struct HoughCircleDetector;

impl HoughCircleDetector {
    pub fn new() -> Self {
        Self
    }

    /// Smooth away coin relief and sensor noise while keeping the rim edge
    fn smooth(&self, gray: &Mat, kernel_size: i32) -> Result<Mat> {
        let mut blurred = Mat::default();
        median_blur(gray, &mut blurred, kernel_size)
            .map_err(|e| MeasureError::opencv("median blur", e))?;
        Ok(blurred)
    }
}

impl CircleDetector for HoughCircleDetector {
    fn detect(&self, gray: &GrayImage, search: &CircleSearch) -> Result<Vec<Circle>> {
        let mat = gray_to_mat(gray)?;
        let blurred = self.smooth(&mat, search.median_kernel_size)?;

        let mut circles = Vector::<Vec3f>::new();
        hough_circles(
            &blurred,
            &mut circles,
            HOUGH_GRADIENT,
            search.accumulator_dp,
            search.min_separation,
            search.edge_threshold,
            search.vote_threshold,
            search.min_radius,
            search.max_radius,
        )
        .map_err(|e| MeasureError::opencv("Hough circle transform", e))?;

        Ok(circles
            .iter()
            .map(|c| Circle::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
            .collect())
    }
}

/// Copy an 8-bit grayscale buffer into a single-channel OpenCV Mat
fn gray_to_mat(gray: &GrayImage) -> Result<Mat> {
    let (width, height) = gray.dimensions();
    let mut mat = Mat::zeros(height as i32, width as i32, CV_8UC1)
        .map_err(|e| MeasureError::opencv("Mat allocation", e))?
        .to_mat()
        .map_err(|e| MeasureError::opencv("Mat conversion", e))?;

    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = mat
            .at_2d_mut::<u8>(y as i32, x as i32)
            .map_err(|e| MeasureError::opencv("pixel access", e))?;
        *value = pixel[0];
    }

    Ok(mat)
}
