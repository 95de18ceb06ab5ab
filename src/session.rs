//! Step-by-step measurement of one photograph
//!
//! A session walks the workflow in a fixed order:
//!
//! 1. [`MeasurementSession::select_regions`]: coin and object rectangles
//!    dragged on the downscaled display
//! 2. [`MeasurementSession::calibrate`]: scale from the coin crop at full
//!    resolution
//! 3. [`MeasurementSession::open_gauge`]: magnified object crop and a fresh
//!    gauge over it
//! 4. [`MeasurementSession::finish`]: physical measurement from the gauge
//! 5. [`MeasurementSession::find_matches`]: standards lookup
//!
//! Redoing a step discards everything that depended on it.

use crate::calibration::{CalibrationResult, Calibrator, CircleDetector};
use crate::config::MeasureConfig;
use crate::error::{MeasureError, Result};
use crate::frames::{crop_image, magnify_image, CropRegion, DisplayFit, PixelRect};
use crate::gauge::Gauge;
use crate::measurement::{derive_measurement, MeasurementResult};
use crate::standards::{match_standards, StandardsRepository, Tolerance};
use image::RgbImage;
use serde::{Deserialize, Serialize};

#[cfg(feature = "opencv")]
use crate::calibration::HoughCircleDetector;

/// Rectangle dragged on the display, corners in any order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDrag {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl DisplayDrag {
    pub fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        Self { start, end }
    }
}

/// Coin and object regions in original-photo pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSelection {
    pub coin: PixelRect,
    pub object: PixelRect,
}

/// Gauge plus the frame it lives in
#[derive(Debug, Clone)]
struct GaugeStage {
    gauge: Gauge,
    object_crop: CropRegion,
}

fn out_of_order(reason: &str) -> MeasureError {
    MeasureError::SessionState {
        reason: reason.to_string(),
    }
}

/// Session-scoped measurement workflow over one photograph
#[derive(Debug)]
pub struct MeasurementSession<D> {
    config: MeasureConfig,
    calibrator: Calibrator<D>,
    regions: Option<RegionSelection>,
    calibration: Option<CalibrationResult>,
    gauge: Option<GaugeStage>,
    result: Option<MeasurementResult>,
}

impl<D: CircleDetector> MeasurementSession<D> {
    /// Start a session; the configuration is validated up front
    pub fn new(config: MeasureConfig, detector: D) -> Result<Self> {
        config.validate()?;
        let calibrator = Calibrator::with_config(
            config.reference.diameter_mm,
            config.calibration.clone(),
            detector,
        )?;
        Ok(Self {
            config,
            calibrator,
            regions: None,
            calibration: None,
            gauge: None,
            result: None,
        })
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// How a `width x height` photograph is shown for region selection
    pub fn display_fit(&self, width: u32, height: u32) -> Result<DisplayFit> {
        DisplayFit::for_image(
            width,
            height,
            self.config.display.max_width,
            self.config.display.max_height,
        )
    }

    /// Record the coin and object rectangles dragged on the display
    ///
    /// # Errors
    ///
    /// `EmptyImage` if either rectangle has no pixels inside the photograph.
    pub fn select_regions(
        &mut self,
        photo_width: u32,
        photo_height: u32,
        coin: DisplayDrag,
        object: DisplayDrag,
    ) -> Result<RegionSelection> {
        let fit = self.display_fit(photo_width, photo_height)?;
        let to_original = |drag: DisplayDrag| {
            fit.to_original_rect(drag.start.0, drag.start.1, drag.end.0, drag.end.1)
        };
        let selection = RegionSelection {
            coin: to_original(coin),
            object: to_original(object),
        };
        self.set_regions(selection, photo_width, photo_height)
    }

    /// Record regions already expressed in original-photo pixels
    pub fn set_regions(
        &mut self,
        selection: RegionSelection,
        photo_width: u32,
        photo_height: u32,
    ) -> Result<RegionSelection> {
        let clamped = RegionSelection {
            coin: selection.coin.clamp_to(photo_width, photo_height),
            object: selection.object.clamp_to(photo_width, photo_height),
        };
        for rect in [clamped.coin, clamped.object] {
            if rect.is_empty() {
                return Err(MeasureError::EmptyImage {
                    width: rect.width,
                    height: rect.height,
                });
            }
        }

        tracing::debug!(coin = ?clamped.coin, object = ?clamped.object, "regions selected");
        self.regions = Some(clamped);
        self.calibration = None;
        self.gauge = None;
        self.result = None;
        Ok(clamped)
    }

    pub fn regions(&self) -> Option<&RegionSelection> {
        self.regions.as_ref()
    }

    /// Calibrate against the coin region of the full-resolution photograph.
    ///
    /// # Errors
    ///
    /// `NoCircleDetected` ends the session: there is no fallback scale, and
    /// the later steps keep refusing to run until a calibration succeeds.
    pub fn calibrate(&mut self, photo: &RgbImage) -> Result<CalibrationResult> {
        let regions = self
            .regions
            .ok_or_else(|| out_of_order("calibrate called before select_regions"))?;

        self.calibration = None;
        self.gauge = None;
        self.result = None;

        let piece = crop_image(photo, regions.coin)?;
        let calibration = self.calibrator.calibrate(&piece)?;
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    pub fn calibration(&self) -> Option<&CalibrationResult> {
        self.calibration.as_ref()
    }

    /// Crop and magnify the object region and place a fresh gauge over it.
    ///
    /// Returns the working image the gauge coordinates refer to.
    pub fn open_gauge(&mut self, photo: &RgbImage) -> Result<RgbImage> {
        let regions = self
            .regions
            .ok_or_else(|| out_of_order("open_gauge called before select_regions"))?;
        if self.calibration.is_none() {
            return Err(out_of_order("open_gauge called before a successful calibrate"));
        }

        let rect = regions.object.clamp_to(photo.width(), photo.height());
        let crop = crop_image(photo, rect)?;
        let working = magnify_image(&crop, self.config.display.magnification)?;
        let gauge = Gauge::new(&self.config.gauge, working.width(), working.height());

        tracing::debug!(
            width = working.width(),
            height = working.height(),
            "gauge opened on object crop"
        );
        self.gauge = Some(GaugeStage {
            gauge,
            object_crop: rect.crop_region(),
        });
        self.result = None;
        Ok(working)
    }

    pub fn gauge(&self) -> Option<&Gauge> {
        self.gauge.as_ref().map(|stage| &stage.gauge)
    }

    /// The gauge, for feeding pointer and key events
    pub fn gauge_mut(&mut self) -> Result<&mut Gauge> {
        self.gauge
            .as_mut()
            .map(|stage| &mut stage.gauge)
            .ok_or_else(|| out_of_order("no gauge open"))
    }

    /// Derive the measurement from the gauge as currently positioned
    pub fn finish(&mut self) -> Result<MeasurementResult> {
        let calibration = self
            .calibration
            .ok_or_else(|| out_of_order("finish called before calibrate"))?;
        let stage = self
            .gauge
            .as_ref()
            .ok_or_else(|| out_of_order("finish called before open_gauge"))?;

        let result = derive_measurement(
            stage.gauge.state(),
            stage.object_crop,
            self.config.display.magnification,
            calibration.mm_per_pixel,
        )?;
        self.result = Some(result.clone());
        Ok(result)
    }

    pub fn result(&self) -> Option<&MeasurementResult> {
        self.result.as_ref()
    }

    /// Match the finished measurement with the configured tolerances
    pub fn find_matches<R>(&self, repository: &R) -> Result<Vec<String>>
    where
        R: StandardsRepository + ?Sized,
    {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| out_of_order("find_matches called before finish"))?;
        match_standards(result, Tolerance::from(&self.config.matching), repository)
    }
}

#[cfg(feature = "opencv")]
impl MeasurementSession<HoughCircleDetector> {
    /// Session backed by the OpenCV Hough circle detector
    pub fn with_hough(config: MeasureConfig) -> Result<Self> {
        Self::new(config, HoughCircleDetector::new())
    }
}
