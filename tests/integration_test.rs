//! Integration tests for the complete thread measurement workflow
//!
//! These tests drive the public API the way a front end would:
//! - Region selection on the downscaled display
//! - Calibration against the reference coin
//! - Gauge adjustment through pointer and key events
//! - Measurement derivation and standards matching
//! - Error propagation for failed calibration and unreachable catalogs
//!
//! Detector-dependent tests use a stub detector so they run without OpenCV;
//! the Hough pipeline itself is exercised on a synthetic coin when the
//! `opencv` feature is enabled.

use approx::assert_relative_eq;
use image::{GrayImage, RgbImage};
use scan_threads::gauge::Interaction;
use scan_threads::standards::ToleranceRange;
use scan_threads::{
    derive_from_metrics, derive_measurement, match_standards, CropRegion, Circle, CircleSearch,
    DisplayDrag, GaugeState, KeyAction, KeyCommand, MeasureConfig, MeasureError,
    MeasurementResult, MeasurementSession, PointerEvent, Result, StandardsCatalog,
    StandardsRepository, ThreadStandardEntry, Tolerance,
};

const CATALOG: &str = r#"{
    "M6x1": { "diam_mm": 6.0, "pas": 1.0, "unite": "M" },
    "1/4-20 UNC": { "diam_mm": 6.35, "pas": 20, "unite": "I" },
    "1/4-28 UNF": { "diam_mm": 6.35, "pas": 28, "unite": "I" },
    "M8x1.25": { "diam_mm": 8.0, "pas": 1.25, "unite": "M" },
    "M10x1.5": { "diam_mm": 10.0, "pas": 1.5, "unite": "M" }
}"#;

fn coin_radius_112(_: &GrayImage, _: &CircleSearch) -> Result<Vec<Circle>> {
    Ok(vec![Circle::new(120.0, 120.0, 112.0), Circle::new(90.0, 90.0, 70.0)])
}

// ============================================================================
// End-to-end measurement
// ============================================================================

#[test]
fn test_reference_scenario_end_to_end() {
    let calibration = scan_threads::calibrate(&RgbImage::new(300, 300), 24.25, coin_radius_112)
        .unwrap();
    assert_relative_eq!(calibration.mm_per_pixel, 0.10826, epsilon = 1e-5);

    let gauge = GaugeState::new(20.0, 40.0, 400.0, 120.0, 8.0, 4.0);
    let result = derive_measurement(
        &gauge,
        CropRegion::offset(900, 300),
        0.8,
        calibration.mm_per_pixel,
    )
    .unwrap();

    assert_relative_eq!(result.length_mm, 51.42, epsilon = 0.01);
    assert_relative_eq!(result.pitch_mm, 6.43, epsilon = 0.01);
    assert!(!result.is_degenerate());
}

#[test]
fn test_calibration_ignores_circles_outside_radius_band() {
    // 100x100 crop admits radii 25..=45 only
    let detector = |_: &GrayImage, _: &CircleSearch| -> Result<Vec<Circle>> {
        Ok(vec![Circle::new(50.0, 50.0, 500.0)])
    };
    let err = scan_threads::calibrate(&RgbImage::new(100, 100), 24.25, detector).unwrap_err();
    assert!(matches!(err, MeasureError::NoCircleDetected { .. }));
}

#[test]
fn test_calibrating_empty_crop_is_an_error() {
    let err = scan_threads::calibrate(&RgbImage::new(0, 10), 24.25, coin_radius_112).unwrap_err();
    assert!(matches!(err, MeasureError::EmptyImage { width: 0, height: 10 }));
}

#[test]
fn test_session_workflow_with_keyboard_layout() {
    let photo = RgbImage::new(2400, 1600);
    let mut session = MeasurementSession::new(MeasureConfig::default(), coin_radius_112).unwrap();

    // 2400x1600 is shown at 0.5
    let regions = session
        .select_regions(
            2400,
            1600,
            DisplayDrag::new((100, 100), (250, 250)),
            DisplayDrag::new((400, 200), (800, 400)),
        )
        .unwrap();
    assert_eq!((regions.coin.width, regions.coin.height), (300, 300));
    assert_eq!((regions.object.x, regions.object.y), (800, 400));
    assert_eq!((regions.object.width, regions.object.height), (800, 400));

    session.calibrate(&photo).unwrap();
    let working = session.open_gauge(&photo).unwrap();
    assert_eq!(working.dimensions(), (640, 320));

    let gauge = session.gauge_mut().unwrap();
    // drag the right edge out to x = 480
    gauge.handle_pointer(PointerEvent::Down { x: 405.0, y: 140.0 });
    assert_eq!(
        gauge.interaction(),
        Interaction::Resizing(scan_threads::gauge::Edge::Right)
    );
    gauge.handle_pointer(PointerEvent::Move { x: 480.0, y: 140.0 });
    gauge.handle_pointer(PointerEvent::Up { x: 480.0, y: 140.0 });
    assert_eq!(gauge.interaction(), Interaction::Idle);

    for key in "llr".chars() {
        if let Some(KeyAction::Adjust(command)) = KeyAction::from_key(key) {
            gauge.handle_key(command);
        }
    }
    assert_eq!(gauge.state().ridge_count(), 11.0);
    assert_eq!(gauge.state().angle_deg(), 1.0);
    assert_eq!(KeyAction::from_key('v'), Some(KeyAction::Validate));

    let result = session.finish().unwrap();
    let scale = 24.25 / 224.0;
    assert_relative_eq!(result.length_mm, 380.0 / 0.8 * scale, epsilon = 1e-9);
    assert_relative_eq!(result.diameter_mm, 80.0 / 0.8 * scale, epsilon = 1e-9);
    assert_relative_eq!(result.pitch_mm, result.length_mm / 11.0, epsilon = 1e-9);

    let catalog = StandardsCatalog::from_json_str(CATALOG).unwrap();
    assert!(session.find_matches(&catalog).unwrap().is_empty());
}

#[test]
fn test_gauge_floors_survive_repeated_decrements() {
    let mut gauge = scan_threads::Gauge::new(&MeasureConfig::default().gauge, 640, 480);
    for _ in 0..100 {
        gauge.handle_key(KeyCommand::FewerRidges);
        gauge.handle_key(KeyCommand::LowerAmplitude);
    }
    assert_eq!(gauge.state().ridge_count(), 1.0);
    assert_eq!(gauge.state().amplitude(), 1.0);

    for _ in 0..360 {
        gauge.handle_key(KeyCommand::Rotate);
    }
    assert_relative_eq!(gauge.state().angle_deg(), 0.0, epsilon = 1e-9);
}

#[test]
fn test_degenerate_gauge_is_not_an_error() {
    let metrics = scan_threads::gauge::GaugeMetrics {
        width_px: 250.0,
        height_px: 60.0,
        ridge_count: 0.0,
    };
    let result = derive_from_metrics(metrics, CropRegion::identity(), 1.0, 0.1).unwrap();
    assert_eq!(result.pitch_mm, 0.0);
    assert!(result.is_degenerate());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_no_circle_aborts_session() {
    let photo = RgbImage::new(800, 600);
    let detector = |_: &GrayImage, _: &CircleSearch| -> Result<Vec<Circle>> { Ok(Vec::new()) };
    let mut session = MeasurementSession::new(MeasureConfig::default(), detector).unwrap();
    session
        .select_regions(
            800,
            600,
            DisplayDrag::new((0, 0), (200, 200)),
            DisplayDrag::new((300, 100), (700, 300)),
        )
        .unwrap();

    let err = session.calibrate(&photo).unwrap_err();
    assert!(matches!(err, MeasureError::NoCircleDetected { .. }));
    assert!(!err.is_recoverable());
    assert!(session.open_gauge(&photo).is_err());
}

struct Unreachable;

impl StandardsRepository for Unreachable {
    fn query_by_tolerance_range(&self, _: &ToleranceRange) -> Result<Vec<ThreadStandardEntry>> {
        Err(MeasureError::CatalogUnavailable {
            message: "timeout".to_string(),
            source: None,
        })
    }
}

#[test]
fn test_catalog_unavailable_propagates() {
    let measurement = MeasurementResult {
        diameter_mm: 6.3,
        length_mm: 12.8,
        pitch_mm: 1.28,
        ridge_count: 10.0,
        center_px: None,
        caveat: None,
    };
    let err = match_standards(&measurement, Tolerance::default(), &Unreachable).unwrap_err();
    assert!(matches!(err, MeasureError::CatalogUnavailable { .. }));
}

// ============================================================================
// Standards Matching
// ============================================================================

#[test]
fn test_imperial_match_through_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Dimensions.json");
    std::fs::write(&path, CATALOG).unwrap();

    let catalog = StandardsCatalog::from_json_file(&path).unwrap();
    let measurement = MeasurementResult {
        diameter_mm: 6.3,
        length_mm: 12.8,
        pitch_mm: 1.28,
        ridge_count: 10.0,
        center_px: None,
        caveat: None,
    };
    let matches = match_standards(&measurement, Tolerance::new(0.1, 0.05), &catalog).unwrap();
    assert_eq!(matches, ["1/4-20 UNC"]);
}

#[test]
fn test_catalog_shared_across_threads() {
    let catalog = StandardsCatalog::from_json_str(CATALOG).unwrap();
    let handles: Vec<_> = [(6.0, 1.0), (8.0, 1.25), (10.0, 1.5)]
        .into_iter()
        .map(|(d, p)| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                scan_threads::match_catalog(catalog.entries(), d, p, Tolerance::new(0.0, 0.0))
            })
        })
        .collect();

    let found: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(found, [vec!["M6x1"], vec!["M8x1.25"], vec!["M10x1.5"]]);
}

// ============================================================================
// OpenCV-backed calibration
// ============================================================================

#[cfg(feature = "opencv")]
#[test]
fn test_hough_calibration_on_synthetic_coin() {
    use image::Rgb;
    use scan_threads::HoughCircleDetector;

    let (size, radius) = (400u32, 110.0f64);
    let center = f64::from(size) / 2.0;
    let coin = RgbImage::from_fn(size, size, |x, y| {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        if (dx * dx + dy * dy).sqrt() <= radius {
            Rgb([200, 190, 120])
        } else {
            Rgb([30, 30, 30])
        }
    });

    let result = scan_threads::calibrate(&coin, 24.25, HoughCircleDetector::new()).unwrap();
    assert_relative_eq!(result.circle.radius, radius, epsilon = 6.0);
    assert_relative_eq!(result.mm_per_pixel, 24.25 / 220.0, max_relative = 0.06);
}
