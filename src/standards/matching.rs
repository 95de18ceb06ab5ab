//! Tolerance-band matching of measurements against thread standards
//!
//! Two independent passes over the catalog, in catalog order:
//!
//! 1. keep rows with `|diameter - measured| <= diameter tolerance`
//! 2. of those, keep rows with `|pitch_mm - measured| <= pitch tolerance`,
//!    where imperial rows are converted with `pitch_mm = 25.4 / tpi`
//!
//! Bands are inclusive and a zero tolerance means an exact match. Results
//! are not ranked by closeness.

use crate::config::MatchingConfig;
use crate::constants::{matching, MM_PER_INCH};
use crate::error::Result;
use crate::measurement::MeasurementResult;
use crate::standards::catalog::{StandardsRepository, ThreadStandardEntry, ThreadUnit};
use serde::{Deserialize, Serialize};

/// Half-widths of the acceptance bands, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub diameter_mm: f64,
    pub pitch_mm: f64,
}

impl Tolerance {
    pub fn new(diameter_mm: f64, pitch_mm: f64) -> Self {
        Self {
            diameter_mm,
            pitch_mm,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(matching::DIAMETER_TOLERANCE_MM, matching::PITCH_TOLERANCE_MM)
    }
}

impl From<&MatchingConfig> for Tolerance {
    fn from(config: &MatchingConfig) -> Self {
        Self::new(config.diameter_tolerance_mm, config.pitch_tolerance_mm)
    }
}

fn within(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() <= tolerance
}

/// Query bounds for a measured diameter and pitch.
///
/// The bounds are what a relational backend filters on; the imperial branch
/// is expressed in threads per inch so it can be compared against the raw
/// column. [`ToleranceRange::admits`] is the authoritative test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRange {
    pub diameter_mm: f64,
    pub pitch_mm: f64,
    pub tolerance: Tolerance,
    pub diameter_min: f64,
    pub diameter_max: f64,
    pub metric_pitch_min: f64,
    pub metric_pitch_max: f64,
    pub tpi_min: f64,
    /// `None` when the pitch band reaches zero, i.e. any thread count is fine
    pub tpi_max: Option<f64>,
}

impl ToleranceRange {
    pub fn new(diameter_mm: f64, pitch_mm: f64, tolerance: Tolerance) -> Self {
        let pitch_low = pitch_mm - tolerance.pitch_mm;
        let pitch_high = pitch_mm + tolerance.pitch_mm;
        Self {
            diameter_mm,
            pitch_mm,
            tolerance,
            diameter_min: diameter_mm - tolerance.diameter_mm,
            diameter_max: diameter_mm + tolerance.diameter_mm,
            metric_pitch_min: pitch_low,
            metric_pitch_max: pitch_high,
            tpi_min: MM_PER_INCH / pitch_high,
            tpi_max: (pitch_low > 0.0).then(|| MM_PER_INCH / pitch_low),
        }
    }

    /// First pass: diameter band
    pub fn admits_diameter(&self, entry: &ThreadStandardEntry) -> bool {
        within(entry.diameter_mm, self.diameter_mm, self.tolerance.diameter_mm)
    }

    /// Second pass: pitch band after unit conversion
    pub fn admits_pitch(&self, entry: &ThreadStandardEntry) -> bool {
        within(entry.pitch_mm(), self.pitch_mm, self.tolerance.pitch_mm)
    }

    pub fn admits(&self, entry: &ThreadStandardEntry) -> bool {
        self.admits_diameter(entry) && self.admits_pitch(entry)
    }

    /// Pitch bounds in the row's own unit
    pub fn pitch_bounds(&self, unit: ThreadUnit) -> (f64, Option<f64>) {
        match unit {
            ThreadUnit::Metric => (self.metric_pitch_min, Some(self.metric_pitch_max)),
            ThreadUnit::Imperial => (self.tpi_min, self.tpi_max),
        }
    }
}

/// Match a measured diameter and pitch against catalog rows
pub fn match_catalog(
    entries: &[ThreadStandardEntry],
    diameter_mm: f64,
    pitch_mm: f64,
    tolerance: Tolerance,
) -> Vec<String> {
    let range = ToleranceRange::new(diameter_mm, pitch_mm, tolerance);

    let by_diameter: Vec<&ThreadStandardEntry> = entries
        .iter()
        .filter(|entry| range.admits_diameter(entry))
        .collect();

    by_diameter
        .into_iter()
        .filter(|entry| range.admits_pitch(entry))
        .map(|entry| entry.designation.clone())
        .collect()
}

/// Resolve a measurement to standard designations through a repository
///
/// # Errors
///
/// Repository failures (`CatalogUnavailable`) are returned unchanged; there
/// is no retry and no fallback catalog.
pub fn match_standards<R>(
    measurement: &MeasurementResult,
    tolerance: Tolerance,
    repository: &R,
) -> Result<Vec<String>>
where
    R: StandardsRepository + ?Sized,
{
    let range = ToleranceRange::new(measurement.diameter_mm, measurement.pitch_mm, tolerance);
    let candidates = repository.query_by_tolerance_range(&range)?;
    tracing::debug!(candidates = candidates.len(), "standards query returned");

    let matches = match_catalog(
        &candidates,
        measurement.diameter_mm,
        measurement.pitch_mm,
        tolerance,
    );
    tracing::info!(
        diameter_mm = measurement.diameter_mm,
        pitch_mm = measurement.pitch_mm,
        matches = matches.len(),
        "standards matched"
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::standards::catalog::StandardsCatalog;
    use approx::assert_relative_eq;

    fn catalog() -> Vec<ThreadStandardEntry> {
        vec![
            ThreadStandardEntry::metric("M6x1", 6.0, 1.0),
            ThreadStandardEntry::imperial("1/4-20 UNC", 6.35, 20.0),
            ThreadStandardEntry::metric("M6x0.75", 6.0, 0.75),
            ThreadStandardEntry::imperial("1/4-28 UNF", 6.35, 28.0),
            ThreadStandardEntry::metric("M8x1.25", 8.0, 1.25),
        ]
    }

    fn measured(diameter_mm: f64, pitch_mm: f64) -> MeasurementResult {
        MeasurementResult {
            diameter_mm,
            length_mm: 0.0,
            pitch_mm,
            ridge_count: 1.0,
            center_px: None,
            caveat: None,
        }
    }

    #[test]
    fn test_imperial_entry_matches_close_measurement() {
        let matches = match_catalog(&catalog(), 6.3, 1.28, Tolerance::new(0.1, 0.05));
        assert_eq!(matches, ["1/4-20 UNC"]);
    }

    #[test]
    fn test_diameter_band_is_inclusive() {
        let entries = vec![
            ThreadStandardEntry::metric("edge", 6.5, 1.0),
            ThreadStandardEntry::metric("past", 6.5 + 1e-9, 1.0),
        ];
        let matches = match_catalog(&entries, 6.0, 1.0, Tolerance::new(0.5, 0.0));
        assert_eq!(matches, ["edge"]);
    }

    #[test]
    fn test_pitch_band_is_inclusive() {
        let entries = vec![
            ThreadStandardEntry::metric("low", 6.0, 0.75),
            ThreadStandardEntry::metric("high", 6.0, 1.25),
            ThreadStandardEntry::metric("out", 6.0, 1.25 + 1e-9),
        ];
        let matches = match_catalog(&entries, 6.0, 1.0, Tolerance::new(0.0, 0.25));
        assert_eq!(matches, ["low", "high"]);
    }

    #[test]
    fn test_zero_tolerance_is_exact_match() {
        let matches = match_catalog(&catalog(), 6.0, 1.0, Tolerance::new(0.0, 0.0));
        assert_eq!(matches, ["M6x1"]);
        assert!(match_catalog(&catalog(), 6.0, 1.0000001, Tolerance::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_results_follow_catalog_order() {
        let matches = match_catalog(&catalog(), 6.1, 0.9, Tolerance::new(0.3, 0.4));
        assert_eq!(matches, ["M6x1", "1/4-20 UNC", "M6x0.75", "1/4-28 UNF"]);
    }

    #[test]
    fn test_tolerance_range_bounds() {
        let range = ToleranceRange::new(13.2, 1.24, Tolerance::new(0.1, 0.1));
        assert_relative_eq!(range.diameter_min, 13.1, epsilon = 1e-12);
        assert_relative_eq!(range.diameter_max, 13.3, epsilon = 1e-12);
        assert_relative_eq!(range.tpi_min, 25.4 / 1.34, epsilon = 1e-12);
        assert_relative_eq!(range.tpi_max.unwrap(), 25.4 / 1.14, epsilon = 1e-12);
        assert_eq!(range.pitch_bounds(ThreadUnit::Metric).1, Some(range.metric_pitch_max));

        let open = ToleranceRange::new(6.0, 0.1, Tolerance::new(0.1, 0.2));
        assert_eq!(open.tpi_max, None);
    }

    #[test]
    fn test_match_standards_through_catalog() {
        let repository = StandardsCatalog::new(catalog());
        let matches =
            match_standards(&measured(6.3, 1.28), Tolerance::new(0.1, 0.05), &repository).unwrap();
        assert_eq!(matches, ["1/4-20 UNC"]);
    }

    struct Offline;

    impl StandardsRepository for Offline {
        fn query_by_tolerance_range(&self, _: &ToleranceRange) -> Result<Vec<ThreadStandardEntry>> {
            Err(MeasureError::CatalogUnavailable {
                message: "connection refused".into(),
                source: None,
            })
        }
    }

    #[test]
    fn test_repository_failure_propagates() {
        let err = match_standards(&measured(6.0, 1.0), Tolerance::default(), &Offline).unwrap_err();
        assert!(matches!(err, MeasureError::CatalogUnavailable { .. }));
    }

    struct Superset(Vec<ThreadStandardEntry>);

    impl StandardsRepository for Superset {
        fn query_by_tolerance_range(&self, _: &ToleranceRange) -> Result<Vec<ThreadStandardEntry>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_loose_repository_is_filtered_again() {
        let matches =
            match_standards(&measured(8.0, 1.25), Tolerance::new(0.05, 0.05), &Superset(catalog()))
                .unwrap();
        assert_eq!(matches, ["M8x1.25"]);
    }
}
