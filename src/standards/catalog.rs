//! Thread standard rows and the in-memory catalog
//!
//! Catalog files are JSON objects keyed by designation:
//!
//! ```json
//! {
//!   "M10x1.5": { "diam_mm": 10.0, "pas": 1.5, "unite": "M" },
//!   "1/4-20 UNC": { "diam_mm": 6.35, "pas": 20, "unite": "I" }
//! }
//! ```
//!
//! `pas` is a pitch in millimetres for metric rows and a thread count per
//! inch for imperial rows. Key order is kept as catalog order.

use crate::constants::MM_PER_INCH;
use crate::error::{MeasureError, Result};
use crate::standards::matching::ToleranceRange;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// How `pitch_or_count` is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadUnit {
    /// Pitch in millimetres
    #[serde(rename = "M")]
    Metric,
    /// Threads per inch
    #[serde(rename = "I")]
    Imperial,
}

/// One named thread standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadStandardEntry {
    pub designation: String,
    pub diameter_mm: f64,
    pub pitch_or_count: f64,
    pub unit: ThreadUnit,
}

impl ThreadStandardEntry {
    pub fn metric(designation: impl Into<String>, diameter_mm: f64, pitch_mm: f64) -> Self {
        Self {
            designation: designation.into(),
            diameter_mm,
            pitch_or_count: pitch_mm,
            unit: ThreadUnit::Metric,
        }
    }

    pub fn imperial(designation: impl Into<String>, diameter_mm: f64, threads_per_inch: f64) -> Self {
        Self {
            designation: designation.into(),
            diameter_mm,
            pitch_or_count: threads_per_inch,
            unit: ThreadUnit::Imperial,
        }
    }

    /// Pitch in millimetres, converting threads per inch where needed
    pub fn pitch_mm(&self) -> f64 {
        match self.unit {
            ThreadUnit::Metric => self.pitch_or_count,
            ThreadUnit::Imperial => MM_PER_INCH / self.pitch_or_count,
        }
    }
}

/// Row layout of catalog files
#[derive(Debug, Deserialize)]
struct CatalogRow {
    diam_mm: f64,
    pas: f64,
    unite: ThreadUnit,
}

/// Read-only source of thread standards.
///
/// Implementations may return a superset of the rows inside `range`; the
/// matcher re-applies the tolerance rules to whatever comes back.
pub trait StandardsRepository {
    /// Fetch the rows whose diameter and pitch fall inside `range`
    ///
    /// # Errors
    ///
    /// `CatalogUnavailable` when the backing store cannot be reached.
    fn query_by_tolerance_range(&self, range: &ToleranceRange) -> Result<Vec<ThreadStandardEntry>>;
}

/// In-memory catalog, cheap to clone and share between sessions
#[derive(Debug, Clone)]
pub struct StandardsCatalog {
    entries: Arc<[ThreadStandardEntry]>,
}

impl StandardsCatalog {
    pub fn new(entries: Vec<ThreadStandardEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Parse a designation-keyed catalog document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| MeasureError::catalog_unavailable("Malformed standards catalog", e))?;

        let entries = document
            .into_iter()
            .map(|(designation, value)| {
                let row: CatalogRow = serde_json::from_value(value).map_err(|e| {
                    MeasureError::catalog_unavailable(
                        format!("Malformed catalog row {}", designation),
                        e,
                    )
                })?;
                Ok(ThreadStandardEntry {
                    designation,
                    diameter_mm: row.diam_mm,
                    pitch_or_count: row.pas,
                    unit: row.unite,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rows = entries.len(), "standards catalog loaded");
        Ok(Self::new(entries))
    }

    /// Load a catalog file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeasureError::catalog_unavailable(format!("Cannot read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    pub fn entries(&self) -> &[ThreadStandardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, designation: &str) -> Option<&ThreadStandardEntry> {
        self.entries.iter().find(|e| e.designation == designation)
    }
}

impl Default for StandardsCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl StandardsRepository for StandardsCatalog {
    fn query_by_tolerance_range(&self, range: &ToleranceRange) -> Result<Vec<ThreadStandardEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| range.admits(entry))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CATALOG: &str = r#"{
        "M8x1.25": { "diam_mm": 8.0, "pas": 1.25, "unite": "M" },
        "1/4-20 UNC": { "diam_mm": 6.35, "pas": 20, "unite": "I" },
        "M6x1": { "diam_mm": 6.0, "pas": 1.0, "unite": "M" }
    }"#;

    #[test]
    fn test_parse_keeps_catalog_order() {
        let catalog = StandardsCatalog::from_json_str(CATALOG).unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.designation.as_str()).collect();
        assert_eq!(names, ["M8x1.25", "1/4-20 UNC", "M6x1"]);
        assert_eq!(catalog.get("1/4-20 UNC").unwrap().unit, ThreadUnit::Imperial);
    }

    #[test]
    fn test_imperial_pitch_conversion() {
        let entry = ThreadStandardEntry::imperial("1/4-20 UNC", 6.35, 20.0);
        assert_relative_eq!(entry.pitch_mm(), 1.27);
        let metric = ThreadStandardEntry::metric("M10x1.5", 10.0, 1.5);
        assert_eq!(metric.pitch_mm(), 1.5);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let err = StandardsCatalog::from_json_str(r#"{ "X": { "diam_mm": 1, "pas": 1, "unite": "Q" } }"#)
            .unwrap_err();
        assert!(matches!(err, MeasureError::CatalogUnavailable { .. }));
    }

    #[test]
    fn test_missing_file_is_catalog_unavailable() {
        let err = StandardsCatalog::from_json_file(Path::new("/nonexistent/Dimensions.json")).unwrap_err();
        assert!(matches!(err, MeasureError::CatalogUnavailable { .. }));
    }

    #[test]
    fn test_clones_share_rows() {
        let catalog = StandardsCatalog::from_json_str(CATALOG).unwrap();
        let shared = catalog.clone();
        assert!(std::ptr::eq(catalog.entries(), shared.entries()));
        assert_eq!(shared.len(), 3);
    }
}
