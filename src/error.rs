//! Error types for the scan_threads library

use thiserror::Error;

/// Result type alias for scan_threads operations
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Error types for calibration, measurement and standards matching
#[derive(Error, Debug)]
pub enum MeasureError {
    /// Calibration found no circle inside the admissible radius band.
    /// Fatal to the session: no default scale is ever substituted.
    #[error(
        "No reference circle detected in {width}x{height} image (radius search {min_radius}..={max_radius} px)"
    )]
    NoCircleDetected {
        width: u32,
        height: u32,
        min_radius: i32,
        max_radius: i32,
    },

    /// The standards repository could not be queried
    #[error("Standards catalog unavailable: {message}")]
    CatalogUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// An image buffer (or a crop of one) has no pixels
    #[error("Empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// Configuration could not be read, written or parsed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A session step was invoked before the steps it depends on
    #[error("Measurement session out of order: {reason}")]
    SessionState { reason: String },

    /// OpenCV operation failed
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {operation}")]
    OpenCvError {
        operation: String,
        #[source]
        source: Option<opencv::Error>,
    },
}

impl MeasureError {
    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a catalog error with the underlying repository failure attached
    pub fn catalog_unavailable<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CatalogUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-parameter error from any displayable value
    pub fn invalid(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Create an OpenCV error with context
    #[cfg(feature = "opencv")]
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCvError {
            operation: operation.into(),
            source: Some(source),
        }
    }

    /// Check if the caller can retry with different input without restarting the session.
    ///
    /// Retrying is always the caller's business; the library never retries on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MeasureError::CatalogUnavailable { .. }
                | MeasureError::InvalidParameter { .. }
                | MeasureError::SessionState { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            MeasureError::NoCircleDetected { .. } => {
                "Could not find the reference coin. Select a region that contains the whole coin and try again.".to_string()
            }
            MeasureError::CatalogUnavailable { .. } => {
                "The thread standards catalog is currently unavailable. Please try again later.".to_string()
            }
            MeasureError::EmptyImage { .. } => {
                "The selected region is empty. Please draw a larger selection.".to_string()
            }
            MeasureError::InvalidParameter { parameter, value } => {
                format!("Invalid value for {}: {}", parameter, value)
            }
            _ => "Thread measurement failed. Please try with a different image.".to_string(),
        }
    }
}
