//! Error types for object extraction operations

use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error types for the extraction pipeline
///
/// Per-file errors (`Decode`, `RemovalService`, `Transport`,
/// `InvalidServiceResponse`) are contained by the processor. The remaining
/// variants are configuration or contract violations.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding or processing errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// An uploaded file could not be decoded as an image
    #[error("Could not process {file_name}: {source}")]
    Decode {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    /// The removal service answered with a non-success status
    #[error("Error removing background: {status} - {body}")]
    RemovalService { status: u16, body: String },

    /// The removal service could not be reached
    #[error("Removal service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The removal service answered 200 with a body that is not an image
    #[error("Removal service returned an unreadable image: {0}")]
    InvalidServiceResponse(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two images that must share dimensions do not
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// ZIP archive errors
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Generic processing failure
    #[error("Processing error: {0}")]
    Processing(String),
}

impl ExtractError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a decode error tagged with the upload's file name
    pub fn decode<S: Into<String>>(file_name: S, source: image::ImageError) -> Self {
        Self::Decode {
            file_name: file_name.into(),
            source,
        }
    }

    /// Create a removal service error from a status code and response body
    pub fn removal_service<S: Into<String>>(status: u16, body: S) -> Self {
        Self::RemovalService {
            status,
            body: body.into(),
        }
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }

    /// Whether the error came from the removal service call
    ///
    /// These are the errors that make the processor fall back to the
    /// original image instead of skipping the file.
    #[must_use]
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::RemovalService { .. } | Self::Transport(_) | Self::InvalidServiceResponse(_)
        )
    }
}
