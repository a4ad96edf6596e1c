//! Error types for camrec
//!
//! Every session operation returns a [`CaptureResult`]. Failures are grouped
//! into categories so callers can tell a denied camera from a missing
//! recording or a broken network without matching on every variant.

use thiserror::Error;

/// Main error type for capture, recording and upload operations
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The user or the host refused camera access
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// No capture device matched the request
    #[error("No capture device available: {reason}")]
    DeviceUnavailable {
        /// Reason reported by the host
        reason: String,
    },

    /// Camera acquisition failed for another reason
    #[error("Camera acquisition failed: {reason}")]
    AcquisitionFailed {
        /// Reason reported by the host
        reason: String,
    },

    /// Recording was requested without an active stream
    #[error("No media stream available for recording")]
    NoActiveStream,

    /// Stop was requested without an active recorder
    #[error("No media recorder found")]
    NoActiveRecorder,

    /// Upload was requested before any recording completed
    #[error("No recorded video to upload")]
    NothingToUpload,

    /// A display container could not be resolved
    #[error("Container element not found: {container_id}")]
    ContainerNotFound {
        /// Id that failed to resolve
        container_id: String,
    },

    /// Building or attaching a display surface failed
    #[error("Render error: {reason}")]
    Render {
        /// Failure reason
        reason: String,
    },

    /// The host recorder failed
    #[error("Recorder error: {reason}")]
    Recorder {
        /// Failure reason
        reason: String,
    },

    /// The upload request did not complete
    #[error("Upload failed: {reason}")]
    UploadFailed {
        /// Failure reason
        reason: String,
    },

    /// The upload endpoint answered with a non-success status and no JSON body
    #[error("Upload rejected with HTTP {status} from {url}")]
    UploadStatus {
        /// HTTP status code
        status: u16,
        /// Endpoint URL
        url: String,
    },

    /// The upload endpoint answered with something other than JSON
    #[error("Invalid upload response: {reason}")]
    InvalidResponse {
        /// Parse failure reason
        reason: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// The running platform lacks a required capability
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform {
        /// Platform or capability name
        platform: String,
    },
}

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

impl CaptureError {
    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            CaptureError::PermissionDenied { .. } => ErrorCategory::Device,
            CaptureError::DeviceUnavailable { .. } => ErrorCategory::Device,
            CaptureError::AcquisitionFailed { .. } => ErrorCategory::Device,
            CaptureError::NoActiveStream => ErrorCategory::Precondition,
            CaptureError::NoActiveRecorder => ErrorCategory::Precondition,
            CaptureError::NothingToUpload => ErrorCategory::Precondition,
            CaptureError::ContainerNotFound { .. } => ErrorCategory::Display,
            CaptureError::Render { .. } => ErrorCategory::Display,
            CaptureError::Recorder { .. } => ErrorCategory::Recorder,
            CaptureError::UploadFailed { .. } => ErrorCategory::Transport,
            CaptureError::UploadStatus { .. } => ErrorCategory::Transport,
            CaptureError::InvalidResponse { .. } => ErrorCategory::Transport,
            CaptureError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            CaptureError::UnsupportedPlatform { .. } => ErrorCategory::Platform,
        }
    }

    /// Whether the failure was a call made out of lifecycle order
    pub fn is_precondition(&self) -> bool {
        self.category() == ErrorCategory::Precondition
    }

    /// Shorthand for a [`CaptureError::Recorder`]
    pub fn recorder(reason: impl Into<String>) -> Self {
        CaptureError::Recorder {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CaptureError::Render`]
    pub fn render(reason: impl Into<String>) -> Self {
        CaptureError::Render {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CaptureError::InvalidConfiguration`]
    pub fn config(message: impl Into<String>) -> Self {
        CaptureError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Camera permission or device errors
    Device,
    /// Operation invoked out of lifecycle order
    Precondition,
    /// Display container or surface errors
    Display,
    /// Host recorder errors
    Recorder,
    /// Upload network or response errors
    Transport,
    /// Configuration and parameter errors
    Configuration,
    /// Platform capability errors
    Platform,
}

impl From<reqwest::Error> for CaptureError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => CaptureError::UploadStatus {
                status: status.as_u16(),
                url: error
                    .url()
                    .map(|url| url.to_string())
                    .unwrap_or_default(),
            },
            None => CaptureError::UploadFailed {
                reason: error.to_string(),
            },
        }
    }
}

impl From<url::ParseError> for CaptureError {
    fn from(error: url::ParseError) -> Self {
        CaptureError::InvalidConfiguration {
            message: format!("invalid upload URL: {}", error),
        }
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(error: serde_json::Error) -> Self {
        CaptureError::InvalidResponse {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let denied = CaptureError::PermissionDenied {
            operation: "camera".to_string(),
        };
        assert_eq!(denied.category(), ErrorCategory::Device);
        assert!(!denied.is_precondition());

        assert_eq!(
            CaptureError::NothingToUpload.category(),
            ErrorCategory::Precondition
        );
        assert!(CaptureError::NoActiveStream.is_precondition());
        assert!(CaptureError::NoActiveRecorder.is_precondition());
    }

    #[test]
    fn test_error_display() {
        let error = CaptureError::ContainerNotFound {
            container_id: "preview".to_string(),
        };
        assert_eq!(error.to_string(), "Container element not found: preview");
        assert_eq!(
            CaptureError::NoActiveStream.to_string(),
            "No media stream available for recording"
        );
    }

    #[test]
    fn test_error_from_url_parse() {
        let parse_error = url::Url::parse("not a url").unwrap_err();
        let error = CaptureError::from(parse_error);

        match error {
            CaptureError::InvalidConfiguration { message } => {
                assert!(message.starts_with("invalid upload URL"))
            }
            _ => panic!("Expected InvalidConfiguration error variant"),
        }
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let error = CaptureError::from(json_error);
        assert_eq!(error.category(), ErrorCategory::Transport);
    }
}
