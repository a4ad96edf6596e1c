//! Configuration types and defaults

use camrec_core::{CaptureError, CaptureResult, UploadConfig};
use camrec_media::{CaptureConstraints, RecorderOptions};
use serde::{Deserialize, Serialize};

/// Container that receives the playback surface and download link
pub const DEFAULT_PLAYBACK_CONTAINER: &str = "video-container";

/// Capture session configuration
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use camrec::SessionConfig;
///
/// let config = SessionConfig::from_json(r#"{"capture": {"audio": true}}"#).unwrap();
/// assert!(config.capture.audio);
/// assert_eq!(config.playback_container_id, "video-container");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Container id for playback after a recording stops
    pub playback_container_id: String,
    /// What to request from the camera
    pub capture: CaptureConstraints,
    /// Options passed to the host recorder
    pub recorder: RecorderOptions,
    /// Multipart upload settings
    pub upload: UploadConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playback_container_id: DEFAULT_PLAYBACK_CONTAINER.to_string(),
            capture: CaptureConstraints::default(),
            recorder: RecorderOptions::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> CaptureResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::config(format!("malformed session config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CaptureResult<()> {
        if self.playback_container_id.trim().is_empty() {
            return Err(CaptureError::config(
                "playback container id must not be empty",
            ));
        }

        self.capture.validate()?;
        self.recorder.validate()?;
        self.upload.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.playback_container_id, "video-container");
        assert!(config.capture.video);
        assert!(!config.capture.audio);
        assert_eq!(config.upload.field_name, "file");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SessionConfig::from_json(
            r#"{"playback_container_id": "playback", "recorder": {"timeslice_ms": 250}}"#,
        )
        .unwrap();

        assert_eq!(config.playback_container_id, "playback");
        assert_eq!(config.recorder.timeslice_ms, Some(250));
        assert_eq!(config.upload, UploadConfig::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let error = SessionConfig::from_json("{not json").unwrap_err();
        assert!(matches!(error, CaptureError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_container() {
        let config = SessionConfig {
            playback_container_id: "  ".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_checks_nested_sections() {
        let mut config = SessionConfig::default();
        config.recorder.timeslice_ms = Some(0);
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.upload.file_name = String::new();
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.capture.video = false;
        assert!(config.validate().is_err());
    }
}
