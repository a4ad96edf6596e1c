//! Session lifecycle state
//!
//! The state is never stored. A session computes it from the resources it
//! currently holds, so it cannot drift from what the host actually has.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a capture session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing held
    Idle,
    /// Camera stream held, no recording yet
    CameraActive,
    /// Recorder running
    Recording,
    /// A recording is available for playback, download and upload
    Recorded,
    /// The latest recording has been uploaded
    Uploaded,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionState {
    /// Derive the state from what a session holds.
    ///
    /// A running recorder wins over everything else; an uploaded recording
    /// wins over a merely recorded one; a bare stream is `CameraActive`.
    pub fn derive(has_stream: bool, recording: bool, has_recording: bool, uploaded: bool) -> Self {
        match (recording, has_recording, uploaded, has_stream) {
            (true, _, _, _) => Self::Recording,
            (false, true, true, _) => Self::Uploaded,
            (false, true, false, _) => Self::Recorded,
            (false, false, _, true) => Self::CameraActive,
            (false, false, _, false) => Self::Idle,
        }
    }

    /// Name used in logs and by the JS surface
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CameraActive => "camera_active",
            Self::Recording => "recording",
            Self::Recorded => "recorded",
            Self::Uploaded => "uploaded",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive() {
        assert_eq!(SessionState::derive(false, false, false, false), SessionState::Idle);
        assert_eq!(
            SessionState::derive(true, false, false, false),
            SessionState::CameraActive
        );
        assert_eq!(SessionState::derive(true, true, false, false), SessionState::Recording);
        assert_eq!(SessionState::derive(true, true, true, true), SessionState::Recording);
        assert_eq!(SessionState::derive(true, false, true, false), SessionState::Recorded);
        assert_eq!(SessionState::derive(false, false, true, false), SessionState::Recorded);
        assert_eq!(SessionState::derive(true, false, true, true), SessionState::Uploaded);
    }

    #[test]
    fn test_serialized_names_match_display() {
        for state in [
            SessionState::Idle,
            SessionState::CameraActive,
            SessionState::Recording,
            SessionState::Recorded,
            SessionState::Uploaded,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state));
        }
    }
}
