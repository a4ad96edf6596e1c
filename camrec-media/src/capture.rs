//! Camera capture
//!
//! The host grants a live stream in answer to a set of constraints. The
//! stream is a [`Release`] resource: releasing it stops every track, which
//! turns the camera off.

use camrec_core::{CaptureError, CaptureResult, Release};
use serde::{Deserialize, Serialize};

/// What to ask the host for when requesting camera access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConstraints {
    /// Request a video track
    pub video: bool,
    /// Request an audio track
    pub audio: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

impl CaptureConstraints {
    /// Video only, the default request
    pub const fn video_only() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }

    /// Video with microphone audio
    pub const fn video_with_audio() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }

    /// Validate constraints
    pub fn validate(&self) -> CaptureResult<()> {
        if !self.video {
            return Err(CaptureError::config(
                "capture constraints must request a video track",
            ));
        }

        Ok(())
    }
}

/// A live capture stream granted by the host
pub trait CaptureStream: Release {
    /// Host-assigned stream identifier
    fn id(&self) -> String;

    /// Whether the stream still produces media
    fn is_active(&self) -> bool;
}
