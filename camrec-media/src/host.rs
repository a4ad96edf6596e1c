//! Host capabilities
//!
//! Everything the capture session needs from its environment, bundled in a
//! single trait: camera access, recorder construction, the page to draw on,
//! and object URLs. Browser handles are bound to the thread that created
//! them, so none of these futures are required to be `Send`.

use crate::capture::{CaptureConstraints, CaptureStream};
use crate::object_url::ObjectUrl;
use crate::recorder::{MediaRecorder, RecorderOptions, RecordingArtifact};
use crate::render::Document;
use async_trait::async_trait;
use camrec_core::CaptureResult;

/// Media capabilities provided by the environment
#[async_trait(?Send)]
pub trait MediaHost {
    /// Live stream handle
    type Stream: CaptureStream;
    /// Recorder bound to a stream
    type Recorder: MediaRecorder;
    /// Page the session draws on
    type Document: Document<Stream = Self::Stream>;

    /// Ask for camera access; may prompt the user
    async fn request_camera(&self, constraints: &CaptureConstraints)
        -> CaptureResult<Self::Stream>;

    /// Build a recorder for `stream` without starting it
    fn create_recorder(
        &self,
        stream: &Self::Stream,
        options: &RecorderOptions,
    ) -> CaptureResult<Self::Recorder>;

    /// The page
    fn document(&self) -> &Self::Document;

    /// Create a temporary URL for `artifact`
    fn create_object_url(&self, artifact: &RecordingArtifact) -> CaptureResult<ObjectUrl>;
}
