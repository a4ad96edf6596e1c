//! # camrec media
//!
//! Host capabilities for camera capture, recording and display. The
//! [`MediaHost`] trait is what a capture session talks to; [`MockHost`] is an
//! in-memory implementation for tests and native builds, and on `wasm32`
//! the browser implementation `WebHost` drives `getUserMedia`,
//! `MediaRecorder` and the DOM.

#![warn(clippy::all)]

pub mod backends;
pub mod capture;
pub mod host;
pub mod object_url;
pub mod recorder;
pub mod render;

// Re-export main types
pub use backends::{
    MockDocument, MockHost, MockPermission, MockRecorder, MockStream, RenderedNode, RenderedSource,
};
#[cfg(target_arch = "wasm32")]
pub use backends::WebHost;
pub use capture::{CaptureConstraints, CaptureStream};
pub use host::MediaHost;
pub use object_url::ObjectUrl;
pub use recorder::{
    ChunkBuffer, MediaRecorder, RecorderEvent, RecorderOptions, RecorderState, RecordingArtifact,
};
pub use render::{
    Document, DownloadLink, MediaSource, ObjectFit, SurfaceNode, VideoOptions, VideoSurface,
    DOWNLOAD_LABEL,
};
