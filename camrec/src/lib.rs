//! # camrec - Camera Recording Client
//!
//! camrec requests camera access, shows a live preview, records the stream
//! into memory, plays the recording back with a download link and uploads it
//! to a remote endpoint with a single multipart `POST`.
//!
//! ## Key Features
//!
//! - **One component**: a [`CaptureSession`] owns the whole lifecycle
//! - **Scoped resources**: camera streams, recorders and object URLs are
//!   released exactly once, on replacement, on `close()` or on drop
//! - **Pluggable host**: the browser on `wasm32`, an in-memory mock elsewhere
//! - **Tagged results**: every operation logs and returns a [`CaptureError`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camrec::{CaptureSession, MockHost};
//!
//! # async fn run() -> camrec::CaptureResult<()> {
//! let host = MockHost::new()
//!     .with_container("camera-preview")
//!     .with_container("video-container")
//!     .with_chunks(vec![b"fragment".to_vec()]);
//!
//! let mut session = CaptureSession::new(host)?;
//! session.start_camera("camera-preview").await?;
//! session.start_recording()?;
//! let recording = session.stop_recording().await?;
//! println!("recorded {} bytes", recording.size());
//!
//! let reply = session.upload_recording("http://localhost:8080/upload").await?;
//! println!("server replied: {}", reply.body);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use camrec_core::{
    CaptureError, CaptureResult, ErrorCategory, HttpUploader, ResourceKind, ResourceUsage,
    UploadConfig, UploadRequest, UploadResponse, UploadTransport,
};

pub use camrec_media::{
    CaptureConstraints, MediaHost, MockHost, MockPermission, RecorderOptions, RecordingArtifact,
    RenderedNode, RenderedSource,
};

#[cfg(target_arch = "wasm32")]
pub use camrec_media::WebHost;

// Public API modules
pub mod config;
pub mod logging;
pub mod session;
pub mod state;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-export main API types
pub use config::{SessionConfig, DEFAULT_PLAYBACK_CONTAINER};
pub use logging::init_logging;
pub use session::{CaptureSession, CaptureSessionBuilder};
pub use state::SessionState;

#[cfg(target_arch = "wasm32")]
pub use web::CameraRecorder;
