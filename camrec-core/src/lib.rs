//! # camrec core
//!
//! Foundational pieces shared by the camrec crates: the error taxonomy,
//! scoped leases for host resources, and the transport that uploads a
//! finished recording.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod resource;
pub mod transport;

// Re-export main types
pub use error::{CaptureError, CaptureResult, ErrorCategory};
pub use resource::{Lease, Release, ResourceKind, ResourceTracker, ResourceUsage};
pub use transport::{
    HttpUploader, UploadConfig, UploadRequest, UploadResponse, UploadTransport,
    DEFAULT_FIELD_NAME, DEFAULT_FILE_NAME, DEFAULT_MIME_TYPE,
};
