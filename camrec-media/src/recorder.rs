//! Recording a capture stream into an in-memory artifact
//!
//! A host recorder samples a stream into binary fragments and reports them
//! as [`RecorderEvent::Data`] in capture order, followed by exactly one
//! [`RecorderEvent::Stopped`]. Fragments are collected in a [`ChunkBuffer`]
//! and concatenated into a [`RecordingArtifact`] once the recorder stops.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use camrec_core::{CaptureError, CaptureResult, Release, DEFAULT_MIME_TYPE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recorder construction options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderOptions {
    /// Preferred container type; used only when the host supports it
    pub mime_type: Option<String>,
    /// Emit a data fragment every `timeslice_ms` instead of once at stop
    pub timeslice_ms: Option<u32>,
}

impl RecorderOptions {
    /// Validate options
    pub fn validate(&self) -> CaptureResult<()> {
        if self.timeslice_ms == Some(0) {
            return Err(CaptureError::config("recorder timeslice must be > 0"));
        }

        if let Some(mime_type) = &self.mime_type {
            if mime_type.trim().is_empty() {
                return Err(CaptureError::config("recorder MIME type must not be empty"));
            }
        }

        Ok(())
    }
}

/// Recorder lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not recording
    Inactive,
    /// Capturing fragments
    Recording,
    /// Paused by the host
    Paused,
}

/// Events reported by a host recorder
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// One fragment of encoded media; may be empty
    Data(Bytes),
    /// The host reported a recorder failure
    Error(String),
    /// The recorder has flushed its last fragment
    Stopped,
}

/// A host media recorder bound to one capture stream
#[async_trait(?Send)]
pub trait MediaRecorder: Release {
    /// Begin capturing
    fn start(&mut self) -> CaptureResult<()>;

    /// Ask the recorder to stop; completion arrives as [`RecorderEvent::Stopped`]
    fn stop(&mut self) -> CaptureResult<()>;

    /// Current state
    fn state(&self) -> RecorderState;

    /// Container type the host is encoding to, when known
    fn mime_type(&self) -> Option<String>;

    /// Next event in capture order; `None` once the host stops reporting
    async fn next_event(&mut self) -> Option<RecorderEvent>;
}

/// Ordered fragments of one recording
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Bytes>,
    total_bytes: usize,
}

impl ChunkBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Empty fragments are skipped; returns whether it was kept.
    pub fn push(&mut self, chunk: Bytes) -> bool {
        if chunk.is_empty() {
            return false;
        }

        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    /// Drop every fragment
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }

    /// Number of fragments held
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no fragment has been kept
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sum of the fragment sizes
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Fragments in capture order
    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    /// Concatenate all fragments into one contiguous buffer
    pub fn concat(&self) -> Bytes {
        match self.chunks.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            chunks => {
                let mut joined = BytesMut::with_capacity(self.total_bytes);
                for chunk in chunks {
                    joined.extend_from_slice(chunk);
                }
                joined.freeze()
            }
        }
    }
}

/// One completed recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingArtifact {
    id: Uuid,
    data: Bytes,
    mime_type: String,
    chunk_count: usize,
    created_at: DateTime<Utc>,
}

impl RecordingArtifact {
    /// Concatenate `buffer` into an artifact of type `mime_type`
    pub fn from_chunks(buffer: &ChunkBuffer, mime_type: Option<&str>) -> Self {
        let mime_type = mime_type
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE);

        Self {
            id: Uuid::new_v4(),
            data: buffer.concat(),
            mime_type: mime_type.to_string(),
            chunk_count: buffer.len(),
            created_at: Utc::now(),
        }
    }

    /// Artifact identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Recording bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Container type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Number of fragments concatenated
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// When the recording completed
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
