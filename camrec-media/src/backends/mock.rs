//! In-memory host for tests and native builds
//!
//! Camera permission, recorder output and the set of page containers are
//! scripted up front. Everything the session does to the host is recorded
//! and can be inspected afterwards: rendered surfaces, acquired and released
//! streams, created and revoked object URLs.

use crate::capture::{CaptureConstraints, CaptureStream};
use crate::host::MediaHost;
use crate::object_url::ObjectUrl;
use crate::recorder::{
    MediaRecorder, RecorderEvent, RecorderOptions, RecorderState, RecordingArtifact,
};
use crate::render::{DownloadLink, Document, MediaSource, SurfaceNode, VideoOptions};
use async_trait::async_trait;
use bytes::Bytes;
use camrec_core::{CaptureError, CaptureResult, Release, ResourceKind};
use futures::channel::mpsc;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Scripted answer to a camera request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockPermission {
    /// Access granted
    Granted,
    /// The user refused
    Denied,
    /// No camera attached
    NoDevice,
}

/// Media source of a rendered video element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedSource {
    /// Live stream, by id
    Stream(String),
    /// Object URL
    Url(String),
}

/// Snapshot of one child placed into a mock container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    /// A video element
    Video {
        /// Media source
        source: RenderedSource,
        /// Presentation options
        options: VideoOptions,
    },
    /// A download link
    Download(DownloadLink),
}

#[derive(Debug)]
struct MockState {
    permission: MockPermission,
    containers: HashMap<String, Vec<RenderedNode>>,
    scripted_chunks: Vec<Bytes>,
    recorder_mime: Option<String>,
    fail_recorder_start: bool,
    fail_object_urls: bool,
    drop_stop_event: bool,
    camera_requests: u32,
    live_streams: Vec<String>,
    stopped_streams: Vec<String>,
    recorders_created: u32,
    recorder_options: Vec<RecorderOptions>,
    live_object_urls: Vec<String>,
    revoked_object_urls: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            permission: MockPermission::Granted,
            containers: HashMap::new(),
            scripted_chunks: Vec::new(),
            recorder_mime: None,
            fail_recorder_start: false,
            fail_object_urls: false,
            drop_stop_event: false,
            camera_requests: 0,
            live_streams: Vec::new(),
            stopped_streams: Vec::new(),
            recorders_created: 0,
            recorder_options: Vec::new(),
            live_object_urls: Vec::new(),
            revoked_object_urls: Vec::new(),
        }
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// Scriptable in-memory [`MediaHost`]
///
/// Clones share their script and their records.
#[derive(Debug, Clone)]
pub struct MockHost {
    state: SharedState,
    document: MockDocument,
}

impl MockHost {
    /// Host that grants camera access and has no containers
    pub fn new() -> Self {
        let state = SharedState::default();
        Self {
            document: MockDocument {
                state: state.clone(),
            },
            state,
        }
    }

    /// Add a page container
    pub fn with_container(self, container_id: &str) -> Self {
        self.add_container(container_id);
        self
    }

    /// Script the answer to camera requests
    pub fn with_permission(self, permission: MockPermission) -> Self {
        self.state.lock().permission = permission;
        self
    }

    /// Fragments every recorder emits when stopped, in order
    pub fn with_chunks<I, B>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.state.lock().scripted_chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Container type reported by recorders
    pub fn with_recorder_mime(self, mime_type: &str) -> Self {
        self.state.lock().recorder_mime = Some(mime_type.to_string());
        self
    }

    /// Make `MediaRecorder::start` fail
    pub fn with_failing_recorder_start(self) -> Self {
        self.state.lock().fail_recorder_start = true;
        self
    }

    /// Make object URL creation fail
    pub fn with_failing_object_urls(self) -> Self {
        self.state.lock().fail_object_urls = true;
        self
    }

    /// Close the recorder event stream without a stop event
    pub fn with_missing_stop_event(self) -> Self {
        self.state.lock().drop_stop_event = true;
        self
    }

    /// Add a page container at runtime
    pub fn add_container(&self, container_id: &str) {
        self.state
            .lock()
            .containers
            .entry(container_id.to_string())
            .or_default();
    }

    /// Remove a page container at runtime
    pub fn remove_container(&self, container_id: &str) {
        self.state.lock().containers.remove(container_id);
    }

    /// Current children of a container
    pub fn rendered(&self, container_id: &str) -> Option<Vec<RenderedNode>> {
        self.state.lock().containers.get(container_id).cloned()
    }

    /// Number of camera requests made
    pub fn camera_requests(&self) -> u32 {
        self.state.lock().camera_requests
    }

    /// Ids of streams acquired and not yet stopped
    pub fn live_streams(&self) -> Vec<String> {
        self.state.lock().live_streams.clone()
    }

    /// Ids of streams that were stopped, in order
    pub fn stopped_streams(&self) -> Vec<String> {
        self.state.lock().stopped_streams.clone()
    }

    /// Number of recorders constructed
    pub fn recorders_created(&self) -> u32 {
        self.state.lock().recorders_created
    }

    /// Options passed to each recorder, in construction order
    pub fn recorder_options(&self) -> Vec<RecorderOptions> {
        self.state.lock().recorder_options.clone()
    }

    /// Object URLs created and not yet revoked
    pub fn live_object_urls(&self) -> Vec<String> {
        self.state.lock().live_object_urls.clone()
    }

    /// Object URLs that were revoked, in order
    pub fn revoked_object_urls(&self) -> Vec<String> {
        self.state.lock().revoked_object_urls.clone()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl MediaHost for MockHost {
    type Stream = MockStream;
    type Recorder = MockRecorder;
    type Document = MockDocument;

    async fn request_camera(&self, constraints: &CaptureConstraints) -> CaptureResult<MockStream> {
        let mut state = self.state.lock();
        state.camera_requests += 1;

        match state.permission {
            MockPermission::Denied => Err(CaptureError::PermissionDenied {
                operation: "camera access".to_string(),
            }),
            MockPermission::NoDevice => Err(CaptureError::DeviceUnavailable {
                reason: "no video input device".to_string(),
            }),
            MockPermission::Granted => {
                let id = Uuid::new_v4().to_string();
                state.live_streams.push(id.clone());
                debug!(stream = %id, audio = constraints.audio, "Mock stream granted");

                Ok(MockStream {
                    id,
                    active: true,
                    state: self.state.clone(),
                })
            }
        }
    }

    fn create_recorder(
        &self,
        stream: &MockStream,
        options: &RecorderOptions,
    ) -> CaptureResult<MockRecorder> {
        if !stream.is_active() {
            return Err(CaptureError::recorder("stream is no longer active"));
        }

        let mut state = self.state.lock();
        state.recorders_created += 1;
        state.recorder_options.push(options.clone());

        let (events_tx, events_rx) = mpsc::unbounded();
        Ok(MockRecorder {
            state: RecorderState::Inactive,
            chunks: state.scripted_chunks.clone(),
            mime_type: options
                .mime_type
                .clone()
                .or_else(|| state.recorder_mime.clone()),
            fail_start: state.fail_recorder_start,
            drop_stop_event: state.drop_stop_event,
            events_tx: Some(events_tx),
            events_rx,
        })
    }

    fn document(&self) -> &MockDocument {
        &self.document
    }

    fn create_object_url(&self, artifact: &RecordingArtifact) -> CaptureResult<ObjectUrl> {
        let mut state = self.state.lock();
        if state.fail_object_urls {
            return Err(CaptureError::render("object URLs are unavailable"));
        }

        let url = format!("blob:mock/{}", artifact.id());
        state.live_object_urls.push(url.clone());

        let shared = self.state.clone();
        Ok(ObjectUrl::new(url, move |url| {
            let mut state = shared.lock();
            state.live_object_urls.retain(|live| live != url);
            state.revoked_object_urls.push(url.to_string());
        }))
    }
}

/// Stream handed out by [`MockHost`]
#[derive(Debug)]
pub struct MockStream {
    id: String,
    active: bool,
    state: SharedState,
}

impl CaptureStream for MockStream {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Release for MockStream {
    fn kind(&self) -> ResourceKind {
        ResourceKind::CaptureStream
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }

        self.active = false;
        let mut state = self.state.lock();
        state.live_streams.retain(|live| live != &self.id);
        state.stopped_streams.push(self.id.clone());
    }
}

/// Recorder handed out by [`MockHost`]; emits its scripted fragments on stop
#[derive(Debug)]
pub struct MockRecorder {
    state: RecorderState,
    chunks: Vec<Bytes>,
    mime_type: Option<String>,
    fail_start: bool,
    drop_stop_event: bool,
    events_tx: Option<mpsc::UnboundedSender<RecorderEvent>>,
    events_rx: mpsc::UnboundedReceiver<RecorderEvent>,
}

#[async_trait(?Send)]
impl MediaRecorder for MockRecorder {
    fn start(&mut self) -> CaptureResult<()> {
        if self.fail_start {
            return Err(CaptureError::recorder("NotSupportedError: recorder refused to start"));
        }

        if self.state != RecorderState::Inactive {
            return Err(CaptureError::recorder("recorder already started"));
        }

        self.state = RecorderState::Recording;
        Ok(())
    }

    fn stop(&mut self) -> CaptureResult<()> {
        if self.state == RecorderState::Inactive {
            return Err(CaptureError::recorder("recorder is not recording"));
        }

        self.state = RecorderState::Inactive;

        let Some(events_tx) = self.events_tx.take() else {
            return Ok(());
        };

        for chunk in self.chunks.drain(..) {
            let _ = events_tx.unbounded_send(RecorderEvent::Data(chunk));
        }

        if !self.drop_stop_event {
            let _ = events_tx.unbounded_send(RecorderEvent::Stopped);
        }

        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.state
    }

    fn mime_type(&self) -> Option<String> {
        self.mime_type.clone()
    }

    async fn next_event(&mut self) -> Option<RecorderEvent> {
        self.events_rx.next().await
    }
}

impl Release for MockRecorder {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Recorder
    }

    fn release(&mut self) {
        self.state = RecorderState::Inactive;
        self.events_tx = None;
    }
}

/// Page of a [`MockHost`]
#[derive(Debug, Clone)]
pub struct MockDocument {
    state: SharedState,
}

impl Document for MockDocument {
    type Stream = MockStream;

    fn has_container(&self, container_id: &str) -> bool {
        self.state.lock().containers.contains_key(container_id)
    }

    fn replace_content(
        &self,
        container_id: &str,
        nodes: &[SurfaceNode<'_, MockStream>],
    ) -> CaptureResult<()> {
        let rendered = nodes
            .iter()
            .map(|node| match node {
                SurfaceNode::Video(surface) => RenderedNode::Video {
                    source: match surface.source {
                        MediaSource::Live(stream) => RenderedSource::Stream(stream.id()),
                        MediaSource::Url(url) => RenderedSource::Url(url.to_string()),
                    },
                    options: surface.options.clone(),
                },
                SurfaceNode::Download(link) => RenderedNode::Download(link.clone()),
            })
            .collect();

        let mut state = self.state.lock();
        let container = state
            .containers
            .get_mut(container_id)
            .ok_or_else(|| CaptureError::ContainerNotFound {
                container_id: container_id.to_string(),
            })?;
        *container = rendered;
        Ok(())
    }
}
