//! Capture session lifecycle
//!
//! A [`CaptureSession`] owns everything one camera recorder needs: the live
//! stream, the recorder bound to it, the collected fragments, the finished
//! artifact and the object URL that displays it. The four operations form a
//! strict lifecycle:
//!
//! ```text
//! start_camera -> start_recording -> stop_recording -> upload_recording
//! ```
//!
//! Every host resource is held in a [`Lease`], so replacing, closing or
//! dropping the session gives the camera, recorder and URLs back to the host.
//! Every failure is logged and returned; none of them leaves the session in
//! a half-updated state.

use crate::config::SessionConfig;
use crate::state::SessionState;
use camrec_core::{
    CaptureError, CaptureResult, HttpUploader, Lease, ResourceTracker, ResourceUsage,
    UploadConfig, UploadRequest, UploadResponse, UploadTransport,
};
use camrec_media::{
    CaptureConstraints, CaptureStream, ChunkBuffer, Document, DownloadLink, MediaHost,
    MediaRecorder, ObjectUrl, RecorderEvent, RecorderOptions, RecorderState, RecordingArtifact,
    SurfaceNode, VideoSurface,
};
use std::fmt;
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// One camera recorder bound to a media host
pub struct CaptureSession<H: MediaHost> {
    host: H,
    config: SessionConfig,
    uploader: Box<dyn UploadTransport>,
    tracker: ResourceTracker,
    // Field order is drop order: recorder before its stream.
    recorder: Option<Lease<H::Recorder>>,
    stream: Option<Lease<H::Stream>>,
    playback_url: Option<Lease<ObjectUrl>>,
    chunks: ChunkBuffer,
    artifact: Option<RecordingArtifact>,
    uploaded: bool,
}

impl<H: MediaHost> CaptureSession<H> {
    /// Session with default configuration and the HTTP uploader
    pub fn new(host: H) -> CaptureResult<Self> {
        Self::builder(host).build()
    }

    /// Configure a session before creating it
    pub fn builder(host: H) -> CaptureSessionBuilder<H> {
        CaptureSessionBuilder::new(host)
    }

    /// Request the camera and show a live preview in `container_id`.
    ///
    /// On success any previous stream is released. If the container does not
    /// exist the stream is still kept, but [`CaptureError::ContainerNotFound`]
    /// is returned. If access is refused the previous stream, if any, stays.
    pub async fn start_camera(&mut self, container_id: &str) -> CaptureResult<()> {
        info!(container = container_id, "Requesting camera access");

        let stream = match self.host.request_camera(&self.config.capture).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Error accessing camera");
                return Err(e);
            }
        };

        let stream_id = stream.id();
        let lease = Lease::new(stream, &self.tracker);
        if let Some(previous) = self.stream.replace(lease) {
            debug!(lease = %previous.id(), "Releasing previous camera stream");
            previous.release();
        }

        info!(stream = %stream_id, "Camera stream acquired");

        let Some(stream) = self.stream.as_deref() else {
            return Err(CaptureError::NoActiveStream);
        };

        let preview = [SurfaceNode::Video(VideoSurface::live_preview(stream))];
        if let Err(e) = self.host.document().replace_content(container_id, &preview) {
            error!(container = container_id, error = %e, "Cannot show camera preview");
            return Err(e);
        }

        debug!(container = container_id, "Live preview attached");
        Ok(())
    }

    /// Start recording the active stream.
    ///
    /// Fails with [`CaptureError::NoActiveStream`] before the camera has been
    /// started. A recording already in flight is stopped and discarded.
    pub fn start_recording(&mut self) -> CaptureResult<()> {
        if self.stream.is_none() {
            let e = CaptureError::NoActiveStream;
            error!("{}", e);
            return Err(e);
        }

        if let Some(previous) = self.recorder.take() {
            warn!(lease = %previous.id(), "Discarding recording in progress");
            discard_recorder(previous);
        }

        let Some(stream) = self.stream.as_deref() else {
            return Err(CaptureError::NoActiveStream);
        };

        let recorder = match self.host.create_recorder(stream, &self.config.recorder) {
            Ok(recorder) => recorder,
            Err(e) => {
                error!(error = %e, "Error creating media recorder");
                return Err(e);
            }
        };
        let mut recorder = Lease::new(recorder, &self.tracker);

        self.chunks.clear();
        self.artifact = None;
        self.uploaded = false;

        // A recorder that fails to start is released with its lease.
        if let Err(e) = recorder.start() {
            error!(error = %e, "Error starting media recorder");
            return Err(e);
        }

        info!(
            lease = %recorder.id(),
            mime_type = recorder.mime_type().as_deref().unwrap_or("host default"),
            "Recording started"
        );
        self.recorder = Some(recorder);
        Ok(())
    }

    /// Stop recording and collect the artifact.
    ///
    /// Every data fragment reported before the stop event is collected in
    /// order. The recording is then shown in the playback container together
    /// with a download link; display problems are logged but do not fail the
    /// operation.
    pub async fn stop_recording(&mut self) -> CaptureResult<RecordingArtifact> {
        let Some(mut recorder) = self.recorder.take() else {
            let e = CaptureError::NoActiveRecorder;
            error!("{}", e);
            return Err(e);
        };

        if recorder.state() != RecorderState::Inactive {
            if let Err(e) = recorder.stop() {
                error!(error = %e, "Error stopping media recorder");
                return Err(e);
            }
        }

        loop {
            match recorder.next_event().await {
                Some(RecorderEvent::Data(chunk)) => {
                    let size = chunk.len();
                    if !self.chunks.push(chunk) {
                        trace!("Skipping empty fragment");
                    } else {
                        trace!(bytes = size, "Collected fragment");
                    }
                }
                Some(RecorderEvent::Error(reason)) => {
                    error!(%reason, "Media recorder reported an error");
                }
                Some(RecorderEvent::Stopped) => break,
                None => {
                    // A partial recording is never kept for upload.
                    self.chunks.clear();
                    let e =
                        CaptureError::recorder("recorder closed without reporting a stop event");
                    error!(error = %e, "Recording incomplete");
                    return Err(e);
                }
            }
        }

        let mime_type = recorder.mime_type();
        recorder.release();

        let artifact = RecordingArtifact::from_chunks(&self.chunks, mime_type.as_deref());
        info!(
            recording = %artifact.id(),
            bytes = artifact.size(),
            chunks = artifact.chunk_count(),
            mime_type = artifact.mime_type(),
            created_at = %artifact.created_at(),
            "Recording stopped"
        );

        self.show_playback(&artifact);
        self.artifact = Some(artifact.clone());
        Ok(artifact)
    }

    /// Upload the latest recording to `api_url` as one multipart `POST`.
    ///
    /// No request is made unless a recording has been completed. Any JSON
    /// reply counts as success and is returned with its status, including
    /// non-2xx answers. There is no retry.
    pub async fn upload_recording(&mut self, api_url: &str) -> CaptureResult<UploadResponse> {
        let mime_type = match self.artifact.as_ref() {
            Some(artifact) if !self.chunks.is_empty() => artifact.mime_type().to_string(),
            _ => {
                let e = CaptureError::NothingToUpload;
                error!("{}", e);
                return Err(e);
            }
        };

        let url = match Url::parse(api_url) {
            Ok(url) => url,
            Err(e) => {
                let e = CaptureError::from(e);
                error!(url = api_url, error = %e, "Cannot upload recording");
                return Err(e);
            }
        };

        let request =
            UploadRequest::new(url, self.chunks.concat(), &mime_type, &self.config.upload);

        info!(url = %request.url, bytes = request.payload.len(), "Uploading recording");

        match self.uploader.upload(request).await {
            Ok(response) => {
                info!(
                    status = response.status,
                    success_status = response.is_success(),
                    response = %response.body,
                    "Upload successful"
                );
                self.uploaded = true;
                Ok(response)
            }
            Err(e) => {
                error!(error = %e, "Error uploading video");
                Err(e)
            }
        }
    }

    /// Release everything the session holds and return to [`SessionState::Idle`]
    pub fn close(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            warn!(lease = %recorder.id(), "Discarding recording in progress");
            discard_recorder(recorder);
        }

        if let Some(stream) = self.stream.take() {
            stream.release();
        }

        if let Some(url) = self.playback_url.take() {
            url.release();
        }

        self.chunks.clear();
        self.artifact = None;
        self.uploaded = false;

        debug!("Capture session closed");
    }

    /// Current lifecycle state, derived from held resources
    pub fn state(&self) -> SessionState {
        SessionState::derive(
            self.has_active_stream(),
            self.is_recording(),
            self.artifact.is_some(),
            self.uploaded,
        )
    }

    /// Whether a live camera stream is held
    pub fn has_active_stream(&self) -> bool {
        self.stream
            .as_deref()
            .map_or(false, |stream| stream.is_active())
    }

    /// Whether a recorder is running
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// The latest completed recording
    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        self.artifact.as_ref()
    }

    /// Bytes collected for the current recording
    pub fn recorded_bytes(&self) -> usize {
        self.chunks.total_bytes()
    }

    /// Object URL currently displayed in the playback container
    pub fn playback_url(&self) -> Option<&str> {
        self.playback_url.as_deref().map(ObjectUrl::as_str)
    }

    /// Live leases per resource kind
    pub fn resource_usage(&self) -> ResourceUsage {
        self.tracker.usage()
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The media host
    pub fn host(&self) -> &H {
        &self.host
    }

    fn show_playback(&mut self, artifact: &RecordingArtifact) {
        let url = match self.host.create_object_url(artifact) {
            Ok(url) => Lease::new(url, &self.tracker),
            Err(e) => {
                error!(error = %e, "Cannot create playback URL");
                return;
            }
        };

        let container_id = self.config.playback_container_id.as_str();
        let nodes = [
            SurfaceNode::Video(VideoSurface::playback(url.as_str())),
            SurfaceNode::Download(DownloadLink::new(
                url.as_str(),
                self.config.upload.file_name.as_str(),
            )),
        ];

        match self.host.document().replace_content(container_id, &nodes) {
            Ok(()) => {
                debug!(container = container_id, url = url.as_str(), "Playback attached");
                if let Some(previous) = self.playback_url.replace(url) {
                    previous.release();
                }
            }
            Err(e) => {
                error!(container = container_id, error = %e, "Cannot show recording");
                url.release();
            }
        }
    }
}

impl<H: MediaHost> fmt::Debug for CaptureSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("recorded_bytes", &self.recorded_bytes())
            .field("resources", &self.tracker.usage())
            .finish()
    }
}

fn discard_recorder<R: MediaRecorder>(mut recorder: Lease<R>) {
    if recorder.state() != RecorderState::Inactive {
        if let Err(e) = recorder.stop() {
            debug!(error = %e, "Discarded recorder did not stop cleanly");
        }
    }
    recorder.release();
}

/// Builder for [`CaptureSession`]
pub struct CaptureSessionBuilder<H: MediaHost> {
    host: H,
    config: SessionConfig,
    uploader: Option<Box<dyn UploadTransport>>,
}

impl<H: MediaHost> CaptureSessionBuilder<H> {
    fn new(host: H) -> Self {
        Self {
            host,
            config: SessionConfig::default(),
            uploader: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Container that receives playback and the download link
    pub fn playback_container(mut self, container_id: &str) -> Self {
        self.config.playback_container_id = container_id.to_string();
        self
    }

    /// Camera request constraints
    pub fn capture_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.config.capture = constraints;
        self
    }

    /// Request microphone audio along with video
    pub fn with_audio(mut self) -> Self {
        self.config.capture = CaptureConstraints::video_with_audio();
        self
    }

    /// Options passed to the host recorder
    pub fn recorder_options(mut self, options: RecorderOptions) -> Self {
        self.config.recorder = options;
        self
    }

    /// Multipart upload settings
    pub fn upload_config(mut self, upload: UploadConfig) -> Self {
        self.config.upload = upload;
        self
    }

    /// Send uploads through `transport` instead of the HTTP uploader
    pub fn upload_transport(mut self, transport: impl UploadTransport + 'static) -> Self {
        self.uploader = Some(Box::new(transport));
        self
    }

    /// Validate the configuration and create the session
    pub fn build(self) -> CaptureResult<CaptureSession<H>> {
        self.config.validate()?;

        let uploader = match self.uploader {
            Some(uploader) => uploader,
            None => Box::new(HttpUploader::with_config(&self.config.upload)?),
        };

        debug!(
            playback_container = %self.config.playback_container_id,
            audio = self.config.capture.audio,
            "Capture session created"
        );

        Ok(CaptureSession {
            host: self.host,
            config: self.config,
            uploader,
            tracker: ResourceTracker::new(),
            recorder: None,
            stream: None,
            playback_url: None,
            chunks: ChunkBuffer::new(),
            artifact: None,
            uploaded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camrec_media::{MockHost, MockPermission};

    #[tokio::test]
    async fn test_new_session_is_idle() {
        let session = CaptureSession::new(MockHost::new()).unwrap();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.has_active_stream());
        assert!(!session.is_recording());
        assert!(session.artifact().is_none());
        assert_eq!(session.resource_usage().total(), 0);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = CaptureSession::builder(MockHost::new())
            .playback_container("")
            .build();

        assert!(matches!(
            result,
            Err(CaptureError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_builder_applies_settings() {
        let session = CaptureSession::builder(MockHost::new())
            .playback_container("playback")
            .with_audio()
            .recorder_options(RecorderOptions {
                mime_type: Some("video/webm;codecs=vp9".to_string()),
                timeslice_ms: Some(500),
            })
            .build()
            .unwrap();

        assert_eq!(session.config().playback_container_id, "playback");
        assert_eq!(
            session.config().capture,
            CaptureConstraints::video_with_audio()
        );
        assert_eq!(session.config().recorder.timeslice_ms, Some(500));
    }

    #[test]
    fn test_denied_camera_keeps_session_idle() {
        let host = MockHost::new()
            .with_container("preview")
            .with_permission(MockPermission::Denied);
        let mut session = CaptureSession::new(host).unwrap();

        let result = tokio_test::block_on(session.start_camera("preview"));

        assert!(matches!(result, Err(CaptureError::PermissionDenied { .. })));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.host().rendered("preview"), Some(Vec::new()));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = CaptureSession::new(MockHost::new()).unwrap();

        session.close();
        session.close();

        assert_eq!(session.state(), SessionState::Idle);
    }
}
