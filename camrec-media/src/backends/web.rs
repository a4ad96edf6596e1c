//! Browser host (wasm32)
//!
//! Adapter over `navigator.mediaDevices.getUserMedia()`, `MediaRecorder`,
//! the DOM and `URL.createObjectURL()`. Recorder callbacks only forward raw
//! events into a channel; blobs are read back to bytes one at a time in
//! [`MediaRecorder::next_event`], so fragments keep their capture order and
//! the stop event is never reported ahead of the last fragment.

use crate::capture::{CaptureConstraints, CaptureStream};
use crate::host::MediaHost;
use crate::object_url::ObjectUrl;
use crate::recorder::{
    MediaRecorder, RecorderEvent, RecorderOptions, RecorderState, RecordingArtifact,
};
use crate::render::{Document, DownloadLink, MediaSource, SurfaceNode, VideoSurface};
use async_trait::async_trait;
use bytes::Bytes;
use camrec_core::{CaptureError, CaptureResult, Release, ResourceKind};
use futures::channel::mpsc;
use futures::StreamExt;
use js_sys::{Array, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobEvent, BlobPropertyBag, DomException, Event, HtmlAnchorElement, HtmlVideoElement,
    MediaStream, MediaStreamConstraints, MediaStreamTrack, MediaRecorderOptions, Node,
    RecordingState, Url, Window,
};

/// Readable message for a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }

    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }

    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn classify_capture_error(value: JsValue) -> CaptureError {
    let name = value
        .dyn_ref::<DomException>()
        .map(|exception| exception.name())
        .unwrap_or_default();
    let reason = js_error_message(&value);

    match name.as_str() {
        "NotAllowedError" | "SecurityError" => CaptureError::PermissionDenied {
            operation: format!("camera access ({})", reason),
        },
        "NotFoundError" | "OverconstrainedError" | "NotReadableError" => {
            CaptureError::DeviceUnavailable { reason }
        }
        _ => CaptureError::AcquisitionFailed { reason },
    }
}

fn render_error(value: JsValue) -> CaptureError {
    CaptureError::render(js_error_message(&value))
}

/// [`MediaHost`] backed by the browser window
pub struct WebHost {
    window: Window,
    document: WebDocument,
}

impl WebHost {
    /// Bind to the global window
    pub fn new() -> CaptureResult<Self> {
        let window = web_sys::window().ok_or_else(|| CaptureError::UnsupportedPlatform {
            platform: "no global window".to_string(),
        })?;
        let document = window
            .document()
            .ok_or_else(|| CaptureError::UnsupportedPlatform {
                platform: "window has no document".to_string(),
            })?;

        Ok(Self {
            window,
            document: WebDocument { document },
        })
    }

    /// URL of the current page
    pub fn page_url(&self) -> Option<String> {
        self.window.location().href().ok()
    }
}

#[async_trait(?Send)]
impl MediaHost for WebHost {
    type Stream = WebStream;
    type Recorder = WebRecorder;
    type Document = WebDocument;

    async fn request_camera(&self, constraints: &CaptureConstraints) -> CaptureResult<WebStream> {
        let devices = self.window.navigator().media_devices().map_err(|e| {
            CaptureError::UnsupportedPlatform {
                platform: format!("navigator.mediaDevices unavailable: {}", js_error_message(&e)),
            }
        })?;

        let request = MediaStreamConstraints::new();
        request.set_video(&JsValue::from_bool(constraints.video));
        request.set_audio(&JsValue::from_bool(constraints.audio));

        let promise = devices
            .get_user_media_with_constraints(&request)
            .map_err(classify_capture_error)?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(classify_capture_error)?;
        let stream: MediaStream = stream
            .dyn_into()
            .map_err(|_| CaptureError::AcquisitionFailed {
                reason: "getUserMedia did not resolve to a MediaStream".to_string(),
            })?;

        Ok(WebStream { stream })
    }

    fn create_recorder(
        &self,
        stream: &WebStream,
        options: &RecorderOptions,
    ) -> CaptureResult<WebRecorder> {
        WebRecorder::new(stream, options)
    }

    fn document(&self) -> &WebDocument {
        &self.document
    }

    fn create_object_url(&self, artifact: &RecordingArtifact) -> CaptureResult<ObjectUrl> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(artifact.data().as_ref()));

        let properties = BlobPropertyBag::new();
        properties.set_type(artifact.mime_type());

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &properties)
            .map_err(render_error)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(render_error)?;

        Ok(ObjectUrl::new(url, |url| {
            if let Err(e) = Url::revoke_object_url(url) {
                warn!(url, error = %js_error_message(&e), "Failed to revoke object URL");
            }
        }))
    }
}

/// Browser `MediaStream`
#[derive(Debug)]
pub struct WebStream {
    stream: MediaStream,
}

impl WebStream {
    /// Underlying JS stream
    pub fn media_stream(&self) -> &MediaStream {
        &self.stream
    }
}

impl CaptureStream for WebStream {
    fn id(&self) -> String {
        self.stream.id()
    }

    fn is_active(&self) -> bool {
        self.stream.active()
    }
}

impl Release for WebStream {
    fn kind(&self) -> ResourceKind {
        ResourceKind::CaptureStream
    }

    fn release(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        debug!(stream = %self.stream.id(), "Stopped capture tracks");
    }
}

enum RawEvent {
    Data(Blob),
    Error(String),
    Stop,
}

/// Browser `MediaRecorder`
pub struct WebRecorder {
    recorder: web_sys::MediaRecorder,
    timeslice_ms: Option<u32>,
    events: mpsc::UnboundedReceiver<RawEvent>,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
    _on_stop: Closure<dyn FnMut(Event)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl WebRecorder {
    fn new(stream: &WebStream, options: &RecorderOptions) -> CaptureResult<Self> {
        let recorder = match options.mime_type.as_deref() {
            Some(mime) if web_sys::MediaRecorder::is_type_supported(mime) => {
                let recorder_options = MediaRecorderOptions::new();
                recorder_options.set_mime_type(mime);
                web_sys::MediaRecorder::new_with_media_stream_and_media_recorder_options(
                    stream.media_stream(),
                    &recorder_options,
                )
            }
            Some(mime) => {
                warn!(mime, "Preferred recording type unsupported, using host default");
                web_sys::MediaRecorder::new_with_media_stream(stream.media_stream())
            }
            None => web_sys::MediaRecorder::new_with_media_stream(stream.media_stream()),
        }
        .map_err(|e| CaptureError::recorder(js_error_message(&e)))?;

        let (events_tx, events_rx) = mpsc::unbounded();

        let data_tx = events_tx.clone();
        let on_data = Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
            if let Some(blob) = event.data() {
                let _ = data_tx.unbounded_send(RawEvent::Data(blob));
            }
        });

        let stop_tx = events_tx.clone();
        let on_stop = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            let _ = stop_tx.unbounded_send(RawEvent::Stop);
        });

        let on_error = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let _ = events_tx.unbounded_send(RawEvent::Error(format!(
                "MediaRecorder {} event",
                event.type_()
            )));
        });

        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        recorder.set_onstop(Some(on_stop.as_ref().unchecked_ref()));
        recorder.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            recorder,
            timeslice_ms: options.timeslice_ms,
            events: events_rx,
            _on_data: on_data,
            _on_stop: on_stop,
            _on_error: on_error,
        })
    }
}

#[async_trait(?Send)]
impl MediaRecorder for WebRecorder {
    fn start(&mut self) -> CaptureResult<()> {
        let started = match self.timeslice_ms {
            Some(timeslice) => self
                .recorder
                .start_with_time_slice(i32::try_from(timeslice).unwrap_or(i32::MAX)),
            None => self.recorder.start(),
        };

        started.map_err(|e| CaptureError::recorder(js_error_message(&e)))
    }

    fn stop(&mut self) -> CaptureResult<()> {
        self.recorder
            .stop()
            .map_err(|e| CaptureError::recorder(js_error_message(&e)))
    }

    fn state(&self) -> RecorderState {
        match self.recorder.state() {
            RecordingState::Recording => RecorderState::Recording,
            RecordingState::Paused => RecorderState::Paused,
            _ => RecorderState::Inactive,
        }
    }

    fn mime_type(&self) -> Option<String> {
        let mime_type = self.recorder.mime_type();
        (!mime_type.is_empty()).then_some(mime_type)
    }

    async fn next_event(&mut self) -> Option<RecorderEvent> {
        match self.events.next().await? {
            RawEvent::Data(blob) if blob.size() == 0.0 => Some(RecorderEvent::Data(Bytes::new())),
            RawEvent::Data(blob) => match JsFuture::from(blob.array_buffer()).await {
                Ok(buffer) => Some(RecorderEvent::Data(Bytes::from(
                    Uint8Array::new(&buffer).to_vec(),
                ))),
                Err(e) => Some(RecorderEvent::Error(js_error_message(&e))),
            },
            RawEvent::Error(message) => Some(RecorderEvent::Error(message)),
            RawEvent::Stop => Some(RecorderEvent::Stopped),
        }
    }
}

impl Release for WebRecorder {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Recorder
    }

    fn release(&mut self) {
        if self.recorder.state() != RecordingState::Inactive {
            let _ = self.recorder.stop();
        }

        self.recorder.set_ondataavailable(None);
        self.recorder.set_onstop(None);
        self.recorder.set_onerror(None);
    }
}

/// Browser document
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    fn build_video(&self, surface: &VideoSurface<'_, WebStream>) -> CaptureResult<Node> {
        let video: HtmlVideoElement = self
            .document
            .create_element("video")
            .map_err(render_error)?
            .dyn_into()
            .map_err(|_| CaptureError::render("created element is not a video element"))?;

        match surface.source {
            MediaSource::Live(stream) => video.set_src_object(Some(stream.media_stream())),
            MediaSource::Url(url) => video.set_src(url),
        }

        let options = &surface.options;
        video.set_autoplay(options.autoplay);
        video.set_muted(options.muted);
        video.set_controls(options.controls);

        let style = video.style();
        style
            .set_property("width", &options.width)
            .map_err(render_error)?;
        style
            .set_property("height", &options.height)
            .map_err(render_error)?;
        if let Some(fit) = options.object_fit {
            style
                .set_property("object-fit", fit.css_value())
                .map_err(render_error)?;
        }

        Ok(video.into())
    }

    fn build_link(&self, link: &DownloadLink) -> CaptureResult<Node> {
        let anchor: HtmlAnchorElement = self
            .document
            .create_element("a")
            .map_err(render_error)?
            .dyn_into()
            .map_err(|_| CaptureError::render("created element is not an anchor"))?;

        anchor.set_href(&link.href);
        anchor.set_download(&link.file_name);
        anchor.set_text_content(Some(&link.label));

        Ok(anchor.into())
    }
}

impl Document for WebDocument {
    type Stream = WebStream;

    fn has_container(&self, container_id: &str) -> bool {
        self.document.get_element_by_id(container_id).is_some()
    }

    fn replace_content(
        &self,
        container_id: &str,
        nodes: &[SurfaceNode<'_, WebStream>],
    ) -> CaptureResult<()> {
        let container = self.document.get_element_by_id(container_id).ok_or_else(|| {
            CaptureError::ContainerNotFound {
                container_id: container_id.to_string(),
            }
        })?;

        // Build everything first so a failure leaves the old content in place.
        let children = nodes
            .iter()
            .map(|node| match node {
                SurfaceNode::Video(surface) => self.build_video(surface),
                SurfaceNode::Download(link) => self.build_link(link),
            })
            .collect::<CaptureResult<Vec<Node>>>()?;

        container.set_inner_html("");
        for child in &children {
            container.append_child(child).map_err(render_error)?;
        }

        Ok(())
    }
}
