//! Display surfaces
//!
//! Surfaces are described declaratively and handed to a [`Document`], which
//! replaces a container's content with them. Two layouts are used: a live
//! preview of the camera stream, and a playback element for a finished
//! recording next to a download link.

use camrec_core::CaptureResult;

/// Label of the download link shown under a recording
pub const DOWNLOAD_LABEL: &str = "Download Recording";

/// How video content fills its box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFit {
    /// Crop to fill the box (may cut off content)
    Cover,
    /// Maintain aspect ratio with letterboxing
    Contain,
    /// Stretch to fill the box (may distort)
    Fill,
    /// No scaling
    None,
}

impl ObjectFit {
    /// CSS `object-fit` value
    pub fn css_value(&self) -> &'static str {
        match self {
            ObjectFit::Cover => "cover",
            ObjectFit::Contain => "contain",
            ObjectFit::Fill => "fill",
            ObjectFit::None => "none",
        }
    }
}

/// Presentation options of a video surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOptions {
    /// Start playing as soon as media is available
    pub autoplay: bool,
    /// Silence output
    pub muted: bool,
    /// Show playback controls
    pub controls: bool,
    /// CSS width
    pub width: String,
    /// CSS height
    pub height: String,
    /// Content scaling, left to the host when `None`
    pub object_fit: Option<ObjectFit>,
}

impl VideoOptions {
    /// Live camera preview: muted (no feedback), autoplaying, filling its container
    pub fn live_preview() -> Self {
        Self {
            autoplay: true,
            muted: true,
            controls: false,
            width: "100%".to_string(),
            height: "100%".to_string(),
            object_fit: Some(ObjectFit::Cover),
        }
    }

    /// Playback of a finished recording with on-screen controls
    pub fn playback() -> Self {
        Self {
            autoplay: false,
            muted: false,
            controls: true,
            width: "100%".to_string(),
            height: "auto".to_string(),
            object_fit: None,
        }
    }
}

/// Where a video surface takes its media from
#[derive(Debug)]
pub enum MediaSource<'a, S> {
    /// A live capture stream
    Live(&'a S),
    /// An object URL pointing at a recording
    Url(&'a str),
}

/// A video element to be placed in a container
#[derive(Debug)]
pub struct VideoSurface<'a, S> {
    /// Media source
    pub source: MediaSource<'a, S>,
    /// Presentation options
    pub options: VideoOptions,
}

impl<'a, S> VideoSurface<'a, S> {
    /// Preview surface for a live stream
    pub fn live_preview(stream: &'a S) -> Self {
        Self {
            source: MediaSource::Live(stream),
            options: VideoOptions::live_preview(),
        }
    }

    /// Playback surface for a recording reachable at `url`
    pub fn playback(url: &'a str) -> Self {
        Self {
            source: MediaSource::Url(url),
            options: VideoOptions::playback(),
        }
    }
}

/// An anchor that downloads a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    /// Link target
    pub href: String,
    /// Suggested filename
    pub file_name: String,
    /// Visible text
    pub label: String,
}

impl DownloadLink {
    /// Download link with the default label
    pub fn new(href: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            file_name: file_name.into(),
            label: DOWNLOAD_LABEL.to_string(),
        }
    }
}

/// One child placed into a container
#[derive(Debug)]
pub enum SurfaceNode<'a, S> {
    /// A video element
    Video(VideoSurface<'a, S>),
    /// A download link
    Download(DownloadLink),
}

/// Page-level display capability
pub trait Document {
    /// Stream type a live surface can show
    type Stream;

    /// Whether a container with this id exists
    fn has_container(&self, container_id: &str) -> bool;

    /// Replace all children of `container_id` with `nodes`, in order.
    ///
    /// Fails with `ContainerNotFound` when the id does not resolve; the page
    /// is left untouched in that case.
    fn replace_content(
        &self,
        container_id: &str,
        nodes: &[SurfaceNode<'_, Self::Stream>],
    ) -> CaptureResult<()>;
}
