//! JavaScript surface (wasm32)
//!
//! `CameraRecorder` wraps a [`CaptureSession`] over the browser host for use
//! from page scripts:
//!
//! ```js
//! const recorder = new CameraRecorder();
//! await recorder.startCamera("camera-preview");
//! recorder.startRecording();
//! await recorder.stopRecording();
//! const reply = await recorder.uploadRecording("/api/upload");
//! ```

use crate::config::SessionConfig;
use crate::logging::{init_logging, DEFAULT_FILTER};
use crate::session::CaptureSession;
use camrec_core::CaptureError;
use camrec_media::WebHost;
use tracing::info;
use url::Url;
use wasm_bindgen::prelude::*;

fn js_error(error: CaptureError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

/// Camera recorder bound to the current page
#[wasm_bindgen]
pub struct CameraRecorder {
    session: CaptureSession<WebHost>,
}

#[wasm_bindgen]
impl CameraRecorder {
    /// Create a recorder; `config` is an optional JSON session configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<CameraRecorder, JsValue> {
        init_logging(DEFAULT_FILTER);

        let config = match config {
            Some(json) => SessionConfig::from_json(&json).map_err(js_error)?,
            None => SessionConfig::default(),
        };

        let host = WebHost::new().map_err(js_error)?;
        let session = CaptureSession::builder(host)
            .config(config)
            .build()
            .map_err(js_error)?;

        info!("CameraRecorder created");
        Ok(Self { session })
    }

    /// Request the camera and preview it in the element with `container_id`
    #[wasm_bindgen(js_name = startCamera)]
    pub async fn start_camera(&mut self, container_id: String) -> Result<(), JsValue> {
        self.session
            .start_camera(&container_id)
            .await
            .map_err(js_error)
    }

    /// Start recording the camera stream
    #[wasm_bindgen(js_name = startRecording)]
    pub fn start_recording(&mut self) -> Result<(), JsValue> {
        self.session.start_recording().map_err(js_error)
    }

    /// Stop recording; resolves to the recording size in bytes
    #[wasm_bindgen(js_name = stopRecording)]
    pub async fn stop_recording(&mut self) -> Result<f64, JsValue> {
        let artifact = self.session.stop_recording().await.map_err(js_error)?;
        Ok(artifact.size() as f64)
    }

    /// Upload the recording; resolves to the parsed JSON reply.
    ///
    /// Relative URLs are resolved against the page location.
    #[wasm_bindgen(js_name = uploadRecording)]
    pub async fn upload_recording(&mut self, api_url: String) -> Result<JsValue, JsValue> {
        let api_url = self.resolve(&api_url).map_err(js_error)?;
        let response = self
            .session
            .upload_recording(&api_url)
            .await
            .map_err(js_error)?;

        js_sys::JSON::parse(&response.body.to_string())
    }

    /// Release the camera, the recorder and the playback URL
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Lifecycle state name, e.g. `"recording"`
    pub fn state(&self) -> String {
        self.session.state().to_string()
    }

    fn resolve(&self, api_url: &str) -> Result<String, CaptureError> {
        match self.session.host().page_url() {
            Some(page) => Ok(Url::parse(&page)?.join(api_url)?.to_string()),
            None => Ok(api_url.to_string()),
        }
    }
}
