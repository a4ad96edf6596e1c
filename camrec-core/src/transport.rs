//! Upload transport
//!
//! A finished recording leaves the client as one multipart `POST`. The
//! endpoint is expected to answer with a JSON body of any shape, which is
//! handed back untouched together with the HTTP status, even when that
//! status is not a success. Only a reply that is not JSON is an error.
//! There is no retry and no resumable upload: a failed attempt is reported
//! and that is the end of it.

use crate::error::{CaptureError, CaptureResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Multipart field that carries the recording
pub const DEFAULT_FIELD_NAME: &str = "file";
/// Suggested filename for uploads and downloads
pub const DEFAULT_FILE_NAME: &str = "recording.webm";
/// Container type used when the recorder does not report one
pub const DEFAULT_MIME_TYPE: &str = "video/webm";

/// Upload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Multipart field name
    pub field_name: String,
    /// Filename attached to the multipart part
    pub file_name: String,
    /// Request timeout in milliseconds (ignored on wasm32)
    pub timeout_ms: Option<u64>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            timeout_ms: None,
        }
    }
}

impl UploadConfig {
    /// Validate configuration
    pub fn validate(&self) -> CaptureResult<()> {
        if self.field_name.trim().is_empty() {
            return Err(CaptureError::config("upload field name must not be empty"));
        }

        if self.file_name.trim().is_empty() {
            return Err(CaptureError::config("upload file name must not be empty"));
        }

        if self.timeout_ms == Some(0) {
            return Err(CaptureError::config("upload timeout must be > 0"));
        }

        Ok(())
    }
}

/// One recording on its way to an endpoint
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Endpoint URL
    pub url: Url,
    /// Multipart field name
    pub field_name: String,
    /// Filename attached to the part
    pub file_name: String,
    /// Content type of the part
    pub mime_type: String,
    /// Recording bytes
    pub payload: Bytes,
}

impl UploadRequest {
    /// Build a request using the field and file names from `config`
    pub fn new(url: Url, payload: Bytes, mime_type: &str, config: &UploadConfig) -> Self {
        Self {
            url,
            field_name: config.field_name.clone(),
            file_name: config.file_name.clone(),
            mime_type: mime_type.to_string(),
            payload,
        }
    }
}

/// Parsed answer from the upload endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
    /// HTTP status code
    pub status: u16,
    /// JSON body as returned by the endpoint
    pub body: serde_json::Value,
}

impl UploadResponse {
    /// Whether the endpoint answered with a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a top-level field of the JSON body
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.body.get(key)
    }
}

/// Sends a recording to a remote endpoint
#[async_trait(?Send)]
pub trait UploadTransport {
    /// Issue exactly one request for `request`
    async fn upload(&self, request: UploadRequest) -> CaptureResult<UploadResponse>;
}

/// Default transport: multipart `POST` through reqwest
#[derive(Clone, Debug)]
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    /// Create an uploader without a request timeout
    pub fn new() -> CaptureResult<Self> {
        Self::with_config(&UploadConfig::default())
    }

    /// Create an uploader honouring `config.timeout_ms`
    pub fn with_config(config: &UploadConfig) -> CaptureResult<Self> {
        config.validate()?;

        #[allow(unused_mut)]
        let mut builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(timeout_ms) = config.timeout_ms {
                builder = builder.timeout(std::time::Duration::from_millis(timeout_ms));
            }
        }

        let client = builder.build().map_err(|e| CaptureError::UploadFailed {
            reason: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }
}

#[async_trait(?Send)]
impl UploadTransport for HttpUploader {
    async fn upload(&self, request: UploadRequest) -> CaptureResult<UploadResponse> {
        let part = Part::bytes(request.payload.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)
            .map_err(|e| CaptureError::config(format!("invalid MIME type: {}", e)))?;
        let form = Form::new().part(request.field_name.clone(), part);

        debug!(
            url = %request.url,
            bytes = request.payload.len(),
            field = %request.field_name,
            "Posting recording"
        );

        let response = self
            .client
            .post(request.url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        // Any JSON reply is handed back, whatever the status.
        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(body) => Ok(UploadResponse {
                status: status.as_u16(),
                body,
            }),
            Err(_) if !status.is_success() => Err(CaptureError::UploadStatus {
                status: status.as_u16(),
                url: request.url.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_config_default() {
        let config = UploadConfig::default();

        assert_eq!(config.field_name, "file");
        assert_eq!(config.file_name, "recording.webm");
        assert!(config.timeout_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upload_config_rejects_blank_names() {
        let config = UploadConfig {
            field_name: " ".to_string(),
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());

        let config = UploadConfig {
            file_name: String::new(),
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());

        let config = UploadConfig {
            timeout_ms: Some(0),
            ..UploadConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_config_from_partial_json() {
        let config: UploadConfig = serde_json::from_str(r#"{"timeout_ms": 5000}"#).unwrap();

        assert_eq!(config.field_name, DEFAULT_FIELD_NAME);
        assert_eq!(config.timeout_ms, Some(5000));
    }

    #[test]
    fn test_upload_request_uses_config_names() {
        let config = UploadConfig {
            field_name: "video".to_string(),
            file_name: "clip.webm".to_string(),
            timeout_ms: None,
        };
        let url = Url::parse("http://localhost/upload").unwrap();
        let request = UploadRequest::new(url, Bytes::from_static(b"abc"), "video/webm", &config);

        assert_eq!(request.field_name, "video");
        assert_eq!(request.file_name, "clip.webm");
        assert_eq!(request.payload.len(), 3);
    }

    #[test]
    fn test_upload_response_success_range() {
        let response = |status| UploadResponse {
            status,
            body: serde_json::json!({"id": "123"}),
        };

        assert!(response(200).is_success());
        assert!(response(201).is_success());
        assert!(!response(400).is_success());
        assert!(!response(500).is_success());
    }
}
