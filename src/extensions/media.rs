//! Built-in media extension for base64-encoded attachments

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Result, SdkError};

use super::MediaExtension;

/// MIME types handled by the standard media extension
const SUPPORTED_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/tiff",
    "application/pdf",
    "video/mp4",
];

/// Media extension accepting base64 payloads for common MIME types
///
/// Payloads may be bare base64 or a `data:` URI; processing strips the URI
/// wrapper and stores bare base64.
pub struct StandardMediaExtension;

impl StandardMediaExtension {
    /// Create the extension
    pub fn new() -> Self {
        StandardMediaExtension
    }

    /// Strip a `data:<mime>;base64,` prefix when present
    fn strip_data_uri(data: &str) -> &str {
        if data.starts_with("data:") {
            data.split_once(";base64,").map(|(_, rest)| rest).unwrap_or(data)
        } else {
            data
        }
    }
}

impl Default for StandardMediaExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaExtension for StandardMediaExtension {
    fn supported_media_types(&self) -> Vec<String> {
        SUPPORTED_TYPES.iter().map(|t| t.to_string()).collect()
    }

    fn validate_media(&self, media_type: &str, data: &str) -> bool {
        if !self.supports_media_type(media_type) {
            return false;
        }
        let payload = Self::strip_data_uri(data);
        !payload.is_empty() && STANDARD.decode(payload).is_ok()
    }

    fn process_media(&self, media_type: &str, data: &str) -> Result<String> {
        if !self.supports_media_type(media_type) {
            return Err(SdkError::MediaValidation(format!(
                "unsupported media type: {}",
                media_type
            )));
        }
        let payload = Self::strip_data_uri(data);
        STANDARD
            .decode(payload)
            .map_err(|e| SdkError::MediaValidation(format!("invalid base64 payload: {}", e)))?;
        Ok(payload.to_string())
    }
}
