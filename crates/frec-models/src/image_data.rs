//! Data-URI image encoding.
//!
//! Images travel through the API and the document store as
//! `data:<mime>;base64,<payload>` strings, matching what browser clients
//! render directly into `<img>` tags.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageDataError {
    #[error("not a data URI")]
    NotADataUri,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// An encoded image as a `data:` URI string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ImageData(String);

impl ImageData {
    /// Encode raw bytes under the given MIME type.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
    }

    /// Wrap an existing data-URI string.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The MIME type between `data:` and the first `;`, if well formed.
    pub fn mime(&self) -> Option<&str> {
        self.0.strip_prefix("data:")?.split(';').next()
    }

    /// Decode the base64 payload after the first comma.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ImageDataError> {
        let payload = self
            .0
            .split_once(',')
            .map(|(_, p)| p)
            .ok_or(ImageDataError::NotADataUri)?;
        Ok(BASE64.decode(payload)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the data-URI string itself, not the decoded image.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_mime_and_payload() {
        let data = ImageData::from_bytes("image/png", b"pixels");
        assert_eq!(data.mime(), Some("image/png"));
        assert_eq!(data.to_bytes().unwrap(), b"pixels");
        assert!(data.as_str().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn rejects_non_uri_strings() {
        let data = ImageData::from_uri("just a string");
        assert!(matches!(
            data.to_bytes(),
            Err(ImageDataError::NotADataUri)
        ));
        assert_eq!(data.mime(), None);
    }
}
