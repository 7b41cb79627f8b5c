//! Inspection image upload validation
//!
//! An [`ImageUpload`] can only be constructed from a payload that passed
//! validation, so the analyze call never sees a rejected file.

use super::error::UploadError;

/// Largest accepted inspection image (10 MiB, inclusive)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A validated image ready for multipart submission
#[derive(Debug, Clone)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let content_type = content_type.into();
        validate(&content_type, bytes.len())?;

        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, String, Vec<u8>) {
        (self.file_name, self.content_type, self.bytes)
    }
}

/// Check content type and size without taking ownership of the payload
pub fn validate(content_type: &str, size: usize) -> Result<(), UploadError> {
    let essence = content_type.trim().to_ascii_lowercase();
    let subtype = essence.strip_prefix("image/").unwrap_or("");
    if subtype.is_empty() {
        return Err(UploadError::NotAnImage(content_type.to_string()));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

/// Best-effort content type from a file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}
