use std::path::Path;

use image::ImageFormat;

use crate::client::DetectError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An image file read into memory, ready to be sent as the `file` form part.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = infer_content_type(&file_name, &bytes);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DetectError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DetectError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// MIME type from the file extension, then from the magic bytes.
pub fn infer_content_type(file_name: &str, bytes: &[u8]) -> String {
    ImageFormat::from_path(file_name)
        .or_else(|_| image::guess_format(bytes))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_CONTENT_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn content_type_from_extension() {
        assert_eq!(infer_content_type("parts.jpg", &[]), "image/jpeg");
        assert_eq!(infer_content_type("parts.WEBP", &[]), "image/webp");
    }

    #[test]
    fn content_type_from_magic_bytes() {
        assert_eq!(infer_content_type("clipboard", PNG_MAGIC), "image/png");
    }

    #[test]
    fn content_type_falls_back() {
        assert_eq!(
            infer_content_type("notes.txt", b"hello"),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = ImageUpload::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::ReadFile { .. }));
    }
}
