use actix_multipart::form::tempfile::TempFile;
use tokio::fs;

use crate::{entities::upload::FileUpload, errors::UploadError};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Reads a multipart temp file into memory after size checks.
///
/// The content type is sniffed from the bytes and only falls back to the
/// client-declared type when the format is unknown.
pub async fn read_upload(temp: TempFile, max_bytes: usize) -> Result<FileUpload, UploadError> {
    if temp.size > max_bytes {
        return Err(UploadError::TooLarge(max_bytes));
    }
    if temp.size == 0 {
        return Err(UploadError::EmptyFile);
    }

    let bytes = fs::read(temp.file.path())
        .await
        .map_err(|e| UploadError::Malformed(e.to_string()))?;
    if bytes.is_empty() {
        return Err(UploadError::EmptyFile);
    }

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type().to_string())
        .or_else(|| temp.content_type.as_ref().map(|mime| mime.to_string()))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let file_name = temp.file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "upload".to_string());

    Ok(FileUpload::new(file_name, content_type, bytes))
}

/// Admin uploads must really be images, whatever the file is called.
pub fn ensure_image(upload: &FileUpload) -> Result<(), UploadError> {
    if infer::is_image(&upload.bytes) {
        return Ok(());
    }

    let detected = infer::get(&upload.bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    Err(UploadError::NotAnImage(detected))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn png_bytes_pass_the_image_check() {
        let upload = FileUpload::new("a.png", "image/png", PNG_HEADER.to_vec());
        assert!(ensure_image(&upload).is_ok());
    }

    #[test]
    fn renamed_text_is_rejected() {
        let upload = FileUpload::new("fake.png", "image/png", b"just text".to_vec());
        assert!(matches!(ensure_image(&upload), Err(UploadError::NotAnImage(_))));
    }
}
