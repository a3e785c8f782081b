use std::fmt;

use serde::Serialize;

/// A file received from a form, held in memory until it is stored remotely.
#[derive(Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        FileUpload {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Public archive submission: a titled file with an optional description.
#[derive(Debug, Clone)]
pub struct WorkSubmission {
    pub title: String,
    pub description: Option<String>,
    pub file: Option<FileUpload>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub message: String,
    pub path: String,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub path: String,
    pub public_url: String,
}
