use chrono::Utc;
use serde_json::json;

use crate::{
    constants::{ARCHIVE_BUCKET, OUTPUTS_TABLE},
    entities::upload::{SubmissionReceipt, WorkSubmission},
    errors::AppError,
    repositories::gateway::RemoteGateway,
    utils::storage_path::archive_upload_path,
};

/// Public "submit a work" form: one upload, one insert, no retries.
pub struct SubmissionHandler<G>
where
    G: RemoteGateway,
{
    pub gateway: G,
}

impl<G> SubmissionHandler<G>
where
    G: RemoteGateway,
{
    pub fn new(gateway: G) -> Self {
        SubmissionHandler { gateway }
    }

    pub async fn submit_work(&self, submission: WorkSubmission) -> Result<SubmissionReceipt, AppError> {
        let title = submission.title.trim();
        if title.is_empty() {
            return Err(AppError::required("title", "Title is required."));
        }
        let file = match submission.file {
            Some(file) if !file.is_empty() => file,
            _ => return Err(AppError::required("file", "File is required.")),
        };

        let path = archive_upload_path(&file.file_name, Utc::now());
        let stored = self.gateway
            .upload_file(ARCHIVE_BUCKET, &path, file.bytes, &file.content_type)
            .await
            .map_err(|e| {
                tracing::error!("Archive upload failed: {}", e);
                AppError::Remote(e)
            })?;

        let image_url = self.gateway.public_url(ARCHIVE_BUCKET, &stored);
        let record = json!({
            "title": title,
            "description": submission.description.unwrap_or_default(),
            "image_url": image_url,
        });

        self.gateway.insert_row(OUTPUTS_TABLE, &record).await.map_err(|e| {
            tracing::error!("Archive record insert failed: {}", e);
            AppError::Remote(e)
        })?;

        tracing::info!(path = %stored, "Work submitted");
        Ok(SubmissionReceipt {
            message: "Work submitted successfully".to_string(),
            path: stored,
            image_url,
        })
    }
}
