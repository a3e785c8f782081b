use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    constants::IMAGES_BUCKET,
    entities::{admin_entity::AdminEntity, upload::FileUpload},
    errors::{AppError, RemoteError},
    repositories::gateway::{decode_rows, RemoteGateway},
    utils::storage_path::admin_upload_path,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormState<D> {
    Listing,
    /// `editing_id` is `None` while creating a new record.
    Editing { editing_id: Option<i64>, draft: D },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed { Confirmation::Confirmed } else { Confirmation::Declined }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot<E: AdminEntity> {
    pub items: Vec<E>,
    pub form: FormState<E::Draft>,
    pub uploading: bool,
}

/// Counts one transfer as in flight for as long as it is alive.
struct UploadTicket(Arc<AtomicUsize>);

impl UploadTicket {
    fn issue(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        UploadTicket(Arc::clone(counter))
    }
}

impl Drop for UploadTicket {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An image upload that has claimed its object name and is ready to be
/// sent. It owns a gateway handle so the transfer can run without holding
/// the controller, and remembers which draft it was started for.
pub struct PendingUpload<E: AdminEntity, G> {
    field: E::ImageField,
    path: String,
    file: FileUpload,
    gateway: G,
    draft_generation: u64,
    _ticket: UploadTicket,
}

pub struct FinishedUpload<E: AdminEntity> {
    field: E::ImageField,
    result: Result<String, RemoteError>,
    draft_generation: u64,
    _ticket: UploadTicket,
}

impl<E: AdminEntity, G: RemoteGateway> PendingUpload<E, G> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Uploads to the images bucket and resolves the public URL of the stored object.
    pub async fn store(self) -> FinishedUpload<E> {
        let result = match self.gateway
            .upload_file(IMAGES_BUCKET, &self.path, self.file.bytes, &self.file.content_type)
            .await
        {
            Ok(stored) => Ok(self.gateway.public_url(IMAGES_BUCKET, &stored)),
            Err(e) => Err(e),
        };

        FinishedUpload {
            field: self.field,
            result,
            draft_generation: self.draft_generation,
            _ticket: self._ticket,
        }
    }
}

/// List/edit screen of one admin table.
///
/// Owns the fetched rows and, while editing, a draft of the record under
/// edit. It is the only writer of its own state; the remote service stays
/// the source of truth and is re-read after every successful submit.
pub struct ListFormController<E: AdminEntity, G: RemoteGateway + Clone> {
    gateway: G,
    items: Vec<E>,
    form: FormState<E::Draft>,
    /// Bumped whenever a draft is opened or closed.
    draft_generation: u64,
    uploads_in_flight: Arc<AtomicUsize>,
}

impl<E, G> ListFormController<E, G>
where
    E: AdminEntity,
    G: RemoteGateway + Clone,
{
    pub fn new(gateway: G) -> Self {
        ListFormController {
            gateway,
            items: Vec::new(),
            form: FormState::Listing,
            draft_generation: 0,
            uploads_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn form(&self) -> &FormState<E::Draft> {
        &self.form
    }

    pub fn draft(&self) -> Option<&E::Draft> {
        match &self.form {
            FormState::Editing { draft, .. } => Some(draft),
            FormState::Listing => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.form, FormState::Editing { .. })
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads_in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn snapshot(&self) -> ControllerSnapshot<E> {
        ControllerSnapshot {
            items: self.items.clone(),
            form: self.form.clone(),
            uploading: self.is_uploading(),
        }
    }

    /// Re-reads the table. A failed read leaves an empty list behind.
    pub async fn load(&mut self) -> &[E] {
        let rows = self.gateway.fetch_rows(E::TABLE, &E::list_query()).await;
        self.items = match rows.and_then(decode_rows::<E>) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Failed to load {} rows: {}", E::LABEL, e);
                Vec::new()
            }
        };
        &self.items
    }

    pub fn start_create(&mut self) -> E::Draft {
        let draft = E::blank_draft(&self.items);
        self.open(None, draft.clone());
        draft
    }

    pub fn start_edit(&mut self, record: &E) -> E::Draft {
        let draft = record.to_draft();
        self.open(Some(record.id()), draft.clone());
        draft
    }

    pub fn start_edit_by_id(&mut self, id: i64) -> Result<E::Draft, AppError> {
        let record = self.items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} {}", E::LABEL, id)))?;
        Ok(self.start_edit(&record))
    }

    pub fn update_draft(&mut self, patch: E::Patch) -> Result<E::Draft, AppError> {
        match &mut self.form {
            FormState::Editing { draft, .. } => {
                E::apply_patch(draft, patch);
                Ok(draft.clone())
            }
            FormState::Listing => Err(not_editing()),
        }
    }

    /// Claims an object name for `file` and hands back the transfer to run.
    pub fn begin_upload(&mut self, field: E::ImageField, file: FileUpload) -> Result<PendingUpload<E, G>, AppError> {
        if !self.is_editing() {
            return Err(not_editing());
        }

        Ok(PendingUpload {
            field,
            path: admin_upload_path(E::UPLOAD_PREFIX, &file.file_name),
            file,
            gateway: self.gateway.clone(),
            draft_generation: self.draft_generation,
            _ticket: UploadTicket::issue(&self.uploads_in_flight),
        })
    }

    /// Applies a finished transfer to the draft it was started for. On
    /// failure, or when that draft has since been closed, the form is left
    /// as it is.
    pub fn finish_upload(&mut self, upload: FinishedUpload<E>) -> Result<String, AppError> {
        let FinishedUpload { field, result, draft_generation, _ticket: ticket } = upload;
        drop(ticket);

        let url = result.map_err(|e| {
            tracing::error!("Error uploading {} image: {}", E::LABEL, e);
            AppError::Remote(e)
        })?;

        match &mut self.form {
            FormState::Editing { draft, .. } if draft_generation == self.draft_generation => {
                E::set_image(draft, field, url.clone());
                Ok(url)
            }
            _ => {
                tracing::warn!("{} image {} finished after its draft was closed, discarding", E::LABEL, url);
                Err(AppError::Conflict("The draft this image was uploaded for is no longer open".to_string()))
            }
        }
    }

    pub async fn upload_image(&mut self, field: E::ImageField, file: FileUpload) -> Result<String, AppError> {
        let pending = self.begin_upload(field, file)?;
        let finished = pending.store().await;
        self.finish_upload(finished)
    }

    /// Validates the draft and writes it: update when it came from an
    /// existing record, insert otherwise. Any failure keeps the draft.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, AppError> {
        let FormState::Editing { editing_id, draft } = &self.form else {
            return Err(not_editing());
        };

        draft.validate()?;
        let payload = E::payload(draft);

        let (result, outcome) = match editing_id {
            Some(id) => (self.gateway.update_row(E::TABLE, *id, &payload).await, SubmitOutcome::Updated),
            None => (self.gateway.insert_row(E::TABLE, &payload).await, SubmitOutcome::Created),
        };

        if let Err(e) = result {
            tracing::error!("Error saving {}: {}", E::LABEL, e);
            return Err(AppError::Remote(e));
        }

        tracing::info!("Saved {} ({:?})", E::LABEL, outcome);
        self.close();
        self.load().await;
        Ok(outcome)
    }

    /// Deletes a row once confirmed and drops it from the local list without re-reading.
    pub async fn delete(&mut self, id: i64, confirmation: Confirmation) -> Result<DeleteOutcome, AppError> {
        if confirmation == Confirmation::Declined {
            return Ok(DeleteOutcome::Declined);
        }

        self.gateway.delete_row(E::TABLE, id).await.map_err(|e| {
            tracing::error!("Error deleting {} {}: {}", E::LABEL, id, e);
            AppError::Remote(e)
        })?;

        self.items.retain(|item| item.id() != id);
        Ok(DeleteOutcome::Deleted)
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    fn open(&mut self, editing_id: Option<i64>, draft: E::Draft) {
        self.draft_generation = self.draft_generation.wrapping_add(1);
        self.form = FormState::Editing { editing_id, draft };
    }

    fn close(&mut self) {
        self.draft_generation = self.draft_generation.wrapping_add(1);
        self.form = FormState::Listing;
    }
}

fn not_editing() -> AppError {
    AppError::Conflict("No record is being edited".to_string())
}
