use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::repositories::gateway::RowQuery;

/// A record type managed through the admin list/form screens.
///
/// The draft is the all-optional editing copy; it is validated before
/// [`AdminEntity::payload`] turns it into the row written to the remote table.
pub trait AdminEntity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Clone + Debug + Default + Validate + Serialize + Send + Sync + 'static;
    type Patch: DeserializeOwned + Send + 'static;
    type ImageField: Copy + Debug + DeserializeOwned + Send + Sync + 'static;

    const TABLE: &'static str;
    const LABEL: &'static str;
    /// Prepended to the random object name of uploaded images.
    const UPLOAD_PREFIX: &'static str;
    const SORT_COLUMN: &'static str;
    const SORT_ASCENDING: bool;

    fn id(&self) -> i64;
    fn blank_draft(existing: &[Self]) -> Self::Draft;
    fn to_draft(&self) -> Self::Draft;
    fn apply_patch(draft: &mut Self::Draft, patch: Self::Patch);
    fn set_image(draft: &mut Self::Draft, field: Self::ImageField, url: String);
    fn payload(draft: &Self::Draft) -> Value;

    fn list_query() -> RowQuery {
        RowQuery::new().order(Self::SORT_COLUMN, Self::SORT_ASCENDING)
    }
}
