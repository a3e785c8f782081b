use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    constants::SLIDES_TABLE,
    entities::admin_entity::AdminEntity,
};

/// A hero slide, as stored in the `slider_content` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SliderItem {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct SlideDraft {
    pub title: Option<String>,
    #[validate(
        required(message = "Image is required."),
        length(min = 1, message = "Image is required.")
    )]
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlidePatch {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SlideImage {
    #[serde(rename = "image_url")]
    Main,
}

impl AdminEntity for SliderItem {
    type Draft = SlideDraft;
    type Patch = SlidePatch;
    type ImageField = SlideImage;

    const TABLE: &'static str = SLIDES_TABLE;
    const LABEL: &'static str = "slide";
    const UPLOAD_PREFIX: &'static str = "slider_";
    const SORT_COLUMN: &'static str = "order";
    const SORT_ASCENDING: bool = true;

    fn id(&self) -> i64 {
        self.id
    }

    /// New slides go to the end of the current list.
    fn blank_draft(existing: &[Self]) -> SlideDraft {
        SlideDraft {
            order: Some(existing.len() as i32 + 1),
            ..SlideDraft::default()
        }
    }

    fn to_draft(&self) -> SlideDraft {
        SlideDraft {
            title: self.title.clone(),
            image_url: Some(self.image_url.clone()),
            link_url: self.link_url.clone(),
            order: Some(self.order),
        }
    }

    fn apply_patch(draft: &mut SlideDraft, patch: SlidePatch) {
        if let Some(title) = patch.title {
            draft.title = Some(title);
        }
        if let Some(image_url) = patch.image_url {
            draft.image_url = Some(image_url);
        }
        if let Some(link_url) = patch.link_url {
            draft.link_url = Some(link_url);
        }
        if let Some(order) = patch.order {
            draft.order = Some(order);
        }
    }

    fn set_image(draft: &mut SlideDraft, field: SlideImage, url: String) {
        match field {
            SlideImage::Main => draft.image_url = Some(url),
        }
    }

    fn payload(draft: &SlideDraft) -> Value {
        json!({
            "title": draft.title.clone().unwrap_or_default(),
            "image_url": draft.image_url.clone().unwrap_or_default(),
            "link_url": draft.link_url.clone().unwrap_or_default(),
            "order": draft.order.unwrap_or(0),
        })
    }
}
