use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    constants::OUTPUTS_TABLE,
    entities::admin_entity::AdminEntity,
};

/// A work in the archive, as stored in the `outputs` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Output {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub process_image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "Workshop Name")]
    pub workshop_name: Option<String>,
    #[serde(default, rename = "Project Name")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl Output {
    pub fn year(&self) -> Option<i32> {
        self.created_at.map(|at| at.year())
    }
}

/// Editable copy of a work held by the admin form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct OutputDraft {
    #[validate(
        required(message = "Title is required."),
        length(min = 1, message = "Title is required.")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(
        required(message = "Image is required."),
        length(min = 1, message = "Image is required.")
    )]
    pub image_url: Option<String>,
    pub process_image_url: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub workshop_name: Option<String>,
    pub project_name: Option<String>,
    pub date: Option<String>,
    pub link_url: Option<String>,
    pub is_featured: Option<bool>,
}

/// Field edits applied to an [`OutputDraft`]; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub process_image_url: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub workshop_name: Option<String>,
    pub project_name: Option<String>,
    pub date: Option<String>,
    pub link_url: Option<String>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum OutputImage {
    #[serde(rename = "image_url")]
    Main,
    #[serde(rename = "process_image_url")]
    Process,
}

impl AdminEntity for Output {
    type Draft = OutputDraft;
    type Patch = OutputPatch;
    type ImageField = OutputImage;

    const TABLE: &'static str = OUTPUTS_TABLE;
    const LABEL: &'static str = "output";
    const UPLOAD_PREFIX: &'static str = "";
    const SORT_COLUMN: &'static str = "created_at";
    const SORT_ASCENDING: bool = false;

    fn id(&self) -> i64 {
        self.id
    }

    fn blank_draft(_existing: &[Self]) -> OutputDraft {
        OutputDraft::default()
    }

    fn to_draft(&self) -> OutputDraft {
        OutputDraft {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            image_url: Some(self.image_url.clone()),
            process_image_url: self.process_image_url.clone(),
            category: self.category.clone(),
            author: self.author.clone(),
            workshop_name: self.workshop_name.clone(),
            project_name: self.project_name.clone(),
            date: self.date.clone(),
            link_url: self.link_url.clone(),
            is_featured: Some(self.is_featured),
        }
    }

    fn apply_patch(draft: &mut OutputDraft, patch: OutputPatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field { draft.$field = Some(value); })*
            };
        }
        merge!(
            title, description, image_url, process_image_url, category, author,
            workshop_name, project_name, date, link_url, is_featured
        );
    }

    fn set_image(draft: &mut OutputDraft, field: OutputImage, url: String) {
        match field {
            OutputImage::Main => draft.image_url = Some(url),
            OutputImage::Process => draft.process_image_url = Some(url),
        }
    }

    fn payload(draft: &OutputDraft) -> Value {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        json!({
            "title": text(&draft.title),
            "description": text(&draft.description),
            "image_url": text(&draft.image_url),
            "is_featured": draft.is_featured.unwrap_or(false),
            "link_url": text(&draft.link_url),
            "author": text(&draft.author),
            "Workshop Name": text(&draft.workshop_name),
            "Project Name": text(&draft.project_name),
            "date": text(&draft.date),
            "category": text(&draft.category),
            "process_image_url": text(&draft.process_image_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Output {
        serde_json::from_value(json!({
            "id": 7,
            "created_at": "2024-11-02T09:30:00Z",
            "title": "Poster",
            "description": null,
            "image_url": "https://x.supabase.co/storage/v1/object/public/images/a.png",
            "author": "김소연",
            "Workshop Name": "A-Hand",
            "Project Name": "Identity",
            "is_featured": true
        }))
        .expect("row decodes")
    }

    #[test]
    fn decodes_space_containing_column_names() {
        let output = stored();
        assert_eq!(output.workshop_name.as_deref(), Some("A-Hand"));
        assert_eq!(output.project_name.as_deref(), Some("Identity"));
        assert_eq!(output.year(), Some(2024));
    }

    #[test]
    fn payload_fills_absent_optionals_with_empty_strings() {
        let draft = OutputDraft {
            title: Some("Poster".into()),
            image_url: Some("https://cdn/a.png".into()),
            ..OutputDraft::default()
        };

        let payload = Output::payload(&draft);
        assert_eq!(payload["description"], "");
        assert_eq!(payload["is_featured"], false);
        assert_eq!(payload["Workshop Name"], "");
        assert_eq!(payload["process_image_url"], "");
    }

    #[test]
    fn draft_without_title_fails_validation() {
        let draft = OutputDraft {
            image_url: Some("https://cdn/a.png".into()),
            ..OutputDraft::default()
        };
        let errors = draft.validate().expect_err("title missing");
        assert!(errors.field_errors().contains_key("title"));

        let draft = OutputDraft {
            title: Some(String::new()),
            image_url: Some("https://cdn/a.png".into()),
            ..OutputDraft::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn patch_touches_only_supplied_fields() {
        let mut draft = stored().to_draft();
        let patch: OutputPatch = serde_json::from_value(json!({"title": "Renamed"})).expect("patch");

        Output::apply_patch(&mut draft, patch);

        assert_eq!(draft.title.as_deref(), Some("Renamed"));
        assert_eq!(draft.author.as_deref(), Some("김소연"));
        assert_eq!(draft.is_featured, Some(true));
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let patch = serde_json::from_value::<OutputPatch>(json!({"titel": "typo"}));
        assert!(patch.is_err());
    }
}
