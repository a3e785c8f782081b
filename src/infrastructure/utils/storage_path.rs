use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
}

fn with_extension(stem: String, ext: Option<String>) -> String {
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Object name for admin image uploads: `<prefix><random>.<ext>`.
pub fn admin_upload_path(prefix: &str, file_name: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    with_extension(format!("{prefix}{token}"), extension_of(file_name))
}

/// Object name for public submissions: `<unix-millis>-<slug>.<ext>`.
pub fn archive_upload_path(file_name: &str, now: DateTime<Utc>) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(slug::slugify)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "file".to_string());

    with_extension(format!("{}-{stem}", now.timestamp_millis()), extension_of(file_name))
}
