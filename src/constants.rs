use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

// ───── Remote tables & buckets ───────────────────────────────────────
pub const OUTPUTS_TABLE: &str = "outputs";
pub const SLIDES_TABLE: &str = "slider_content";
pub const IMAGES_BUCKET: &str = "images";
pub const ARCHIVE_BUCKET: &str = "archive_files";

// ───── Routes ────────────────────────────────────────────────────────
pub const LOGIN_ROUTE: &str = "/admin/login";
pub const ADMIN_HOME_ROUTE: &str = "/admin/outputs";
pub const OUTPUT_ROUTE: &str = "/output";

// ───── Image widths ──────────────────────────────────────────────────
pub const GRID_IMAGE_WIDTH: u32 = 600;
pub const DETAIL_IMAGE_WIDTH: u32 = 1600;
pub const SLIDE_IMAGE_WIDTH: u32 = 1200;

/// Cohort roster listed in the navigation dropdown.
pub const MEMBERS: [&str; 13] = [
    "김기웅", "김소연", "김진영", "김태양", "노윤하", "문지은", "박건희",
    "이가경", "이정원", "장현주", "정여진", "조수진", "황혜명",
];

/// (label, path) pairs of the top navigation bar.
pub const NAV_ITEMS: [(&str, &str); 6] = [
    ("home", "/"),
    ("history", "/history"),
    ("member", "/member"),
    ("output", "/output"),
    ("activity", "/activity"),
    ("board", "/board"),
];
