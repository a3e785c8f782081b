pub mod markdown;
pub mod storage_path;
pub mod uploads;
