pub mod home;
pub mod gallery;
pub mod auth;
pub mod admin;
pub mod system;
pub mod json_error;
