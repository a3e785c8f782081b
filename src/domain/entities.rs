pub mod admin_entity;
pub mod output;
pub mod slider;
pub mod session;
pub mod upload;
pub mod samples;
