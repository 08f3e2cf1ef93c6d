pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod files;
pub mod send;
pub mod status;
pub mod summary;
pub mod transform;
