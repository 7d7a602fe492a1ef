//! CLI command implementations

pub mod add;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod fields;
pub mod import;
pub mod init;
pub mod list;
pub mod view;
