//! commently-storage - Storage backends for commently
//!
//! Provides a JSON file store implementing `CommentStore`.

pub mod file_store;

pub use file_store::{default_data_dir, FileSystemStore, CURRENT_SCHEMA_VERSION};
