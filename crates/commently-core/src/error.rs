//! Error types for commently

use crate::types::{CommentId, MorphRef};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for commently
#[derive(Debug, Error)]
pub enum CommentlyError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Empty or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Comment or reply cap reached
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Replies or guest mode switched off
    #[error("Feature disabled: {0}")]
    FeatureDisabled(String),

    /// Policy check failed
    #[error("Unauthorized: {action} is not allowed")]
    Unauthorized { action: Permission },

    /// Comment not found
    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    /// Commentable target not found
    #[error("Commentable not found: {0}")]
    CommentableNotFound(MorphRef),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config or data file missing
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unsupported schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(u32),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CommentlyError>,
    },
}

impl CommentlyError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CommentlyError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error is one of the not-found variants
    pub fn is_not_found(&self) -> bool {
        match self {
            CommentlyError::CommentNotFound(_) | CommentlyError::CommentableNotFound(_) => true,
            CommentlyError::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<toml::de::Error> for CommentlyError {
    fn from(err: toml::de::Error) -> Self {
        CommentlyError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for CommentlyError {
    fn from(err: toml::ser::Error) -> Self {
        CommentlyError::Toml(err.to_string())
    }
}

/// Actions guarded by the policy layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CreateComment,
    UpdateComment,
    DeleteComment,
    CreateReply,
    UpdateReply,
    DeleteReply,
    Moderate,
}

impl Permission {
    /// Binding name as used in host permission tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateComment => "create-comment",
            Permission::UpdateComment => "update-comment",
            Permission::DeleteComment => "delete-comment",
            Permission::CreateReply => "create-reply",
            Permission::UpdateReply => "update-reply",
            Permission::DeleteReply => "delete-reply",
            Permission::Moderate => "moderate",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for commently
pub type Result<T> = std::result::Result<T, CommentlyError>;
