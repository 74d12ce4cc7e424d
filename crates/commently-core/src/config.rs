//! Configuration management for commently

use crate::display::DateFormat;
use crate::error::{CommentlyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Morph kind used for authenticated commenters
    pub user_model: String,
    /// Hide unapproved comments from public listings
    pub approval_required: bool,
    /// Max comments one commenter may post per commentable (None = unlimited)
    pub limit: Option<usize>,
    /// Whether list filters are offered to the view
    pub show_filters: bool,
    /// How timestamps are rendered
    pub date_format: DateFormat,
    /// Guest (unauthenticated) posting
    pub guest_mode: GuestModeConfig,
    /// Reply settings
    pub reply: ReplyConfig,
    /// Top-level comment pagination
    pub pagination: PaginationConfig,
    /// Comment text constraints
    pub text: TextConfig,
    /// Available reactions, in display order
    pub reactions: Vec<ReactionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_model: "users".to_string(),
            approval_required: false,
            limit: None,
            show_filters: true,
            date_format: DateFormat::Diff,
            guest_mode: GuestModeConfig::default(),
            reply: ReplyConfig::default(),
            pagination: PaginationConfig::default(),
            text: TextConfig::default(),
            reactions: default_reactions(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CommentlyError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("Failed to load {}", path.display())))
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.user_model.trim().is_empty() {
            return Err(CommentlyError::Config("user_model cannot be empty".to_string()));
        }
        if self.pagination.per_page == 0 {
            return Err(CommentlyError::Config(
                "pagination.per_page must be greater than zero".to_string(),
            ));
        }
        if self.reply.pagination.per_page == 0 {
            return Err(CommentlyError::Config(
                "reply.pagination.per_page must be greater than zero".to_string(),
            ));
        }
        if self.limit == Some(0) || self.reply.limit == Some(0) {
            return Err(CommentlyError::Config(
                "limits must be greater than zero; leave unset for unlimited".to_string(),
            ));
        }
        if self.text.max_length == 0 {
            return Err(CommentlyError::Config(
                "text.max_length must be greater than zero".to_string(),
            ));
        }
        if self.reactions.is_empty() {
            return Err(CommentlyError::Config(
                "at least one reaction must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for reaction in &self.reactions {
            let name = reaction.name.trim();
            if name.is_empty() {
                return Err(CommentlyError::Config("reaction name cannot be empty".to_string()));
            }
            if !seen.insert(name) {
                return Err(CommentlyError::Config(format!(
                    "duplicate reaction '{}'",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Look up a configured reaction by name
    pub fn reaction(&self, name: &str) -> Option<&ReactionConfig> {
        self.reactions.iter().find(|r| r.name == name)
    }

    /// Approval flag that applies to a comment or a reply
    pub fn approval_required_for(&self, is_reply: bool) -> bool {
        if is_reply {
            self.reply.approval_required
        } else {
            self.approval_required
        }
    }

    /// Whether guests must give an email for a comment or a reply
    pub fn guest_email_required_for(&self, is_reply: bool) -> bool {
        if is_reply {
            self.reply.email_enabled
        } else {
            self.guest_mode.email_enabled
        }
    }
}

/// Guest-mode settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestModeConfig {
    /// Allow posting without authentication
    pub enabled: bool,
    /// Require guests to give an email
    pub email_enabled: bool,
}

impl Default for GuestModeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            email_enabled: true,
        }
    }
}

/// Reply settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Allow replies at all
    pub enabled: bool,
    /// Require guests to give an email when replying
    pub email_enabled: bool,
    /// Max replies one commenter may post under a comment (None = unlimited)
    pub limit: Option<usize>,
    /// Hide unapproved replies
    pub approval_required: bool,
    /// Reply pagination
    pub pagination: PaginationConfig,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            email_enabled: true,
            limit: None,
            approval_required: false,
            pagination: PaginationConfig {
                enabled: true,
                per_page: 10,
            },
        }
    }
}

/// Pagination settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub enabled: bool,
    pub per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_page: 15,
        }
    }
}

/// Comment text constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Maximum text length in characters, after trimming
    pub max_length: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { max_length: 10_000 }
    }
}

/// One configured reaction type with its display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionConfig {
    pub name: String,
    #[serde(default)]
    pub position: ReactionPosition,
    #[serde(default = "default_fill")]
    pub fill: String,
}

impl ReactionConfig {
    pub fn new(name: impl Into<String>, position: ReactionPosition, fill: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            fill: fill.into(),
        }
    }
}

/// Which side of the reaction bar a reaction is shown on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionPosition {
    #[default]
    Left,
    Right,
}

fn default_fill() -> String {
    "gray".to_string()
}

fn default_reactions() -> Vec<ReactionConfig> {
    vec![
        ReactionConfig::new("like", ReactionPosition::Left, "gray"),
        ReactionConfig::new("dislike", ReactionPosition::Left, "gray"),
        ReactionConfig::new("happy", ReactionPosition::Right, "orange"),
        ReactionConfig::new("love", ReactionPosition::Right, "red"),
        ReactionConfig::new("sad", ReactionPosition::Right, "orange"),
    ]
}
