//! Comment validation

use crate::error::{CommentlyError, Result};
use crate::types::GuestInfo;
use ::validator::ValidateEmail;

/// Maximum comment length (default)
pub const MAX_COMMENT_LENGTH: usize = 10000;

/// Maximum guest name length
pub const MAX_GUEST_NAME_LENGTH: usize = 255;

/// Validator for comment input
pub struct CommentValidator {
    max_length: usize,
}

impl CommentValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            max_length: MAX_COMMENT_LENGTH,
        }
    }

    /// Create a new validator with custom max length
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Validate comment text, returning it trimmed
    pub fn validate_text(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(CommentlyError::Validation(
                "Comment text cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > self.max_length {
            return Err(CommentlyError::Validation(format!(
                "Comment text exceeds maximum length of {} characters",
                self.max_length
            )));
        }

        Ok(trimmed.to_string())
    }

    /// Validate guest name/email; the email is mandatory when `email_required`
    pub fn validate_guest(&self, guest: Option<&GuestInfo>, email_required: bool) -> Result<GuestInfo> {
        let guest = guest.cloned().unwrap_or_default();

        let name = guest
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CommentlyError::Validation("Guest name is required".to_string()))?;

        if name.chars().count() > MAX_GUEST_NAME_LENGTH {
            return Err(CommentlyError::Validation(format!(
                "Guest name exceeds maximum length of {} characters",
                MAX_GUEST_NAME_LENGTH
            )));
        }

        let email = guest.email.as_deref().map(str::trim).filter(|e| !e.is_empty());

        match email {
            None if email_required => {
                return Err(CommentlyError::Validation(
                    "Guest email is required".to_string(),
                ))
            }
            Some(email) if !email.validate_email() => {
                return Err(CommentlyError::Validation(format!(
                    "Invalid email address: {}",
                    email
                )))
            }
            _ => {}
        }

        Ok(GuestInfo {
            name: Some(name.to_string()),
            email: email.map(str::to_string),
        })
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new()
    }
}
