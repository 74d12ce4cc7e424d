//! Comment storage trait and abstractions
//!
//! A store owns the commentable, comment and reaction tables. Each method is
//! one atomic unit: implementations hold their write lock for the whole
//! call, which is what keeps posting limits and the one-reaction-per-actor
//! rule intact under concurrent requests.

mod memory;
mod tables;

pub use memory::MemoryStore;
pub use tables::{CascadeOutcome, Tables};

use crate::comment::{Comment, CommentChange, CommenterKey, NewComment};
use crate::error::Result;
use crate::reaction::{Reaction, ReactionState, ReactionToggle};
use crate::types::{CommentId, MorphRef};

/// Trait for comment storage implementations
pub trait CommentStore: Send + Sync {
    /// Make a host entity commentable
    fn register_commentable(&self, target: &MorphRef) -> Result<()>;

    /// Check whether a commentable is known
    fn has_commentable(&self, target: &MorphRef) -> Result<bool>;

    /// Load a comment by ID
    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>>;

    /// Top-level comments on a target, oldest first
    fn comments_on(&self, target: &MorphRef) -> Result<Vec<Comment>>;

    /// Replies to a comment, oldest first
    fn replies_to(&self, parent: CommentId) -> Result<Vec<Comment>>;

    /// Count top-level comments by one author on a target
    fn count_for_commenter(&self, target: &MorphRef, commenter: &CommenterKey) -> Result<usize>;

    /// Count replies by one author under a comment
    fn count_replies_for_commenter(
        &self,
        parent: CommentId,
        commenter: &CommenterKey,
    ) -> Result<usize>;

    /// Insert a comment unless its author already reached `limit`
    fn insert_comment(&self, comment: NewComment, limit: Option<usize>) -> Result<Comment>;

    /// Apply an edit
    fn update_comment(&self, id: CommentId, change: CommentChange) -> Result<Comment>;

    /// Delete a comment together with its replies and all their reactions
    fn delete_comment(&self, id: CommentId) -> Result<CascadeOutcome>;

    /// Toggle a reaction as one conditional write
    fn toggle_reaction(&self, toggle: ReactionToggle) -> Result<ReactionState>;

    /// Reactions on a comment
    fn reactions_on(&self, comment_id: CommentId) -> Result<Vec<Reaction>>;
}
