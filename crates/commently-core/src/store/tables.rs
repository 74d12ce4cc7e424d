//! Table state shared by the store implementations
//!
//! Every mutating operation checks all of its preconditions before touching
//! any row, so an `Err` always leaves the tables unchanged.

use crate::comment::{Comment, CommentChange, CommenterKey, NewComment};
use crate::error::{CommentlyError, Result};
use crate::reaction::{Reaction, ReactionState, ReactionToggle};
use crate::types::{CommentId, MorphRef, ReactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Commentables, comments and reactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    commentables: BTreeSet<MorphRef>,
    comments: BTreeMap<CommentId, Comment>,
    reactions: BTreeMap<ReactionId, Reaction>,
    last_comment_id: u64,
    last_reaction_id: u64,
}

/// Rows removed by a cascading delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    /// The deleted comment followed by its replies
    pub comment_ids: Vec<CommentId>,
    pub reactions_removed: usize,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commentable; returns false if it was already known
    pub fn register_commentable(&mut self, target: MorphRef) -> bool {
        self.commentables.insert(target)
    }

    pub fn has_commentable(&self, target: &MorphRef) -> bool {
        self.commentables.contains(target)
    }

    pub fn commentables(&self) -> impl Iterator<Item = &MorphRef> {
        self.commentables.iter()
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id)
    }

    /// Top-level comments on a target, in creation order
    pub fn comments_on(&self, target: &MorphRef) -> Vec<Comment> {
        self.comments
            .values()
            .filter(|c| c.reply_id.is_none() && &c.commentable == target)
            .cloned()
            .collect()
    }

    /// Replies to a comment, in creation order
    pub fn replies_to(&self, parent: CommentId) -> Vec<Comment> {
        self.comments
            .values()
            .filter(|c| c.reply_id == Some(parent))
            .cloned()
            .collect()
    }

    /// Top-level comments on `target` written by `commenter`
    pub fn count_for_commenter(&self, target: &MorphRef, commenter: &CommenterKey) -> usize {
        self.comments
            .values()
            .filter(|c| c.reply_id.is_none() && &c.commentable == target)
            .filter(|c| c.commenter_key().matches(commenter))
            .count()
    }

    /// Replies under `parent` written by `commenter`
    pub fn count_replies_for_commenter(&self, parent: CommentId, commenter: &CommenterKey) -> usize {
        self.comments
            .values()
            .filter(|c| c.reply_id == Some(parent))
            .filter(|c| c.commenter_key().matches(commenter))
            .count()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Insert a comment, refusing it if its author already reached `limit`
    ///
    /// The limit applies per target for top-level comments and per parent
    /// for replies.
    pub fn insert_comment(
        &mut self,
        new: NewComment,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        if !self.has_commentable(&new.commentable) {
            return Err(CommentlyError::CommentableNotFound(new.commentable));
        }

        let author = new.commenter_key();
        let existing = match new.reply_id {
            Some(parent_id) => {
                let parent = self
                    .comments
                    .get(&parent_id)
                    .ok_or(CommentlyError::CommentNotFound(parent_id))?;
                if parent.commentable != new.commentable {
                    return Err(CommentlyError::Validation(format!(
                        "Reply target {} does not match parent target {}",
                        new.commentable, parent.commentable
                    )));
                }
                if parent.is_reply() {
                    return Err(CommentlyError::Validation(
                        "Replies can only be made to top-level comments".to_string(),
                    ));
                }
                self.count_replies_for_commenter(parent_id, &author)
            }
            None => self.count_for_commenter(&new.commentable, &author),
        };

        if let Some(max) = limit {
            if existing >= max {
                let scope = if new.reply_id.is_some() { "reply" } else { "comment" };
                return Err(CommentlyError::LimitExceeded(format!(
                    "{} limit of {} reached",
                    scope, max
                )));
            }
        }

        self.last_comment_id += 1;
        let id = CommentId(self.last_comment_id);
        let comment = new.into_comment(id, now);
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    /// Apply an edit to an existing comment
    pub fn update_comment(
        &mut self,
        id: CommentId,
        change: CommentChange,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        let comment = self
            .comments
            .get_mut(&id)
            .ok_or(CommentlyError::CommentNotFound(id))?;

        if let Some(text) = change.text {
            comment.set_text(text, now);
        }
        if let Some(approved) = change.approved {
            comment.set_approved(approved, now);
        }
        Ok(comment.clone())
    }

    /// Delete a comment, every reply below it and their reactions
    pub fn delete_comment(&mut self, id: CommentId) -> Result<CascadeOutcome> {
        if !self.comments.contains_key(&id) {
            return Err(CommentlyError::CommentNotFound(id));
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            doomed.extend(
                self.comments
                    .values()
                    .filter(|c| c.reply_id == Some(parent))
                    .map(|c| c.id),
            );
            cursor += 1;
        }

        let doomed_set: BTreeSet<CommentId> = doomed.iter().copied().collect();
        let before = self.reactions.len();
        self.reactions
            .retain(|_, r| !doomed_set.contains(&r.comment_id));
        let reactions_removed = before - self.reactions.len();

        for comment_id in &doomed {
            self.comments.remove(comment_id);
        }

        Ok(CascadeOutcome {
            comment_ids: doomed,
            reactions_removed,
        })
    }

    /// Create, remove or replace the actor's reaction in one step
    pub fn toggle_reaction(
        &mut self,
        toggle: ReactionToggle,
        now: DateTime<Utc>,
    ) -> Result<ReactionState> {
        if !self.comments.contains_key(&toggle.comment_id) {
            return Err(CommentlyError::CommentNotFound(toggle.comment_id));
        }

        let key = toggle.reactor_key();
        let previous: Vec<(ReactionId, String)> = self
            .reactions
            .values()
            .filter(|r| r.comment_id == toggle.comment_id && r.reactor_key() == key)
            .map(|r| (r.id, r.reaction_type.clone()))
            .collect();

        let same_type = previous
            .iter()
            .any(|(_, t)| *t == toggle.reaction_type);

        for (reaction_id, _) in &previous {
            self.reactions.remove(reaction_id);
        }

        if same_type {
            return Ok(ReactionState::None);
        }

        self.last_reaction_id += 1;
        let id = ReactionId(self.last_reaction_id);
        self.reactions.insert(
            id,
            Reaction {
                id,
                user: toggle.user,
                comment_id: toggle.comment_id,
                reaction_type: toggle.reaction_type.clone(),
                ip_address: toggle.ip_address,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(ReactionState::Reacted(toggle.reaction_type))
    }

    /// All reactions on a comment
    pub fn reactions_on(&self, comment_id: CommentId) -> Vec<Reaction> {
        self.reactions
            .values()
            .filter(|r| r.comment_id == comment_id)
            .cloned()
            .collect()
    }
}
