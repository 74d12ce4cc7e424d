//! In-memory store for tests and embedded use

use super::{CascadeOutcome, CommentStore, Tables};
use crate::comment::{Comment, CommentChange, CommenterKey, NewComment};
use crate::error::{CommentlyError, Result};
use crate::reaction::{Reaction, ReactionState, ReactionToggle};
use crate::types::{CommentId, MorphRef};
use chrono::Utc;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Store keeping all tables behind one `RwLock`
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing tables
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of the current tables
    pub fn snapshot(&self) -> Result<Tables> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| CommentlyError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| CommentlyError::Storage("memory store lock poisoned".to_string()))
    }
}

impl CommentStore for MemoryStore {
    fn register_commentable(&self, target: &MorphRef) -> Result<()> {
        if self.write()?.register_commentable(target.clone()) {
            debug!("Registered commentable {}", target);
        }
        Ok(())
    }

    fn has_commentable(&self, target: &MorphRef) -> Result<bool> {
        Ok(self.read()?.has_commentable(target))
    }

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        Ok(self.read()?.comment(id).cloned())
    }

    fn comments_on(&self, target: &MorphRef) -> Result<Vec<Comment>> {
        Ok(self.read()?.comments_on(target))
    }

    fn replies_to(&self, parent: CommentId) -> Result<Vec<Comment>> {
        Ok(self.read()?.replies_to(parent))
    }

    fn count_for_commenter(&self, target: &MorphRef, commenter: &CommenterKey) -> Result<usize> {
        Ok(self.read()?.count_for_commenter(target, commenter))
    }

    fn count_replies_for_commenter(
        &self,
        parent: CommentId,
        commenter: &CommenterKey,
    ) -> Result<usize> {
        Ok(self.read()?.count_replies_for_commenter(parent, commenter))
    }

    fn insert_comment(&self, comment: NewComment, limit: Option<usize>) -> Result<Comment> {
        self.write()?.insert_comment(comment, limit, Utc::now())
    }

    fn update_comment(&self, id: CommentId, change: CommentChange) -> Result<Comment> {
        self.write()?.update_comment(id, change, Utc::now())
    }

    fn delete_comment(&self, id: CommentId) -> Result<CascadeOutcome> {
        self.write()?.delete_comment(id)
    }

    fn toggle_reaction(&self, toggle: ReactionToggle) -> Result<ReactionState> {
        self.write()?.toggle_reaction(toggle, Utc::now())
    }

    fn reactions_on(&self, comment_id: CommentId) -> Result<Vec<Reaction>> {
        Ok(self.read()?.reactions_on(comment_id))
    }
}
