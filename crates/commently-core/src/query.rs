//! Paginated, approval-aware listings

use crate::comment::{Comment, CommenterKey};
use crate::config::{Config, PaginationConfig};
use crate::error::{CommentlyError, Result};
use crate::policy::Policies;
use crate::store::CommentStore;
use crate::types::{Actor, CommentId, MorphRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creation-time ordering of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Latest,
    /// Oldest first
    Oldest,
}

/// Optional narrowing of a comment listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListFilter {
    pub order: SortOrder,
    /// Only the requesting actor's own comments
    pub mine_only: bool,
}

impl ListFilter {
    pub fn oldest() -> Self {
        Self {
            order: SortOrder::Oldest,
            mine_only: false,
        }
    }

    pub fn mine() -> Self {
        Self {
            order: SortOrder::Latest,
            mine_only: true,
        }
    }
}

/// Which page to return; `per_page` falls back to configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    pub per_page: Option<usize>,
}

impl PageRequest {
    pub fn first() -> Self {
        Self {
            page: 1,
            per_page: None,
        }
    }

    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page,
            per_page: Some(per_page),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    /// Whether later pages hold more items
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.per_page) < self.total
    }

    pub fn last_page(&self) -> usize {
        if self.total == 0 || self.per_page == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn slice(all: Vec<T>, request: PageRequest, settings: PaginationConfig) -> Result<Self> {
        if request.page == 0 {
            return Err(CommentlyError::Validation(
                "Page numbers start at 1".to_string(),
            ));
        }

        let total = all.len();
        if !settings.enabled {
            return Ok(Page {
                items: all,
                total,
                page: 1,
                per_page: total.max(1),
            });
        }

        let per_page = request.per_page.unwrap_or(settings.per_page);
        if per_page == 0 {
            return Err(CommentlyError::Validation(
                "Page size must be greater than zero".to_string(),
            ));
        }

        let items = all
            .into_iter()
            .skip((request.page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Ok(Page {
            items,
            total,
            page: request.page,
            per_page,
        })
    }
}

/// Read side of the comment system
#[derive(Clone)]
pub struct Queries {
    config: Arc<Config>,
    store: Arc<dyn CommentStore>,
    policies: Policies,
}

impl Queries {
    pub fn new(config: Arc<Config>, store: Arc<dyn CommentStore>, policies: Policies) -> Self {
        Self {
            config,
            store,
            policies,
        }
    }

    /// Top-level comments on `target` visible to `actor`
    pub fn list_comments(
        &self,
        actor: &Actor,
        target: &MorphRef,
        request: PageRequest,
        filter: ListFilter,
    ) -> Result<Page<Comment>> {
        self.ensure_commentable(target)?;

        let mut visible: Vec<Comment> = self
            .store
            .comments_on(target)?
            .into_iter()
            .filter(|c| self.policies.can_view(actor, c))
            .filter(|c| !filter.mine_only || c.is_owned_by(actor))
            .collect();

        // store order is creation order
        if filter.order == SortOrder::Latest {
            visible.reverse();
        }

        Page::slice(visible, request, self.config.pagination)
    }

    /// Replies to `comment_id` visible to `actor`, oldest first
    pub fn list_replies(
        &self,
        actor: &Actor,
        comment_id: CommentId,
        request: PageRequest,
    ) -> Result<Page<Comment>> {
        self.ensure_comment(comment_id)?;

        let visible: Vec<Comment> = self
            .store
            .replies_to(comment_id)?
            .into_iter()
            .filter(|c| self.policies.can_view(actor, c))
            .collect();

        Page::slice(visible, request, self.config.reply.pagination)
    }

    /// Number of replies to `comment_id` visible to `actor`
    pub fn reply_count(&self, actor: &Actor, comment_id: CommentId) -> Result<usize> {
        self.ensure_comment(comment_id)?;
        Ok(self
            .store
            .replies_to(comment_id)?
            .iter()
            .filter(|c| self.policies.can_view(actor, c))
            .count())
    }

    /// Top-level comments `commenter` has posted on `target`, approved or not
    pub fn count_for_commenter(&self, target: &MorphRef, commenter: &CommenterKey) -> Result<usize> {
        self.ensure_commentable(target)?;
        self.store.count_for_commenter(target, commenter)
    }

    /// Replies `commenter` has posted under `parent`
    pub fn count_replies_for_commenter(
        &self,
        parent: CommentId,
        commenter: &CommenterKey,
    ) -> Result<usize> {
        self.ensure_comment(parent)?;
        self.store.count_replies_for_commenter(parent, commenter)
    }

    /// Load one comment, failing when it does not exist
    pub fn find(&self, id: CommentId) -> Result<Comment> {
        self.store
            .get_comment(id)?
            .ok_or(CommentlyError::CommentNotFound(id))
    }

    fn ensure_commentable(&self, target: &MorphRef) -> Result<()> {
        if self.store.has_commentable(target)? {
            Ok(())
        } else {
            Err(CommentlyError::CommentableNotFound(target.clone()))
        }
    }

    fn ensure_comment(&self, id: CommentId) -> Result<()> {
        self.find(id).map(|_| ())
    }
}
