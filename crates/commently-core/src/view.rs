//! State behind a rendered comment list
//!
//! Mirrors what a reactive list component keeps between requests: how many
//! comments are loaded, the filter in use, and how to react to events
//! coming from sibling components.

use crate::comment::Comment;
use crate::error::{CommentlyError, Result};
use crate::events::CommentEvent;
use crate::query::{ListFilter, PageRequest};
use crate::service::CommentService;
use crate::types::{Actor, CommentId, MorphRef};

/// What applying an event did to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListUpdate {
    Unchanged,
    /// Text replaced in place
    Patched(CommentId),
    /// Dropped locally; the comment went back to moderation
    Removed(CommentId),
    /// The list must be reloaded
    NeedsRefresh,
}

/// "Load more" list of top-level comments on one target
#[derive(Debug, Clone)]
pub struct CommentListState {
    target: MorphRef,
    filter: ListFilter,
    step: usize,
    limit: usize,
    comments: Vec<Comment>,
    total: usize,
}

impl CommentListState {
    /// Empty state sized by the service's pagination settings
    pub fn new(target: MorphRef, service: &CommentService) -> Self {
        let step = service.config().pagination.per_page;
        Self {
            target,
            filter: ListFilter::default(),
            step,
            limit: step,
            comments: Vec::new(),
            total: 0,
        }
    }

    pub fn target(&self) -> &MorphRef {
        &self.target
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Total visible comments, loaded or not
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn filter(&self) -> ListFilter {
        self.filter
    }

    pub fn has_more(&self) -> bool {
        self.comments.len() < self.total
    }

    /// Reload the first `limit` comments
    pub fn refresh(&mut self, service: &CommentService, actor: &Actor) -> Result<()> {
        let page = service.queries().list_comments(
            actor,
            &self.target,
            PageRequest::new(1, self.limit),
            self.filter,
        )?;
        self.comments = page.items;
        self.total = page.total;
        Ok(())
    }

    /// Grow the window by one page and reload
    pub fn load_more(&mut self, service: &CommentService, actor: &Actor) -> Result<()> {
        self.limit += self.step;
        self.refresh(service, actor)
    }

    /// Switch filter, shrinking back to one page
    ///
    /// Only the default filter is accepted when filters are hidden.
    pub fn set_filter(
        &mut self,
        filter: ListFilter,
        service: &CommentService,
        actor: &Actor,
    ) -> Result<()> {
        if !service.config().show_filters && filter != ListFilter::default() {
            return Err(CommentlyError::FeatureDisabled(
                "comment filters are disabled".to_string(),
            ));
        }
        self.filter = filter;
        self.limit = self.step;
        self.refresh(service, actor)
    }

    /// Apply an event raised elsewhere on the page
    pub fn apply(&mut self, event: &CommentEvent) -> ListUpdate {
        match event {
            CommentEvent::Created { .. } => ListUpdate::NeedsRefresh,
            CommentEvent::Updated {
                comment_id,
                text,
                approved,
            } => {
                let Some(pos) = self.comments.iter().position(|c| c.id == *comment_id) else {
                    return ListUpdate::Unchanged;
                };
                if *approved {
                    self.comments[pos].text = text.clone();
                    ListUpdate::Patched(*comment_id)
                } else {
                    self.comments.remove(pos);
                    self.total = self.total.saturating_sub(1);
                    ListUpdate::Removed(*comment_id)
                }
            }
            CommentEvent::UpdateDiscarded { .. } => ListUpdate::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::RecordingSink;
    use crate::policy::ModeratorPolicy;
    use crate::store::MemoryStore;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    fn setup(per_page: usize) -> (CommentService, Actor, MorphRef) {
        let mut config = Config::default();
        config.pagination.per_page = per_page;
        let service = CommentService::new(config, Arc::new(MemoryStore::new())).unwrap();
        let post = MorphRef::new("posts", 1);
        service.register_commentable(&post).unwrap();
        let actor = Actor::user(MorphRef::new("users", 1), IpAddr::V4(Ipv4Addr::LOCALHOST));
        (service, actor, post)
    }

    #[test]
    fn test_load_more() {
        let (service, actor, post) = setup(2);
        for i in 0..5 {
            service
                .create_comment(&actor, &post, &format!("c{}", i), None)
                .unwrap();
        }

        let mut list = CommentListState::new(post, &service);
        list.refresh(&service, &actor).unwrap();
        assert_eq!(list.comments().len(), 2);
        assert_eq!(list.total(), 5);
        assert!(list.has_more());

        list.load_more(&service, &actor).unwrap();
        list.load_more(&service, &actor).unwrap();
        assert_eq!(list.comments().len(), 5);
        assert!(!list.has_more());

        list.set_filter(ListFilter::oldest(), &service, &actor).unwrap();
        assert_eq!(list.comments().len(), 2);
        assert_eq!(list.comments()[0].text, "c0");
    }

    #[test]
    fn test_filters_hidden() {
        let mut config = Config::default();
        config.show_filters = false;
        let service = CommentService::new(config, Arc::new(MemoryStore::new())).unwrap();
        let post = MorphRef::new("posts", 1);
        service.register_commentable(&post).unwrap();
        let actor = Actor::user(MorphRef::new("users", 1), IpAddr::V4(Ipv4Addr::LOCALHOST));
        service.create_comment(&actor, &post, "only", None).unwrap();

        let mut list = CommentListState::new(post, &service);
        assert!(matches!(
            list.set_filter(ListFilter::oldest(), &service, &actor),
            Err(CommentlyError::FeatureDisabled(_))
        ));
        assert!(matches!(
            list.set_filter(ListFilter::mine(), &service, &actor),
            Err(CommentlyError::FeatureDisabled(_))
        ));
        assert_eq!(list.filter(), ListFilter::default());

        list.set_filter(ListFilter::default(), &service, &actor).unwrap();
        assert_eq!(list.comments().len(), 1);
    }

    #[test]
    fn test_apply_events() {
        let (service, actor, post) = setup(10);
        let comment = service.create_comment(&actor, &post, "before", None).unwrap();

        let mut list = CommentListState::new(post, &service);
        list.refresh(&service, &actor).unwrap();

        let patched = CommentEvent::Updated {
            comment_id: comment.id,
            text: "after".to_string(),
            approved: true,
        };
        assert_eq!(list.apply(&patched), ListUpdate::Patched(comment.id));
        assert_eq!(list.comments()[0].text, "after");

        let pending = CommentEvent::Updated {
            comment_id: comment.id,
            text: "again".to_string(),
            approved: false,
        };
        assert_eq!(list.apply(&pending), ListUpdate::Removed(comment.id));
        assert!(list.comments().is_empty());
        assert_eq!(list.apply(&pending), ListUpdate::Unchanged);

        let created = CommentEvent::Created {
            comment_id: CommentId(50),
        };
        assert_eq!(list.apply(&created), ListUpdate::NeedsRefresh);
    }

    #[test]
    fn test_moderator_edit_stays_listed() {
        let mut config = Config::default();
        config.approval_required = true;
        let events = Arc::new(RecordingSink::new());
        let service = CommentService::builder(config, Arc::new(MemoryStore::new()))
            .policy(ModeratorPolicy::new([MorphRef::new("users", 9)]))
            .events(events.clone())
            .build()
            .unwrap();
        let post = MorphRef::new("posts", 1);
        service.register_commentable(&post).unwrap();
        let moderator = Actor::user(MorphRef::new("users", 9), IpAddr::V4(Ipv4Addr::LOCALHOST));
        let author = Actor::user(MorphRef::new("users", 1), IpAddr::V4(Ipv4Addr::LOCALHOST));

        let own = service.create_comment(&moderator, &post, "posted", None).unwrap();
        let other = service.create_comment(&author, &post, "mine", None).unwrap();
        service.approve(&moderator, other.id).unwrap();

        let mut list = CommentListState::new(post, &service);
        list.refresh(&service, &moderator).unwrap();
        assert_eq!(list.comments().len(), 2);
        events.drain();

        service.update_comment(&moderator, own.id, "tidied").unwrap();
        service.update_comment(&author, other.id, "rewritten").unwrap();

        let updates: Vec<ListUpdate> = events.drain().iter().map(|e| list.apply(e)).collect();
        assert_eq!(
            updates,
            vec![ListUpdate::Patched(own.id), ListUpdate::Removed(other.id)]
        );
        assert_eq!(list.comments().len(), 1);
        assert_eq!(list.comments()[0].text, "tidied");
    }
}
