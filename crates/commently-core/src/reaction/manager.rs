//! Reaction toggling and aggregation

use super::model::{ReactionCount, ReactionState, ReactionToggle};
use crate::config::Config;
use crate::error::{CommentlyError, Result};
use crate::store::CommentStore;
use crate::types::{Actor, CommentId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maintains one reaction per actor per comment
#[derive(Clone)]
pub struct ReactionManager {
    config: Arc<Config>,
    store: Arc<dyn CommentStore>,
}

impl ReactionManager {
    pub fn new(config: Arc<Config>, store: Arc<dyn CommentStore>) -> Self {
        Self { config, store }
    }

    /// React, un-react or switch reaction type
    pub fn toggle(
        &self,
        actor: &Actor,
        comment_id: CommentId,
        reaction_type: &str,
    ) -> Result<ReactionState> {
        if self.config.reaction(reaction_type).is_none() {
            return Err(CommentlyError::Validation(format!(
                "Unknown reaction type: {}",
                reaction_type
            )));
        }
        if actor.is_guest() && !self.config.guest_mode.enabled {
            return Err(CommentlyError::FeatureDisabled(
                "guest mode is disabled; sign in to react".to_string(),
            ));
        }

        let state = self.store.toggle_reaction(ReactionToggle {
            comment_id,
            user: actor.user_ref().cloned(),
            ip_address: actor.ip_address(),
            reaction_type: reaction_type.to_string(),
        })?;

        debug!(
            "Reaction on comment {} by {:?} is now {:?}",
            comment_id,
            actor.reactor_key(),
            state
        );
        Ok(state)
    }

    /// Count per configured type, in configured order, zeros included
    pub fn counts_by_type(&self, comment_id: CommentId) -> Result<Vec<ReactionCount>> {
        self.ensure_comment(comment_id)?;
        let mut tally: HashMap<String, usize> = HashMap::new();
        for reaction in self.store.reactions_on(comment_id)? {
            *tally.entry(reaction.reaction_type).or_insert(0) += 1;
        }

        Ok(self
            .config
            .reactions
            .iter()
            .map(|r| ReactionCount::from_config(r, tally.get(&r.name).copied().unwrap_or(0)))
            .collect())
    }

    /// The actor's current reaction on a comment
    pub fn reaction_of(&self, actor: &Actor, comment_id: CommentId) -> Result<ReactionState> {
        self.ensure_comment(comment_id)?;
        let key = actor.reactor_key();
        Ok(self
            .store
            .reactions_on(comment_id)?
            .into_iter()
            .find(|r| r.reactor_key() == key)
            .map(|r| ReactionState::Reacted(r.reaction_type))
            .unwrap_or(ReactionState::None))
    }

    fn ensure_comment(&self, comment_id: CommentId) -> Result<()> {
        self.store
            .get_comment(comment_id)?
            .map(|_| ())
            .ok_or(CommentlyError::CommentNotFound(comment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{Comment, NewComment};
    use crate::store::MemoryStore;
    use crate::types::{GuestInfo, MorphRef};
    use std::net::{IpAddr, Ipv4Addr};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(172, 16, 0, last))
    }

    fn setup(config: Config) -> (ReactionManager, Arc<MemoryStore>, Comment) {
        let store = Arc::new(MemoryStore::new());
        let post = MorphRef::new("posts", 1);
        store.register_commentable(&post).unwrap();
        let comment = store
            .insert_comment(
                NewComment {
                    commentable: post,
                    commenter: None,
                    reply_id: None,
                    text: "hello".to_string(),
                    guest_name: Some("Alice".to_string()),
                    guest_email: None,
                    approved: true,
                    ip_address: ip(1),
                },
                None,
            )
            .unwrap();
        (ReactionManager::new(Arc::new(config), store.clone()), store, comment)
    }

    fn guest(last: u8) -> Actor {
        Actor::guest(GuestInfo::default(), ip(last))
    }

    #[test]
    fn test_toggle_round_trip() {
        let (manager, store, comment) = setup(Config::default());
        let actor = guest(2);

        assert_eq!(
            manager.toggle(&actor, comment.id, "like").unwrap(),
            ReactionState::Reacted("like".to_string())
        );
        assert_eq!(manager.toggle(&actor, comment.id, "like").unwrap(), ReactionState::None);
        assert!(store.reactions_on(comment.id).unwrap().is_empty());
    }

    #[test]
    fn test_switching_type_replaces() {
        let (manager, store, comment) = setup(Config::default());
        let actor = Actor::user(MorphRef::new("users", 3), ip(3));

        manager.toggle(&actor, comment.id, "like").unwrap();
        manager.toggle(&actor, comment.id, "love").unwrap();

        let reactions = store.reactions_on(comment.id).unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].reaction_type, "love");
        assert_eq!(
            manager.reaction_of(&actor, comment.id).unwrap(),
            ReactionState::Reacted("love".to_string())
        );
    }

    #[test]
    fn test_counts_by_type() {
        let (manager, _, comment) = setup(Config::default());
        manager.toggle(&guest(2), comment.id, "like").unwrap();
        manager.toggle(&guest(3), comment.id, "like").unwrap();
        manager.toggle(&guest(4), comment.id, "sad").unwrap();

        let counts = manager.counts_by_type(comment.id).unwrap();
        let summary: Vec<(&str, usize)> = counts
            .iter()
            .map(|c| (c.reaction_type.as_str(), c.count))
            .collect();
        assert_eq!(
            summary,
            vec![("like", 2), ("dislike", 0), ("happy", 0), ("love", 0), ("sad", 1)]
        );
        assert_eq!(counts[3].fill, "red");
    }

    #[test]
    fn test_rejections() {
        let (manager, _, comment) = setup(Config::default());
        assert!(matches!(
            manager.toggle(&guest(2), comment.id, "angry"),
            Err(CommentlyError::Validation(_))
        ));
        assert!(matches!(
            manager.toggle(&guest(2), CommentId(77), "like"),
            Err(CommentlyError::CommentNotFound(_))
        ));
        assert!(matches!(
            manager.counts_by_type(CommentId(77)),
            Err(CommentlyError::CommentNotFound(CommentId(77)))
        ));
        assert!(matches!(
            manager.reaction_of(&guest(2), CommentId(77)),
            Err(CommentlyError::CommentNotFound(CommentId(77)))
        ));

        let mut config = Config::default();
        config.guest_mode.enabled = false;
        let (manager, _, comment) = setup(config);
        assert!(matches!(
            manager.toggle(&guest(2), comment.id, "like"),
            Err(CommentlyError::FeatureDisabled(_))
        ));
    }

    #[test]
    fn test_concurrent_toggles_keep_one_row() {
        let (manager, store, comment) = setup(Config::default());
        let actor = guest(9);

        let handles: Vec<_> = ["like", "love", "sad", "like", "happy", "love", "sad"]
            .into_iter()
            .map(|kind| {
                let manager = manager.clone();
                let actor = actor.clone();
                std::thread::spawn(move || manager.toggle(&actor, comment.id, kind).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(store.reactions_on(comment.id).unwrap().len() <= 1);
    }
}
