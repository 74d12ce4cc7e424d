//! Authorization for comment and reply actions
//!
//! Built-in rules (guest mode, reply switch, posting limits, ownership) are
//! always applied. Deployment-specific rules plug in through
//! [`CommentPolicy`], one method per action.

use crate::comment::{Comment, CommenterKey};
use crate::config::Config;
use crate::error::{CommentlyError, Permission, Result};
use crate::store::CommentStore;
use crate::types::{Actor, MorphRef};
use std::sync::Arc;

/// Host-supplied rules
///
/// `create_*` can veto creation that the built-in rules would allow.
/// `update_*`, `delete_*` and `moderate` grant elevated rights on comments
/// the actor does not own.
pub trait CommentPolicy: Send + Sync {
    fn create_comment(&self, _actor: &Actor, _target: &MorphRef) -> bool {
        true
    }

    fn update_comment(&self, _actor: &Actor, _comment: &Comment) -> bool {
        false
    }

    fn delete_comment(&self, _actor: &Actor, _comment: &Comment) -> bool {
        false
    }

    fn create_reply(&self, _actor: &Actor, _parent: &Comment) -> bool {
        true
    }

    fn update_reply(&self, _actor: &Actor, _reply: &Comment) -> bool {
        false
    }

    fn delete_reply(&self, _actor: &Actor, _reply: &Comment) -> bool {
        false
    }

    /// See pending comments and approve them
    fn moderate(&self, _actor: &Actor) -> bool {
        false
    }
}

/// Owners only, nobody moderates
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl CommentPolicy for DefaultPolicy {}

/// Grants every elevated right to a fixed set of users
#[derive(Debug, Clone, Default)]
pub struct ModeratorPolicy {
    moderators: Vec<MorphRef>,
}

impl ModeratorPolicy {
    pub fn new(moderators: impl IntoIterator<Item = MorphRef>) -> Self {
        Self {
            moderators: moderators.into_iter().collect(),
        }
    }

    fn is_moderator(&self, actor: &Actor) -> bool {
        actor
            .user_ref()
            .map(|user| self.moderators.contains(user))
            .unwrap_or(false)
    }
}

impl CommentPolicy for ModeratorPolicy {
    fn update_comment(&self, actor: &Actor, _comment: &Comment) -> bool {
        self.is_moderator(actor)
    }

    fn delete_comment(&self, actor: &Actor, _comment: &Comment) -> bool {
        self.is_moderator(actor)
    }

    fn update_reply(&self, actor: &Actor, _reply: &Comment) -> bool {
        self.is_moderator(actor)
    }

    fn delete_reply(&self, actor: &Actor, _reply: &Comment) -> bool {
        self.is_moderator(actor)
    }

    fn moderate(&self, actor: &Actor) -> bool {
        self.is_moderator(actor)
    }
}

/// Decision point combining configuration, stored state and host rules
#[derive(Clone)]
pub struct Policies {
    config: Arc<Config>,
    store: Arc<dyn CommentStore>,
    rules: Arc<dyn CommentPolicy>,
}

impl Policies {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn CommentStore>,
        rules: Arc<dyn CommentPolicy>,
    ) -> Self {
        Self {
            config,
            store,
            rules,
        }
    }

    pub fn can_create_comment(&self, actor: &Actor, target: &MorphRef) -> bool {
        self.check_create_comment(actor, target).is_ok()
    }

    pub fn can_create_reply(&self, actor: &Actor, parent: &Comment) -> bool {
        self.check_create_reply(actor, parent).is_ok()
    }

    pub fn can_update(&self, actor: &Actor, comment: &Comment) -> bool {
        self.check_update(actor, comment).is_ok()
    }

    pub fn can_delete(&self, actor: &Actor, comment: &Comment) -> bool {
        self.check_delete(actor, comment).is_ok()
    }

    pub fn can_moderate(&self, actor: &Actor) -> bool {
        self.rules.moderate(actor)
    }

    /// Whether `actor` may see `comment` in listings
    pub fn can_view(&self, actor: &Actor, comment: &Comment) -> bool {
        comment.approved
            || !self.config.approval_required_for(comment.is_reply())
            || comment.is_owned_by(actor)
            || self.can_moderate(actor)
    }

    /// Creation check with the reason for refusal
    pub fn check_create_comment(&self, actor: &Actor, target: &MorphRef) -> Result<()> {
        self.check_guest_allowed(actor)?;

        if !self.rules.create_comment(actor, target) {
            return Err(CommentlyError::Unauthorized {
                action: Permission::CreateComment,
            });
        }

        if let Some(limit) = self.config.limit {
            let posted = self
                .store
                .count_for_commenter(target, &CommenterKey::from_actor(actor))?;
            if posted >= limit {
                return Err(CommentlyError::LimitExceeded(format!(
                    "comment limit of {} reached for {}",
                    limit, target
                )));
            }
        }

        Ok(())
    }

    /// Reply check with the reason for refusal
    pub fn check_create_reply(&self, actor: &Actor, parent: &Comment) -> Result<()> {
        if !self.config.reply.enabled {
            return Err(CommentlyError::FeatureDisabled("replies are disabled".to_string()));
        }
        self.check_guest_allowed(actor)?;

        if parent.is_reply() {
            return Err(CommentlyError::Validation(
                "Replies can only be made to top-level comments".to_string(),
            ));
        }

        if !self.rules.create_reply(actor, parent) {
            return Err(CommentlyError::Unauthorized {
                action: Permission::CreateReply,
            });
        }

        if let Some(limit) = self.config.reply.limit {
            let posted = self
                .store
                .count_replies_for_commenter(parent.id, &CommenterKey::from_actor(actor))?;
            if posted >= limit {
                return Err(CommentlyError::LimitExceeded(format!(
                    "reply limit of {} reached for comment {}",
                    limit, parent.id
                )));
            }
        }

        Ok(())
    }

    /// Owner or elevated permission
    pub fn check_update(&self, actor: &Actor, comment: &Comment) -> Result<()> {
        let (granted, action) = if comment.is_reply() {
            (self.rules.update_reply(actor, comment), Permission::UpdateReply)
        } else {
            (self.rules.update_comment(actor, comment), Permission::UpdateComment)
        };

        if comment.is_owned_by(actor) || granted {
            Ok(())
        } else {
            Err(CommentlyError::Unauthorized { action })
        }
    }

    /// Owner or elevated permission
    pub fn check_delete(&self, actor: &Actor, comment: &Comment) -> Result<()> {
        let (granted, action) = if comment.is_reply() {
            (self.rules.delete_reply(actor, comment), Permission::DeleteReply)
        } else {
            (self.rules.delete_comment(actor, comment), Permission::DeleteComment)
        };

        if comment.is_owned_by(actor) || granted {
            Ok(())
        } else {
            Err(CommentlyError::Unauthorized { action })
        }
    }

    pub fn check_moderate(&self, actor: &Actor) -> Result<()> {
        if self.can_moderate(actor) {
            Ok(())
        } else {
            Err(CommentlyError::Unauthorized {
                action: Permission::Moderate,
            })
        }
    }

    fn check_guest_allowed(&self, actor: &Actor) -> Result<()> {
        if actor.is_guest() && !self.config.guest_mode.enabled {
            return Err(CommentlyError::FeatureDisabled(
                "guest mode is disabled; sign in to comment".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::NewComment;
    use crate::store::MemoryStore;
    use crate::types::GuestInfo;
    use std::net::{IpAddr, Ipv4Addr};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, last))
    }

    fn post() -> MorphRef {
        MorphRef::new("posts", 1)
    }

    fn user(id: u32) -> Actor {
        Actor::user(MorphRef::new("users", id), ip(1))
    }

    fn guest(last: u8) -> Actor {
        Actor::guest(GuestInfo::new("Guest"), ip(last))
    }

    fn setup(config: Config, rules: impl CommentPolicy + 'static) -> (Policies, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.register_commentable(&post()).unwrap();
        let policies = Policies::new(Arc::new(config), store.clone(), Arc::new(rules));
        (policies, store)
    }

    fn insert(store: &MemoryStore, actor: &Actor, reply_id: Option<crate::types::CommentId>) -> Comment {
        store
            .insert_comment(
                NewComment {
                    commentable: post(),
                    commenter: actor.user_ref().cloned(),
                    reply_id,
                    text: "text".to_string(),
                    guest_name: actor.is_guest().then(|| "Guest".to_string()),
                    guest_email: None,
                    approved: false,
                    ip_address: actor.ip_address(),
                },
                None,
            )
            .unwrap()
    }

    #[test]
    fn test_guest_mode_gate() {
        let mut config = Config::default();
        config.guest_mode.enabled = false;
        let (policies, _) = setup(config, DefaultPolicy);

        assert!(!policies.can_create_comment(&guest(2), &post()));
        assert!(policies.can_create_comment(&user(1), &post()));
        assert!(matches!(
            policies.check_create_comment(&guest(2), &post()),
            Err(CommentlyError::FeatureDisabled(_))
        ));
    }

    #[test]
    fn test_comment_limit() {
        let mut config = Config::default();
        config.limit = Some(1);
        let (policies, store) = setup(config, DefaultPolicy);

        assert!(policies.can_create_comment(&user(1), &post()));
        insert(&store, &user(1), None);
        assert!(!policies.can_create_comment(&user(1), &post()));
        assert!(policies.can_create_comment(&user(2), &post()));
    }

    #[test]
    fn test_reply_checks() {
        let mut config = Config::default();
        config.reply.limit = Some(1);
        let (policies, store) = setup(config, DefaultPolicy);

        let parent = insert(&store, &user(1), None);
        assert!(policies.can_create_reply(&user(2), &parent));
        let reply = insert(&store, &user(2), Some(parent.id));
        assert!(!policies.can_create_reply(&user(2), &parent));
        assert!(!policies.can_create_reply(&user(3), &reply));

        let mut config = Config::default();
        config.reply.enabled = false;
        let (policies, store) = setup(config, DefaultPolicy);
        let parent = insert(&store, &user(1), None);
        assert!(matches!(
            policies.check_create_reply(&user(1), &parent),
            Err(CommentlyError::FeatureDisabled(_))
        ));
    }

    #[test]
    fn test_ownership_rules() {
        let (policies, store) = setup(Config::default(), DefaultPolicy);
        let mine = insert(&store, &user(1), None);
        let guest_comment = insert(&store, &guest(9), None);

        assert!(policies.can_update(&user(1), &mine));
        assert!(policies.can_delete(&user(1), &mine));
        assert!(!policies.can_update(&user(2), &mine));
        assert!(!policies.can_delete(&user(2), &mine));

        assert!(policies.can_update(&guest(9), &guest_comment));
        assert!(!policies.can_update(&guest(8), &guest_comment));
    }

    #[test]
    fn test_moderator_policy() {
        let (policies, store) = setup(
            Config::default(),
            ModeratorPolicy::new([MorphRef::new("users", 99)]),
        );
        let comment = insert(&store, &user(1), None);
        let reply = insert(&store, &user(2), Some(comment.id));

        assert!(policies.can_moderate(&user(99)));
        assert!(policies.can_update(&user(99), &comment));
        assert!(policies.can_delete(&user(99), &reply));
        assert!(!policies.can_moderate(&user(1)));
        assert!(matches!(
            policies.check_delete(&user(3), &reply),
            Err(CommentlyError::Unauthorized {
                action: Permission::DeleteReply
            })
        ));
    }

    #[test]
    fn test_host_can_veto_creation() {
        struct ReadOnly;
        impl CommentPolicy for ReadOnly {
            fn create_comment(&self, _actor: &Actor, _target: &MorphRef) -> bool {
                false
            }
        }

        let (policies, _) = setup(Config::default(), ReadOnly);
        assert!(matches!(
            policies.check_create_comment(&user(1), &post()),
            Err(CommentlyError::Unauthorized {
                action: Permission::CreateComment
            })
        ));
    }

    #[test]
    fn test_visibility() {
        let mut config = Config::default();
        config.approval_required = true;
        let (policies, store) = setup(config, ModeratorPolicy::new([MorphRef::new("users", 99)]));
        let pending = insert(&store, &user(1), None);

        assert!(policies.can_view(&user(1), &pending));
        assert!(policies.can_view(&user(99), &pending));
        assert!(!policies.can_view(&user(2), &pending));

        // replies follow their own approval flag
        let reply = insert(&store, &user(1), Some(pending.id));
        assert!(policies.can_view(&user(2), &reply));
    }
}
