//! Comment and reply lifecycle
//!
//! [`CommentService`] is the single entry point a host wires into its
//! request handlers: every action takes the requesting [`Actor`]
//! explicitly, checks authorization before touching the store and reports
//! changes through the configured [`EventSink`].

use crate::comment::{Comment, CommentChange, CommentValidator, NewComment};
use crate::config::Config;
use crate::error::{CommentlyError, Result};
use crate::events::{CommentEvent, EventSink, NullSink};
use crate::policy::{CommentPolicy, DefaultPolicy, Policies};
use crate::query::Queries;
use crate::reaction::{ReactionManager, ReactionState};
use crate::store::{CascadeOutcome, CommentStore};
use crate::types::{Actor, CommentId, GuestInfo, MorphRef};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builder for [`CommentService`]
pub struct CommentServiceBuilder {
    config: Config,
    store: Arc<dyn CommentStore>,
    rules: Arc<dyn CommentPolicy>,
    events: Arc<dyn EventSink>,
}

impl CommentServiceBuilder {
    /// Host authorization rules (default: owners only)
    pub fn policy(mut self, rules: impl CommentPolicy + 'static) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    /// Shared host authorization rules
    pub fn shared_policy(mut self, rules: Arc<dyn CommentPolicy>) -> Self {
        self.rules = rules;
        self
    }

    /// Event receiver (default: discard)
    pub fn events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Validate configuration and assemble the service
    pub fn build(self) -> Result<CommentService> {
        self.config.validate()?;

        let config = Arc::new(self.config);
        let policies = Policies::new(config.clone(), self.store.clone(), self.rules);
        let queries = Queries::new(config.clone(), self.store.clone(), policies.clone());
        let reactions = ReactionManager::new(config.clone(), self.store.clone());
        let validator = CommentValidator::with_max_length(config.text.max_length);

        Ok(CommentService {
            config,
            store: self.store,
            policies,
            queries,
            reactions,
            events: self.events,
            validator,
        })
    }
}

/// Create, edit, delete and moderate comments and replies
pub struct CommentService {
    config: Arc<Config>,
    store: Arc<dyn CommentStore>,
    policies: Policies,
    queries: Queries,
    reactions: ReactionManager,
    events: Arc<dyn EventSink>,
    validator: CommentValidator,
}

impl CommentService {
    pub fn builder(config: Config, store: Arc<dyn CommentStore>) -> CommentServiceBuilder {
        CommentServiceBuilder {
            config,
            store,
            rules: Arc::new(DefaultPolicy),
            events: Arc::new(NullSink),
        }
    }

    /// Service with default policy and no event sink
    pub fn new(config: Config, store: Arc<dyn CommentStore>) -> Result<Self> {
        Self::builder(config, store).build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    pub fn reactions(&self) -> &ReactionManager {
        &self.reactions
    }

    /// Make a host entity commentable
    pub fn register_commentable(&self, target: &MorphRef) -> Result<()> {
        self.store.register_commentable(target)
    }

    /// Post a top-level comment on `target`
    pub fn create_comment(
        &self,
        actor: &Actor,
        target: &MorphRef,
        text: &str,
        guest: Option<&GuestInfo>,
    ) -> Result<Comment> {
        if !self.store.has_commentable(target)? {
            return Err(CommentlyError::CommentableNotFound(target.clone()));
        }

        let actor = actor.with_submitted_guest(guest);
        self.policies
            .check_create_comment(&actor, target)
            .inspect_err(|e| warn!("Refused comment on {}: {}", target, e))?;

        let draft = self.draft(&actor, target.clone(), None, text)?;
        let comment = self.store.insert_comment(draft, self.config.limit)?;

        debug!(
            "Created comment {} on {} (approved: {})",
            comment.id, target, comment.approved
        );
        self.events.emit(CommentEvent::Created {
            comment_id: comment.id,
        });
        Ok(comment)
    }

    /// Reply to a top-level comment
    pub fn create_reply(
        &self,
        actor: &Actor,
        parent_id: CommentId,
        text: &str,
        guest: Option<&GuestInfo>,
    ) -> Result<Comment> {
        if !self.config.reply.enabled {
            return Err(CommentlyError::FeatureDisabled("replies are disabled".to_string()));
        }

        let parent = self.queries.find(parent_id)?;
        let actor = actor.with_submitted_guest(guest);
        self.policies
            .check_create_reply(&actor, &parent)
            .inspect_err(|e| warn!("Refused reply to {}: {}", parent_id, e))?;

        let draft = self.draft(&actor, parent.commentable.clone(), Some(parent.id), text)?;
        let reply = self.store.insert_comment(draft, self.config.reply.limit)?;

        debug!(
            "Created reply {} to comment {} (approved: {})",
            reply.id, parent.id, reply.approved
        );
        self.events.emit(CommentEvent::Created {
            comment_id: reply.id,
        });
        Ok(reply)
    }

    /// Replace the text of a comment or reply
    ///
    /// Under approval an edit by a non-moderator sends the comment back to
    /// pending.
    pub fn update_comment(&self, actor: &Actor, id: CommentId, text: &str) -> Result<Comment> {
        let comment = self.queries.find(id)?;
        self.policies
            .check_update(actor, &comment)
            .inspect_err(|e| warn!("Refused update of {}: {}", id, e))?;

        let text = self.validator.validate_text(text)?;
        let mut change = CommentChange::text(text);
        if self.config.approval_required_for(comment.is_reply())
            && !self.policies.can_moderate(actor)
        {
            change = change.with_approval(false);
        }

        let updated = self.store.update_comment(id, change)?;
        debug!("Updated comment {} (approved: {})", id, updated.approved);
        self.events.emit(CommentEvent::Updated {
            comment_id: id,
            text: updated.text.clone(),
            approved: updated.approved,
        });
        Ok(updated)
    }

    /// Abandon an edit in progress
    pub fn discard_update(&self, actor: &Actor, id: CommentId) -> Result<()> {
        let comment = self.queries.find(id)?;
        self.policies.check_update(actor, &comment)?;
        self.events.emit(CommentEvent::UpdateDiscarded { comment_id: id });
        Ok(())
    }

    /// Delete a comment with its replies and reactions
    pub fn delete_comment(&self, actor: &Actor, id: CommentId) -> Result<CascadeOutcome> {
        let comment = self.queries.find(id)?;
        self.policies
            .check_delete(actor, &comment)
            .inspect_err(|e| warn!("Refused delete of {}: {}", id, e))?;

        let outcome = self.store.delete_comment(id)?;
        info!(
            "Deleted comment {} with {} replies and {} reactions",
            id,
            outcome.comment_ids.len().saturating_sub(1),
            outcome.reactions_removed
        );
        Ok(outcome)
    }

    /// Publish a pending comment
    pub fn approve(&self, actor: &Actor, id: CommentId) -> Result<Comment> {
        self.set_approval(actor, id, true)
    }

    /// Send a comment back to pending
    pub fn unapprove(&self, actor: &Actor, id: CommentId) -> Result<Comment> {
        self.set_approval(actor, id, false)
    }

    /// React, un-react or switch reaction type
    pub fn toggle_reaction(
        &self,
        actor: &Actor,
        id: CommentId,
        reaction_type: &str,
    ) -> Result<ReactionState> {
        self.reactions.toggle(actor, id, reaction_type)
    }

    fn set_approval(&self, actor: &Actor, id: CommentId, approved: bool) -> Result<Comment> {
        self.policies
            .check_moderate(actor)
            .inspect_err(|e| warn!("Refused moderation of {}: {}", id, e))?;
        self.queries.find(id)?;

        let comment = self
            .store
            .update_comment(id, CommentChange::approval(approved))?;
        info!("Comment {} is now {}", id, comment.approval());
        Ok(comment)
    }

    /// Validate input and build the row to insert
    fn draft(
        &self,
        actor: &Actor,
        commentable: MorphRef,
        reply_id: Option<CommentId>,
        text: &str,
    ) -> Result<NewComment> {
        let is_reply = reply_id.is_some();
        let text = self.validator.validate_text(text)?;

        let (commenter, guest_name, guest_email) = match actor {
            Actor::User { user, .. } => (Some(user.clone()), None, None),
            Actor::Guest { info, .. } => {
                let guest = self
                    .validator
                    .validate_guest(Some(info), self.config.guest_email_required_for(is_reply))?;
                (None, guest.name, guest.email)
            }
        };

        let approved =
            !self.config.approval_required_for(is_reply) || self.policies.can_moderate(actor);

        Ok(NewComment {
            commentable,
            commenter,
            reply_id,
            text,
            guest_name,
            guest_email,
            approved,
            ip_address: actor.ip_address(),
        })
    }
}
