//! Reaction data models

use crate::config::{ReactionConfig, ReactionPosition};
use crate::types::{CommentId, MorphRef, ReactionId, ReactorKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One actor's reaction to one comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: ReactionId,
    /// Authenticated user; `None` for guests
    pub user: Option<MorphRef>,
    pub comment_id: CommentId,
    /// Name of a configured reaction
    pub reaction_type: String,
    /// Guest identity key, recorded for users too
    pub ip_address: IpAddr,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reaction {
    /// Identity this reaction counts against
    pub fn reactor_key(&self) -> ReactorKey {
        match &self.user {
            Some(user) => ReactorKey::User(user.clone()),
            None => ReactorKey::Guest(self.ip_address),
        }
    }
}

/// An actor's reaction on a comment after a toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "type", rename_all = "lowercase")]
pub enum ReactionState {
    None,
    Reacted(String),
}

impl ReactionState {
    pub fn is_reacted(&self) -> bool {
        matches!(self, ReactionState::Reacted(_))
    }

    pub fn reaction_type(&self) -> Option<&str> {
        match self {
            ReactionState::None => None,
            ReactionState::Reacted(t) => Some(t),
        }
    }
}

/// Input for a single atomic toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionToggle {
    pub comment_id: CommentId,
    pub user: Option<MorphRef>,
    pub ip_address: IpAddr,
    pub reaction_type: String,
}

impl ReactionToggle {
    pub fn reactor_key(&self) -> ReactorKey {
        match &self.user {
            Some(user) => ReactorKey::User(user.clone()),
            None => ReactorKey::Guest(self.ip_address),
        }
    }
}

/// Aggregate count for one configured reaction type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub reaction_type: String,
    pub count: usize,
    pub position: ReactionPosition,
    pub fill: String,
}

impl ReactionCount {
    pub(crate) fn from_config(config: &ReactionConfig, count: usize) -> Self {
        Self {
            reaction_type: config.name.clone(),
            count,
            position: config.position,
            fill: config.fill.clone(),
        }
    }
}
