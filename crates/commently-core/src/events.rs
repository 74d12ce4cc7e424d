//! Events emitted for the host's view layer

use crate::types::CommentId;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Something a rendered comment list should react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum CommentEvent {
    #[serde(rename = "comment-created", rename_all = "camelCase")]
    Created { comment_id: CommentId },
    /// `approved` is the flag after the edit; false means back in moderation
    #[serde(rename = "comment-updated", rename_all = "camelCase")]
    Updated {
        comment_id: CommentId,
        text: String,
        approved: bool,
    },
    #[serde(rename = "comment-update-discarded", rename_all = "camelCase")]
    UpdateDiscarded { comment_id: CommentId },
}

impl CommentEvent {
    /// Browser-side event name
    pub fn name(&self) -> &'static str {
        match self {
            CommentEvent::Created { .. } => "comment-created",
            CommentEvent::Updated { .. } => "comment-updated",
            CommentEvent::UpdateDiscarded { .. } => "comment-update-discarded",
        }
    }

    pub fn comment_id(&self) -> CommentId {
        match self {
            CommentEvent::Created { comment_id }
            | CommentEvent::Updated { comment_id, .. }
            | CommentEvent::UpdateDiscarded { comment_id } => *comment_id,
        }
    }
}

/// Receiver for events, implemented by the host
pub trait EventSink: Send + Sync {
    fn emit(&self, event: CommentEvent);
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CommentEvent) {}
}

/// Keeps events in memory, in emission order
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CommentEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<CommentEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: CommentEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
