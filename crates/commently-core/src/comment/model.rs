//! Comment data models

use crate::types::{guest_fingerprint, Actor, CommentId, MorphRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A comment or reply attached to a commentable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier
    pub id: CommentId,
    /// Entity this comment belongs to
    pub commentable: MorphRef,
    /// Authenticated author; `None` for guests
    pub commenter: Option<MorphRef>,
    /// Parent comment when this is a reply
    pub reply_id: Option<CommentId>,
    /// Body text
    pub text: String,
    /// Guest name, only set when `commenter` is `None`
    pub guest_name: Option<String>,
    /// Guest email, only set when `commenter` is `None`
    pub guest_email: Option<String>,
    /// Moderation flag
    pub approved: bool,
    /// Address the comment was posted from
    pub ip_address: IpAddr,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Whether this comment answers another comment
    pub fn is_reply(&self) -> bool {
        self.reply_id.is_some()
    }

    pub fn is_guest(&self) -> bool {
        self.commenter.is_none()
    }

    /// Current moderation state
    pub fn approval(&self) -> ApprovalState {
        if self.approved {
            ApprovalState::Approved
        } else {
            ApprovalState::Pending
        }
    }

    /// Identity of the author
    pub fn commenter_key(&self) -> CommenterKey {
        match &self.commenter {
            Some(user) => CommenterKey::User(user.clone()),
            None => CommenterKey::Guest {
                ip_address: self.ip_address,
                email: self.guest_email.clone(),
            },
        }
    }

    /// Whether `actor` wrote this comment
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        self.commenter_key().matches(&CommenterKey::from_actor(actor))
    }

    /// Name to show next to a guest comment
    pub fn guest_display_name(&self) -> Option<&str> {
        self.guest_name.as_deref()
    }

    /// Short opaque marker for the guest who wrote this comment
    pub fn guest_fingerprint(&self) -> Option<String> {
        self.is_guest()
            .then(|| guest_fingerprint(self.ip_address, self.guest_email.as_deref()))
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.text = text.into();
        self.updated_at = now;
    }

    pub(crate) fn set_approved(&mut self, approved: bool, now: DateTime<Utc>) {
        self.approved = approved;
        self.updated_at = now;
    }
}

/// Moderation state of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    /// Hidden from public listings while approval is required
    Pending,
    Approved,
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalState::Pending => write!(f, "pending"),
            ApprovalState::Approved => write!(f, "approved"),
        }
    }
}

/// Author identity used for ownership checks and posting limits
///
/// Guests have no stable id, so they are keyed by IP address plus the
/// declared email. That pair is trivially spoofable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommenterKey {
    User(MorphRef),
    Guest {
        ip_address: IpAddr,
        email: Option<String>,
    },
}

impl CommenterKey {
    /// Key of the party issuing a request
    pub fn from_actor(actor: &Actor) -> Self {
        match actor {
            Actor::User { user, .. } => CommenterKey::User(user.clone()),
            Actor::Guest { info, ip_address } => CommenterKey::Guest {
                ip_address: *ip_address,
                email: info.email.clone(),
            },
        }
    }

    /// Identity comparison; guest emails compare case-insensitively
    pub fn matches(&self, other: &CommenterKey) -> bool {
        match (self, other) {
            (CommenterKey::User(a), CommenterKey::User(b)) => a == b,
            (
                CommenterKey::Guest {
                    ip_address: ip_a,
                    email: email_a,
                },
                CommenterKey::Guest {
                    ip_address: ip_b,
                    email: email_b,
                },
            ) => ip_a == ip_b && normalize(email_a) == normalize(email_b),
            _ => false,
        }
    }
}

fn normalize(email: &Option<String>) -> Option<String> {
    email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// A validated comment waiting for the store to assign id and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub commentable: MorphRef,
    pub commenter: Option<MorphRef>,
    pub reply_id: Option<CommentId>,
    pub text: String,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub approved: bool,
    pub ip_address: IpAddr,
}

impl NewComment {
    /// Author identity of the comment-to-be
    pub fn commenter_key(&self) -> CommenterKey {
        match &self.commenter {
            Some(user) => CommenterKey::User(user.clone()),
            None => CommenterKey::Guest {
                ip_address: self.ip_address,
                email: self.guest_email.clone(),
            },
        }
    }

    /// Materialize with a store-assigned id
    pub fn into_comment(self, id: CommentId, now: DateTime<Utc>) -> Comment {
        Comment {
            id,
            commentable: self.commentable,
            commenter: self.commenter,
            reply_id: self.reply_id,
            text: self.text,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            approved: self.approved,
            ip_address: self.ip_address,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An edit applied through the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentChange {
    pub text: Option<String>,
    pub approved: Option<bool>,
}

impl CommentChange {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            approved: None,
        }
    }

    pub fn approval(approved: bool) -> Self {
        Self {
            text: None,
            approved: Some(approved),
        }
    }

    pub fn with_approval(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.approved.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuestInfo;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn guest_comment(email: Option<&str>) -> Comment {
        NewComment {
            commentable: MorphRef::new("posts", 1),
            commenter: None,
            reply_id: None,
            text: "hello".to_string(),
            guest_name: Some("Alice".to_string()),
            guest_email: email.map(str::to_string),
            approved: true,
            ip_address: ip(1),
        }
        .into_comment(CommentId(1), Utc::now())
    }

    #[test]
    fn test_guest_ownership_uses_ip_and_email() {
        let comment = guest_comment(Some("alice@example.com"));

        let same = Actor::guest(GuestInfo::new("Alice").with_email("ALICE@example.com"), ip(1));
        let other_ip = Actor::guest(GuestInfo::new("Alice").with_email("alice@example.com"), ip(2));
        let other_email = Actor::guest(GuestInfo::new("Alice").with_email("eve@example.com"), ip(1));

        assert!(comment.is_owned_by(&same));
        assert!(!comment.is_owned_by(&other_ip));
        assert!(!comment.is_owned_by(&other_email));
    }

    #[test]
    fn test_guest_without_email_owned_by_ip() {
        let comment = guest_comment(None);
        assert!(comment.is_owned_by(&Actor::guest(GuestInfo::default(), ip(1))));
        assert!(!comment.is_owned_by(&Actor::guest(GuestInfo::default(), ip(9))));
    }

    #[test]
    fn test_user_ownership() {
        let mut comment = guest_comment(None);
        comment.commenter = Some(MorphRef::new("users", 5));
        comment.guest_name = None;

        assert!(comment.is_owned_by(&Actor::user(MorphRef::new("users", 5), ip(7))));
        assert!(!comment.is_owned_by(&Actor::user(MorphRef::new("users", 6), ip(1))));
        // a guest on the same address is not the user
        assert!(!comment.is_owned_by(&Actor::guest(GuestInfo::default(), ip(1))));
        assert!(comment.guest_fingerprint().is_none());
    }

    #[test]
    fn test_approval_state() {
        let mut comment = guest_comment(None);
        assert_eq!(comment.approval(), ApprovalState::Approved);

        let before = comment.updated_at;
        comment.set_approved(false, before + chrono::Duration::seconds(1));
        assert_eq!(comment.approval(), ApprovalState::Pending);
        assert!(comment.updated_at > before);
    }

    #[test]
    fn test_comment_serialization() {
        let comment = guest_comment(Some("alice@example.com"));
        let json = serde_json::to_string(&comment).unwrap();
        let back: Comment = serde_json::from_str(&json).unwrap();
        assert_eq!(comment, back);
    }
}
