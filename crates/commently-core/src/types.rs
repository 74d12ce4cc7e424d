//! Core type definitions for commently

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Store-assigned comment identifier, increasing in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommentId {
    type Err = crate::CommentlyError;

    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim().parse::<u64>().map(CommentId).map_err(|_| {
            crate::CommentlyError::Validation(format!("Invalid comment ID: {}", s))
        })
    }
}

/// Store-assigned reaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(pub u64);

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Polymorphic reference to a host entity (`kind` + `id`)
///
/// Used for both commentables (`posts:12`) and authenticated commenters
/// (`users:3`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MorphRef {
    pub kind: String,
    pub id: String,
}

impl MorphRef {
    /// Create a reference from a kind and any displayable id
    pub fn new(kind: impl Into<String>, id: impl ToString) -> Self {
        Self {
            kind: kind.into(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for MorphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for MorphRef {
    type Err = crate::CommentlyError;

    /// Parse `kind:id`
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.split_once(':') {
            Some((kind, id)) if !kind.trim().is_empty() && !id.trim().is_empty() => {
                Ok(MorphRef::new(kind.trim(), id.trim()))
            }
            _ => Err(crate::CommentlyError::Validation(format!(
                "Invalid reference '{}', expected kind:id",
                s
            ))),
        }
    }
}

/// Name and email submitted by an unauthenticated commenter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl GuestInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// The party issuing a request
///
/// Passed explicitly into every query and action; there is no ambient
/// "current guest".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Actor {
    /// Authenticated user
    User { user: MorphRef, ip_address: IpAddr },
    /// Anonymous visitor, optionally carrying the name/email from its session
    Guest {
        #[serde(default)]
        info: GuestInfo,
        ip_address: IpAddr,
    },
}

impl Actor {
    pub fn user(user: MorphRef, ip_address: IpAddr) -> Self {
        Actor::User { user, ip_address }
    }

    pub fn guest(info: GuestInfo, ip_address: IpAddr) -> Self {
        Actor::Guest { info, ip_address }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Actor::Guest { .. })
    }

    pub fn ip_address(&self) -> IpAddr {
        match self {
            Actor::User { ip_address, .. } | Actor::Guest { ip_address, .. } => *ip_address,
        }
    }

    /// Authenticated user reference, if any
    pub fn user_ref(&self) -> Option<&MorphRef> {
        match self {
            Actor::User { user, .. } => Some(user),
            Actor::Guest { .. } => None,
        }
    }

    /// Session guest info, if any
    pub fn guest_info(&self) -> Option<&GuestInfo> {
        match self {
            Actor::Guest { info, .. } => Some(info),
            Actor::User { .. } => None,
        }
    }

    /// The actor as identified by a form submission
    ///
    /// Guest name and email typed into a form replace the session ones, so
    /// limits, the stored row and later ownership checks all see one
    /// identity. Hosts should keep the result as the session guest.
    /// Authenticated users are returned unchanged.
    pub fn with_submitted_guest(&self, submitted: Option<&GuestInfo>) -> Actor {
        match (self, submitted) {
            (Actor::Guest { ip_address, .. }, Some(info)) => Actor::guest(info.clone(), *ip_address),
            _ => self.clone(),
        }
    }

    /// Key used for the one-reaction-per-actor rule
    pub fn reactor_key(&self) -> ReactorKey {
        match self {
            Actor::User { user, .. } => ReactorKey::User(user.clone()),
            Actor::Guest { ip_address, .. } => ReactorKey::Guest(*ip_address),
        }
    }
}

/// Identity of whoever left a reaction: the user when authenticated,
/// otherwise the IP address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactorKey {
    User(MorphRef),
    Guest(IpAddr),
}

/// Stable short fingerprint for a guest identity (IP + email)
///
/// Lets hosts show "same guest" markers without exposing the address.
pub fn guest_fingerprint(ip_address: IpAddr, email: Option<&str>) -> String {
    let material = format!(
        "{}|{}",
        ip_address,
        email.map(|e| e.trim().to_lowercase()).unwrap_or_default()
    );
    let hash = blake3::hash(material.as_bytes());
    format!("g_{}", &hash.to_hex()[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_morph_ref_parse() {
        let r: MorphRef = "posts:12".parse().unwrap();
        assert_eq!(r, MorphRef::new("posts", 12));
        assert_eq!(r.to_string(), "posts:12");

        assert!("posts".parse::<MorphRef>().is_err());
        assert!(":12".parse::<MorphRef>().is_err());
        assert!("posts:".parse::<MorphRef>().is_err());
    }

    #[test]
    fn test_comment_id_parse() {
        assert_eq!("17".parse::<CommentId>().unwrap(), CommentId(17));
        assert!("abc".parse::<CommentId>().is_err());
    }

    #[test]
    fn test_reactor_key() {
        let user = Actor::user(MorphRef::new("users", 1), localhost());
        assert_eq!(user.reactor_key(), ReactorKey::User(MorphRef::new("users", 1)));

        let guest = Actor::guest(GuestInfo::new("Alice"), localhost());
        assert_eq!(guest.reactor_key(), ReactorKey::Guest(localhost()));
        assert!(guest.is_guest());
        assert!(guest.user_ref().is_none());
    }

    #[test]
    fn test_with_submitted_guest() {
        let info = GuestInfo::new("Alice").with_email("alice@example.com");

        let visitor = Actor::guest(GuestInfo::default(), localhost());
        let resolved = visitor.with_submitted_guest(Some(&info));
        assert_eq!(resolved.guest_info(), Some(&info));
        assert_eq!(resolved.ip_address(), localhost());
        assert_eq!(visitor.with_submitted_guest(None), visitor);

        let user = Actor::user(MorphRef::new("users", 1), localhost());
        assert_eq!(user.with_submitted_guest(Some(&info)), user);
    }

    #[test]
    fn test_guest_fingerprint() {
        let a = guest_fingerprint(localhost(), Some("Alice@Example.com"));
        let b = guest_fingerprint(localhost(), Some("alice@example.com "));
        let c = guest_fingerprint(localhost(), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("g_"));
        assert_eq!(a.len(), 14);
    }

    #[test]
    fn test_actor_serialization() {
        let actor = Actor::guest(GuestInfo::new("Bob").with_email("bob@example.com"), localhost());
        let json = serde_json::to_string(&actor).unwrap();
        assert!(json.contains("\"type\":\"guest\""));
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(actor, back);
    }
}
