//! commently-core - Core library for commently
//!
//! This crate provides threaded comments, replies and reactions for any host
//! entity, including approval moderation, guest posting, authorization
//! policies, pagination and a storage abstraction.

pub mod error;
pub mod types;
pub mod config;
pub mod display;
pub mod comment;
pub mod reaction;
pub mod store;
pub mod policy;
pub mod query;
pub mod events;
pub mod service;
pub mod view;

pub use error::{CommentlyError, Permission, Result};
pub use service::{CommentService, CommentServiceBuilder};
pub use types::*;
