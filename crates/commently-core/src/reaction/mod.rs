//! Reactions on comments

pub mod manager;
pub mod model;

pub use manager::ReactionManager;
pub use model::*;
