//! Comment system module
//!
//! Comment records, author identity and input validation.

pub mod model;
pub mod validator;

pub use self::model::*;
pub use self::validator::CommentValidator;
