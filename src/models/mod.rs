//! Data models for the forum API.
//!
//! Response types serialize with camelCase field names.

mod post;
mod user;

pub use post::*;
pub use user::*;
