//! Forum core: activity tracking, the post forest, recency ordering and
//! pagination. Nothing in here performs I/O.

mod activity;
mod clock;
mod pagination;
mod recency;
mod tree;

pub use activity::*;
pub use clock::*;
pub use pagination::*;
pub use recency::*;
pub use tree::*;
