//! Response shaping.
//!
//! Pure functions that reduce verbose upstream payloads to what an agent
//! actually reads. Each shaper is total over its raw input type and never
//! touches the network.

pub mod activities;
pub mod comments;
pub mod pull_requests;

pub use activities::{shape_activity_page, strip_activity};
pub use comments::{simplify_liked_by, simplify_reaction, strip_comment, strip_user};
pub use pull_requests::{minimal_pull_request, shape_inbox_page};
