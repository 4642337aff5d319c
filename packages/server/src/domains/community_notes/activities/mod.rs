//! Community note activities - business logic functions
//!
//! Activities take `&ServerDeps`, enforce the note rules and return domain
//! errors. HTTP handlers call them directly.

mod edit;
mod moderate;
mod normalize;
mod queries;
mod submit;
mod vote;

pub use edit::{patch_content, EditContent};
pub use moderate::{moderate_note, set_status};
pub use queries::{author_tally, get_note, list_approved, list_pending};
pub use submit::{submit_note, SubmitNote};
pub use vote::{cast_vote, mark_helpful, mark_not_helpful, Vote};
