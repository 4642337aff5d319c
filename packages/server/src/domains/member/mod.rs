//! Member domain - the moderation tally kept for note authors.
//!
//! Member identity itself is owned by the account service; only the
//! accepted/rejected note counters live here.

pub mod models;

pub use models::MemberNoteStats;
