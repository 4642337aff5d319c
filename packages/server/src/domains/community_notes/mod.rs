//! Community notes domain - fact-check annotations on answers, their
//! moderation lifecycle and helpful/not-helpful voting.

pub mod activities;
pub mod data;
pub mod error;
pub mod events;
pub mod models;

pub use data::CommunityNoteData;
pub use error::{CommunityNoteError, CommunityNoteResult};
pub use models::{CommunityNote, ModerationDecision, NoteStatus, VoteKind};
