//! Typed ID definitions for the entities the note subsystem touches.
//!
//! Only community notes are owned here. Members, questions and answers live
//! in other services and are referenced by id without existence checks.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for community notes.
pub struct CommunityNote;

/// Marker type for members (note authors, voters, moderators).
pub struct Member;

/// Marker type for questions.
pub struct Question;

/// Marker type for answers within a question.
pub struct Answer;

// ============================================================================
// Type aliases
// ============================================================================

pub type CommunityNoteId = Id<CommunityNote>;

pub type MemberId = Id<Member>;

pub type QuestionId = Id<Question>;

pub type AnswerId = Id<Answer>;
