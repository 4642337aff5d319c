// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Validation, rate-limit windows and event fan-out live in the domain
// activities that call these traits.
//
// Naming convention: Base* for trait names (e.g., BaseClock, BaseCommunityNoteStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{AnswerId, CommunityNoteId, MemberId};
use crate::domains::community_notes::models::{
    CommunityNote, ContentPatch, InsertOutcome, ModerationDecision, NewCommunityNote, NoteStatus,
    VoteKind, VoteOutcome,
};
use crate::domains::member::MemberNoteStats;

// =============================================================================
// Clock Trait (Infrastructure)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// Community Note Store Trait (Infrastructure - persistence)
// =============================================================================

/// Persistence primitives for community notes.
///
/// Every method is atomic with respect to concurrent calls on the same note:
/// implementations must never lose a vote increment, never admit a second
/// vote by the same member, and never let two submissions for one
/// (author, question) pass the window check together.
#[async_trait]
pub trait BaseCommunityNoteStore: Send + Sync {
    /// Insert `new` unless its author has a note on the same question created
    /// at or after `window_start`.
    async fn insert_if_window_clear(
        &self,
        new: NewCommunityNote,
        window_start: DateTime<Utc>,
    ) -> Result<InsertOutcome>;

    async fn find_by_id(&self, id: CommunityNoteId) -> Result<Option<CommunityNote>>;

    /// Notes in `status`, oldest first, optionally narrowed to one answer.
    async fn list_by_status(
        &self,
        status: NoteStatus,
        answer_id: Option<AnswerId>,
    ) -> Result<Vec<CommunityNote>>;

    /// Append `voter` to the vote set for `kind` and bump its count, only if
    /// `voter` is in neither set. A reason is only kept for not-helpful votes.
    async fn record_vote(
        &self,
        id: CommunityNoteId,
        voter: MemberId,
        kind: VoteKind,
        reason: Option<String>,
    ) -> Result<VoteOutcome>;

    /// Apply `patch` and reset the status to pending. `None` if the note is unknown.
    async fn patch_content(
        &self,
        id: CommunityNoteId,
        patch: ContentPatch,
    ) -> Result<Option<CommunityNote>>;

    /// Overwrite the status. `None` if the note is unknown.
    async fn set_status(
        &self,
        id: CommunityNoteId,
        status: NoteStatus,
    ) -> Result<Option<CommunityNote>>;

    /// Write the decision's status and increment the author's matching
    /// counter as one unit. `None` (and no counter change) if the note is unknown.
    async fn moderate(
        &self,
        id: CommunityNoteId,
        decision: ModerationDecision,
    ) -> Result<Option<CommunityNote>>;

    async fn author_tally(&self, member_id: MemberId) -> Result<Option<MemberNoteStats>>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}
