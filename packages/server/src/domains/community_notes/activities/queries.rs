//! Read-side queries for the public note list, the moderation dashboard and
//! author tallies.

use crate::common::{AnswerId, CommunityNoteId, MemberId};
use crate::domains::community_notes::error::{CommunityNoteError, CommunityNoteResult};
use crate::domains::community_notes::models::{CommunityNote, NoteStatus};
use crate::domains::member::MemberNoteStats;
use crate::kernel::ServerDeps;

/// Publicly visible notes: approved only, optionally for one answer.
pub async fn list_approved(
    answer_id: Option<AnswerId>,
    deps: &ServerDeps,
) -> CommunityNoteResult<Vec<CommunityNote>> {
    Ok(deps
        .note_store
        .list_by_status(NoteStatus::Approved, answer_id)
        .await?)
}

/// The moderation queue.
pub async fn list_pending(deps: &ServerDeps) -> CommunityNoteResult<Vec<CommunityNote>> {
    Ok(deps
        .note_store
        .list_by_status(NoteStatus::Pending, None)
        .await?)
}

pub async fn get_note(
    note_id: CommunityNoteId,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    deps.note_store
        .find_by_id(note_id)
        .await?
        .ok_or(CommunityNoteError::NotFound)
}

/// Accepted/rejected counters for an author; zero when nothing was moderated yet.
pub async fn author_tally(
    member_id: MemberId,
    deps: &ServerDeps,
) -> CommunityNoteResult<MemberNoteStats> {
    Ok(deps
        .note_store
        .author_tally(member_id)
        .await?
        .unwrap_or_else(|| MemberNoteStats::empty(member_id)))
}
