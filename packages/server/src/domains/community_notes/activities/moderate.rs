//! Moderation status changes.

use tracing::info;

use crate::common::CommunityNoteId;
use crate::domains::community_notes::error::{CommunityNoteError, CommunityNoteResult};
use crate::domains::community_notes::events::{publish_note_event, NoteEventKind};
use crate::domains::community_notes::models::{CommunityNote, ModerationDecision, NoteStatus};
use crate::kernel::ServerDeps;

/// Overwrite a note's status.
///
/// Any transition is allowed, including to the current status. Subscribers
/// receive `noteUpdated` with the new status so open dashboards can reconcile.
pub async fn set_status(
    note_id: CommunityNoteId,
    status: NoteStatus,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    let note = deps
        .note_store
        .set_status(note_id, status)
        .await?
        .ok_or(CommunityNoteError::NotFound)?;

    info!(note_id = %note.id, status = %status, "Community note status updated");
    publish_note_event(deps, NoteEventKind::NoteUpdated, &note).await;

    Ok(note)
}

/// Apply a moderator's approve/reject decision.
///
/// The status write and the author's accepted/rejected counter move together
/// or not at all.
pub async fn moderate_note(
    note_id: CommunityNoteId,
    decision: ModerationDecision,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    let note = deps
        .note_store
        .moderate(note_id, decision)
        .await?
        .ok_or(CommunityNoteError::NotFound)?;

    info!(
        note_id = %note.id,
        author = %note.created_by,
        status = %note.status,
        "Community note moderated"
    );
    publish_note_event(deps, NoteEventKind::NoteUpdated, &note).await;

    Ok(note)
}
