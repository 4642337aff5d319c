//! Content edits. Any edit sends the note back to moderation.

use tracing::info;

use super::normalize;
use crate::common::CommunityNoteId;
use crate::domains::community_notes::error::{CommunityNoteError, CommunityNoteResult};
use crate::domains::community_notes::events::{publish_note_event, NoteEventKind};
use crate::domains::community_notes::models::{CommunityNote, ContentPatch};
use crate::kernel::ServerDeps;

/// The fields an author may change. Anything else about a note (author,
/// target, votes, status) is not editable through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditContent {
    pub note_text: Option<String>,
    /// A blank string clears the sources.
    pub sources: Option<String>,
}

pub async fn patch_content(
    note_id: CommunityNoteId,
    edit: EditContent,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    let patch = ContentPatch {
        note_text: edit
            .note_text
            .as_deref()
            .map(normalize::note_text)
            .transpose()?,
        sources: edit
            .sources
            .as_deref()
            .map(|raw| normalize::sources(Some(raw))),
    };
    if patch.is_empty() {
        return Err(CommunityNoteError::validation(
            "Nothing to update: supply noteText or sources",
        ));
    }

    let note = deps
        .note_store
        .patch_content(note_id, patch)
        .await?
        .ok_or(CommunityNoteError::NotFound)?;

    info!(note_id = %note.id, "Community note edited, back to pending");
    publish_note_event(deps, NoteEventKind::NoteUpdated, &note).await;

    Ok(note)
}
