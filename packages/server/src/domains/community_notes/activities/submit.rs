//! Note submission with the per-(author, question) rolling window.

use tracing::info;

use super::normalize;
use crate::common::{AnswerId, MemberId, QuestionId};
use crate::domains::community_notes::error::{CommunityNoteError, CommunityNoteResult};
use crate::domains::community_notes::events::{publish_note_event, NoteEventKind};
use crate::domains::community_notes::models::{CommunityNote, InsertOutcome, NewCommunityNote};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitNote {
    pub note_text: String,
    pub created_by: MemberId,
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub sources: Option<String>,
}

/// Submit a new note for moderation.
///
/// Fails with `RateLimited` when the author already submitted a note on the
/// same question (any answer) within the configured window, measured back
/// from now. Nothing is written in that case.
pub async fn submit_note(input: SubmitNote, deps: &ServerDeps) -> CommunityNoteResult<CommunityNote> {
    let note_text = normalize::note_text(&input.note_text)?;
    let now = deps.clock.now();
    let window_start = now - deps.note_rate_limit_window;

    let new = NewCommunityNote {
        note_text,
        created_by: input.created_by,
        question_id: input.question_id,
        answer_id: input.answer_id,
        sources: normalize::sources(input.sources.as_deref()),
        created_at: now,
    };

    match deps
        .note_store
        .insert_if_window_clear(new, window_start)
        .await?
    {
        InsertOutcome::Inserted(note) => {
            info!(
                note_id = %note.id,
                author = %note.created_by,
                question = %note.question_id,
                "Community note submitted"
            );
            publish_note_event(deps, NoteEventKind::NoteSubmitted, &note).await;
            Ok(note)
        }
        InsertOutcome::RateLimited => {
            info!(
                author = %input.created_by,
                question = %input.question_id,
                "Community note submission rate limited"
            );
            Err(CommunityNoteError::RateLimited)
        }
    }
}
