//! Real-time note events.
//!
//! Events go to the `community_notes` StreamHub topic; open moderation
//! dashboards subscribe over SSE and reconcile their local list by note id.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::community_notes::data::CommunityNoteData;
use crate::domains::community_notes::models::{CommunityNote, NoteStatus};
use crate::kernel::ServerDeps;

/// StreamHub topic carrying note events.
pub const NOTES_TOPIC: &str = "community_notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteEventKind {
    NoteSubmitted,
    NoteUpdated,
}

impl NoteEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteEventKind::NoteSubmitted => "noteSubmitted",
            NoteEventKind::NoteUpdated => "noteUpdated",
        }
    }
}

/// Payload published for every note lifecycle change: `{event, note, type}`
/// where `type` is the note's status after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub event: NoteEventKind,
    pub note: CommunityNoteData,
    #[serde(rename = "type")]
    pub status: NoteStatus,
}

impl NoteEvent {
    pub fn new(event: NoteEventKind, note: &CommunityNote) -> Self {
        Self {
            event,
            status: note.status,
            note: CommunityNoteData::from(note.clone()),
        }
    }
}

/// Publish a note event. Delivery is best-effort: no subscribers is not an error.
pub async fn publish_note_event(deps: &ServerDeps, event: NoteEventKind, note: &CommunityNote) {
    match serde_json::to_value(NoteEvent::new(event, note)) {
        Ok(value) => {
            deps.stream_hub.publish(NOTES_TOPIC, value).await;
            debug!(note_id = %note.id, event = event.as_str(), status = %note.status, "Published note event");
        }
        Err(e) => {
            tracing::warn!(note_id = %note.id, error = %e, "Failed to serialize note event");
        }
    }
}
