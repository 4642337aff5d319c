//! Input clean-up shared by submission and editing.

use crate::domains::community_notes::error::{CommunityNoteError, CommunityNoteResult};

/// Trimmed note text, rejecting text that is empty after trimming.
pub(crate) fn note_text(raw: &str) -> CommunityNoteResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CommunityNoteError::validation("Note text cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trimmed sources; blank means "no sources".
pub(crate) fn sources(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trimmed not-helpful reason; blank reasons are dropped.
pub(crate) fn reason(raw: Option<&str>) -> Option<String> {
    sources(raw)
}
