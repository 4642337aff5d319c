use serde::{Deserialize, Serialize};

use crate::common::{AnswerId, CommunityNoteId, MemberId, QuestionId};
use crate::domains::community_notes::models::{CommunityNote, NoteStatus};
use crate::domains::member::MemberNoteStats;

/// Client-facing representation of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityNoteData {
    pub id: CommunityNoteId,
    pub note_text: String,
    pub created_by: MemberId,
    pub question: QuestionId,
    pub answer_id: AnswerId,
    pub sources: Option<String>,
    pub status: NoteStatus,
    pub helpful_count: i32,
    pub not_helpful_count: i32,
    pub votes: VoteSetsData,
    pub not_helpful_reasons: Vec<String>,
    pub created_date_time: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSetsData {
    pub helpful: Vec<MemberId>,
    pub not_helpful: Vec<MemberId>,
}

impl From<CommunityNote> for CommunityNoteData {
    fn from(note: CommunityNote) -> Self {
        Self {
            id: note.id,
            note_text: note.note_text,
            created_by: note.created_by,
            question: note.question_id,
            answer_id: note.answer_id,
            sources: note.sources,
            status: note.status,
            helpful_count: note.helpful_count,
            not_helpful_count: note.not_helpful_count,
            votes: VoteSetsData {
                helpful: note.helpful_votes,
                not_helpful: note.not_helpful_votes,
            },
            not_helpful_reasons: note.not_helpful_reasons,
            created_date_time: note.created_at.to_rfc3339(),
            updated_at: note.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorTallyData {
    pub member_id: MemberId,
    pub accepted_notes: i32,
    pub rejected_notes: i32,
}

impl From<MemberNoteStats> for AuthorTallyData {
    fn from(stats: MemberNoteStats) -> Self {
        Self {
            member_id: stats.member_id,
            accepted_notes: stats.accepted_notes,
            rejected_notes: stats.rejected_notes,
        }
    }
}
