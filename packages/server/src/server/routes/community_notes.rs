//! Community note HTTP endpoints.
//!
//! The `/api/community-notes/*` routes keep the paths existing clients call.
//! `/api/notes/:noteId/*` exposes the same operations as separately typed
//! endpoints, one per operation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::common::{AnswerId, CommunityNoteId, Id, MemberId};
use crate::domains::community_notes::activities::{self, EditContent, SubmitNote, Vote};
use crate::domains::community_notes::data::{AuthorTallyData, CommunityNoteData};
use crate::domains::community_notes::models::{
    CommunityNote, ModerationDecision, NoteStatus, VoteKind,
};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Request bodies
// =============================================================================

/// Submission body. Every field is optional at the serde level so a missing
/// field produces the usual `{"error": ...}` 400 rather than a decoder error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitNoteRequest {
    pub note_text: Option<String>,
    pub created_by: Option<String>,
    pub question: Option<String>,
    pub answer_id: Option<String>,
    pub sources: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_type: VoteKind,
    pub user_id: Option<String>,
    pub reason: Option<String>,
}

/// Only these fields may be edited; anything else in the body is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentPatchRequest {
    pub note_text: Option<String>,
    pub sources: Option<String>,
}

/// Content patch as older clients send it on the edit endpoint: the allow-listed
/// fields plus a `status` that may only restate `"pending"`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LegacyContentPatchRequest {
    pub note_text: Option<String>,
    pub sources: Option<String>,
    pub status: Option<String>,
}

impl LegacyContentPatchRequest {
    fn into_patch(self) -> ApiResult<ContentPatchRequest> {
        match self.status.as_deref() {
            None | Some("pending") => Ok(ContentPatchRequest {
                note_text: self.note_text,
                sources: self.sources,
            }),
            Some(_) => Err(ApiError::bad_request(
                "Edits always return a note to pending; status cannot be set here",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub note_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub decision: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesQuery {
    pub answer_id: Option<String>,
}

/// Body of the legacy edit endpoint, decoded before dispatch.
///
/// A body carrying `voteType` is a vote; anything else is a content patch,
/// where a `status` of `"pending"` is tolerated and dropped.
#[derive(Debug)]
pub enum NoteEdit {
    Vote(VoteRequest),
    Content(ContentPatchRequest),
}

impl NoteEdit {
    pub fn decode(body: Value) -> ApiResult<Self> {
        if !body.is_object() {
            return Err(ApiError::bad_request("Request body must be a JSON object"));
        }
        if body.get("voteType").is_some() {
            serde_json::from_value(body)
                .map(NoteEdit::Vote)
                .map_err(|e| ApiError::bad_request(format!("Invalid vote: {}", e)))
        } else {
            serde_json::from_value::<LegacyContentPatchRequest>(body)
                .map_err(|e| ApiError::bad_request(format!("Invalid note update: {}", e)))?
                .into_patch()
                .map(NoteEdit::Content)
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_id<T>(raw: &str, field: &str) -> ApiResult<Id<T>> {
    Id::parse(raw).map_err(|_| ApiError::bad_request(format!("Invalid {}: expected a UUID", field)))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}

fn into_vote(request: VoteRequest) -> ApiResult<(MemberId, Vote)> {
    let user_id = present(&request.user_id)
        .ok_or_else(|| ApiError::bad_request("userId is required to vote"))?;
    let voter = parse_id(user_id, "userId")?;
    let vote = match request.vote_type {
        VoteKind::Helpful => Vote::Helpful,
        VoteKind::NotHelpful => Vote::NotHelpful {
            reason: request.reason,
        },
    };
    Ok((voter, vote))
}

fn into_edit(request: ContentPatchRequest) -> EditContent {
    EditContent {
        note_text: request.note_text,
        sources: request.sources,
    }
}

fn to_data(notes: Vec<CommunityNote>) -> Vec<CommunityNoteData> {
    notes.into_iter().map(CommunityNoteData::from).collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/community-notes/submit
pub async fn submit_note_handler(
    State(state): State<AxumAppState>,
    payload: Result<Json<SubmitNoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CommunityNoteData>)> {
    let request = body(payload)?;

    let (Some(note_text), Some(created_by), Some(question), Some(answer_id)) = (
        present(&request.note_text),
        present(&request.created_by),
        present(&request.question),
        present(&request.answer_id),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let input = SubmitNote {
        note_text: note_text.to_string(),
        created_by: parse_id(created_by, "createdBy")?,
        question_id: parse_id(question, "question")?,
        answer_id: parse_id(answer_id, "answerId")?,
        sources: request.sources,
    };

    let note = activities::submit_note(input, &state.deps).await?;

    Ok((StatusCode::CREATED, Json(note.into())))
}

/// GET /api/community-notes
pub async fn list_approved_handler(
    State(state): State<AxumAppState>,
    Query(query): Query<ListNotesQuery>,
) -> ApiResult<Json<Vec<CommunityNoteData>>> {
    let answer_id: Option<AnswerId> = present(&query.answer_id)
        .map(|raw| parse_id(raw, "answerId"))
        .transpose()?;

    let notes = activities::list_approved(answer_id, &state.deps).await?;

    Ok(Json(to_data(notes)))
}

/// GET /api/community-notes/getPendingNotes
pub async fn list_pending_handler(
    State(state): State<AxumAppState>,
) -> ApiResult<Json<Vec<CommunityNoteData>>> {
    let notes = activities::list_pending(&state.deps).await?;

    Ok(Json(to_data(notes)))
}

/// PATCH /api/community-notes/editNote/:noteId
pub async fn edit_note_handler(
    State(state): State<AxumAppState>,
    Path(note_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<CommunityNoteData>> {
    let note_id: CommunityNoteId = parse_id(&note_id, "noteId")?;

    let note = match NoteEdit::decode(body(payload)?)? {
        NoteEdit::Vote(request) => {
            let (voter, vote) = into_vote(request)?;
            debug!(note_id = %note_id, "Dispatching edit body as vote");
            activities::cast_vote(note_id, voter, vote, &state.deps).await?
        }
        NoteEdit::Content(request) => {
            debug!(note_id = %note_id, "Dispatching edit body as content patch");
            activities::patch_content(note_id, into_edit(request), &state.deps).await?
        }
    };

    Ok(Json(note.into()))
}

/// PATCH /api/community-notes/updateNoteStatus
pub async fn update_status_handler(
    State(state): State<AxumAppState>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<CommunityNoteData>> {
    let request = body(payload)?;

    let (Some(note_id), Some(status)) = (present(&request.note_id), present(&request.status))
    else {
        return Err(ApiError::bad_request("noteId and status are required"));
    };
    let note_id: CommunityNoteId = parse_id(note_id, "noteId")?;
    let status: NoteStatus = status.parse().map_err(ApiError::bad_request)?;

    let note = activities::set_status(note_id, status, &state.deps).await?;

    Ok(Json(note.into()))
}

/// GET /api/notes/:noteId
pub async fn get_note_handler(
    State(state): State<AxumAppState>,
    Path(note_id): Path<String>,
) -> ApiResult<Json<CommunityNoteData>> {
    let note_id: CommunityNoteId = parse_id(&note_id, "noteId")?;

    let note = activities::get_note(note_id, &state.deps).await?;

    Ok(Json(note.into()))
}

/// POST /api/notes/:noteId/votes
pub async fn cast_vote_handler(
    State(state): State<AxumAppState>,
    Path(note_id): Path<String>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<CommunityNoteData>> {
    let note_id: CommunityNoteId = parse_id(&note_id, "noteId")?;
    let (voter, vote) = into_vote(body(payload)?)?;

    let note = activities::cast_vote(note_id, voter, vote, &state.deps).await?;

    Ok(Json(note.into()))
}

/// PATCH /api/notes/:noteId/content
pub async fn patch_content_handler(
    State(state): State<AxumAppState>,
    Path(note_id): Path<String>,
    payload: Result<Json<ContentPatchRequest>, JsonRejection>,
) -> ApiResult<Json<CommunityNoteData>> {
    let note_id: CommunityNoteId = parse_id(&note_id, "noteId")?;
    let edit = into_edit(body(payload)?);

    let note = activities::patch_content(note_id, edit, &state.deps).await?;

    Ok(Json(note.into()))
}

/// POST /api/notes/:noteId/moderate
pub async fn moderate_note_handler(
    State(state): State<AxumAppState>,
    Path(note_id): Path<String>,
    payload: Result<Json<ModerateRequest>, JsonRejection>,
) -> ApiResult<Json<CommunityNoteData>> {
    let note_id: CommunityNoteId = parse_id(&note_id, "noteId")?;
    let decision = match present(&body(payload)?.decision) {
        Some("approved") => ModerationDecision::Approve,
        Some("rejected") => ModerationDecision::Reject,
        _ => {
            return Err(ApiError::bad_request(
                "decision must be \"approved\" or \"rejected\"",
            ))
        }
    };

    let note = activities::moderate_note(note_id, decision, &state.deps).await?;

    Ok(Json(note.into()))
}

/// GET /api/members/:memberId/note-stats
pub async fn author_tally_handler(
    State(state): State<AxumAppState>,
    Path(member_id): Path<String>,
) -> ApiResult<Json<AuthorTallyData>> {
    let member_id: MemberId = parse_id(&member_id, "memberId")?;

    let tally = activities::author_tally(member_id, &state.deps).await?;

    Ok(Json(tally.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_with_vote_type_decodes_as_vote() {
        let edit = NoteEdit::decode(json!({
            "voteType": "notHelpful",
            "userId": "0190c0de-0000-7000-8000-000000000001",
            "reason": "Outdated"
        }))
        .unwrap();

        match edit {
            NoteEdit::Vote(vote) => {
                assert_eq!(vote.vote_type, VoteKind::NotHelpful);
                assert_eq!(vote.reason.as_deref(), Some("Outdated"));
            }
            other => panic!("expected vote, got {:?}", other),
        }
    }

    #[test]
    fn body_without_vote_type_decodes_as_content_patch() {
        let edit = NoteEdit::decode(json!({"noteText": "Revised"})).unwrap();
        assert!(matches!(
            edit,
            NoteEdit::Content(ContentPatchRequest { note_text: Some(_), sources: None })
        ));
    }

    #[test]
    fn pending_status_in_edit_body_is_tolerated() {
        let edit = NoteEdit::decode(json!({"noteText": "Revised", "status": "pending"})).unwrap();
        assert!(matches!(
            edit,
            NoteEdit::Content(ContentPatchRequest { note_text: Some(_), sources: None })
        ));
    }

    #[test]
    fn typed_content_patch_rejects_status() {
        let result: Result<ContentPatchRequest, _> =
            serde_json::from_value(json!({"noteText": "Revised", "status": "pending"}));
        assert!(result.is_err());
    }

    #[test]
    fn content_patch_rejects_fields_outside_allow_list() {
        let err = NoteEdit::decode(json!({"noteText": "x", "helpfulCount": 99})).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = NoteEdit::decode(json!({"status": "approved"})).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_vote_type_is_rejected() {
        let err = NoteEdit::decode(json!({"voteType": "love", "userId": "x"})).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn vote_without_user_is_rejected() {
        let request = VoteRequest {
            vote_type: VoteKind::Helpful,
            user_id: Some("  ".to_string()),
            reason: None,
        };
        let err = into_vote(request).unwrap_err();
        assert_eq!(err.message, "userId is required to vote");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(NoteEdit::decode(json!(["voteType"])).is_err());
    }
}
