use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use crate::common::{AnswerId, CommunityNoteId, MemberId, QuestionId};
use crate::domains::member::models::MemberNoteStats;

// ============================================================================
// Enums
// ============================================================================

/// Moderation state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "note_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Pending => "pending",
            NoteStatus::Approved => "approved",
            NoteStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NoteStatus::Pending),
            "approved" => Ok(NoteStatus::Approved),
            "rejected" => Ok(NoteStatus::Rejected),
            other => Err(format!("Invalid note status: {}", other)),
        }
    }
}

/// Which way a member voted on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteKind {
    Helpful,
    NotHelpful,
}

/// A moderator's verdict on a note. Unlike a raw status write, a decision is
/// credited to the author's tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationDecision {
    #[serde(rename = "approved")]
    Approve,
    #[serde(rename = "rejected")]
    Reject,
}

impl ModerationDecision {
    pub fn status(&self) -> NoteStatus {
        match self {
            ModerationDecision::Approve => NoteStatus::Approved,
            ModerationDecision::Reject => NoteStatus::Rejected,
        }
    }
}

// ============================================================================
// Rows and inputs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommunityNote {
    pub id: CommunityNoteId,
    pub note_text: String,
    pub created_by: MemberId,
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub sources: Option<String>,
    pub status: NoteStatus,
    pub helpful_count: i32,
    pub not_helpful_count: i32,
    pub helpful_votes: Vec<MemberId>,
    pub not_helpful_votes: Vec<MemberId>,
    pub not_helpful_reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommunityNote {
    pub note_text: String,
    pub created_by: MemberId,
    pub question_id: QuestionId,
    pub answer_id: AnswerId,
    pub sources: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Allow-listed content fields an edit may touch.
///
/// `sources: Some(None)` clears the citations; `None` leaves them as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPatch {
    pub note_text: Option<String>,
    pub sources: Option<Option<String>>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        self.note_text.is_none() && self.sources.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(CommunityNote),
    /// The author already has a note on this question inside the window.
    RateLimited,
}

#[derive(Debug, Clone)]
pub enum VoteOutcome {
    Recorded(CommunityNote),
    AlreadyVoted,
    NotFound,
}

impl CommunityNote {
    pub fn has_voted(&self, member_id: MemberId) -> bool {
        self.helpful_votes.contains(&member_id) || self.not_helpful_votes.contains(&member_id)
    }
}

// =============================================================================
// Queries
// =============================================================================

impl CommunityNote {
    /// Insert a note unless the author already wrote one on the same question
    /// at or after `window_start`.
    ///
    /// The probe and the insert run in one transaction holding an advisory
    /// lock keyed on (author, question), so two concurrent submissions cannot
    /// both pass the check.
    pub async fn insert_if_window_clear(
        new: &NewCommunityNote,
        window_start: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<InsertOutcome> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("community_note:{}:{}", new.created_by, new.question_id))
            .execute(&mut *tx)
            .await
            .context("Failed to acquire submission lock")?;

        let recent = sqlx::query_as::<_, (CommunityNoteId,)>(
            r#"
            SELECT id
            FROM community_notes
            WHERE created_by = $1
              AND question_id = $2
              AND created_at >= $3
            LIMIT 1
            "#,
        )
        .bind(new.created_by)
        .bind(new.question_id)
        .bind(window_start)
        .fetch_optional(&mut *tx)
        .await?;

        if recent.is_some() {
            tx.rollback().await?;
            return Ok(InsertOutcome::RateLimited);
        }

        let note = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO community_notes
                (id, note_text, created_by, question_id, answer_id, sources, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(CommunityNoteId::new())
        .bind(&new.note_text)
        .bind(new.created_by)
        .bind(new.question_id)
        .bind(new.answer_id)
        .bind(new.sources.as_deref())
        .bind(new.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(InsertOutcome::Inserted(note))
    }

    pub async fn find_by_id(id: CommunityNoteId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM community_notes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// All notes in `status`, oldest first, optionally narrowed to one answer.
    pub async fn find_by_status(
        status: NoteStatus,
        answer_id: Option<AnswerId>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT *
            FROM community_notes
            WHERE status = $1
              AND ($2::uuid IS NULL OR answer_id = $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(status)
        .bind(answer_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Record a vote in a single conditional update.
    ///
    /// The row only changes when `voter` is in neither vote set; the voter is
    /// appended and the matching count incremented together. Row locking makes
    /// a concurrent second vote re-check the predicate against the committed
    /// arrays, so neither lost updates nor double votes are possible.
    pub async fn record_vote(
        id: CommunityNoteId,
        voter: MemberId,
        kind: VoteKind,
        reason: Option<&str>,
        pool: &PgPool,
    ) -> Result<VoteOutcome> {
        let updated = match kind {
            VoteKind::Helpful => {
                sqlx::query_as::<_, Self>(
                    r#"
                    UPDATE community_notes
                    SET helpful_votes = array_append(helpful_votes, $2),
                        helpful_count = helpful_count + 1,
                        updated_at = now()
                    WHERE id = $1
                      AND NOT ($2 = ANY(helpful_votes))
                      AND NOT ($2 = ANY(not_helpful_votes))
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(voter)
                .fetch_optional(pool)
                .await?
            }
            VoteKind::NotHelpful => {
                sqlx::query_as::<_, Self>(
                    r#"
                    UPDATE community_notes
                    SET not_helpful_votes = array_append(not_helpful_votes, $2),
                        not_helpful_count = not_helpful_count + 1,
                        not_helpful_reasons = CASE
                            WHEN $3::text IS NULL THEN not_helpful_reasons
                            ELSE array_append(not_helpful_reasons, $3::text)
                        END,
                        updated_at = now()
                    WHERE id = $1
                      AND NOT ($2 = ANY(helpful_votes))
                      AND NOT ($2 = ANY(not_helpful_votes))
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(voter)
                .bind(reason)
                .fetch_optional(pool)
                .await?
            }
        };

        if let Some(note) = updated {
            return Ok(VoteOutcome::Recorded(note));
        }

        let (exists,) =
            sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM community_notes WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(if exists {
            VoteOutcome::AlreadyVoted
        } else {
            VoteOutcome::NotFound
        })
    }

    /// Apply a content patch and send the note back to moderation.
    pub async fn patch_content(
        id: CommunityNoteId,
        patch: &ContentPatch,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let (update_sources, sources) = match &patch.sources {
            Some(sources) => (true, sources.as_deref()),
            None => (false, None),
        };

        sqlx::query_as::<_, Self>(
            r#"
            UPDATE community_notes
            SET note_text = COALESCE($2, note_text),
                sources = CASE WHEN $3 THEN $4 ELSE sources END,
                status = 'pending',
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.note_text.as_deref())
        .bind(update_sources)
        .bind(sources)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn update_status(
        id: CommunityNoteId,
        status: NoteStatus,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE community_notes SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Write a moderation decision and credit it to the author in one transaction.
    pub async fn moderate(
        id: CommunityNoteId,
        decision: ModerationDecision,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let note = sqlx::query_as::<_, Self>(
            "UPDATE community_notes SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(decision.status())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(note) = note else {
            tx.rollback().await?;
            return Ok(None);
        };

        MemberNoteStats::record_decision(note.created_by, decision, &mut *tx)
            .await
            .context("Failed to update author moderation tally")?;

        tx.commit().await?;

        Ok(Some(note))
    }
}
