use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::MemberId;
use crate::domains::community_notes::models::ModerationDecision;

/// Per-author moderation tally.
///
/// This is the slice of the member record the note subsystem writes. Rows are
/// created lazily on the first decision, so members that never had a note
/// moderated have no row and read as zero.
#[derive(sqlx::FromRow, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberNoteStats {
    pub member_id: MemberId,
    pub accepted_notes: i32,
    pub rejected_notes: i32,
    pub updated_at: DateTime<Utc>,
}

impl MemberNoteStats {
    pub fn empty(member_id: MemberId) -> Self {
        Self {
            member_id,
            accepted_notes: 0,
            rejected_notes: 0,
            updated_at: Utc::now(),
        }
    }

    pub async fn find_by_member(member_id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM member_note_stats WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Increment the counter matching `decision`.
    ///
    /// Takes a connection so the caller can run it inside the transaction that
    /// writes the note status.
    pub async fn record_decision(
        member_id: MemberId,
        decision: ModerationDecision,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        let (accepted, rejected) = match decision {
            ModerationDecision::Approve => (1, 0),
            ModerationDecision::Reject => (0, 1),
        };

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO member_note_stats (member_id, accepted_notes, rejected_notes)
            VALUES ($1, $2, $3)
            ON CONFLICT (member_id) DO UPDATE
            SET accepted_notes = member_note_stats.accepted_notes + EXCLUDED.accepted_notes,
                rejected_notes = member_note_stats.rejected_notes + EXCLUDED.rejected_notes,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(accepted)
        .bind(rejected)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }
}
