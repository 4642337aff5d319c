//! Server dependencies for domain activities (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! community-note activities and HTTP handlers.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::common::{AnswerId, CommunityNoteId, MemberId};
use crate::domains::community_notes::models::{
    CommunityNote, ContentPatch, InsertOutcome, ModerationDecision, NewCommunityNote, NoteStatus,
    VoteKind, VoteOutcome,
};
use crate::domains::member::MemberNoteStats;
use crate::kernel::{stream_hub::StreamHub, BaseClock, BaseCommunityNoteStore};

// =============================================================================
// Postgres store (implements BaseCommunityNoteStore trait)
// =============================================================================

/// Wrapper around the Postgres pool that implements BaseCommunityNoteStore
#[derive(Clone)]
pub struct PostgresNoteStore(pub PgPool);

impl PostgresNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }
}

#[async_trait]
impl BaseCommunityNoteStore for PostgresNoteStore {
    async fn insert_if_window_clear(
        &self,
        new: NewCommunityNote,
        window_start: DateTime<Utc>,
    ) -> Result<InsertOutcome> {
        CommunityNote::insert_if_window_clear(&new, window_start, &self.0).await
    }

    async fn find_by_id(&self, id: CommunityNoteId) -> Result<Option<CommunityNote>> {
        CommunityNote::find_by_id(id, &self.0).await
    }

    async fn list_by_status(
        &self,
        status: NoteStatus,
        answer_id: Option<AnswerId>,
    ) -> Result<Vec<CommunityNote>> {
        CommunityNote::find_by_status(status, answer_id, &self.0).await
    }

    async fn record_vote(
        &self,
        id: CommunityNoteId,
        voter: MemberId,
        kind: VoteKind,
        reason: Option<String>,
    ) -> Result<VoteOutcome> {
        CommunityNote::record_vote(id, voter, kind, reason.as_deref(), &self.0).await
    }

    async fn patch_content(
        &self,
        id: CommunityNoteId,
        patch: ContentPatch,
    ) -> Result<Option<CommunityNote>> {
        CommunityNote::patch_content(id, &patch, &self.0).await
    }

    async fn set_status(
        &self,
        id: CommunityNoteId,
        status: NoteStatus,
    ) -> Result<Option<CommunityNote>> {
        CommunityNote::update_status(id, status, &self.0).await
    }

    async fn moderate(
        &self,
        id: CommunityNoteId,
        decision: ModerationDecision,
    ) -> Result<Option<CommunityNote>> {
        CommunityNote::moderate(id, decision, &self.0).await
    }

    async fn author_tally(&self, member_id: MemberId) -> Result<Option<MemberNoteStats>> {
        MemberNoteStats::find_by_member(member_id, &self.0).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.0).await?;
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub note_store: Arc<dyn BaseCommunityNoteStore>,
    pub clock: Arc<dyn BaseClock>,
    /// In-process pub/sub hub for real-time streaming to SSE endpoints
    pub stream_hub: StreamHub,
    /// Rolling window in which an author may submit one note per question
    pub note_rate_limit_window: chrono::Duration,
}

impl ServerDeps {
    pub fn new(
        note_store: Arc<dyn BaseCommunityNoteStore>,
        clock: Arc<dyn BaseClock>,
        stream_hub: StreamHub,
        note_rate_limit_window: chrono::Duration,
    ) -> Self {
        Self {
            note_store,
            clock,
            stream_hub,
            note_rate_limit_window,
        }
    }
}
