//! Helpful / not-helpful voting.
//!
//! Both vote kinds go through the store's single conditional update, so a
//! member can vote at most once per note and concurrent votes from different
//! members never lose an increment.

use tracing::{debug, info};

use super::normalize;
use crate::common::{CommunityNoteId, MemberId};
use crate::domains::community_notes::error::{CommunityNoteError, CommunityNoteResult};
use crate::domains::community_notes::models::{CommunityNote, VoteKind, VoteOutcome};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vote {
    Helpful,
    /// The reason is kept in the note's anonymous reason list; it is not
    /// linked to the voter.
    NotHelpful { reason: Option<String> },
}

impl Vote {
    pub fn kind(&self) -> VoteKind {
        match self {
            Vote::Helpful => VoteKind::Helpful,
            Vote::NotHelpful { .. } => VoteKind::NotHelpful,
        }
    }
}

pub async fn cast_vote(
    note_id: CommunityNoteId,
    voter: MemberId,
    vote: Vote,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    let kind = vote.kind();
    let reason = match &vote {
        Vote::Helpful => None,
        Vote::NotHelpful { reason } => normalize::reason(reason.as_deref()),
    };

    match deps
        .note_store
        .record_vote(note_id, voter, kind, reason)
        .await?
    {
        VoteOutcome::Recorded(note) => {
            info!(note_id = %note_id, voter = %voter, kind = ?kind, "Vote recorded");
            Ok(note)
        }
        VoteOutcome::AlreadyVoted => {
            debug!(note_id = %note_id, voter = %voter, "Duplicate vote rejected");
            Err(CommunityNoteError::AlreadyVoted)
        }
        VoteOutcome::NotFound => Err(CommunityNoteError::NotFound),
    }
}

pub async fn mark_helpful(
    note_id: CommunityNoteId,
    voter: MemberId,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    cast_vote(note_id, voter, Vote::Helpful, deps).await
}

pub async fn mark_not_helpful(
    note_id: CommunityNoteId,
    voter: MemberId,
    reason: Option<String>,
    deps: &ServerDeps,
) -> CommunityNoteResult<CommunityNote> {
    cast_vote(note_id, voter, Vote::NotHelpful { reason }, deps).await
}
