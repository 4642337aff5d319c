// TestDependencies - in-memory implementations for testing
//
// Provides doubles that can be injected into ServerDeps for tests. The
// in-memory store holds a single lock across each call, which gives it the
// same per-call atomicity the Postgres store gets from conditional updates
// and transactions.

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseClock, BaseCommunityNoteStore, ServerDeps, StreamHub};
use crate::common::{AnswerId, CommunityNoteId, MemberId};
use crate::domains::community_notes::models::{
    CommunityNote, ContentPatch, InsertOutcome, ModerationDecision, NewCommunityNote, NoteStatus,
    VoteKind, VoteOutcome,
};
use crate::domains::member::MemberNoteStats;

// =============================================================================
// Mock Clock
// =============================================================================

/// Manually driven clock.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }
}

impl BaseClock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// In-memory Community Note Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    /// Insertion order doubles as creation order.
    notes: Vec<CommunityNote>,
    tallies: HashMap<MemberId, MemberNoteStats>,
}

impl StoreState {
    fn note_mut(&mut self, id: CommunityNoteId) -> Option<&mut CommunityNote> {
        self.notes.iter_mut().find(|note| note.id == id)
    }
}

#[derive(Default)]
pub struct InMemoryNoteStore {
    state: Mutex<StoreState>,
    fail_writes: AtomicBool,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail like a lost database connection.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every stored note regardless of status.
    pub fn all_notes(&self) -> Vec<CommunityNote> {
        self.state.lock().unwrap().notes.clone()
    }

    /// Snapshot of one note, bypassing the failure switch.
    pub fn note(&self, id: CommunityNoteId) -> Option<CommunityNote> {
        let state = self.state.lock().unwrap();
        state.notes.iter().find(|note| note.id == id).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl BaseCommunityNoteStore for InMemoryNoteStore {
    async fn insert_if_window_clear(
        &self,
        new: NewCommunityNote,
        window_start: DateTime<Utc>,
    ) -> Result<InsertOutcome> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        let limited = state.notes.iter().any(|note| {
            note.created_by == new.created_by
                && note.question_id == new.question_id
                && note.created_at >= window_start
        });
        if limited {
            return Ok(InsertOutcome::RateLimited);
        }

        let note = CommunityNote {
            id: CommunityNoteId::new(),
            note_text: new.note_text,
            created_by: new.created_by,
            question_id: new.question_id,
            answer_id: new.answer_id,
            sources: new.sources,
            status: NoteStatus::Pending,
            helpful_count: 0,
            not_helpful_count: 0,
            helpful_votes: Vec::new(),
            not_helpful_votes: Vec::new(),
            not_helpful_reasons: Vec::new(),
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        state.notes.push(note.clone());

        Ok(InsertOutcome::Inserted(note))
    }

    async fn find_by_id(&self, id: CommunityNoteId) -> Result<Option<CommunityNote>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.notes.iter().find(|note| note.id == id).cloned())
    }

    async fn list_by_status(
        &self,
        status: NoteStatus,
        answer_id: Option<AnswerId>,
    ) -> Result<Vec<CommunityNote>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .notes
            .iter()
            .filter(|note| note.status == status)
            .filter(|note| answer_id.map_or(true, |answer| note.answer_id == answer))
            .cloned()
            .collect())
    }

    async fn record_vote(
        &self,
        id: CommunityNoteId,
        voter: MemberId,
        kind: VoteKind,
        reason: Option<String>,
    ) -> Result<VoteOutcome> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        let Some(note) = state.note_mut(id) else {
            return Ok(VoteOutcome::NotFound);
        };
        if note.has_voted(voter) {
            return Ok(VoteOutcome::AlreadyVoted);
        }

        match kind {
            VoteKind::Helpful => {
                note.helpful_votes.push(voter);
                note.helpful_count += 1;
            }
            VoteKind::NotHelpful => {
                note.not_helpful_votes.push(voter);
                note.not_helpful_count += 1;
                if let Some(reason) = reason {
                    note.not_helpful_reasons.push(reason);
                }
            }
        }
        note.updated_at = Utc::now();

        Ok(VoteOutcome::Recorded(note.clone()))
    }

    async fn patch_content(
        &self,
        id: CommunityNoteId,
        patch: ContentPatch,
    ) -> Result<Option<CommunityNote>> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        let Some(note) = state.note_mut(id) else {
            return Ok(None);
        };
        if let Some(text) = patch.note_text {
            note.note_text = text;
        }
        if let Some(sources) = patch.sources {
            note.sources = sources;
        }
        note.status = NoteStatus::Pending;
        note.updated_at = Utc::now();

        Ok(Some(note.clone()))
    }

    async fn set_status(
        &self,
        id: CommunityNoteId,
        status: NoteStatus,
    ) -> Result<Option<CommunityNote>> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        Ok(state.note_mut(id).map(|note| {
            note.status = status;
            note.updated_at = Utc::now();
            note.clone()
        }))
    }

    async fn moderate(
        &self,
        id: CommunityNoteId,
        decision: ModerationDecision,
    ) -> Result<Option<CommunityNote>> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        let Some(note) = state.note_mut(id) else {
            return Ok(None);
        };
        note.status = decision.status();
        note.updated_at = Utc::now();
        let note = note.clone();

        let tally = state
            .tallies
            .entry(note.created_by)
            .or_insert_with(|| MemberNoteStats::empty(note.created_by));
        match decision {
            ModerationDecision::Approve => tally.accepted_notes += 1,
            ModerationDecision::Reject => tally.rejected_notes += 1,
        }
        tally.updated_at = Utc::now();

        Ok(Some(note))
    }

    async fn author_tally(&self, member_id: MemberId) -> Result<Option<MemberNoteStats>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.tallies.get(&member_id).copied())
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of doubles plus the ServerDeps built from them.
///
/// Tests keep the concrete handles to drive the clock or inspect the store.
pub struct TestDependencies {
    pub store: Arc<InMemoryNoteStore>,
    pub clock: Arc<MockClock>,
    pub stream_hub: StreamHub,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryNoteStore::new()),
            clock: Arc::new(MockClock::default()),
            stream_hub: StreamHub::new(),
        }
    }

    /// ServerDeps with the standard 24 hour submission window.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.clock.clone(),
            self.stream_hub.clone(),
            Duration::hours(24),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
