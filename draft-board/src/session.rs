// Draft session: the single owner of pick state and its persistence.
//
// A pick is validated against the in-memory state, applied, and then written
// through to the store. A failed write leaves the pick applied in memory.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, warn};

use crate::draft::order::{pick_number, DraftSlot};
use crate::draft::pick::{ParticipantId, PlayerId};
use crate::draft::state::{PickError, PickState};
use crate::store::{LoadSource, Persistence, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Pick(#[from] PickError),

    /// The pick is applied in memory but did not reach the store.
    #[error("pick {pick} recorded locally but not saved: {source}")]
    Persist {
        pick: usize,
        slot: DraftSlot,
        player_id: PlayerId,
        source: StoreError,
    },
}

/// A successfully recorded and persisted pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickReceipt {
    pub index: usize,
    pub slot: DraftSlot,
    pub player_id: PlayerId,
}

pub struct DraftSession {
    state: PickState,
    persistence: Persistence,
    participant_names: HashMap<ParticipantId, String>,
    load_source: LoadSource,
}

impl DraftSession {
    /// Read persisted picks and build the session state over `order`.
    ///
    /// Never fails; a degraded load is reported through the returned warning.
    pub async fn open(
        order: Vec<DraftSlot>,
        persistence: Persistence,
    ) -> (Self, Option<String>) {
        let loaded = persistence.read_state().await;
        let state = PickState::initialize(order, &loaded.picks);
        info!(
            "Draft session opened: {} of {} picks filled, next pick {}",
            state.filled_count(),
            state.len(),
            pick_number(state.current_pick_index())
        );
        let session = Self {
            state,
            persistence,
            participant_names: HashMap::new(),
            load_source: loaded.source,
        };
        (session, loaded.warning)
    }

    pub fn with_participant_names(mut self, names: HashMap<ParticipantId, String>) -> Self {
        self.participant_names = names;
        self
    }

    /// Record `player_id` at order position `index`, then write through.
    pub async fn record_pick(
        &mut self,
        index: usize,
        player_id: PlayerId,
    ) -> Result<PickReceipt, SessionError> {
        let slot = self.state.record_pick(index, player_id)?;

        if let Err(source) = self.persistence.write_state(&self.state.snapshot()).await {
            warn!(
                "Pick {} ({}) applied but not saved: {}",
                pick_number(index),
                slot.key(),
                source
            );
            return Err(SessionError::Persist {
                pick: pick_number(index),
                slot,
                player_id,
                source,
            });
        }

        info!(
            "Pick {}: {} takes player {}",
            pick_number(index),
            self.participant_name(slot.participant),
            player_id
        );
        Ok(PickReceipt {
            index,
            slot,
            player_id,
        })
    }

    /// Record `player_id` for whoever is on the clock.
    pub async fn draft_next(&mut self, player_id: PlayerId) -> Result<PickReceipt, SessionError> {
        let index = self.state.current_pick_index();
        self.record_pick(index, player_id).await
    }

    pub fn state(&self) -> &PickState {
        &self.state
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn store_label(&self) -> String {
        self.persistence.primary_label()
    }

    pub fn participant_name(&self, id: ParticipantId) -> String {
        self.participant_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Team {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::order::generate;
    use crate::draft::pick::{PickKey, PickMap};
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    async fn open_with(store: Arc<MemoryStore>) -> DraftSession {
        let persistence = Persistence::new(store, None, false);
        let (session, warning) = DraftSession::open(generate(&[1, 2, 3], 2), persistence).await;
        assert!(warning.is_none());
        session
    }

    #[tokio::test]
    async fn open_resumes_from_stored_picks() {
        let mut picks = PickMap::new();
        picks.insert(PickKey::new(1, 1), Some(10));
        picks.insert(PickKey::new(1, 2), Some(11));
        let session = open_with(Arc::new(MemoryStore::with_picks(picks))).await;

        assert_eq!(session.state().current_pick_index(), 2);
        assert_eq!(session.load_source(), LoadSource::Primary);
    }

    #[tokio::test]
    async fn open_reports_fallback_warning() {
        let persistence = Persistence::new(
            Arc::new(MemoryStore::new().failing_reads()),
            Some(Arc::new(MemoryStore::new())),
            true,
        );
        let (session, warning) = DraftSession::open(generate(&[1, 2], 1), persistence).await;
        assert!(warning.is_some());
        assert_eq!(session.load_source(), LoadSource::Empty);
    }

    #[tokio::test]
    async fn record_pick_writes_full_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open_with(store.clone()).await;

        let receipt = session.record_pick(0, 42).await.unwrap();
        assert_eq!(receipt.slot.participant, 1);

        let stored = store.stored().unwrap();
        assert_eq!(stored.len(), 6);
        assert_eq!(stored[&PickKey::new(1, 1)], Some(42));
    }

    #[tokio::test]
    async fn rejected_pick_does_not_write() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open_with(store.clone()).await;
        session.record_pick(0, 42).await.unwrap();

        let err = session.record_pick(0, 43).await.unwrap_err();
        assert!(matches!(err, SessionError::Pick(PickError::AlreadyFilled { .. })));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn write_failure_keeps_pick_in_memory() {
        let store = Arc::new(MemoryStore::new().failing_writes());
        let mut session = open_with(store).await;

        let err = session.record_pick(0, 42).await.unwrap_err();
        match err {
            SessionError::Persist {
                pick, player_id, source, ..
            } => {
                assert_eq!(pick, 1);
                assert_eq!(player_id, 42);
                assert!(matches!(source, StoreError::WriteFailed { status: 500, .. }));
            }
            other => panic!("expected Persist, got: {other}"),
        }
        assert_eq!(session.state().pick_at(0), Some(42));
        assert_eq!(session.state().current_pick_index(), 1);
    }

    #[tokio::test]
    async fn draft_next_follows_the_clock() {
        let mut session = open_with(Arc::new(MemoryStore::new())).await;
        for player in [1, 2, 3] {
            session.draft_next(player).await.unwrap();
        }
        let receipt = session.draft_next(4).await.unwrap();
        assert_eq!((receipt.slot.round, receipt.slot.participant), (2, 3));
    }

    #[tokio::test]
    async fn draft_next_on_complete_draft_is_out_of_range() {
        let persistence = Persistence::new(Arc::new(MemoryStore::new()), None, false);
        let (mut session, _) = DraftSession::open(generate(&[1], 1), persistence).await;
        session.draft_next(1).await.unwrap();
        let err = session.draft_next(2).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Pick(PickError::OutOfRange { index: 1, len: 1 })
        ));
    }

    #[tokio::test]
    async fn participant_names_fall_back_to_team_id() {
        let session = open_with(Arc::new(MemoryStore::new()))
            .await
            .with_participant_names([(1, "Alice".to_string())].into_iter().collect());
        assert_eq!(session.participant_name(1), "Alice");
        assert_eq!(session.participant_name(2), "Team 2");
    }
}
