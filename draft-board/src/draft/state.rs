// Pick state: who was drafted in which slot, and where the draft stands.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use super::order::DraftSlot;
use super::pick::{PickKey, PickMap, PlayerId};

/// Why a pick was rejected. State is never modified when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    #[error("pick index {index} is out of range (draft has {len} picks)")]
    OutOfRange { index: usize, len: usize },

    #[error("pick {key} is already filled by player {player_id}")]
    AlreadyFilled { key: PickKey, player_id: PlayerId },

    #[error("player {player_id} was already drafted at pick {key}")]
    AlreadyDrafted { player_id: PlayerId, key: PickKey },
}

/// The in-memory pick state for a single draft session.
///
/// Every key of the draft order has an entry (possibly empty) from
/// construction onwards.
#[derive(Debug, Clone)]
pub struct PickState {
    order: Vec<DraftSlot>,
    picks: PickMap,
    current_pick_index: usize,
}

impl PickState {
    /// Build the state for `order`, taking values from `persisted`.
    ///
    /// Persisted keys that are not part of the order are ignored. The current
    /// pick index becomes one past the highest filled slot, or 0.
    pub fn initialize(order: Vec<DraftSlot>, persisted: &PickMap) -> Self {
        let picks: PickMap = order
            .iter()
            .map(|slot| {
                let key = slot.key();
                (key, persisted.get(&key).copied().flatten())
            })
            .collect();

        let ignored = persisted
            .iter()
            .filter(|(k, v)| v.is_some() && !picks.contains_key(k))
            .count();
        if ignored > 0 {
            warn!("ignoring {} persisted picks outside the draft order", ignored);
        }

        let mut state = PickState {
            order,
            picks,
            current_pick_index: 0,
        };
        state.current_pick_index = state.derive_current_index();
        state
    }

    fn derive_current_index(&self) -> usize {
        self.order
            .iter()
            .rposition(|slot| matches!(self.picks.get(&slot.key()), Some(Some(_))))
            .map_or(0, |i| i + 1)
    }

    /// Record `player_id` at order position `index`.
    ///
    /// Returns the filled slot. Persisting the result is the caller's job.
    pub fn record_pick(&mut self, index: usize, player_id: PlayerId) -> Result<DraftSlot, PickError> {
        let slot = *self.order.get(index).ok_or(PickError::OutOfRange {
            index,
            len: self.order.len(),
        })?;
        let key = slot.key();

        if let Some(Some(existing)) = self.picks.get(&key) {
            return Err(PickError::AlreadyFilled {
                key,
                player_id: *existing,
            });
        }
        if let Some(owner) = self.drafted_by(player_id) {
            return Err(PickError::AlreadyDrafted {
                player_id,
                key: owner,
            });
        }

        self.picks.insert(key, Some(player_id));
        if index + 1 > self.current_pick_index {
            self.current_pick_index = index + 1;
        }
        debug!(%key, player_id, next = self.current_pick_index, "pick recorded");
        Ok(slot)
    }

    /// All player ids that currently occupy a pick.
    pub fn drafted_player_ids(&self) -> HashSet<PlayerId> {
        self.picks.values().flatten().copied().collect()
    }

    /// The key holding `player_id`, if that player has been drafted.
    pub fn drafted_by(&self, player_id: PlayerId) -> Option<PickKey> {
        self.picks
            .iter()
            .find(|(_, v)| **v == Some(player_id))
            .map(|(k, _)| *k)
    }

    pub fn current_pick_index(&self) -> usize {
        self.current_pick_index
    }

    pub fn order(&self) -> &[DraftSlot] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The player drafted at order position `index`, if any.
    pub fn pick_at(&self, index: usize) -> Option<PlayerId> {
        self.order
            .get(index)
            .and_then(|slot| self.picks.get(&slot.key()).copied().flatten())
    }

    /// The slot whose participant is on the clock, or `None` once the draft
    /// is complete.
    pub fn on_the_clock(&self) -> Option<&DraftSlot> {
        self.order.get(self.current_pick_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_pick_index >= self.order.len()
    }

    pub fn filled_count(&self) -> usize {
        self.picks.values().filter(|v| v.is_some()).count()
    }

    /// Full snapshot of the mapping, suitable for persisting.
    pub fn snapshot(&self) -> PickMap {
        self.picks.clone()
    }
}
