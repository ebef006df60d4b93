// Serpentine draft order generation.
//
// Round 1 runs forward, round 2 reversed, round 3 reversed again, round 4
// forward, and strict alternation from there. The last participant of round
// 1 therefore picks back-to-back across rounds 2 and 3 as well.

use serde::{Deserialize, Serialize};

use super::pick::{ParticipantId, PickKey};

/// One position in the draft sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSlot {
    /// 1-indexed round.
    pub round: u32,
    /// 1-indexed position within the round.
    pub slot: u32,
    pub participant: ParticipantId,
}

impl DraftSlot {
    pub fn key(&self) -> PickKey {
        PickKey::new(self.round, self.participant)
    }
}

/// Whether `round` lists participants in reverse order.
pub fn round_is_reversed(round: u32) -> bool {
    match round {
        1 => false,
        2 => true,
        r => r % 2 == 1,
    }
}

/// Build the full `rounds × participants` draft order.
///
/// Empty participants or zero rounds produce an empty order.
pub fn generate(participants: &[ParticipantId], rounds: u32) -> Vec<DraftSlot> {
    let mut order = Vec::with_capacity(participants.len() * rounds as usize);
    for round in 1..=rounds {
        let in_round: Box<dyn Iterator<Item = &ParticipantId>> = if round_is_reversed(round) {
            Box::new(participants.iter().rev())
        } else {
            Box::new(participants.iter())
        };
        order.extend(in_round.enumerate().map(|(i, &participant)| DraftSlot {
            round,
            slot: i as u32 + 1,
            participant,
        }));
    }
    order
}

/// Overall 1-indexed pick number for a 0-based order index.
pub fn pick_number(index: usize) -> usize {
    index + 1
}
