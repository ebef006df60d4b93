// Pick identifiers and the `<round>_<participant>` key codec.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable player identifier from the player catalog.
pub type PlayerId = u32;

/// Draft participant identifier (as configured in league.toml).
pub type ParticipantId = u32;

/// Full pick mapping: every key of the draft order, filled or empty.
pub type PickMap = BTreeMap<PickKey, Option<PlayerId>>;

/// Key of a single pick record. Ordered by round, then participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickKey {
    pub round: u32,
    pub participant: ParticipantId,
}

impl PickKey {
    pub fn new(round: u32, participant: ParticipantId) -> Self {
        Self { round, participant }
    }
}

impl fmt::Display for PickKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.round, self.participant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pick key `{0}`: expected <round>_<participant>")]
pub struct KeyParseError(pub String);

impl FromStr for PickKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeyParseError(s.to_string());
        let (round, participant) = s.split_once('_').ok_or_else(invalid)?;
        // A second separator means the key has more than two parts.
        if participant.contains('_') {
            return Err(invalid());
        }
        Ok(PickKey {
            round: round.trim().parse().map_err(|_| invalid())?,
            participant: participant.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Drop empty entries so that "absent" and "explicitly empty" compare equal.
pub fn normalize(picks: &PickMap) -> PickMap {
    picks
        .iter()
        .filter(|(_, v)| v.is_some())
        .map(|(k, v)| (*k, *v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_uses_underscore() {
        assert_eq!(PickKey::new(3, 2).to_string(), "3_2");
        assert_eq!(PickKey::new(15, 6).to_string(), "15_6");
    }

    #[test]
    fn key_parses_back_exactly() {
        let key: PickKey = "3_2".parse().unwrap();
        assert_eq!(key, PickKey::new(3, 2));
        let again: PickKey = key.to_string().parse().unwrap();
        assert_eq!(again, key);
    }

    #[test]
    fn key_parse_rejects_garbage() {
        assert!("".parse::<PickKey>().is_err());
        assert!("3".parse::<PickKey>().is_err());
        assert!("3_".parse::<PickKey>().is_err());
        assert!("a_2".parse::<PickKey>().is_err());
        assert!("1_2_3".parse::<PickKey>().is_err());
        assert!("-1_2".parse::<PickKey>().is_err());
    }

    #[test]
    fn keys_order_numerically() {
        let mut keys = vec![
            PickKey::new(10, 1),
            PickKey::new(2, 6),
            PickKey::new(2, 1),
            PickKey::new(1, 3),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                PickKey::new(1, 3),
                PickKey::new(2, 1),
                PickKey::new(2, 6),
                PickKey::new(10, 1),
            ]
        );
    }

    #[test]
    fn normalize_drops_empty_entries() {
        let mut picks = PickMap::new();
        picks.insert(PickKey::new(1, 1), Some(42));
        picks.insert(PickKey::new(1, 2), None);
        let normalized = normalize(&picks);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalize(&normalized), normalized);
    }
}
