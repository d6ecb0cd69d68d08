//! Pick/ban rulesets and negotiation state models.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::errors::{PickBanError, PickBanResult};
use crate::bracket::{MatchId, SlotIndex};

/// One map in a pool: stable key plus display name
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MapRef {
    pub key: String,
    pub name: String,
}

impl MapRef {
    #[must_use]
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
        }
    }
}

/// Step action in a configured sequence
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Ban,
    Pick,
}

/// Which side acts on a configured step.
///
/// `Alternate` resolves to starter/other strictly alternating over the
/// alternate steps of the sequence, starting with the starter.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepActor {
    Starter,
    Other,
    Alternate,
}

/// One configured ban/pick step
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Step {
    pub action: StepAction,
    pub actor: StepActor,
}

impl Step {
    #[must_use]
    pub const fn ban(actor: StepActor) -> Self {
        Self {
            action: StepAction::Ban,
            actor,
        }
    }

    #[must_use]
    pub const fn pick(actor: StepActor) -> Self {
        Self {
            action: StepAction::Pick,
            actor,
        }
    }
}

/// A map pool plus one ordered step sequence per supported best-of value
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ruleset {
    pub maps: Vec<MapRef>,
    pub sequences: BTreeMap<u8, Vec<Step>>,
}

impl Ruleset {
    /// Check the structural invariants before the ruleset may be attached:
    /// for every best-of, `picks + 1 = best_of` (picks plus the implicit
    /// decider are the maps played) and `bans + picks = pool - 1` (exactly
    /// one map survives as decider).
    pub fn validate(&self) -> PickBanResult<()> {
        let mut keys = HashSet::new();
        for map in &self.maps {
            if !keys.insert(map.key.as_str()) {
                return Err(PickBanError::DuplicateMap(map.key.clone()));
            }
        }
        for (&best_of, steps) in &self.sequences {
            let picks = steps
                .iter()
                .filter(|s| s.action == StepAction::Pick)
                .count();
            let bans = steps.len() - picks;
            if picks + 1 != best_of as usize {
                return Err(PickBanError::RulesetPicks { best_of, picks });
            }
            if bans + picks != self.maps.len() - 1 {
                return Err(PickBanError::RulesetPool {
                    best_of,
                    bans,
                    picks,
                    pool: self.maps.len(),
                });
            }
        }
        Ok(())
    }

    /// The configured sequence for a match's best-of value
    pub fn sequence(&self, best_of: u8) -> PickBanResult<&[Step]> {
        self.sequences
            .get(&best_of)
            .map(Vec::as_slice)
            .ok_or(PickBanError::UnsupportedBestOf(best_of))
    }

    /// Parse a ruleset document as submitted by organizers
    pub fn from_json(document: &str) -> serde_json::Result<Self> {
        serde_json::from_str(document)
    }
}

/// Coin face for the opening toss
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinFace {
    Heads,
    Tails,
}

/// Team label choice in seed-based start mode
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamLabel {
    A,
    B,
}

/// How the starter was determined
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum StartDecision {
    /// One slot called the coin; a correct call makes it the starter
    CoinToss {
        caller_slot: SlotIndex,
        call: CoinFace,
        result: CoinFace,
    },
    /// The higher seed chose to be Team A or Team B; Team A starts
    HigherSeed {
        higher_slot: SlotIndex,
        chose: TeamLabel,
    },
}

/// Kind of a recorded pick/ban action
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Ban,
    Pick,
    /// The last remaining map, auto-appended and not actor-attributed
    Decider,
}

/// One entry of the ordered action log
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionRecord {
    pub step_index: usize,
    /// Acting slot; `None` for the implicit decider
    pub slot: Option<SlotIndex>,
    pub kind: ActionKind,
    pub map_key: String,
}

/// Which side slot 1 plays on a map
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSide {
    Attack,
    Defense,
}

/// Whether a side was an explicit choice or auto-assigned
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSource {
    Choice,
    Auto,
}

/// Side assignment for one picked map
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SideRecord {
    pub map_key: String,
    /// The side slot 1 (index 0) plays
    pub slot_one_side: MapSide,
    /// Choosing slot; `None` when auto-assigned
    pub chosen_by: Option<SlotIndex>,
    pub source: SideSource,
}

/// Negotiation status: `Locked` is a one-way gate
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickBanStatus {
    Running,
    Locked,
}

/// The next submission a running negotiation is waiting for
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PendingTask {
    pub match_id: MatchId,
    pub kind: TaskKind,
    /// Slot(s) that must act
    pub slots: Vec<SlotIndex>,
    /// Map awaiting a side choice, when applicable
    pub map_key: Option<String>,
}

/// What kind of submission is pending
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Ban,
    Pick,
    Side,
    Lock,
}

/// Full negotiation state for one match (1:1 with a match under a ruleset)
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PickBanState {
    pub match_id: MatchId,
    pub status: PickBanStatus,
    pub decision: StartDecision,
    /// Slot that acts on `Starter` steps
    pub starter: SlotIndex,
    /// Configuration snapshot: pool at initiation time
    pub maps: Vec<MapRef>,
    /// Configuration snapshot: step sequence for this match's best-of
    pub steps: Vec<Step>,
    pub actions: Vec<ActionRecord>,
    pub sides: Vec<SideRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> Vec<MapRef> {
        (1..=n)
            .map(|i| MapRef::new(&format!("map{i}"), &format!("Map {i}")))
            .collect()
    }

    #[test]
    fn test_valid_bo3_ruleset() {
        // 7 maps, best-of 3: 4 bans + 2 picks leaves one decider
        let ruleset = Ruleset {
            maps: pool(7),
            sequences: BTreeMap::from([(
                3,
                vec![
                    Step::ban(StepActor::Starter),
                    Step::ban(StepActor::Other),
                    Step::pick(StepActor::Starter),
                    Step::pick(StepActor::Other),
                    Step::ban(StepActor::Starter),
                    Step::ban(StepActor::Other),
                ],
            )]),
        };
        assert_eq!(ruleset.validate(), Ok(()));
    }

    #[test]
    fn test_pick_count_must_match_best_of() {
        let ruleset = Ruleset {
            maps: pool(7),
            sequences: BTreeMap::from([(
                3,
                vec![
                    Step::ban(StepActor::Starter),
                    Step::ban(StepActor::Other),
                    Step::ban(StepActor::Starter),
                    Step::ban(StepActor::Other),
                    Step::ban(StepActor::Starter),
                    Step::pick(StepActor::Other),
                ],
            )]),
        };
        assert_eq!(
            ruleset.validate(),
            Err(PickBanError::RulesetPicks {
                best_of: 3,
                picks: 1
            })
        );
    }

    #[test]
    fn test_pool_arithmetic_must_leave_one_decider() {
        let ruleset = Ruleset {
            maps: pool(6),
            sequences: BTreeMap::from([(
                3,
                vec![
                    Step::ban(StepActor::Starter),
                    Step::ban(StepActor::Other),
                    Step::pick(StepActor::Starter),
                    Step::pick(StepActor::Other),
                ],
            )]),
        };
        assert_eq!(
            ruleset.validate(),
            Err(PickBanError::RulesetPool {
                best_of: 3,
                bans: 2,
                picks: 2,
                pool: 6
            })
        );
    }

    #[test]
    fn test_duplicate_map_keys_rejected() {
        let mut maps = pool(5);
        maps[4].key = "map1".into();
        let ruleset = Ruleset {
            maps,
            sequences: BTreeMap::new(),
        };
        assert_eq!(
            ruleset.validate(),
            Err(PickBanError::DuplicateMap("map1".into()))
        );
    }

    #[test]
    fn test_ruleset_document_parsing() {
        let doc = r#"{
            "maps": [
                {"key": "dust2", "name": "Dust II"},
                {"key": "mirage", "name": "Mirage"},
                {"key": "inferno", "name": "Inferno"}
            ],
            "sequences": {
                "1": [
                    {"action": "ban", "actor": "starter"},
                    {"action": "ban", "actor": "other"}
                ]
            }
        }"#;
        let ruleset = Ruleset::from_json(doc).unwrap();
        assert_eq!(ruleset.maps.len(), 3);
        assert_eq!(ruleset.validate(), Ok(()));
        assert_eq!(ruleset.sequence(1).unwrap().len(), 2);
    }

    #[test]
    fn test_sequence_lookup() {
        let ruleset = Ruleset {
            maps: pool(5),
            sequences: BTreeMap::from([(1, vec![Step::ban(StepActor::Alternate); 4])]),
        };
        assert!(ruleset.sequence(1).is_ok());
        assert_eq!(
            ruleset.sequence(5).unwrap_err(),
            PickBanError::UnsupportedBestOf(5)
        );
    }
}
