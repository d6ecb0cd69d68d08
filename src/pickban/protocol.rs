//! The pick/ban negotiation state machine.
//!
//! Per match, optional, and gating scheduling rather than match existence:
//! a coin toss (or seed-based Team A/B choice) fixes the starter, the
//! configured ban/pick sequence runs strictly in order, the last map left in
//! the pool is auto-appended as the decider, every played map receives a side
//! record, and `lock` closes the negotiation one-way.

use rand::Rng;

use super::errors::{PickBanError, PickBanResult};
use super::models::{
    ActionKind, ActionRecord, CoinFace, MapRef, MapSide, PendingTask, PickBanState, PickBanStatus,
    Ruleset, SideRecord, SideSource, StartDecision, StepAction, StepActor, TaskKind, TeamLabel,
};
use crate::bracket::{MatchId, SlotIndex, other_slot};

/// How a negotiation decides its starter
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartMode {
    /// One slot calls the coin; a correct call makes it the starter
    CoinToss {
        caller_slot: SlotIndex,
        call: CoinFace,
    },
    /// The higher seed picks Team A or Team B; Team A is the starter
    HigherSeed {
        higher_slot: SlotIndex,
        chose: TeamLabel,
    },
}

/// Initiate a negotiation for a match, snapshotting the ruleset.
pub fn start(
    match_id: MatchId,
    best_of: u8,
    ruleset: &Ruleset,
    mode: StartMode,
    rng: &mut impl Rng,
) -> PickBanResult<PickBanState> {
    ruleset.validate()?;
    let steps = ruleset.sequence(best_of)?.to_vec();
    let (decision, starter) = match mode {
        StartMode::CoinToss { caller_slot, call } => {
            let result = if rng.random_bool(0.5) {
                CoinFace::Heads
            } else {
                CoinFace::Tails
            };
            let starter = if call == result {
                caller_slot
            } else {
                other_slot(caller_slot)
            };
            (
                StartDecision::CoinToss {
                    caller_slot,
                    call,
                    result,
                },
                starter,
            )
        }
        StartMode::HigherSeed { higher_slot, chose } => {
            let starter = match chose {
                TeamLabel::A => higher_slot,
                TeamLabel::B => other_slot(higher_slot),
            };
            (StartDecision::HigherSeed { higher_slot, chose }, starter)
        }
    };
    Ok(PickBanState {
        match_id,
        status: PickBanStatus::Running,
        decision,
        starter,
        maps: ruleset.maps.clone(),
        steps,
        actions: Vec::new(),
        sides: Vec::new(),
    })
}

impl PickBanState {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.status == PickBanStatus::Locked
    }

    /// Number of explicit (non-decider) actions taken so far
    #[must_use]
    pub fn explicit_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.kind != ActionKind::Decider)
            .count()
    }

    /// Resolve the acting slot for a configured step index.
    ///
    /// `Alternate` steps alternate over the alternate steps of the sequence,
    /// starting with the starter.
    #[must_use]
    pub fn actor_for_step(&self, index: usize) -> SlotIndex {
        match self.steps[index].actor {
            StepActor::Starter => self.starter,
            StepActor::Other => other_slot(self.starter),
            StepActor::Alternate => {
                let prior = self.steps[..index]
                    .iter()
                    .filter(|s| s.actor == StepActor::Alternate)
                    .count();
                if prior % 2 == 0 {
                    self.starter
                } else {
                    other_slot(self.starter)
                }
            }
        }
    }

    /// Maps not yet banned or picked
    #[must_use]
    pub fn remaining_pool(&self) -> Vec<&MapRef> {
        self.maps
            .iter()
            .filter(|map| !self.actions.iter().any(|a| a.map_key == map.key))
            .collect()
    }

    /// Submit the next configured ban/pick step.
    ///
    /// Steps must arrive strictly in order, from the step's resolved actor,
    /// naming a map still in the pool. Consuming the final configured step
    /// auto-appends the sole remaining map as the decider.
    pub fn submit_step(
        &mut self,
        acting_slot: SlotIndex,
        step_index: usize,
        map_key: &str,
    ) -> PickBanResult<()> {
        if self.is_locked() {
            return Err(PickBanError::AlreadyLocked);
        }
        let expected = self.explicit_count();
        if expected >= self.steps.len() || step_index != expected {
            return Err(PickBanError::StepOutOfOrder {
                expected: expected.min(self.steps.len()),
                got: step_index,
            });
        }
        let actor = self.actor_for_step(expected);
        if acting_slot != actor {
            return Err(PickBanError::WrongActor { expected: actor });
        }
        if !self.maps.iter().any(|map| map.key == map_key) {
            return Err(PickBanError::MapNotInPool(map_key.to_string()));
        }
        if self.actions.iter().any(|a| a.map_key == map_key) {
            return Err(PickBanError::MapAlreadyActioned(map_key.to_string()));
        }
        // Last configured step: the pool must collapse to a single decider
        let last_step = expected + 1 == self.steps.len();
        if last_step {
            let remaining_after = self.remaining_pool().len() - 1;
            if remaining_after != 1 {
                return Err(PickBanError::DeciderUnresolved(remaining_after));
            }
        }

        let kind = match self.steps[expected].action {
            StepAction::Ban => ActionKind::Ban,
            StepAction::Pick => ActionKind::Pick,
        };
        self.actions.push(ActionRecord {
            step_index: expected,
            slot: Some(acting_slot),
            kind,
            map_key: map_key.to_string(),
        });
        if last_step {
            let decider = self.remaining_pool()[0].key.clone();
            self.actions.push(ActionRecord {
                step_index: self.steps.len(),
                slot: None,
                kind: ActionKind::Decider,
                map_key: decider,
            });
        }
        Ok(())
    }

    /// Keys of the maps that will be played, in action-log order
    #[must_use]
    pub fn played_maps(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Pick | ActionKind::Decider))
            .map(|a| a.map_key.as_str())
            .collect()
    }

    /// The slot entitled to choose the side for a played map: the slot that
    /// did not pick it; for the decider, the non-starter.
    pub fn side_chooser(&self, map_key: &str) -> PickBanResult<SlotIndex> {
        let action = self
            .actions
            .iter()
            .find(|a| a.map_key == map_key)
            .ok_or_else(|| PickBanError::MapNotPicked(map_key.to_string()))?;
        match (action.kind, action.slot) {
            (ActionKind::Pick, Some(picker)) => Ok(other_slot(picker)),
            (ActionKind::Decider, _) => Ok(other_slot(self.starter)),
            _ => Err(PickBanError::MapNotPicked(map_key.to_string())),
        }
    }

    /// Record an explicit side choice for a played map
    pub fn choose_side(
        &mut self,
        choosing_slot: SlotIndex,
        map_key: &str,
        slot_one_side: MapSide,
    ) -> PickBanResult<()> {
        if self.is_locked() {
            return Err(PickBanError::AlreadyLocked);
        }
        let chooser = self.side_chooser(map_key)?;
        if choosing_slot != chooser {
            return Err(PickBanError::NotSideChooser {
                map: map_key.to_string(),
                expected: chooser,
            });
        }
        self.push_side(SideRecord {
            map_key: map_key.to_string(),
            slot_one_side,
            chosen_by: Some(choosing_slot),
            source: SideSource::Choice,
        })
    }

    /// Auto-assign a side for a played map whose chooser did not act
    pub fn auto_side(&mut self, map_key: &str, rng: &mut impl Rng) -> PickBanResult<()> {
        if self.is_locked() {
            return Err(PickBanError::AlreadyLocked);
        }
        self.side_chooser(map_key)?;
        let slot_one_side = if rng.random_bool(0.5) {
            MapSide::Attack
        } else {
            MapSide::Defense
        };
        self.push_side(SideRecord {
            map_key: map_key.to_string(),
            slot_one_side,
            chosen_by: None,
            source: SideSource::Auto,
        })
    }

    fn push_side(&mut self, record: SideRecord) -> PickBanResult<()> {
        if self.sides.iter().any(|s| s.map_key == record.map_key) {
            return Err(PickBanError::SideAlreadyAssigned(record.map_key));
        }
        self.sides.push(record);
        Ok(())
    }

    /// Played maps still waiting for a side record
    #[must_use]
    pub fn missing_sides(&self) -> Vec<String> {
        self.played_maps()
            .into_iter()
            .filter(|key| !self.sides.iter().any(|s| s.map_key == *key))
            .map(str::to_string)
            .collect()
    }

    /// One-way transition to `Locked`: every configured step is consumed and
    /// every played map has its side record.
    pub fn lock(&mut self) -> PickBanResult<()> {
        if self.is_locked() {
            return Err(PickBanError::AlreadyLocked);
        }
        if self.explicit_count() < self.steps.len() {
            return Err(PickBanError::StepsRemaining);
        }
        let missing = self.missing_sides();
        if !missing.is_empty() {
            return Err(PickBanError::SidesMissing(missing));
        }
        self.status = PickBanStatus::Locked;
        Ok(())
    }

    /// The next submission this negotiation is waiting for, for the pending
    /// tasks view. `None` once locked.
    #[must_use]
    pub fn next_task(&self) -> Option<PendingTask> {
        if self.is_locked() {
            return None;
        }
        let explicit = self.explicit_count();
        if explicit < self.steps.len() {
            let kind = match self.steps[explicit].action {
                StepAction::Ban => TaskKind::Ban,
                StepAction::Pick => TaskKind::Pick,
            };
            return Some(PendingTask {
                match_id: self.match_id,
                kind,
                slots: vec![self.actor_for_step(explicit)],
                map_key: None,
            });
        }
        if let Some(map_key) = self.missing_sides().into_iter().next() {
            let chooser = self.side_chooser(&map_key).ok()?;
            return Some(PendingTask {
                match_id: self.match_id,
                kind: TaskKind::Side,
                slots: vec![chooser],
                map_key: Some(map_key),
            });
        }
        Some(PendingTask {
            match_id: self.match_id,
            kind: TaskKind::Lock,
            slots: Vec::new(),
            map_key: None,
        })
    }
}
