//! Pick/ban protocol errors.

use thiserror::Error;

use crate::bracket::SlotIndex;

/// Errors raised by ruleset validation and the negotiation state machine
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PickBanError {
    #[error("best-of {best_of}: picks + 1 must equal the best-of, sequence has {picks} picks")]
    RulesetPicks { best_of: u8, picks: usize },

    #[error(
        "best-of {best_of}: {bans} bans + {picks} picks must leave exactly one decider from {pool} maps"
    )]
    RulesetPool {
        best_of: u8,
        bans: usize,
        picks: usize,
        pool: usize,
    },

    #[error("map key {0:?} appears more than once in the pool")]
    DuplicateMap(String),

    #[error("no step sequence configured for best-of {0}")]
    UnsupportedBestOf(u8),

    #[error("step out of order: expected index {expected}, got {got}")]
    StepOutOfOrder { expected: usize, got: usize },

    #[error("not this slot's turn: step belongs to slot {expected}")]
    WrongActor { expected: SlotIndex },

    #[error("map {0:?} is not in the pool")]
    MapNotInPool(String),

    #[error("map {0:?} was already banned or picked")]
    MapAlreadyActioned(String),

    #[error("negotiation is already locked")]
    AlreadyLocked,

    #[error("configured steps are not finished yet")]
    StepsRemaining,

    #[error("maps without a side record: {0:?}")]
    SidesMissing(Vec<String>),

    #[error("map {0:?} was not picked, no side selection applies")]
    MapNotPicked(String),

    #[error("side for map {map:?} belongs to slot {expected}")]
    NotSideChooser { map: String, expected: SlotIndex },

    #[error("side for map {0:?} is already recorded")]
    SideAlreadyAssigned(String),

    #[error("configured steps left {0} maps, expected exactly one decider")]
    DeciderUnresolved(usize),
}

pub type PickBanResult<T> = Result<T, PickBanError>;
