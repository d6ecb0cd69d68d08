//! Top-level engine errors.

use thiserror::Error;

use crate::bracket::{GenerationError, MatchId, SlotIndex, TournamentId};
use crate::duels::DuelError;
use crate::lifecycle::LifecycleError;
use crate::pickban::PickBanError;
use crate::store::StoreError;

/// Union of every failure an engine operation can return.
///
/// All variants are local, recoverable failures for the caller to render;
/// none indicate a crashed engine.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    PickBan(#[from] PickBanError),

    #[error(transparent)]
    Duel(#[from] DuelError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no ruleset attached to tournament {0}")]
    NoRuleset(TournamentId),

    #[error("pick/ban already started for match {0}")]
    PickBanAlreadyStarted(MatchId),

    #[error("match {0} does not aggregate duels or rounds")]
    NotAggregated(MatchId),

    #[error("pick/ban cannot be reset once the match is confirmed")]
    PickBanFrozen,

    #[error("slot index {0} is out of range")]
    SlotOutOfRange(SlotIndex),

    #[error("replay of match {0} must reuse its original participants")]
    ReplaySlotsMismatch(MatchId),
}

pub type EngineResult<T> = Result<T, EngineError>;
