//! Sub-match aggregation errors.

use thiserror::Error;

use crate::bracket::{SlotIndex, UserId};

/// Why a submitted lineup was rejected
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum LineupIssue {
    #[error("lineup has {got} members, team size is {expected}")]
    WrongSize { expected: usize, got: usize },

    #[error("user {0} appears more than once")]
    DuplicateUser(UserId),

    #[error("user {0} is not on the team roster")]
    NotOnRoster(UserId),
}

/// Errors raised by the lineup-duel and multi-round aggregators
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DuelError {
    #[error("invalid lineup: {0}")]
    InvalidLineup(#[from] LineupIssue),

    #[error("duels already started, lineups are frozen")]
    DuelsAlreadyStarted,

    #[error("slot {0} has not submitted a lineup")]
    LineupMissing(SlotIndex),

    #[error("no duel at index {0}")]
    DuelNotFound(usize),

    #[error("duel {0} is already confirmed")]
    DuelAlreadyConfirmed(usize),

    #[error("no round with index {0}")]
    RoundNotFound(u32),

    #[error("all {0} regular rounds are already recorded")]
    RoundsComplete(u32),

    #[error("tiebreak rounds require a completed and tied regular score")]
    TiebreakNotAllowed,
}

pub type DuelResult<T> = Result<T, DuelError>;
