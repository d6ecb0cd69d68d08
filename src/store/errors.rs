//! Store lookup and locking errors.

use thiserror::Error;

use crate::bracket::{MatchId, TournamentId};

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum StoreError {
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    #[error("tournament has no generated bracket")]
    NoBracket,

    #[error("no pick/ban state for match {0}")]
    PickBanNotFound(MatchId),

    #[error("no duel sheet for match {0}")]
    DuelSheetNotFound(MatchId),

    #[error("no round log for match {0}")]
    RoundLogNotFound(MatchId),

    #[error("state changed concurrently, retry the operation")]
    ConcurrentModification,
}

pub type StoreResult<T> = Result<T, StoreError>;
