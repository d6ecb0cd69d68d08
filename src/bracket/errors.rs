//! Bracket generation errors.

use thiserror::Error;

/// Errors raised by bracket generation preconditions.
///
/// Generation never writes partial state: any of these means no match was
/// created.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GenerationError {
    #[error("need at least 2 participants, have {0}")]
    InsufficientParticipants(usize),

    #[error("teams with incomplete rosters (need {team_size} members): {teams:?}")]
    IncompleteRoster {
        team_size: usize,
        teams: Vec<String>,
    },

    #[error("seed {0} is assigned more than once")]
    DuplicateSeed(u32),

    #[error("bracket already generated; reset it first")]
    BracketAlreadyGenerated,

    #[error("bracket contains confirmed matches and is locked against structural edits")]
    BracketLocked,
}

pub type GenerationResult<T> = Result<T, GenerationError>;
