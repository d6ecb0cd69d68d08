//! Match lifecycle errors.

use thiserror::Error;

use crate::bracket::MatchStatus;

/// Errors raised by match lifecycle transitions
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum LifecycleError {
    #[error("match slots are unresolved or the match is already finalized")]
    MatchNotReportable,

    #[error("scores must not tie and the winner must hold the strictly greater score")]
    InvalidScore,

    #[error("this side already reported; wait for the opponent or a rejection")]
    DuplicateReport,

    #[error("map negotiation must be locked before the match can be scheduled")]
    PickBanNotLocked,

    #[error("transition not allowed from {0:?}")]
    InvalidTransition(MatchStatus),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
