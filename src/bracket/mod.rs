//! Bracket topology: data models and the match-skeleton builder.
//!
//! The topology builder is a pure function of (participants, format,
//! team size): it produces every match of the tournament with round 1
//! populated and later rounds unresolved, plus coordinate arithmetic for the
//! advancement graph (winner-goes-to / loser-goes-to).

pub mod errors;
pub mod models;
pub mod topology;

pub use errors::{GenerationError, GenerationResult};
pub use models::{
    BracketKind, EntrantId, Format, GenerationOptions, Match, MatchCoord, MatchId, MatchMode,
    MatchStatus, ParticipantKind, ScoreReport, SeedEntry, Slot, SlotIndex, TournamentId, UserId,
    other_slot,
};
pub use topology::{
    generate, loser_route, losers_round_matches, losers_rounds, seed_order, winner_route,
    winners_rounds,
};
