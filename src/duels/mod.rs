//! Team sub-match aggregation: lineup duels and multi-round scoring.
//!
//! Matches in these modes refuse direct score reports; the aggregate
//! outcome derived from the duel sheet or round log is what finalizes the
//! parent match.

pub mod errors;
pub mod models;

pub use errors::{DuelError, DuelResult, LineupIssue};
pub use models::{Duel, DuelKind, DuelSheet, RoundEntry, RoundKind, RoundLog};
