//! # OpenBracket
//!
//! A tournament bracket engine: topology generation, match lifecycle,
//! result propagation, per-match map negotiation, and team sub-match
//! aggregation, behind a single request-driven facade.
//!
//! ## Architecture
//!
//! A tournament moves through a handful of independent mechanisms:
//!
//! - **Topology**: seeding, BYE padding, and the full match skeleton for
//!   single elimination, double elimination (winners/losers/grand brackets
//!   plus the reset decider), and round robin
//! - **Lifecycle**: the per-match state machine — `Pending`, `Scheduled`,
//!   `Reported`, `Disputed`, `Confirmed`, `Void` — with two-sided score
//!   reporting and agreement-based auto-confirmation
//! - **Propagation**: coordinate-computed advancement routes, idempotent
//!   slot placement, BYE walkover cascades, and replay unwinding
//! - **Pick/ban**: the optional map negotiation protocol gating scheduling
//! - **Duels/rounds**: aggregators that resolve a team match from lineup
//!   duels or cumulative round scores instead of a direct report
//!
//! ## Core Modules
//!
//! - [`bracket`]: match models, seeding, and the topology builder
//! - [`lifecycle`]: the report/confirm state machine
//! - [`propagation`]: advancement across the bracket
//! - [`pickban`]: rulesets and the negotiation protocol
//! - [`duels`]: lineup duels and multi-round scoring
//! - [`engine`]: the facade tying everything together
//!
//! ## Example
//!
//! ```
//! use openbracket::bracket::{Format, GenerationOptions, SeedEntry};
//! use openbracket::engine::Engine;
//!
//! let engine = Engine::new();
//! let entrants = (1..=8)
//!     .map(|i| SeedEntry::solo(i, &format!("player {i}"), Some(i as u32)))
//!     .collect();
//! engine.register_tournament(1, entrants, "admin").unwrap();
//! let matches = engine
//!     .generate_bracket(1, GenerationOptions::solo(Format::DoubleElim, 3), "admin")
//!     .unwrap();
//! assert_eq!(matches.len(), 15);
//! ```

/// Bracket data models, seeding, and the topology builder.
pub mod bracket;
pub use bracket::{
    Format, GenerationOptions, Match, MatchCoord, MatchId, MatchMode, MatchStatus, ScoreReport,
    SeedEntry, Slot, TournamentId,
};

/// The per-match report/confirm state machine.
pub mod lifecycle;
pub use lifecycle::LifecycleError;

/// Result propagation across the bracket.
pub mod propagation;

/// Map pick/ban negotiation.
pub mod pickban;
pub use pickban::{PickBanState, Ruleset};

/// Team sub-match aggregation.
pub mod duels;
pub use duels::{DuelSheet, RoundLog};

/// Shared in-memory state.
pub mod store;

/// Audit records for state-changing operations.
pub mod audit;

/// The request-driven engine facade.
pub mod engine;
pub use engine::{Engine, EngineError, EngineResult};
