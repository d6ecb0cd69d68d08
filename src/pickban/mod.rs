//! Per-match pick/ban negotiation.
//!
//! A ruleset (map pool plus one step sequence per best-of) attaches to a
//! tournament; each match then runs its own negotiation: a start decision
//! fixes the starter, the sequence's bans and picks execute strictly in
//! order, the last pool map becomes the implicit decider, sides are chosen
//! or auto-assigned per played map, and a one-way lock closes the record.

pub mod errors;
pub mod models;
pub mod protocol;

pub use errors::{PickBanError, PickBanResult};
pub use models::{
    ActionKind, ActionRecord, CoinFace, MapRef, MapSide, PendingTask, PickBanState, PickBanStatus,
    Ruleset, SideRecord, SideSource, StartDecision, Step, StepAction, StepActor, TaskKind,
    TeamLabel,
};
pub use protocol::{StartMode, start};
