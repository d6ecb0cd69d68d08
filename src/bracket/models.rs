//! Core bracket data models: slots, matches, and generation inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tournament ID type
pub type TournamentId = i64;

/// Match ID type
pub type MatchId = i64;

/// Entrant ID type (a solo player or a team, opaque to the engine)
pub type EntrantId = i64;

/// User ID type (an individual person, used for team rosters and duels)
pub type UserId = i64;

/// One of the two sides of a match (0 or 1)
pub type SlotIndex = usize;

/// The opposite side of a match slot
#[must_use]
pub const fn other_slot(slot: SlotIndex) -> SlotIndex {
    if slot == 0 { 1 } else { 0 }
}

/// Named partition of a tournament's matches
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketKind {
    Winners,
    Losers,
    Grand,
    RoundRobin,
}

/// One side of a match.
///
/// `Empty` means the slot is still waiting on an earlier match, `Bye` is an
/// automatic win granted when the bracket was padded to a power of two, and
/// `Entrant` is a resolved participant.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Empty,
    Bye,
    Entrant(EntrantId),
}

impl Slot {
    /// The entrant occupying this slot, if any
    #[must_use]
    pub const fn entrant(&self) -> Option<EntrantId> {
        match self {
            Self::Entrant(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn is_bye(&self) -> bool {
        matches!(self, Self::Bye)
    }
}

/// Match lifecycle state
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// No schedule yet
    Pending,
    /// Has a scheduled time
    Scheduled,
    /// One side submitted a result
    Reported,
    /// The other side submitted a conflicting result
    Disputed,
    /// Authoritative result recorded
    Confirmed,
    /// Slots cleared, position unplayable
    Void,
}

/// How a match's result is produced
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Direct per-slot score reporting
    #[default]
    Standard,
    /// Team match resolved as an aggregate of individual 1v1 duels
    LineupDuels,
    /// Team match resolved as cumulative points over scored rounds
    MultiRound,
}

/// Bracket format
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElim,
    DoubleElim,
    RoundRobin,
}

/// Participant kind for generation
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    #[default]
    Solo,
    Team,
}

/// A raw score submission from one side of a match
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScoreReport {
    /// Which slot submitted this report
    pub reporter_slot: SlotIndex,
    pub score1: u32,
    pub score2: u32,
    /// Claimed winning slot; must agree with the strictly greater score
    pub winner_slot: SlotIndex,
}

impl ScoreReport {
    /// Whether two reports claim the same outcome (exact payload equality,
    /// reporter identity excluded)
    #[must_use]
    pub fn agrees_with(&self, other: &Self) -> bool {
        self.score1 == other.score1
            && self.score2 == other.score2
            && self.winner_slot == other.winner_slot
    }
}

/// (bracket, round, position) coordinate of a match within a tournament.
///
/// The triple is unique per tournament and is how the advancement graph is
/// persisted: successors are computed from coordinates, never from match ids.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MatchCoord {
    pub bracket: BracketKind,
    pub round: u32,
    pub round_pos: u32,
}

impl MatchCoord {
    #[must_use]
    pub const fn new(bracket: BracketKind, round: u32, round_pos: u32) -> Self {
        Self {
            bracket,
            round,
            round_pos,
        }
    }
}

/// A single match within a tournament bracket
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub bracket: BracketKind,
    /// 1-based round; 0 for round robin
    pub round: u32,
    /// 1-based position within the round
    pub round_pos: u32,
    /// Odd integer >= 1
    pub best_of: u8,
    pub mode: MatchMode,
    pub slots: [Slot; 2],
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Pending reports, indexed by reporting slot
    pub reports: [Option<ScoreReport>; 2],
    pub winner_slot: Option<SlotIndex>,
    pub score: Option<(u32, u32)>,
    /// Bumped on every mutation; used for optimistic concurrency checks
    pub version: u64,
}

impl Match {
    #[must_use]
    pub fn new(
        id: MatchId,
        tournament_id: TournamentId,
        coord: MatchCoord,
        best_of: u8,
        mode: MatchMode,
        slots: [Slot; 2],
    ) -> Self {
        Self {
            id,
            tournament_id,
            bracket: coord.bracket,
            round: coord.round,
            round_pos: coord.round_pos,
            best_of,
            mode,
            slots,
            status: MatchStatus::Pending,
            scheduled_at: None,
            reports: [None, None],
            winner_slot: None,
            score: None,
            version: 0,
        }
    }

    #[must_use]
    pub const fn coord(&self) -> MatchCoord {
        MatchCoord::new(self.bracket, self.round, self.round_pos)
    }

    /// Both slots hold real participants
    #[must_use]
    pub fn has_both_entrants(&self) -> bool {
        self.slots.iter().all(|slot| slot.entrant().is_some())
    }

    /// The slot value that advances as this match's winner
    #[must_use]
    pub fn winner_value(&self) -> Slot {
        match (self.status, self.winner_slot) {
            (MatchStatus::Confirmed, Some(slot)) => self.slots[slot],
            // A voided bracket position forwards a BYE
            (MatchStatus::Void, _) => Slot::Bye,
            _ => Slot::Empty,
        }
    }

    /// The slot value that drops as this match's loser
    #[must_use]
    pub fn loser_value(&self) -> Slot {
        match (self.status, self.winner_slot) {
            (MatchStatus::Confirmed, Some(slot)) => self.slots[other_slot(slot)],
            (MatchStatus::Void, _) => Slot::Bye,
            _ => Slot::Empty,
        }
    }

    /// Bump the optimistic version after a mutation
    pub fn touch(&mut self) {
        self.version += 1;
    }
}

/// One entrant supplied to bracket generation.
///
/// Created by signup/roster flows outside the engine; the engine references
/// entrants and never mutates them.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeedEntry {
    pub id: EntrantId,
    pub name: String,
    /// Positive and unique within the tournament when present
    pub seed: Option<u32>,
    pub checked_in: bool,
    /// Roster members; empty for solo participants
    pub members: Vec<UserId>,
}

impl SeedEntry {
    #[must_use]
    pub fn solo(id: EntrantId, name: &str, seed: Option<u32>) -> Self {
        Self {
            id,
            name: name.to_string(),
            seed,
            checked_in: true,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn team(id: EntrantId, name: &str, seed: Option<u32>, members: Vec<UserId>) -> Self {
        Self {
            id,
            name: name.to_string(),
            seed,
            checked_in: true,
            members,
        }
    }
}

/// Options for bracket generation
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GenerationOptions {
    pub format: Format,
    pub kind: ParticipantKind,
    /// Required roster size when `kind` is `Team`
    pub team_size: usize,
    pub best_of: u8,
    pub mode: MatchMode,
}

impl GenerationOptions {
    #[must_use]
    pub fn solo(format: Format, best_of: u8) -> Self {
        Self {
            format,
            kind: ParticipantKind::Solo,
            team_size: 0,
            best_of,
            mode: MatchMode::Standard,
        }
    }

    #[must_use]
    pub fn team(format: Format, best_of: u8, team_size: usize, mode: MatchMode) -> Self {
        Self {
            format,
            kind: ParticipantKind::Team,
            team_size,
            best_of,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_slot() {
        assert_eq!(other_slot(0), 1);
        assert_eq!(other_slot(1), 0);
    }

    #[test]
    fn test_slot_accessors() {
        assert_eq!(Slot::Entrant(7).entrant(), Some(7));
        assert_eq!(Slot::Bye.entrant(), None);
        assert!(Slot::Empty.is_empty());
        assert!(Slot::Bye.is_bye());
        assert!(!Slot::Entrant(1).is_empty());
    }

    #[test]
    fn test_report_agreement_ignores_reporter() {
        let a = ScoreReport {
            reporter_slot: 0,
            score1: 2,
            score2: 1,
            winner_slot: 0,
        };
        let b = ScoreReport {
            reporter_slot: 1,
            ..a
        };
        assert!(a.agrees_with(&b));

        let c = ScoreReport { score2: 0, ..b };
        assert!(!a.agrees_with(&c));
    }

    #[test]
    fn test_winner_and_loser_values() {
        let coord = MatchCoord::new(BracketKind::Winners, 1, 1);
        let mut m = Match::new(
            1,
            1,
            coord,
            3,
            MatchMode::Standard,
            [Slot::Entrant(10), Slot::Entrant(20)],
        );
        assert_eq!(m.winner_value(), Slot::Empty);

        m.status = MatchStatus::Confirmed;
        m.winner_slot = Some(1);
        assert_eq!(m.winner_value(), Slot::Entrant(20));
        assert_eq!(m.loser_value(), Slot::Entrant(10));

        m.status = MatchStatus::Void;
        assert_eq!(m.winner_value(), Slot::Bye);
        assert_eq!(m.loser_value(), Slot::Bye);
    }

    #[test]
    fn test_version_bump() {
        let coord = MatchCoord::new(BracketKind::RoundRobin, 0, 1);
        let mut m = Match::new(1, 1, coord, 1, MatchMode::Standard, [Slot::Empty, Slot::Empty]);
        assert_eq!(m.version, 0);
        m.touch();
        m.touch();
        assert_eq!(m.version, 2);
    }
}
