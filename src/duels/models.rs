//! Lineup-duel sheets and multi-round score logs.
//!
//! Both are append-only records hanging off a team match; the only mutation
//! after creation is the removal of a single erroneous entry. The aggregate
//! decision derived here is what finalizes the parent match, never a direct
//! score report.

use serde::{Deserialize, Serialize};

use super::errors::{DuelError, DuelResult, LineupIssue};
use crate::bracket::{MatchId, SlotIndex, UserId};

/// Kind of an individual duel inside a lineup-duel match
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelKind {
    Regular,
    /// Extra captain-vs-captain duel breaking an even split
    CaptainTiebreak,
}

/// One 1v1 duel pairing a member of each lineup
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Duel {
    pub kind: DuelKind,
    /// Users per slot, same order as the match slots
    pub users: [UserId; 2],
    pub winner_slot: Option<SlotIndex>,
    /// Identity that confirmed the result
    pub confirmed_by: Option<UserId>,
}

impl Duel {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.winner_slot.is_some()
    }
}

/// The lineup-duel state for one team match.
///
/// Lineups are replaceable until `start` generates the duels; from then on
/// the sheet is an append-only confirmation log.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DuelSheet {
    pub match_id: MatchId,
    /// Full team rosters per slot, the membership universe for lineups
    pub rosters: [Vec<UserId>; 2],
    /// Required lineup size
    pub team_size: usize,
    /// Whether `start` appends a captain-vs-captain tiebreak duel
    pub captain_tiebreak: bool,
    /// Submitted ordered lineups, replaceable until start
    pub lineups: [Option<Vec<UserId>>; 2],
    pub duels: Vec<Duel>,
}

impl DuelSheet {
    #[must_use]
    pub fn new(
        match_id: MatchId,
        rosters: [Vec<UserId>; 2],
        team_size: usize,
        captain_tiebreak: bool,
    ) -> Self {
        Self {
            match_id,
            rosters,
            team_size,
            captain_tiebreak,
            lineups: [None, None],
            duels: Vec::new(),
        }
    }

    #[must_use]
    pub fn started(&self) -> bool {
        !self.duels.is_empty()
    }

    /// Replace one slot's ordered lineup. Rejected once duels exist.
    pub fn replace_lineup(&mut self, slot: SlotIndex, users: Vec<UserId>) -> DuelResult<()> {
        if self.started() {
            return Err(DuelError::DuelsAlreadyStarted);
        }
        if users.len() != self.team_size {
            return Err(LineupIssue::WrongSize {
                expected: self.team_size,
                got: users.len(),
            }
            .into());
        }
        for (i, user) in users.iter().enumerate() {
            if users[..i].contains(user) {
                return Err(LineupIssue::DuplicateUser(*user).into());
            }
            if !self.rosters[slot].contains(user) {
                return Err(LineupIssue::NotOnRoster(*user).into());
            }
        }
        self.lineups[slot] = Some(users);
        Ok(())
    }

    /// Generate the duels from the two submitted lineups, pairing members
    /// index for index. The first lineup entry is the captain.
    pub fn start(&mut self) -> DuelResult<()> {
        if self.started() {
            return Err(DuelError::DuelsAlreadyStarted);
        }
        let one = self.lineups[0]
            .as_ref()
            .ok_or(DuelError::LineupMissing(0))?;
        let two = self.lineups[1]
            .as_ref()
            .ok_or(DuelError::LineupMissing(1))?;
        for (a, b) in one.iter().zip(two.iter()) {
            self.duels.push(Duel {
                kind: DuelKind::Regular,
                users: [*a, *b],
                winner_slot: None,
                confirmed_by: None,
            });
        }
        if self.captain_tiebreak {
            self.duels.push(Duel {
                kind: DuelKind::CaptainTiebreak,
                users: [one[0], two[0]],
                winner_slot: None,
                confirmed_by: None,
            });
        }
        Ok(())
    }

    /// Confirm one duel's winner. A confirmed duel is immutable.
    pub fn confirm_duel(
        &mut self,
        index: usize,
        winner_slot: SlotIndex,
        reporter: UserId,
    ) -> DuelResult<()> {
        let duel = self
            .duels
            .get_mut(index)
            .ok_or(DuelError::DuelNotFound(index))?;
        if duel.is_confirmed() {
            return Err(DuelError::DuelAlreadyConfirmed(index));
        }
        duel.winner_slot = Some(winner_slot);
        duel.confirmed_by = Some(reporter);
        Ok(())
    }

    /// Remove a single erroneous duel entry
    pub fn remove_duel(&mut self, index: usize) -> DuelResult<Duel> {
        if index >= self.duels.len() {
            return Err(DuelError::DuelNotFound(index));
        }
        Ok(self.duels.remove(index))
    }

    /// Confirmed duel wins per slot
    #[must_use]
    pub fn wins(&self) -> [usize; 2] {
        let mut wins = [0, 0];
        for duel in &self.duels {
            if let Some(slot) = duel.winner_slot {
                wins[slot] += 1;
            }
        }
        wins
    }

    /// The aggregate winner, once one side holds a strict majority of the
    /// generated duels. `None` while undecidable.
    #[must_use]
    pub fn decided(&self) -> Option<SlotIndex> {
        let threshold = self.duels.len() / 2 + 1;
        let wins = self.wins();
        if wins[0] >= threshold {
            Some(0)
        } else if wins[1] >= threshold {
            Some(1)
        } else {
            None
        }
    }
}

/// Kind of a scored round in a multi-round match
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    Regular,
    Tiebreak,
}

/// One scored round: a points pair per slot
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundEntry {
    /// 1-based, assigned in append order
    pub round_index: u32,
    pub kind: RoundKind,
    pub points: [u32; 2],
}

/// The multi-round score log for one team match.
///
/// Regular rounds append until the configured count is reached; the winner
/// is whoever leads on cumulative points. Tiebreak rounds only append while
/// the completed regular score is tied.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoundLog {
    pub match_id: MatchId,
    /// Number of regular rounds the format plays
    pub target_rounds: u32,
    pub entries: Vec<RoundEntry>,
    next_index: u32,
}

impl RoundLog {
    #[must_use]
    pub fn new(match_id: MatchId, target_rounds: u32) -> Self {
        Self {
            match_id,
            target_rounds,
            entries: Vec::new(),
            next_index: 1,
        }
    }

    fn regular_count(&self) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.kind == RoundKind::Regular)
            .count() as u32
    }

    /// Cumulative points per slot over a subset of entries
    fn totals(&self, kind: Option<RoundKind>) -> [u32; 2] {
        let mut totals = [0, 0];
        for entry in &self.entries {
            if kind.is_none_or(|k| entry.kind == k) {
                totals[0] += entry.points[0];
                totals[1] += entry.points[1];
            }
        }
        totals
    }

    /// All regular rounds recorded
    #[must_use]
    pub fn regular_complete(&self) -> bool {
        self.regular_count() >= self.target_rounds
    }

    /// Append the next round.
    ///
    /// Regular rounds are refused once the configured count is reached;
    /// tiebreak rounds are refused unless the regular rounds are complete
    /// and tied on cumulative points (including any earlier tiebreaks).
    pub fn push_round(&mut self, kind: RoundKind, points: [u32; 2]) -> DuelResult<RoundEntry> {
        match kind {
            RoundKind::Regular => {
                if self.regular_complete() {
                    return Err(DuelError::RoundsComplete(self.target_rounds));
                }
            }
            RoundKind::Tiebreak => {
                let totals = self.totals(None);
                if !self.regular_complete() || totals[0] != totals[1] {
                    return Err(DuelError::TiebreakNotAllowed);
                }
            }
        }
        let entry = RoundEntry {
            round_index: self.next_index,
            kind,
            points,
        };
        self.next_index += 1;
        self.entries.push(entry);
        Ok(entry)
    }

    /// Remove a single erroneous round entry by its index
    pub fn remove_round(&mut self, round_index: u32) -> DuelResult<RoundEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.round_index == round_index)
            .ok_or(DuelError::RoundNotFound(round_index))?;
        Ok(self.entries.remove(pos))
    }

    /// The aggregate winner and the cumulative score, once the regular
    /// rounds are complete and the total is not tied. `None` while rounds
    /// remain or the score needs a tiebreak.
    #[must_use]
    pub fn decided(&self) -> Option<(SlotIndex, [u32; 2])> {
        if !self.regular_complete() {
            return None;
        }
        let totals = self.totals(None);
        match totals[0].cmp(&totals[1]) {
            std::cmp::Ordering::Greater => Some((0, totals)),
            std::cmp::Ordering::Less => Some((1, totals)),
            std::cmp::Ordering::Equal => None,
        }
    }
}
