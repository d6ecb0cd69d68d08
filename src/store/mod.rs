//! In-memory tournament store.
//!
//! One `TournamentData` per tournament behind its own mutex, registered in a
//! shared map. Locking a tournament is the exclusive-lock scope every
//! mutating operation runs under; whole-tournament operations (generation,
//! reset) and per-match operations therefore serialize against each other.

pub mod errors;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

pub use errors::{StoreError, StoreResult};

use crate::bracket::{
    Format, GenerationOptions, Match, MatchCoord, MatchId, MatchStatus, SeedEntry, TournamentId,
};
use crate::duels::{DuelSheet, RoundLog};
use crate::pickban::{PickBanState, Ruleset};

/// A generated bracket: matches addressed by id and by coordinate.
///
/// Coordinates are the persisted topology; advancement routes are computed
/// from them rather than stored as edges.
#[derive(Clone, Debug)]
pub struct BracketState {
    pub format: Format,
    /// Rounds in the winners bracket (log2 of the padded field)
    pub winners_rounds: u32,
    pub matches: BTreeMap<MatchId, Match>,
    by_coord: HashMap<MatchCoord, MatchId>,
}

impl BracketState {
    #[must_use]
    pub fn new(format: Format, winners_rounds: u32, matches: Vec<Match>) -> Self {
        let by_coord = matches.iter().map(|m| (m.coord(), m.id)).collect();
        let matches = matches.into_iter().map(|m| (m.id, m)).collect();
        Self {
            format,
            winners_rounds,
            matches,
            by_coord,
        }
    }

    pub fn get(&self, id: MatchId) -> StoreResult<&Match> {
        self.matches.get(&id).ok_or(StoreError::MatchNotFound(id))
    }

    pub fn get_mut(&mut self, id: MatchId) -> StoreResult<&mut Match> {
        self.matches
            .get_mut(&id)
            .ok_or(StoreError::MatchNotFound(id))
    }

    #[must_use]
    pub fn id_at(&self, coord: &MatchCoord) -> Option<MatchId> {
        self.by_coord.get(coord).copied()
    }

    #[must_use]
    pub fn at(&self, coord: &MatchCoord) -> Option<&Match> {
        self.id_at(coord).and_then(|id| self.matches.get(&id))
    }

    pub fn at_mut(&mut self, coord: &MatchCoord) -> Option<&mut Match> {
        self.id_at(coord).and_then(|id| self.matches.get_mut(&id))
    }

    /// A bracket with any confirmed match refuses structural edits
    #[must_use]
    pub fn locked(&self) -> bool {
        self.matches
            .values()
            .any(|m| m.status == MatchStatus::Confirmed)
    }
}

/// Everything the engine holds for one tournament
#[derive(Clone, Debug, Default)]
pub struct TournamentData {
    pub entrants: Vec<SeedEntry>,
    /// Options the current bracket was generated with
    pub options: Option<GenerationOptions>,
    pub bracket: Option<BracketState>,
    pub ruleset: Option<Ruleset>,
    pub pickban: HashMap<MatchId, PickBanState>,
    pub duel_sheets: HashMap<MatchId, DuelSheet>,
    pub round_logs: HashMap<MatchId, RoundLog>,
    pub next_match_id: MatchId,
}

impl TournamentData {
    pub fn bracket(&self) -> StoreResult<&BracketState> {
        self.bracket.as_ref().ok_or(StoreError::NoBracket)
    }

    pub fn bracket_mut(&mut self) -> StoreResult<&mut BracketState> {
        self.bracket.as_mut().ok_or(StoreError::NoBracket)
    }

    /// Drop the bracket and everything cascading from its matches
    pub fn clear_bracket(&mut self) {
        self.bracket = None;
        self.options = None;
        self.pickban.clear();
        self.duel_sheets.clear();
        self.round_logs.clear();
    }
}

/// Shared registry of tournaments
#[derive(Debug, Default)]
pub struct Store {
    tournaments: RwLock<HashMap<TournamentId, Arc<Mutex<TournamentData>>>>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tournament with its participant list. Replaces any
    /// previous registration under the same id.
    pub fn register(&self, id: TournamentId, entrants: Vec<SeedEntry>) -> StoreResult<()> {
        let mut map = self
            .tournaments
            .write()
            .map_err(|_| StoreError::ConcurrentModification)?;
        map.insert(
            id,
            Arc::new(Mutex::new(TournamentData {
                entrants,
                next_match_id: 1,
                ..TournamentData::default()
            })),
        );
        Ok(())
    }

    /// Handle to one tournament's data
    pub fn tournament(&self, id: TournamentId) -> StoreResult<Arc<Mutex<TournamentData>>> {
        let map = self
            .tournaments
            .read()
            .map_err(|_| StoreError::ConcurrentModification)?;
        map.get(&id)
            .cloned()
            .ok_or(StoreError::TournamentNotFound(id))
    }

    pub fn remove(&self, id: TournamentId) -> StoreResult<()> {
        let mut map = self
            .tournaments
            .write()
            .map_err(|_| StoreError::ConcurrentModification)?;
        map.remove(&id)
            .map(|_| ())
            .ok_or(StoreError::TournamentNotFound(id))
    }
}

/// Lock one tournament, mapping a poisoned mutex to a retryable failure
pub fn lock_tournament(
    data: &Arc<Mutex<TournamentData>>,
) -> StoreResult<MutexGuard<'_, TournamentData>> {
    data.lock().map_err(|_| StoreError::ConcurrentModification)
}
