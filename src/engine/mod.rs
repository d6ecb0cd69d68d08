//! The request-driven engine facade.
//!
//! Every operation is a short synchronous transaction: look the tournament
//! up, take its lock, mutate, emit an audit record, return the post-state.
//! Nothing here spawns background work; propagation runs inline under the
//! same tournament lock, so a confirm and its cascade are observed together.

pub mod errors;

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub use errors::{EngineError, EngineResult};

use crate::audit::{AuditLog, EntityKind, EntityRef};
use crate::bracket::{
    GenerationError, GenerationOptions, Match, MatchId, MatchMode, MatchStatus, ScoreReport,
    SeedEntry, Slot, SlotIndex, TournamentId, UserId, generate, winners_rounds,
};
use crate::duels::{DuelSheet, RoundKind, RoundLog};
use crate::lifecycle::{self, LifecycleError};
use crate::pickban::{
    self, MapSide, PendingTask, PickBanState, Ruleset, StartMode,
};
use crate::propagation::{propagate, resolve_byes, unresolve_downstream};
use crate::store::{BracketState, Store, StoreError, TournamentData, lock_tournament};

/// Full view of one match: the match row plus its attached negotiation and
/// aggregation records
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchDetail {
    pub game: Match,
    pub pickban: Option<PickBanState>,
    pub duels: Option<DuelSheet>,
    pub rounds: Option<RoundLog>,
}

/// The tournament bracket engine
#[derive(Debug)]
pub struct Engine {
    store: Store,
    audit: AuditLog,
    rng: Mutex<StdRng>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic engine for reproducible coin tosses and auto-sides
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            store: Store::new(),
            audit: AuditLog::new(),
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    fn with_data<T>(
        &self,
        tournament_id: TournamentId,
        op: impl FnOnce(&mut TournamentData) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let handle = self.store.tournament(tournament_id)?;
        let mut data = lock_tournament(&handle)?;
        op(&mut data)
    }

    fn rng(&self) -> EngineResult<std::sync::MutexGuard<'_, StdRng>> {
        self.rng.lock().map_err(|_| StoreError::ConcurrentModification.into())
    }

    // ---- tournament registry -------------------------------------------

    pub fn register_tournament(
        &self,
        tournament_id: TournamentId,
        entrants: Vec<SeedEntry>,
        actor: &str,
    ) -> EngineResult<()> {
        let count = entrants.len();
        self.store.register(tournament_id, entrants)?;
        self.audit.record(
            tournament_id,
            actor,
            "tournament.register",
            EntityRef::new(EntityKind::Tournament, tournament_id),
            format!("{count} entrants"),
        );
        Ok(())
    }

    pub fn remove_tournament(&self, tournament_id: TournamentId, actor: &str) -> EngineResult<()> {
        self.store.remove(tournament_id)?;
        self.audit.record(
            tournament_id,
            actor,
            "tournament.remove",
            EntityRef::new(EntityKind::Tournament, tournament_id),
            String::new(),
        );
        Ok(())
    }

    // ---- bracket -------------------------------------------------------

    /// Generate the full bracket and resolve the initial BYE walkovers
    pub fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        options: GenerationOptions,
        actor: &str,
    ) -> EngineResult<Vec<Match>> {
        self.with_data(tournament_id, |data| {
            if data.bracket.is_some() {
                return Err(GenerationError::BracketAlreadyGenerated.into());
            }
            let matches = generate(tournament_id, &data.entrants, &options, &mut data.next_match_id)?;
            let padded = (data.entrants.len() as u32).next_power_of_two().max(2);
            let mut bracket =
                BracketState::new(options.format, winners_rounds(padded), matches);
            let walkovers = resolve_byes(&mut bracket);
            info!(
                "tournament {tournament_id}: generated {} matches, {} walkovers",
                bracket.matches.len(),
                walkovers.len()
            );
            let snapshot: Vec<Match> = bracket.matches.values().cloned().collect();
            data.bracket = Some(bracket);
            data.options = Some(options);
            self.audit.record(
                tournament_id,
                actor,
                "bracket.generate",
                EntityRef::new(EntityKind::Tournament, tournament_id),
                format!("{} matches", snapshot.len()),
            );
            Ok(snapshot)
        })
    }

    /// Delete every match and everything cascading from them
    pub fn reset_bracket(&self, tournament_id: TournamentId, actor: &str) -> EngineResult<()> {
        self.with_data(tournament_id, |data| {
            data.bracket()?;
            data.clear_bracket();
            self.audit.record(
                tournament_id,
                actor,
                "bracket.reset",
                EntityRef::new(EntityKind::Tournament, tournament_id),
                String::new(),
            );
            Ok(())
        })
    }

    /// Manually place a participant into a slot. Refused once any match in
    /// the bracket is confirmed.
    pub fn override_slot(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        slot: SlotIndex,
        value: Slot,
        actor: &str,
    ) -> EngineResult<Match> {
        check_slot(slot)?;
        self.with_data(tournament_id, |data| {
            let bracket = data.bracket_mut()?;
            if bracket.locked() {
                return Err(GenerationError::BracketLocked.into());
            }
            let m = bracket.get_mut(match_id)?;
            m.slots[slot] = value;
            m.touch();
            let snapshot = m.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.override_slot",
                EntityRef::new(EntityKind::Match, match_id),
                format!("slot {slot} = {value:?}"),
            );
            Ok(snapshot)
        })
    }

    // ---- match lifecycle -----------------------------------------------

    /// Set a match's scheduled time. When a ruleset is attached, the
    /// match's map negotiation must be locked first.
    pub fn schedule_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        at: DateTime<Utc>,
        expected_version: Option<u64>,
        actor: &str,
    ) -> EngineResult<Match> {
        self.with_data(tournament_id, |data| {
            if data.ruleset.is_some()
                && !data.pickban.get(&match_id).is_some_and(PickBanState::is_locked)
            {
                return Err(LifecycleError::PickBanNotLocked.into());
            }
            let m = data.bracket_mut()?.get_mut(match_id)?;
            check_version(m, expected_version)?;
            lifecycle::schedule(m, at)?;
            let snapshot = m.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.schedule",
                EntityRef::new(EntityKind::Match, match_id),
                at.to_rfc3339(),
            );
            Ok(snapshot)
        })
    }

    /// Submit one side's score report. Two agreeing reports auto-confirm
    /// and propagate.
    pub fn report_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        submission: ScoreReport,
        expected_version: Option<u64>,
        actor: &str,
    ) -> EngineResult<Match> {
        self.with_data(tournament_id, |data| {
            let bracket = data.bracket_mut()?;
            let m = bracket.get_mut(match_id)?;
            check_version(m, expected_version)?;
            let outcome = lifecycle::report(m, submission)?;
            if outcome.is_some() {
                propagate(bracket, match_id);
            }
            let snapshot = bracket.get(match_id)?.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.report",
                EntityRef::new(EntityKind::Match, match_id),
                format!(
                    "slot {} reported {}-{}",
                    submission.reporter_slot, submission.score1, submission.score2
                ),
            );
            Ok(snapshot)
        })
    }

    /// Admin confirmation of a reported or disputed match
    pub fn confirm_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        score1: u32,
        score2: u32,
        winner_slot: SlotIndex,
        expected_version: Option<u64>,
        actor: &str,
    ) -> EngineResult<Match> {
        self.with_data(tournament_id, |data| {
            let bracket = data.bracket_mut()?;
            let m = bracket.get_mut(match_id)?;
            check_version(m, expected_version)?;
            lifecycle::confirm(m, score1, score2, winner_slot)?;
            propagate(bracket, match_id);
            let snapshot = bracket.get(match_id)?.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.confirm",
                EntityRef::new(EntityKind::Match, match_id),
                format!("{score1}-{score2}, winner slot {winner_slot}"),
            );
            Ok(snapshot)
        })
    }

    /// Discard pending reports, returning the match to its unplayed state
    pub fn reject_reports(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        expected_version: Option<u64>,
        actor: &str,
    ) -> EngineResult<Match> {
        self.with_data(tournament_id, |data| {
            let m = data.bracket_mut()?.get_mut(match_id)?;
            check_version(m, expected_version)?;
            lifecycle::reject(m)?;
            let snapshot = m.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.reject",
                EntityRef::new(EntityKind::Match, match_id),
                String::new(),
            );
            Ok(snapshot)
        })
    }

    /// Void an unconfirmed match; the bracket position forwards a BYE
    pub fn void_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        expected_version: Option<u64>,
        actor: &str,
    ) -> EngineResult<Match> {
        self.with_data(tournament_id, |data| {
            let bracket = data.bracket_mut()?;
            let m = bracket.get_mut(match_id)?;
            check_version(m, expected_version)?;
            lifecycle::void(m)?;
            propagate(bracket, match_id);
            let snapshot = bracket.get(match_id)?.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.void",
                EntityRef::new(EntityKind::Match, match_id),
                String::new(),
            );
            Ok(snapshot)
        })
    }

    /// Reopen a confirmed match for replay, unwinding every downstream
    /// placement its result fed. The replay keeps the original participants;
    /// `slots` may restate them in the same or swapped order, `None` reuses
    /// the current order.
    pub fn replay_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        slots: Option<[Slot; 2]>,
        expected_version: Option<u64>,
        actor: &str,
    ) -> EngineResult<Match> {
        self.with_data(tournament_id, |data| {
            let bracket = data.bracket_mut()?;
            let current = bracket.get(match_id)?;
            check_version(current, expected_version)?;
            let current = current.slots;
            let slots = slots.unwrap_or(current);
            if slots != current && slots != [current[1], current[0]] {
                return Err(EngineError::ReplaySlotsMismatch(match_id));
            }
            let cleared = unresolve_downstream(bracket, match_id);
            let m = bracket.get_mut(match_id)?;
            lifecycle::reset_for_replay(m, slots)?;
            let snapshot = m.clone();
            self.audit.record(
                tournament_id,
                actor,
                "match.replay",
                EntityRef::new(EntityKind::Match, match_id),
                format!("{} downstream matches unwound", cleared.len()),
            );
            Ok(snapshot)
        })
    }

    // ---- pick/ban ------------------------------------------------------

    /// Attach (or replace) the tournament's map negotiation ruleset
    pub fn attach_ruleset(
        &self,
        tournament_id: TournamentId,
        ruleset: Ruleset,
        actor: &str,
    ) -> EngineResult<()> {
        ruleset.validate()?;
        self.with_data(tournament_id, |data| {
            let pool = ruleset.maps.len();
            data.ruleset = Some(ruleset);
            self.audit.record(
                tournament_id,
                actor,
                "pickban.attach_ruleset",
                EntityRef::new(EntityKind::Tournament, tournament_id),
                format!("{pool} maps"),
            );
            Ok(())
        })
    }

    /// Initiate a match's map negotiation
    pub fn start_pickban(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        mode: StartMode,
        actor: &str,
    ) -> EngineResult<PickBanState> {
        self.with_data(tournament_id, |data| {
            let ruleset = data
                .ruleset
                .clone()
                .ok_or(EngineError::NoRuleset(tournament_id))?;
            let best_of = data.bracket()?.get(match_id)?.best_of;
            if data.pickban.contains_key(&match_id) {
                return Err(EngineError::PickBanAlreadyStarted(match_id));
            }
            let state = pickban::start(match_id, best_of, &ruleset, mode, &mut *self.rng()?)?;
            data.pickban.insert(match_id, state.clone());
            self.audit.record(
                tournament_id,
                actor,
                "pickban.start",
                EntityRef::new(EntityKind::PickBan, match_id),
                format!("starter slot {}", state.starter),
            );
            Ok(state)
        })
    }

    /// Submit the next ban/pick step of a match's negotiation
    pub fn submit_pickban_step(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        acting_slot: SlotIndex,
        step_index: usize,
        map_key: &str,
        actor: &str,
    ) -> EngineResult<PickBanState> {
        self.with_data(tournament_id, |data| {
            let state = pickban_mut(data, match_id)?;
            state.submit_step(acting_slot, step_index, map_key)?;
            let snapshot = state.clone();
            self.audit.record(
                tournament_id,
                actor,
                "pickban.step",
                EntityRef::new(EntityKind::PickBan, match_id),
                format!("slot {acting_slot} step {step_index}: {map_key}"),
            );
            Ok(snapshot)
        })
    }

    /// Record the side choice for a picked map
    pub fn choose_side(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        choosing_slot: SlotIndex,
        map_key: &str,
        slot_one_side: MapSide,
        actor: &str,
    ) -> EngineResult<PickBanState> {
        self.with_data(tournament_id, |data| {
            let state = pickban_mut(data, match_id)?;
            state.choose_side(choosing_slot, map_key, slot_one_side)?;
            let snapshot = state.clone();
            self.audit.record(
                tournament_id,
                actor,
                "pickban.side",
                EntityRef::new(EntityKind::PickBan, match_id),
                format!("{map_key}: slot 1 plays {slot_one_side:?}"),
            );
            Ok(snapshot)
        })
    }

    /// Auto-assign the side for a picked map whose chooser never acted
    pub fn auto_side(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        map_key: &str,
        actor: &str,
    ) -> EngineResult<PickBanState> {
        self.with_data(tournament_id, |data| {
            let state = pickban_mut(data, match_id)?;
            state.auto_side(map_key, &mut *self.rng()?)?;
            let snapshot = state.clone();
            self.audit.record(
                tournament_id,
                actor,
                "pickban.auto_side",
                EntityRef::new(EntityKind::PickBan, match_id),
                map_key.to_string(),
            );
            Ok(snapshot)
        })
    }

    /// Lock a finished negotiation, enabling scheduling
    pub fn lock_pickban(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        actor: &str,
    ) -> EngineResult<PickBanState> {
        self.with_data(tournament_id, |data| {
            let state = pickban_mut(data, match_id)?;
            state.lock()?;
            let snapshot = state.clone();
            self.audit.record(
                tournament_id,
                actor,
                "pickban.lock",
                EntityRef::new(EntityKind::PickBan, match_id),
                String::new(),
            );
            Ok(snapshot)
        })
    }

    /// Delete a match's negotiation entirely, returning to pre-initiation.
    /// Refused once the parent match is confirmed.
    pub fn reset_pickban(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        actor: &str,
    ) -> EngineResult<()> {
        self.with_data(tournament_id, |data| {
            if data.bracket()?.get(match_id)?.status == MatchStatus::Confirmed {
                return Err(EngineError::PickBanFrozen);
            }
            data.pickban
                .remove(&match_id)
                .ok_or(StoreError::PickBanNotFound(match_id))?;
            self.audit.record(
                tournament_id,
                actor,
                "pickban.reset",
                EntityRef::new(EntityKind::PickBan, match_id),
                String::new(),
            );
            Ok(())
        })
    }

    // ---- lineup duels --------------------------------------------------

    /// Replace one slot's ordered lineup, creating the duel sheet on first
    /// submission
    pub fn replace_lineup(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        slot: SlotIndex,
        users: Vec<UserId>,
        actor: &str,
    ) -> EngineResult<DuelSheet> {
        check_slot(slot)?;
        self.with_data(tournament_id, |data| {
            ensure_mode(data, match_id, MatchMode::LineupDuels)?;
            if !data.duel_sheets.contains_key(&match_id) {
                let sheet = new_duel_sheet(data, match_id)?;
                data.duel_sheets.insert(match_id, sheet);
            }
            let sheet = data
                .duel_sheets
                .get_mut(&match_id)
                .ok_or(StoreError::DuelSheetNotFound(match_id))?;
            sheet.replace_lineup(slot, users)?;
            let snapshot = sheet.clone();
            self.audit.record(
                tournament_id,
                actor,
                "duels.replace_lineup",
                EntityRef::new(EntityKind::Duel, match_id),
                format!("slot {slot}"),
            );
            Ok(snapshot)
        })
    }

    /// Generate the duels from the submitted lineups
    pub fn start_duels(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        actor: &str,
    ) -> EngineResult<DuelSheet> {
        self.with_data(tournament_id, |data| {
            let sheet = data
                .duel_sheets
                .get_mut(&match_id)
                .ok_or(StoreError::DuelSheetNotFound(match_id))?;
            sheet.start()?;
            let snapshot = sheet.clone();
            self.audit.record(
                tournament_id,
                actor,
                "duels.start",
                EntityRef::new(EntityKind::Duel, match_id),
                format!("{} duels", snapshot.duels.len()),
            );
            Ok(snapshot)
        })
    }

    /// Confirm one duel. Once a side reaches a strict majority the parent
    /// match is confirmed and propagated.
    pub fn confirm_duel(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        duel_index: usize,
        winner_slot: SlotIndex,
        reporter: UserId,
        actor: &str,
    ) -> EngineResult<DuelSheet> {
        check_slot(winner_slot)?;
        self.with_data(tournament_id, |data| {
            let sheet = data
                .duel_sheets
                .get_mut(&match_id)
                .ok_or(StoreError::DuelSheetNotFound(match_id))?;
            sheet.confirm_duel(duel_index, winner_slot, reporter)?;
            let decided = sheet.decided();
            let wins = sheet.wins();
            let snapshot = sheet.clone();
            if let Some(winner) = decided {
                finalize_aggregate(data, match_id, winner, (wins[0] as u32, wins[1] as u32))?;
            }
            self.audit.record(
                tournament_id,
                actor,
                "duels.confirm",
                EntityRef::new(EntityKind::Duel, match_id),
                format!("duel {duel_index} to slot {winner_slot}"),
            );
            Ok(snapshot)
        })
    }

    /// Remove a single erroneous duel entry
    pub fn remove_duel(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        duel_index: usize,
        actor: &str,
    ) -> EngineResult<DuelSheet> {
        self.with_data(tournament_id, |data| {
            let sheet = data
                .duel_sheets
                .get_mut(&match_id)
                .ok_or(StoreError::DuelSheetNotFound(match_id))?;
            sheet.remove_duel(duel_index)?;
            let snapshot = sheet.clone();
            self.audit.record(
                tournament_id,
                actor,
                "duels.remove",
                EntityRef::new(EntityKind::Duel, match_id),
                format!("duel {duel_index}"),
            );
            Ok(snapshot)
        })
    }

    // ---- multi-round scoring -------------------------------------------

    /// Append a scored round. Once the configured rounds are complete and
    /// untied the parent match is confirmed and propagated.
    pub fn push_round(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        kind: RoundKind,
        points: [u32; 2],
        actor: &str,
    ) -> EngineResult<RoundLog> {
        self.with_data(tournament_id, |data| {
            ensure_mode(data, match_id, MatchMode::MultiRound)?;
            let target = data.bracket()?.get(match_id)?.best_of as u32;
            let log = data
                .round_logs
                .entry(match_id)
                .or_insert_with(|| RoundLog::new(match_id, target));
            let entry = log.push_round(kind, points)?;
            let decided = log.decided();
            let snapshot = log.clone();
            if let Some((winner, totals)) = decided {
                finalize_aggregate(data, match_id, winner, (totals[0], totals[1]))?;
            }
            self.audit.record(
                tournament_id,
                actor,
                "rounds.push",
                EntityRef::new(EntityKind::Round, match_id),
                format!(
                    "round {} ({:?}) {}-{}",
                    entry.round_index, entry.kind, points[0], points[1]
                ),
            );
            Ok(snapshot)
        })
    }

    /// Remove a single erroneous round entry
    pub fn remove_round(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        round_index: u32,
        actor: &str,
    ) -> EngineResult<RoundLog> {
        self.with_data(tournament_id, |data| {
            let log = data
                .round_logs
                .get_mut(&match_id)
                .ok_or(StoreError::RoundLogNotFound(match_id))?;
            log.remove_round(round_index)?;
            let snapshot = log.clone();
            self.audit.record(
                tournament_id,
                actor,
                "rounds.remove",
                EntityRef::new(EntityKind::Round, match_id),
                format!("round {round_index}"),
            );
            Ok(snapshot)
        })
    }

    // ---- queries -------------------------------------------------------

    /// Every match of a tournament in id order
    pub fn list_matches(&self, tournament_id: TournamentId) -> EngineResult<Vec<Match>> {
        self.with_data(tournament_id, |data| {
            Ok(data.bracket()?.matches.values().cloned().collect())
        })
    }

    /// One match with its negotiation and aggregation records
    pub fn match_detail(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> EngineResult<MatchDetail> {
        self.with_data(tournament_id, |data| {
            Ok(MatchDetail {
                game: data.bracket()?.get(match_id)?.clone(),
                pickban: data.pickban.get(&match_id).cloned(),
                duels: data.duel_sheets.get(&match_id).cloned(),
                rounds: data.round_logs.get(&match_id).cloned(),
            })
        })
    }

    /// The pending pick/ban submissions across a tournament, for
    /// notification relays
    pub fn pending_pickban_tasks(
        &self,
        tournament_id: TournamentId,
    ) -> EngineResult<Vec<PendingTask>> {
        self.with_data(tournament_id, |data| {
            let mut tasks: Vec<PendingTask> = data
                .pickban
                .values()
                .filter_map(PickBanState::next_task)
                .collect();
            tasks.sort_by_key(|t| t.match_id);
            Ok(tasks)
        })
    }
}

// Caller-supplied slot indices go straight into two-slot arrays; reject
// them before any lock is taken.
fn check_slot(slot: SlotIndex) -> EngineResult<()> {
    if slot > 1 {
        return Err(EngineError::SlotOutOfRange(slot));
    }
    Ok(())
}

fn check_version(m: &Match, expected: Option<u64>) -> EngineResult<()> {
    match expected {
        Some(v) if v != m.version => Err(StoreError::ConcurrentModification.into()),
        _ => Ok(()),
    }
}

fn pickban_mut(
    data: &mut TournamentData,
    match_id: MatchId,
) -> EngineResult<&mut PickBanState> {
    data.pickban
        .get_mut(&match_id)
        .ok_or_else(|| StoreError::PickBanNotFound(match_id).into())
}

fn ensure_mode(
    data: &TournamentData,
    match_id: MatchId,
    mode: MatchMode,
) -> EngineResult<()> {
    let m = data.bracket()?.get(match_id)?;
    if m.mode != mode {
        return Err(EngineError::NotAggregated(match_id));
    }
    Ok(())
}

/// Build a duel sheet from the match's resolved teams and the tournament's
/// generation options
fn new_duel_sheet(data: &TournamentData, match_id: MatchId) -> EngineResult<DuelSheet> {
    let m = data.bracket()?.get(match_id)?;
    let mut rosters: [Vec<UserId>; 2] = [Vec::new(), Vec::new()];
    for (i, slot) in m.slots.iter().enumerate() {
        let team = slot.entrant().ok_or(LifecycleError::MatchNotReportable)?;
        rosters[i] = data
            .entrants
            .iter()
            .find(|e| e.id == team)
            .map(|e| e.members.clone())
            .unwrap_or_default();
    }
    let options = data
        .options
        .as_ref()
        .ok_or(StoreError::NoBracket)?;
    // An even duel count needs the extra captain duel to avoid splits
    let captain_tiebreak = options.team_size % 2 == 0;
    Ok(DuelSheet::new(
        match_id,
        rosters,
        options.team_size,
        captain_tiebreak,
    ))
}

/// Write an aggregate outcome as the parent match's confirmed result and
/// propagate it
fn finalize_aggregate(
    data: &mut TournamentData,
    match_id: MatchId,
    winner_slot: SlotIndex,
    score: (u32, u32),
) -> EngineResult<()> {
    let bracket = data.bracket_mut()?;
    let m = bracket.get_mut(match_id)?;
    if m.status == MatchStatus::Confirmed {
        return Ok(());
    }
    lifecycle::force_confirm(m, Some(score), winner_slot)?;
    propagate(bracket, match_id);
    Ok(())
}
