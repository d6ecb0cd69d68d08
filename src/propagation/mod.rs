//! Result propagation across the bracket.
//!
//! Routes are computed from match coordinates (`winner_route`/`loser_route`)
//! rather than stored as edges. Placement is idempotent: a target slot that
//! already holds the expected participant is a no-op, so retrying after a
//! crash between "confirm" and "propagate" is safe. Failures to place are
//! logged and never unwind the triggering confirmation.

use std::collections::VecDeque;

use log::warn;

use crate::bracket::{
    BracketKind, Match, MatchCoord, MatchId, MatchStatus, Slot, SlotIndex, loser_route,
    winner_route,
};
use crate::lifecycle;
use crate::store::BracketState;

/// Forward a resolved match's outcome through the bracket.
///
/// Works a queue instead of recursing: BYE-advances confirmed along the way
/// re-enter the queue until the cascade settles. Returns the ids of matches
/// auto-confirmed (or voided) by BYE resolution.
pub fn propagate(bracket: &mut BracketState, source: MatchId) -> Vec<MatchId> {
    let mut queue = VecDeque::from([source]);
    let mut auto_resolved = Vec::new();

    while let Some(id) = queue.pop_front() {
        let Some(m) = bracket.matches.get(&id) else {
            warn!("propagation source match {id} is missing");
            continue;
        };
        if !matches!(m.status, MatchStatus::Confirmed | MatchStatus::Void) {
            continue;
        }
        let coord = m.coord();
        let winner = m.winner_value();
        let loser = m.loser_value();

        if coord.bracket == BracketKind::Grand && coord.round == 1 {
            settle_grand_reset(bracket, id);
            continue;
        }

        for (value, route) in [
            (winner, winner_route(bracket.format, bracket.winners_rounds, coord)),
            (loser, loser_route(bracket.format, bracket.winners_rounds, coord)),
        ] {
            let Some((target, slot)) = route else {
                continue;
            };
            if place(bracket, &target, slot, value)
                && let Some(resolved) = try_auto_resolve(bracket, &target)
            {
                auto_resolved.push(resolved);
                queue.push_back(resolved);
            }
        }
    }
    auto_resolved
}

/// Write a participant into a target slot. Returns whether the slot changed.
fn place(bracket: &mut BracketState, target: &MatchCoord, slot: SlotIndex, value: Slot) -> bool {
    if value.is_empty() {
        return false;
    }
    let Some(m) = bracket.at_mut(target) else {
        warn!("propagation target {target:?} does not exist");
        return false;
    };
    if m.slots[slot] == value {
        return false;
    }
    if !m.slots[slot].is_empty() {
        warn!(
            "match {} slot {slot} already holds {:?}, not overwriting with {value:?}",
            m.id, m.slots[slot]
        );
        return false;
    }
    m.slots[slot] = value;
    m.touch();
    true
}

/// Auto-resolve a match that received a BYE: a real entrant against a BYE is
/// confirmed in the entrant's favor, BYE against BYE is voided so the BYE
/// keeps forwarding. Returns the match id when it resolved.
fn try_auto_resolve(bracket: &mut BracketState, coord: &MatchCoord) -> Option<MatchId> {
    let m = bracket.at_mut(coord)?;
    if !matches!(m.status, MatchStatus::Pending | MatchStatus::Scheduled) {
        return None;
    }
    match m.slots {
        [Slot::Bye, Slot::Bye] => {
            let id = m.id;
            if lifecycle::void(m).is_err() {
                return None;
            }
            Some(id)
        }
        [Slot::Entrant(_), Slot::Bye] => confirm_walkover(m, 0),
        [Slot::Bye, Slot::Entrant(_)] => confirm_walkover(m, 1),
        _ => None,
    }
}

fn confirm_walkover(m: &mut Match, winner_slot: SlotIndex) -> Option<MatchId> {
    let id = m.id;
    match lifecycle::force_confirm(m, None, winner_slot) {
        Ok(_) => Some(id),
        Err(err) => {
            warn!("walkover confirmation for match {id} failed: {err}");
            None
        }
    }
}

/// Grand-final round 1 aftermath: a losers-bracket finalist winning forces
/// the round-2 reset match; a winners-bracket finalist winning ends the
/// tournament and voids round 2.
fn settle_grand_reset(bracket: &mut BracketState, grand_one: MatchId) {
    let Ok(m) = bracket.get(grand_one) else {
        return;
    };
    let slots = m.slots;
    let winner_slot = m.winner_slot;
    let reset_coord = MatchCoord::new(BracketKind::Grand, 2, 1);
    let Some(reset) = bracket.at_mut(&reset_coord) else {
        warn!("grand final reset match is missing");
        return;
    };
    if !matches!(reset.status, MatchStatus::Pending | MatchStatus::Scheduled) {
        return;
    }
    if winner_slot == Some(1) {
        // The undefeated finalist lost its first match; both meet again
        if reset.slots != slots {
            reset.slots = slots;
            reset.touch();
        }
    } else if lifecycle::void(reset).is_err() {
        warn!("could not void the unused grand final reset match");
    }
}

/// Confirm every walkover the initial BYE padding produced and cascade the
/// results. Called once right after generation.
pub fn resolve_byes(bracket: &mut BracketState) -> Vec<MatchId> {
    let coords: Vec<MatchCoord> = bracket.matches.values().map(Match::coord).collect();
    let mut auto_resolved = Vec::new();
    for coord in coords {
        if let Some(id) = try_auto_resolve(bracket, &coord) {
            auto_resolved.push(id);
            auto_resolved.extend(propagate(bracket, id));
        }
    }
    auto_resolved
}

/// Unwind every downstream placement fed by a match that is being replayed.
///
/// Clears the slots the source's winner/loser occupy in later matches and
/// resets any result those matches had, transitively.
pub fn unresolve_downstream(bracket: &mut BracketState, source: MatchId) -> Vec<MatchId> {
    let mut queue = VecDeque::from([source]);
    let mut cleared = Vec::new();

    while let Some(id) = queue.pop_front() {
        let Some(m) = bracket.matches.get(&id) else {
            continue;
        };
        let coord = m.coord();
        let mut targets: Vec<(MatchCoord, Option<SlotIndex>)> = Vec::new();
        if coord.bracket == BracketKind::Grand && coord.round == 1 {
            // Both reset-match slots came from round 1
            targets.push((MatchCoord::new(BracketKind::Grand, 2, 1), None));
        } else {
            if let Some((t, s)) = winner_route(bracket.format, bracket.winners_rounds, coord) {
                targets.push((t, Some(s)));
            }
            if let Some((t, s)) = loser_route(bracket.format, bracket.winners_rounds, coord) {
                targets.push((t, Some(s)));
            }
        }

        for (target, slot) in targets {
            let Some(tm) = bracket.at_mut(&target) else {
                continue;
            };
            let occupied = match slot {
                Some(s) => !tm.slots[s].is_empty(),
                None => tm.slots.iter().any(|s| !s.is_empty()) || tm.status == MatchStatus::Void,
            };
            if !occupied {
                continue;
            }
            queue.push_back(tm.id);
            cleared.push(tm.id);
            match slot {
                Some(s) => tm.slots[s] = Slot::Empty,
                None => tm.slots = [Slot::Empty, Slot::Empty],
            }
            tm.reports = [None, None];
            tm.winner_slot = None;
            tm.score = None;
            tm.status = if tm.scheduled_at.is_some() {
                MatchStatus::Scheduled
            } else {
                MatchStatus::Pending
            };
            tm.touch();
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{Format, GenerationOptions, SeedEntry, generate, winners_rounds};
    use crate::lifecycle::force_confirm;

    fn build(format: Format, n: usize) -> BracketState {
        let entrants: Vec<SeedEntry> = (1..=n as i64)
            .map(|i| SeedEntry::solo(i * 10, &format!("p{i}"), Some(i as u32)))
            .collect();
        let options = GenerationOptions::solo(format, 3);
        let mut next_id = 1;
        let matches = generate(1, &entrants, &options, &mut next_id).unwrap();
        let rounds = winners_rounds((n as u32).next_power_of_two());
        BracketState::new(format, rounds, matches)
    }

    fn confirm_at(bracket: &mut BracketState, coord: MatchCoord, winner_slot: SlotIndex) {
        let m = bracket.at_mut(&coord).unwrap();
        force_confirm(m, Some((2, 0)), winner_slot).unwrap();
        let id = m.id;
        propagate(bracket, id);
    }

    fn coord(bracket_kind: BracketKind, round: u32, pos: u32) -> MatchCoord {
        MatchCoord::new(bracket_kind, round, pos)
    }

    #[test]
    fn test_winner_advances_idempotently() {
        let mut bracket = build(Format::SingleElim, 4);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 1), 0);

        let final_match = bracket.at(&coord(BracketKind::Winners, 2, 1)).unwrap();
        assert_eq!(final_match.slots[0], Slot::Entrant(10));
        let version = final_match.version;

        // Re-running the cascade must not touch anything
        let id = bracket.id_at(&coord(BracketKind::Winners, 1, 1)).unwrap();
        propagate(&mut bracket, id);
        let final_match = bracket.at(&coord(BracketKind::Winners, 2, 1)).unwrap();
        assert_eq!(final_match.version, version);
    }

    #[test]
    fn test_loser_drops_to_losers_bracket() {
        let mut bracket = build(Format::DoubleElim, 4);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 2), 1);

        // Round-1 pairs for four entrants are (1,4) and (2,3)
        let l1 = bracket.at(&coord(BracketKind::Losers, 1, 1)).unwrap();
        assert_eq!(l1.slots, [Slot::Entrant(40), Slot::Entrant(20)]);
    }

    #[test]
    fn test_bye_walkovers_cascade_from_generation() {
        // 5 entrants pad to 8: three round-1 BYEs auto-confirm
        let mut bracket = build(Format::SingleElim, 5);
        let resolved = resolve_byes(&mut bracket);
        assert_eq!(resolved.len(), 3);

        let semi = bracket.at(&coord(BracketKind::Winners, 2, 1)).unwrap();
        assert_eq!(semi.slots[0], Slot::Entrant(10));
        let semi2 = bracket.at(&coord(BracketKind::Winners, 2, 2)).unwrap();
        assert_eq!(semi2.slots, [Slot::Entrant(30), Slot::Entrant(20)]);
    }

    #[test]
    fn test_bye_forwards_through_losers_bracket() {
        // 5 entrants, double elim: the BYE-fed losers matches void and keep
        // forwarding until a real loser arrives
        let mut bracket = build(Format::DoubleElim, 5);
        resolve_byes(&mut bracket);

        let l1 = bracket.at(&coord(BracketKind::Losers, 1, 2)).unwrap();
        assert_eq!(l1.status, MatchStatus::Void);
    }

    #[test]
    fn test_grand_final_reset_populated_on_upset() {
        let mut bracket = build(Format::DoubleElim, 4);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 2), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 2, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Losers, 1, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Losers, 2, 1), 0);

        let g1 = bracket.at(&coord(BracketKind::Grand, 1, 1)).unwrap();
        assert_eq!(g1.slots, [Slot::Entrant(10), Slot::Entrant(40)]);

        // Losers finalist wins round 1: the reset match activates
        confirm_at(&mut bracket, coord(BracketKind::Grand, 1, 1), 1);
        let g2 = bracket.at(&coord(BracketKind::Grand, 2, 1)).unwrap();
        assert_eq!(g2.slots, [Slot::Entrant(10), Slot::Entrant(40)]);
        assert_eq!(g2.status, MatchStatus::Pending);
    }

    #[test]
    fn test_grand_final_reset_voided_when_champion_holds() {
        let mut bracket = build(Format::DoubleElim, 4);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 2), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 2, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Losers, 1, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Losers, 2, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Grand, 1, 1), 0);

        let g2 = bracket.at(&coord(BracketKind::Grand, 2, 1)).unwrap();
        assert_eq!(g2.status, MatchStatus::Void);
    }

    #[test]
    fn test_unresolve_clears_downstream_transitively() {
        let mut bracket = build(Format::SingleElim, 8);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 1), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 1, 2), 0);
        confirm_at(&mut bracket, coord(BracketKind::Winners, 2, 1), 0);

        let final_match = bracket.at(&coord(BracketKind::Winners, 3, 1)).unwrap();
        assert_eq!(final_match.slots[0], Slot::Entrant(10));

        let source = bracket.id_at(&coord(BracketKind::Winners, 1, 1)).unwrap();
        let cleared = unresolve_downstream(&mut bracket, source);
        assert_eq!(cleared.len(), 2);

        let semi = bracket.at(&coord(BracketKind::Winners, 2, 1)).unwrap();
        assert_eq!(semi.slots[0], Slot::Empty);
        // The other feeder's winner stays in place
        assert_eq!(semi.slots[1], Slot::Entrant(40));
        assert_eq!(semi.status, MatchStatus::Pending);
        let final_match = bracket.at(&coord(BracketKind::Winners, 3, 1)).unwrap();
        assert_eq!(final_match.slots[0], Slot::Empty);
    }
}
