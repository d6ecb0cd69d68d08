//! Bracket topology builder.
//!
//! Pure functions that turn a seeded participant list and a format into the
//! full set of match skeletons plus the advancement routes between them.
//! Routes are computed from (bracket, round, position) coordinates so they can
//! be re-derived from persisted matches without storing an explicit graph.

use std::collections::HashSet;

use super::errors::{GenerationError, GenerationResult};
use super::models::{
    BracketKind, Format, GenerationOptions, Match, MatchCoord, MatchId, ParticipantKind, SeedEntry,
    Slot, SlotIndex, TournamentId,
};

/// Canonical bracket seeding order for a power-of-two bracket size.
///
/// Consecutive pairs are round-1 matches. Built by repeatedly pairing each
/// surviving seed `s` with `size + 1 - s` and mirroring the bottom half of
/// the pair list, so the top seeds avoid each other as long as possible:
/// for size 8 the order is `[1, 8, 4, 5, 3, 6, 2, 7]`.
#[must_use]
pub fn seed_order(size: u32) -> Vec<u32> {
    debug_assert!(size.is_power_of_two());
    let mut order = vec![1u32];
    while (order.len() as u32) < size {
        let next_size = order.len() as u32 * 2;
        let pairs: Vec<[u32; 2]> = order.iter().map(|&s| [s, next_size + 1 - s]).collect();
        let half = pairs.len().div_ceil(2);
        let mut next = Vec::with_capacity(next_size as usize);
        for pair in &pairs[..half] {
            next.extend_from_slice(pair);
        }
        for pair in pairs[half..].iter().rev() {
            next.extend_from_slice(pair);
        }
        order = next;
    }
    order
}

/// Number of winners-bracket rounds for a padded bracket size
#[must_use]
pub const fn winners_rounds(padded_size: u32) -> u32 {
    padded_size.trailing_zeros()
}

/// Number of losers-bracket rounds for a winners bracket of `rounds` rounds
#[must_use]
pub const fn losers_rounds(rounds: u32) -> u32 {
    if rounds < 2 { 0 } else { 2 * rounds - 2 }
}

/// Match count of losers-bracket round `round` for a padded bracket size
#[must_use]
pub fn losers_round_matches(padded_size: u32, round: u32) -> u32 {
    let exp = (round + 1) / 2 + 1;
    (padded_size >> exp).max(1)
}

/// Where a match's winner advances to: target coordinate plus slot index.
///
/// `winners_rounds` is the winners-bracket round count of the tournament the
/// coordinate belongs to. Returns `None` for terminal matches; the grand
/// final's conditional round-2 handling lives in the propagation engine.
#[must_use]
pub fn winner_route(
    format: Format,
    winners_rounds: u32,
    coord: MatchCoord,
) -> Option<(MatchCoord, SlotIndex)> {
    let MatchCoord {
        bracket,
        round,
        round_pos: pos,
    } = coord;
    match bracket {
        BracketKind::RoundRobin | BracketKind::Grand => None,
        BracketKind::Winners => {
            if round < winners_rounds {
                Some((
                    MatchCoord::new(BracketKind::Winners, round + 1, pos.div_ceil(2)),
                    pair_slot(pos),
                ))
            } else if format == Format::DoubleElim {
                Some((MatchCoord::new(BracketKind::Grand, 1, 1), 0))
            } else {
                None
            }
        }
        BracketKind::Losers => {
            if round % 2 == 1 {
                // Odd round winner meets the next winners-bracket drop
                Some((MatchCoord::new(BracketKind::Losers, round + 1, pos), 0))
            } else if round == losers_rounds(winners_rounds) {
                // Losers-bracket champion advances to the grand final
                Some((MatchCoord::new(BracketKind::Grand, 1, 1), 1))
            } else {
                Some((
                    MatchCoord::new(BracketKind::Losers, round + 1, pos.div_ceil(2)),
                    pair_slot(pos),
                ))
            }
        }
    }
}

/// Where a match's loser drops to (double elimination only).
///
/// Winners round 1 losers merge pairwise into losers round 1; round `r >= 2`
/// losers drop into losers round `2r - 2` at the same position, slot 2.
#[must_use]
pub fn loser_route(
    format: Format,
    winners_rounds: u32,
    coord: MatchCoord,
) -> Option<(MatchCoord, SlotIndex)> {
    if format != Format::DoubleElim || coord.bracket != BracketKind::Winners {
        return None;
    }
    let pos = coord.round_pos;
    if winners_rounds < 2 {
        // Two-entrant bracket: the sole loser goes straight to the grand final
        return Some((MatchCoord::new(BracketKind::Grand, 1, 1), 1));
    }
    if coord.round == 1 {
        Some((
            MatchCoord::new(BracketKind::Losers, 1, pos.div_ceil(2)),
            pair_slot(pos),
        ))
    } else {
        Some((
            MatchCoord::new(BracketKind::Losers, 2 * coord.round - 2, pos),
            1,
        ))
    }
}

const fn pair_slot(pos: u32) -> SlotIndex {
    if pos % 2 == 1 { 0 } else { 1 }
}

/// Generate the complete set of match skeletons for a tournament.
///
/// The entrant list is ordered before seeding: explicitly seeded entrants
/// first by ascending seed, then unseeded entrants in join order. Round 1
/// slots are populated (with `Slot::Bye` padding up to the next power of
/// two); all later rounds start `Slot::Empty`. BYE auto-resolution is the
/// propagation engine's job and runs after insertion.
pub fn generate(
    tournament_id: TournamentId,
    entrants: &[SeedEntry],
    options: &GenerationOptions,
    next_id: &mut MatchId,
) -> GenerationResult<Vec<Match>> {
    if entrants.len() < 2 {
        return Err(GenerationError::InsufficientParticipants(entrants.len()));
    }
    let mut seen = HashSet::new();
    for entry in entrants {
        if let Some(seed) = entry.seed
            && !seen.insert(seed)
        {
            return Err(GenerationError::DuplicateSeed(seed));
        }
    }
    if options.kind == ParticipantKind::Team {
        let incomplete: Vec<String> = entrants
            .iter()
            .filter(|entry| entry.members.len() != options.team_size)
            .map(|entry| entry.name.clone())
            .collect();
        if !incomplete.is_empty() {
            return Err(GenerationError::IncompleteRoster {
                team_size: options.team_size,
                teams: incomplete,
            });
        }
    }

    let ordered = seed_sorted(entrants);
    let matches = match options.format {
        Format::SingleElim | Format::DoubleElim => {
            elimination(tournament_id, &ordered, options, next_id)
        }
        Format::RoundRobin => round_robin(tournament_id, &ordered, options, next_id),
    };
    Ok(matches)
}

/// Seeded entrants first by ascending seed, then unseeded in join order
fn seed_sorted(entrants: &[SeedEntry]) -> Vec<&SeedEntry> {
    let mut seeded: Vec<&SeedEntry> = entrants.iter().filter(|e| e.seed.is_some()).collect();
    seeded.sort_by_key(|e| e.seed);
    seeded.extend(entrants.iter().filter(|e| e.seed.is_none()));
    seeded
}

fn elimination(
    tournament_id: TournamentId,
    ordered: &[&SeedEntry],
    options: &GenerationOptions,
    next_id: &mut MatchId,
) -> Vec<Match> {
    let padded = (ordered.len() as u32).next_power_of_two().max(2);
    let rounds = winners_rounds(padded);
    let order = seed_order(padded);

    let mut matches = Vec::new();
    let mut push = |coord: MatchCoord, slots: [Slot; 2], matches: &mut Vec<Match>| {
        let id = *next_id;
        *next_id += 1;
        matches.push(Match::new(
            id,
            tournament_id,
            coord,
            options.best_of,
            options.mode,
            slots,
        ));
    };

    // Winners round 1 from the seeding order; effective seed n is the n-th
    // entrant of the sorted list, seeds past the real count are byes.
    for (i, pair) in order.chunks_exact(2).enumerate() {
        let slots = [seed_slot(ordered, pair[0]), seed_slot(ordered, pair[1])];
        push(
            MatchCoord::new(BracketKind::Winners, 1, i as u32 + 1),
            slots,
            &mut matches,
        );
    }
    for round in 2..=rounds {
        for pos in 1..=(padded >> round) {
            push(
                MatchCoord::new(BracketKind::Winners, round, pos),
                [Slot::Empty, Slot::Empty],
                &mut matches,
            );
        }
    }

    if options.format == Format::DoubleElim {
        for round in 1..=losers_rounds(rounds) {
            for pos in 1..=losers_round_matches(padded, round) {
                push(
                    MatchCoord::new(BracketKind::Losers, round, pos),
                    [Slot::Empty, Slot::Empty],
                    &mut matches,
                );
            }
        }
        // Grand final and its potential reset decider
        push(
            MatchCoord::new(BracketKind::Grand, 1, 1),
            [Slot::Empty, Slot::Empty],
            &mut matches,
        );
        push(
            MatchCoord::new(BracketKind::Grand, 2, 1),
            [Slot::Empty, Slot::Empty],
            &mut matches,
        );
    }
    matches
}

fn seed_slot(ordered: &[&SeedEntry], seed: u32) -> Slot {
    ordered
        .get(seed as usize - 1)
        .map_or(Slot::Bye, |entry| Slot::Entrant(entry.id))
}

/// Every unordered pair of entrants is one match; round 0, no elimination.
fn round_robin(
    tournament_id: TournamentId,
    ordered: &[&SeedEntry],
    options: &GenerationOptions,
    next_id: &mut MatchId,
) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut pos = 1u32;
    for i in 0..ordered.len() {
        for j in (i + 1)..ordered.len() {
            let id = *next_id;
            *next_id += 1;
            matches.push(Match::new(
                id,
                tournament_id,
                MatchCoord::new(BracketKind::RoundRobin, 0, pos),
                options.best_of,
                options.mode,
                [Slot::Entrant(ordered[i].id), Slot::Entrant(ordered[j].id)],
            ));
            pos += 1;
        }
    }
    matches
}
