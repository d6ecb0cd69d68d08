//! Integration tests for bracket generation and full tournament runs.
//!
//! Drives complete tournaments through the engine facade: structure checks
//! for every format, BYE walkovers, and the grand-final reset.

use openbracket::bracket::{
    BracketKind, Format, GenerationError, GenerationOptions, Match, MatchStatus, ScoreReport,
    SeedEntry, Slot, TournamentId,
};
use openbracket::engine::{Engine, EngineError};

fn solo_entrants(n: i64) -> Vec<SeedEntry> {
    (1..=n)
        .map(|i| SeedEntry::solo(i * 10, &format!("player {i}"), Some(i as u32)))
        .collect()
}

fn setup(n: i64, format: Format) -> Engine {
    let engine = Engine::seeded(7);
    engine
        .register_tournament(1, solo_entrants(n), "admin")
        .unwrap();
    engine
        .generate_bracket(1, GenerationOptions::solo(format, 3), "admin")
        .unwrap();
    engine
}

fn match_at(
    engine: &Engine,
    t: TournamentId,
    bracket: BracketKind,
    round: u32,
    pos: u32,
) -> Match {
    engine
        .list_matches(t)
        .unwrap()
        .into_iter()
        .find(|m| m.bracket == bracket && m.round == round && m.round_pos == pos)
        .unwrap()
}

/// Both sides submit the same score; the match auto-confirms
fn agree(engine: &Engine, t: TournamentId, m: &Match, winner_slot: usize) {
    for reporter_slot in [0, 1] {
        engine
            .report_match(
                t,
                m.id,
                ScoreReport {
                    reporter_slot,
                    score1: if winner_slot == 0 { 2 } else { 1 },
                    score2: if winner_slot == 0 { 1 } else { 2 },
                    winner_slot,
                },
                None,
                "reporter",
            )
            .unwrap();
    }
}

#[test]
fn test_eight_player_double_elim_structure() {
    let engine = setup(8, Format::DoubleElim);
    let matches = engine.list_matches(1).unwrap();

    let count = |bracket, round| {
        matches
            .iter()
            .filter(|m| m.bracket == bracket && m.round == round)
            .count()
    };
    assert_eq!(count(BracketKind::Winners, 1), 4);
    assert_eq!(count(BracketKind::Winners, 2), 2);
    assert_eq!(count(BracketKind::Winners, 3), 1);
    assert_eq!(count(BracketKind::Losers, 1), 2);
    assert_eq!(count(BracketKind::Losers, 2), 2);
    assert_eq!(count(BracketKind::Losers, 3), 1);
    assert_eq!(count(BracketKind::Losers, 4), 1);
    assert_eq!(count(BracketKind::Grand, 1), 1);
    assert_eq!(count(BracketKind::Grand, 2), 1);
    assert_eq!(matches.len(), 15);
}

#[test]
fn test_canonical_seeding_round_one_pairs() {
    let engine = setup(8, Format::SingleElim);
    let pairs: Vec<[Slot; 2]> = (1..=4)
        .map(|pos| match_at(&engine, 1, BracketKind::Winners, 1, pos).slots)
        .collect();
    assert_eq!(pairs[0], [Slot::Entrant(10), Slot::Entrant(80)]);
    assert_eq!(pairs[1], [Slot::Entrant(40), Slot::Entrant(50)]);
    assert_eq!(pairs[2], [Slot::Entrant(30), Slot::Entrant(60)]);
    assert_eq!(pairs[3], [Slot::Entrant(20), Slot::Entrant(70)]);
}

#[test]
fn test_bye_walkovers_resolve_immediately() {
    // 6 entrants pad to 8: seeds 1 and 2 get byes and advance on generation
    let engine = setup(6, Format::SingleElim);
    let m1 = match_at(&engine, 1, BracketKind::Winners, 1, 1);
    assert_eq!(m1.status, MatchStatus::Confirmed);
    assert_eq!(m1.winner_slot, Some(0));

    let semi = match_at(&engine, 1, BracketKind::Winners, 2, 1);
    assert_eq!(semi.slots[0], Slot::Entrant(10));
}

#[test]
fn test_round_robin_pairs_everyone_once() {
    let engine = setup(5, Format::RoundRobin);
    let matches = engine.list_matches(1).unwrap();
    assert_eq!(matches.len(), 10);
    assert!(matches.iter().all(|m| m.bracket == BracketKind::RoundRobin));
    assert!(matches.iter().all(|m| m.round == 0));

    let mut pairs: Vec<(Slot, Slot)> = matches.iter().map(|m| (m.slots[0], m.slots[1])).collect();
    pairs.sort_by_key(|p| format!("{p:?}"));
    pairs.dedup();
    assert_eq!(pairs.len(), 10);
}

#[test]
fn test_single_elim_runs_to_a_champion() {
    let engine = setup(8, Format::SingleElim);
    for round in 1..=3 {
        for pos in 1..=(8 >> round) {
            let m = match_at(&engine, 1, BracketKind::Winners, round, pos);
            agree(&engine, 1, &m, 0);
        }
    }
    let final_match = match_at(&engine, 1, BracketKind::Winners, 3, 1);
    assert_eq!(final_match.status, MatchStatus::Confirmed);
    // Seed 1 wins every slot-0 victory path
    assert_eq!(final_match.slots[final_match.winner_slot.unwrap()], Slot::Entrant(10));
}

#[test]
fn test_double_elim_grand_final_reset_run() {
    let engine = setup(4, Format::DoubleElim);
    agree(&engine, 1, &match_at(&engine, 1, BracketKind::Winners, 1, 1), 0);
    agree(&engine, 1, &match_at(&engine, 1, BracketKind::Winners, 1, 2), 0);
    agree(&engine, 1, &match_at(&engine, 1, BracketKind::Winners, 2, 1), 0);
    agree(&engine, 1, &match_at(&engine, 1, BracketKind::Losers, 1, 1), 0);
    agree(&engine, 1, &match_at(&engine, 1, BracketKind::Losers, 2, 1), 0);

    // The losers finalist takes grand final round 1: the reset activates
    let g1 = match_at(&engine, 1, BracketKind::Grand, 1, 1);
    agree(&engine, 1, &g1, 1);
    let g2 = match_at(&engine, 1, BracketKind::Grand, 2, 1);
    assert_eq!(g2.status, MatchStatus::Pending);
    assert_eq!(g2.slots, g1.slots);

    agree(&engine, 1, &g2, 0);
    let g2 = match_at(&engine, 1, BracketKind::Grand, 2, 1);
    assert_eq!(g2.status, MatchStatus::Confirmed);
}

#[test]
fn test_regeneration_requires_reset() {
    let engine = setup(4, Format::SingleElim);
    let err = engine
        .generate_bracket(1, GenerationOptions::solo(Format::SingleElim, 3), "admin")
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Generation(GenerationError::BracketAlreadyGenerated)
    );

    engine.reset_bracket(1, "admin").unwrap();
    engine
        .generate_bracket(1, GenerationOptions::solo(Format::DoubleElim, 3), "admin")
        .unwrap();
    assert_eq!(engine.list_matches(1).unwrap().len(), 7);
}

#[test]
fn test_generation_preconditions() {
    let engine = Engine::seeded(7);
    engine
        .register_tournament(1, solo_entrants(1), "admin")
        .unwrap();
    let err = engine
        .generate_bracket(1, GenerationOptions::solo(Format::SingleElim, 3), "admin")
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Generation(GenerationError::InsufficientParticipants(1))
    );
    // Nothing was written
    assert!(engine.list_matches(1).is_err());
}

#[test]
fn test_slot_override_locked_after_first_confirmation() {
    let engine = setup(4, Format::SingleElim);
    let m = match_at(&engine, 1, BracketKind::Winners, 1, 1);
    engine
        .override_slot(1, m.id, 1, Slot::Entrant(30), "admin")
        .unwrap();

    let m = match_at(&engine, 1, BracketKind::Winners, 1, 2);
    agree(&engine, 1, &m, 0);
    let err = engine
        .override_slot(1, m.id, 0, Slot::Entrant(10), "admin")
        .unwrap_err();
    assert_eq!(err, EngineError::Generation(GenerationError::BracketLocked));
}

#[test]
fn test_out_of_range_override_slot_is_refused() {
    let engine = setup(4, Format::SingleElim);
    let m = match_at(&engine, 1, BracketKind::Winners, 1, 1);
    let err = engine
        .override_slot(1, m.id, 2, Slot::Entrant(30), "admin")
        .unwrap_err();
    assert_eq!(err, EngineError::SlotOutOfRange(2));

    // The tournament stays fully operable after the refusal
    assert_eq!(engine.list_matches(1).unwrap().len(), 3);
    engine
        .override_slot(1, m.id, 1, Slot::Entrant(30), "admin")
        .unwrap();
}
