//! Match lifecycle state machine.
//!
//! Pure transition functions over a single [`Match`]. Cross-match effects
//! (propagating a confirmed outcome, cascading a replay reset) belong to the
//! propagation engine; callers invoke it whenever a function here reports a
//! transition into `Confirmed`.

use chrono::{DateTime, Utc};

use super::errors::{LifecycleError, LifecycleResult};
use crate::bracket::{Match, MatchMode, MatchStatus, ScoreReport, Slot, SlotIndex};

/// Outcome of a transition into `Confirmed`, ready for propagation
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConfirmedOutcome {
    pub winner_slot: SlotIndex,
    pub winner: Slot,
    pub loser: Slot,
}

/// Set or move the scheduled time. Only meaningful before a result exists.
pub fn schedule(m: &mut Match, at: DateTime<Utc>) -> LifecycleResult<()> {
    match m.status {
        MatchStatus::Pending | MatchStatus::Scheduled => {
            m.scheduled_at = Some(at);
            m.status = MatchStatus::Scheduled;
            m.touch();
            Ok(())
        }
        status => Err(LifecycleError::InvalidTransition(status)),
    }
}

/// Submit one side's result.
///
/// The first report moves the match to `Reported`. The opposing report either
/// auto-confirms (exact payload agreement) or moves the match to `Disputed`.
/// Returns the confirmed outcome when agreement finalizes the match.
pub fn report(m: &mut Match, submission: ScoreReport) -> LifecycleResult<Option<ConfirmedOutcome>> {
    if m.mode != MatchMode::Standard {
        // Aggregated team matches only resolve through their duel/round logs
        return Err(LifecycleError::MatchNotReportable);
    }
    if !m.has_both_entrants() {
        return Err(LifecycleError::MatchNotReportable);
    }
    validate_score(&submission)?;

    match m.status {
        MatchStatus::Pending | MatchStatus::Scheduled => {
            m.reports[submission.reporter_slot] = Some(submission);
            m.status = MatchStatus::Reported;
            m.touch();
            Ok(None)
        }
        MatchStatus::Reported => {
            if m.reports[submission.reporter_slot].is_some() {
                return Err(LifecycleError::DuplicateReport);
            }
            let prior = m.reports[crate::bracket::other_slot(submission.reporter_slot)]
                .ok_or(LifecycleError::InvalidTransition(MatchStatus::Reported))?;
            if prior.agrees_with(&submission) {
                let outcome = finalize(
                    m,
                    (submission.score1, submission.score2),
                    submission.winner_slot,
                );
                Ok(Some(outcome))
            } else {
                m.reports[submission.reporter_slot] = Some(submission);
                m.status = MatchStatus::Disputed;
                m.touch();
                Ok(None)
            }
        }
        MatchStatus::Confirmed | MatchStatus::Void => Err(LifecycleError::MatchNotReportable),
        status => Err(LifecycleError::InvalidTransition(status)),
    }
}

/// Record an authoritative result, overriding any pending reports.
///
/// Allowed from `Reported` and `Disputed`; the submitted result need not
/// match either report but must still be internally consistent.
pub fn confirm(
    m: &mut Match,
    score1: u32,
    score2: u32,
    winner_slot: SlotIndex,
) -> LifecycleResult<ConfirmedOutcome> {
    let submission = ScoreReport {
        reporter_slot: winner_slot,
        score1,
        score2,
        winner_slot,
    };
    validate_score(&submission)?;
    match m.status {
        MatchStatus::Reported | MatchStatus::Disputed => {
            Ok(finalize(m, (score1, score2), winner_slot))
        }
        status => Err(LifecycleError::InvalidTransition(status)),
    }
}

/// Record an outcome produced outside direct reporting (BYE advancement,
/// team aggregation). Allowed from any unfinalized state.
pub fn force_confirm(
    m: &mut Match,
    score: Option<(u32, u32)>,
    winner_slot: SlotIndex,
) -> LifecycleResult<ConfirmedOutcome> {
    match m.status {
        MatchStatus::Confirmed | MatchStatus::Void => {
            Err(LifecycleError::InvalidTransition(m.status))
        }
        _ => {
            m.reports = [None, None];
            m.score = score;
            m.winner_slot = Some(winner_slot);
            m.status = MatchStatus::Confirmed;
            m.touch();
            Ok(outcome_of(m, winner_slot))
        }
    }
}

/// Discard pending reports, returning the match to `Pending` or `Scheduled`
/// depending on whether it still has a schedule time.
pub fn reject(m: &mut Match) -> LifecycleResult<()> {
    match m.status {
        MatchStatus::Reported | MatchStatus::Disputed => {
            m.reports = [None, None];
            m.status = unplayed_status(m);
            m.touch();
            Ok(())
        }
        status => Err(LifecycleError::InvalidTransition(status)),
    }
}

/// Clear slots, scores, and report data; the bracket position is unplayable.
///
/// A confirmed match cannot be voided directly: its outcome has already
/// propagated, so it must go through a replay reset first.
pub fn void(m: &mut Match) -> LifecycleResult<()> {
    if m.status == MatchStatus::Confirmed {
        return Err(LifecycleError::InvalidTransition(m.status));
    }
    m.slots = [Slot::Empty, Slot::Empty];
    m.reports = [None, None];
    m.score = None;
    m.winner_slot = None;
    m.status = MatchStatus::Void;
    m.touch();
    Ok(())
}

/// Reopen a confirmed match with fresh (same or swapped) slots.
///
/// Callers must cascade-unresolve every downstream match that consumed the
/// old winner/loser before play resumes; the propagation engine does that.
pub fn reset_for_replay(m: &mut Match, slots: [Slot; 2]) -> LifecycleResult<()> {
    if m.status != MatchStatus::Confirmed {
        return Err(LifecycleError::InvalidTransition(m.status));
    }
    m.slots = slots;
    m.reports = [None, None];
    m.score = None;
    m.winner_slot = None;
    m.status = unplayed_status(m);
    m.touch();
    Ok(())
}

fn finalize(m: &mut Match, score: (u32, u32), winner_slot: SlotIndex) -> ConfirmedOutcome {
    m.reports = [None, None];
    m.score = Some(score);
    m.winner_slot = Some(winner_slot);
    m.status = MatchStatus::Confirmed;
    m.touch();
    outcome_of(m, winner_slot)
}

fn outcome_of(m: &Match, winner_slot: SlotIndex) -> ConfirmedOutcome {
    ConfirmedOutcome {
        winner_slot,
        winner: m.slots[winner_slot],
        loser: m.slots[crate::bracket::other_slot(winner_slot)],
    }
}

const fn unplayed_status(m: &Match) -> MatchStatus {
    if m.scheduled_at.is_some() {
        MatchStatus::Scheduled
    } else {
        MatchStatus::Pending
    }
}

fn validate_score(submission: &ScoreReport) -> LifecycleResult<()> {
    if submission.winner_slot > 1 || submission.reporter_slot > 1 {
        return Err(LifecycleError::InvalidScore);
    }
    let (winner_score, loser_score) = if submission.winner_slot == 0 {
        (submission.score1, submission.score2)
    } else {
        (submission.score2, submission.score1)
    };
    if winner_score <= loser_score {
        return Err(LifecycleError::InvalidScore);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{BracketKind, MatchCoord};

    fn playable() -> Match {
        Match::new(
            1,
            1,
            MatchCoord::new(BracketKind::Winners, 1, 1),
            3,
            MatchMode::Standard,
            [Slot::Entrant(10), Slot::Entrant(20)],
        )
    }

    fn submission(reporter: SlotIndex, s1: u32, s2: u32, winner: SlotIndex) -> ScoreReport {
        ScoreReport {
            reporter_slot: reporter,
            score1: s1,
            score2: s2,
            winner_slot: winner,
        }
    }

    #[test]
    fn test_agreeing_reports_auto_confirm() {
        let mut m = playable();
        assert_eq!(report(&mut m, submission(0, 2, 1, 0)), Ok(None));
        assert_eq!(m.status, MatchStatus::Reported);

        let outcome = report(&mut m, submission(1, 2, 1, 0)).unwrap().unwrap();
        assert_eq!(m.status, MatchStatus::Confirmed);
        assert_eq!(m.score, Some((2, 1)));
        assert_eq!(outcome.winner, Slot::Entrant(10));
        assert_eq!(outcome.loser, Slot::Entrant(20));
        assert_eq!(m.reports, [None, None]);
    }

    #[test]
    fn test_same_winner_different_scores_disputes() {
        let mut m = playable();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        assert_eq!(report(&mut m, submission(1, 2, 0, 0)), Ok(None));
        assert_eq!(m.status, MatchStatus::Disputed);
    }

    #[test]
    fn test_duplicate_report_rejected() {
        let mut m = playable();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        assert_eq!(
            report(&mut m, submission(0, 2, 1, 0)),
            Err(LifecycleError::DuplicateReport)
        );
    }

    #[test]
    fn test_tie_and_mismatched_winner_rejected() {
        let mut m = playable();
        assert_eq!(
            report(&mut m, submission(0, 1, 1, 0)),
            Err(LifecycleError::InvalidScore)
        );
        assert_eq!(
            report(&mut m, submission(0, 1, 2, 0)),
            Err(LifecycleError::InvalidScore)
        );
    }

    #[test]
    fn test_unresolved_slots_not_reportable() {
        let mut m = playable();
        m.slots[1] = Slot::Bye;
        assert_eq!(
            report(&mut m, submission(0, 2, 0, 0)),
            Err(LifecycleError::MatchNotReportable)
        );
        m.slots[1] = Slot::Empty;
        assert_eq!(
            report(&mut m, submission(0, 2, 0, 0)),
            Err(LifecycleError::MatchNotReportable)
        );
    }

    #[test]
    fn test_aggregated_modes_not_reportable() {
        let mut m = playable();
        m.mode = MatchMode::LineupDuels;
        assert_eq!(
            report(&mut m, submission(0, 2, 0, 0)),
            Err(LifecycleError::MatchNotReportable)
        );
    }

    #[test]
    fn test_admin_confirm_overrides_reports() {
        let mut m = playable();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        report(&mut m, submission(1, 0, 2, 1)).unwrap();
        assert_eq!(m.status, MatchStatus::Disputed);

        let outcome = confirm(&mut m, 1, 2, 1).unwrap();
        assert_eq!(m.status, MatchStatus::Confirmed);
        assert_eq!(m.score, Some((1, 2)));
        assert_eq!(outcome.winner, Slot::Entrant(20));
    }

    #[test]
    fn test_reject_restores_schedule_state() {
        let mut m = playable();
        schedule(&mut m, Utc::now()).unwrap();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        reject(&mut m).unwrap();
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert_eq!(m.reports, [None, None]);

        m.scheduled_at = None;
        report(&mut m, submission(1, 0, 1, 1)).unwrap();
        reject(&mut m).unwrap();
        assert_eq!(m.status, MatchStatus::Pending);
    }

    #[test]
    fn test_void_clears_everything_but_not_confirmed() {
        let mut m = playable();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        void(&mut m).unwrap();
        assert_eq!(m.status, MatchStatus::Void);
        assert_eq!(m.slots, [Slot::Empty, Slot::Empty]);

        let mut done = playable();
        force_confirm(&mut done, None, 0).unwrap();
        assert_eq!(
            void(&mut done),
            Err(LifecycleError::InvalidTransition(MatchStatus::Confirmed))
        );
    }

    #[test]
    fn test_replay_reset_swaps_slots() {
        let mut m = playable();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        report(&mut m, submission(1, 2, 1, 0)).unwrap();

        reset_for_replay(&mut m, [Slot::Entrant(20), Slot::Entrant(10)]).unwrap();
        assert_eq!(m.status, MatchStatus::Pending);
        assert_eq!(m.slots, [Slot::Entrant(20), Slot::Entrant(10)]);
        assert_eq!(m.score, None);
        assert_eq!(m.winner_slot, None);
    }

    #[test]
    fn test_reporting_a_disputed_match_fails() {
        let mut m = playable();
        report(&mut m, submission(0, 2, 1, 0)).unwrap();
        report(&mut m, submission(1, 1, 2, 1)).unwrap();
        assert_eq!(
            report(&mut m, submission(0, 2, 1, 0)),
            Err(LifecycleError::InvalidTransition(MatchStatus::Disputed))
        );
    }
}
