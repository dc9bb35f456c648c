//! Round-based tournament strategies.
//!
//! This module defines the [`TournamentStrategy`] trait shared by the round-based schedulers
//! ([`RoundRobinScheduler`](crate::round_robin::RoundRobinScheduler) and
//! [`SwissScheduler`](crate::swiss::SwissScheduler)). Elimination brackets are generated in one
//! go by [`BracketScheduler`](crate::bracket::BracketScheduler) and do not implement it.
//!
//! Every method is a pure function over a snapshot of participants and matches. The caller
//! decides when a round starts and persists the returned pairings; calling twice with the same
//! snapshot returns the same answer.
//!
//! # Implementing a Custom Strategy
//! Provide the scoring rules, the number of rounds for a given field size, how to pair a round
//! and when the tournament is over. Standings, placements and the current round come for free,
//! but can be overridden (Swiss does so to apply its own tie-breaker).

use crate::{
    match_record::{Match, Pairing},
    participant::Participant,
    standings::{self, Placement, ScoringRules, Standing, StandingsCalculator},
};

/// How participants are paired, scored and ranked across rounds.
pub trait TournamentStrategy {
    /// Rules used to turn results into points.
    fn scoring(&self) -> ScoringRules;

    /// Number of rounds needed for `participant_count` participants. Zero when fewer than two.
    fn total_rounds(&self, participant_count: usize) -> u32;

    /// Pairings of `round` (1-based), given everything played so far.
    ///
    /// Returns an empty list when the round does not exist.
    fn pairings_for_round(
        &self,
        participants: &[Participant],
        matches: &[Match],
        round: u32,
    ) -> Vec<Pairing>;

    /// True once every scheduled game of the tournament has a result.
    fn is_complete(&self, participants: &[Participant], matches: &[Match]) -> bool;

    /// Ranked standings.
    fn standings(&self, participants: &[Participant], matches: &[Match]) -> Vec<Standing> {
        StandingsCalculator::new(self.scoring()).calculate(participants, matches)
    }

    /// Ranked standings with 1-based ranks.
    fn placements(&self, participants: &[Participant], matches: &[Match]) -> Vec<Placement> {
        standings::placements(&self.standings(participants, matches))
    }

    /// Highest round present in `matches`, capped at the total round count.
    ///
    /// Round 1 when nothing was played yet, 0 when the field is too small to play at all.
    fn current_round(&self, participants: &[Participant], matches: &[Match]) -> u32 {
        let total = self.total_rounds(participants.len());
        if total == 0 {
            return 0;
        }
        matches
            .iter()
            .map(|m| m.round)
            .max()
            .unwrap_or(1)
            .clamp(1, total)
    }
}
