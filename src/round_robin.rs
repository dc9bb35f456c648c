//! Round-robin scheduling with the circle method.

use tracing::trace;

use crate::{
    match_record::{Match, Pairing},
    participant::Participant,
    standings::ScoringRules,
    tournament_strategy::TournamentStrategy,
};

/// Every participant meets every other participant exactly once.
///
/// The whole schedule is known up front: [`generate_pairings`](Self::generate_pairings)
/// returns all rounds at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    /// Creates the scheduler.
    pub fn new() -> Self {
        Self
    }

    /// `n - 1` rounds for an even field, `n` for an odd one (each round someone sits out).
    pub fn round_count(participant_count: usize) -> u32 {
        match participant_count {
            0 | 1 => 0,
            n if n % 2 == 0 => (n - 1) as u32,
            n => n as u32,
        }
    }

    /// `n·(n-1)/2`: one match per unordered pair.
    pub fn match_count(participant_count: usize) -> usize {
        participant_count * participant_count.saturating_sub(1) / 2
    }

    /// Full schedule, ordered by round.
    ///
    /// Seat 0 stays put while the others rotate by one seat after every round; in each round
    /// seat `i` faces seat `len - 1 - i`. An odd field gets an empty seat, and whoever faces
    /// it sits the round out. Fewer than two participants yields an empty schedule.
    pub fn generate_pairings(&self, participants: &[Participant]) -> Vec<Pairing> {
        if participants.len() < 2 {
            return vec![];
        }

        let mut seats: Vec<Option<&Participant>> = participants.iter().map(Some).collect();
        if seats.len() % 2 == 1 {
            seats.push(None);
        }
        let len = seats.len();

        let mut pairings = Vec::with_capacity(Self::match_count(participants.len()));
        for round in 1..len as u32 {
            for i in 0..len / 2 {
                match (seats[i], seats[len - 1 - i]) {
                    (Some(a), Some(b)) => {
                        pairings.push(Pairing::new(a.id.clone(), b.id.clone(), round))
                    }
                    (Some(p), None) | (None, Some(p)) => {
                        trace!(round, participant = %p.id, "sits out");
                    }
                    (None, None) => {}
                }
            }
            seats[1..].rotate_right(1);
        }
        pairings
    }
}

impl TournamentStrategy for RoundRobinScheduler {
    fn scoring(&self) -> ScoringRules {
        ScoringRules::ROUND_ROBIN
    }

    fn total_rounds(&self, participant_count: usize) -> u32 {
        Self::round_count(participant_count)
    }

    fn pairings_for_round(
        &self,
        participants: &[Participant],
        _matches: &[Match],
        round: u32,
    ) -> Vec<Pairing> {
        self.generate_pairings(participants)
            .into_iter()
            .filter(|p| p.round == round)
            .collect()
    }

    fn is_complete(&self, participants: &[Participant], matches: &[Match]) -> bool {
        let expected = Self::match_count(participants.len());
        expected > 0 && matches.iter().filter(|m| m.is_completed()).count() >= expected
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::participant::ParticipantId;

    fn players(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant::new(format!("P{i}"), format!("Player {i}")))
            .collect()
    }

    fn as_tuples(pairings: &[Pairing]) -> Vec<(u32, &str, &str)> {
        pairings
            .iter()
            .map(|p| {
                (
                    p.round,
                    p.player1.as_str(),
                    p.player2.as_ref().map(ParticipantId::as_str).unwrap_or("-"),
                )
            })
            .collect()
    }

    #[test]
    fn four_players_schedule() {
        let pairings = RoundRobinScheduler::new().generate_pairings(&players(4));
        assert_eq!(
            as_tuples(&pairings),
            vec![
                (1, "P1", "P4"),
                (1, "P2", "P3"),
                (2, "P1", "P3"),
                (2, "P4", "P2"),
                (3, "P1", "P2"),
                (3, "P3", "P4"),
            ]
        );
    }

    #[test]
    fn three_players_rotate_the_bye() {
        let pairings = RoundRobinScheduler::new().generate_pairings(&players(3));
        assert_eq!(
            as_tuples(&pairings),
            vec![(1, "P2", "P3"), (2, "P1", "P3"), (3, "P1", "P2")]
        );
        assert!(pairings.iter().all(|p| !p.is_bye()));
    }

    #[test]
    fn too_few_participants() {
        let scheduler = RoundRobinScheduler::new();
        assert!(scheduler.generate_pairings(&[]).is_empty());
        assert!(scheduler.generate_pairings(&players(1)).is_empty());
        assert_eq!(scheduler.total_rounds(1), 0);
        assert_eq!(scheduler.current_round(&players(1), &[]), 0);
        assert!(!scheduler.is_complete(&players(1), &[]));
    }

    #[test]
    fn counts_for_various_sizes() {
        for n in 2..=12 {
            let pairings = RoundRobinScheduler::new().generate_pairings(&players(n));
            assert_eq!(pairings.len(), n * (n - 1) / 2, "n = {n}");
            let rounds: HashSet<u32> = pairings.iter().map(|p| p.round).collect();
            assert_eq!(rounds.len() as u32, RoundRobinScheduler::round_count(n));
        }
    }

    #[test]
    fn single_round_filter() {
        let scheduler = RoundRobinScheduler::new();
        let round_two = scheduler.pairings_for_round(&players(4), &[], 2);
        assert_eq!(as_tuples(&round_two), vec![(2, "P1", "P3"), (2, "P4", "P2")]);
        assert!(scheduler.pairings_for_round(&players(4), &[], 4).is_empty());
    }

    #[test]
    fn completion_and_current_round() {
        let scheduler = RoundRobinScheduler::new();
        let field = players(3);
        let mut matches: Vec<Match> = scheduler
            .generate_pairings(&field)
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.into_match(format!("m{i}"), 1))
            .collect();

        assert_eq!(scheduler.current_round(&field, &[]), 1);
        assert_eq!(scheduler.current_round(&field, &matches), 3);
        assert!(!scheduler.is_complete(&field, &matches));

        for m in &mut matches {
            let winner = m.player1.clone();
            *m = m.clone().with_result(winner);
        }
        assert!(scheduler.is_complete(&field, &matches));
    }

    #[test]
    fn current_round_is_capped() {
        let scheduler = RoundRobinScheduler::new();
        let stray = Match::new("x", 9, 1, Some("P1".into()), Some("P2".into()));
        assert_eq!(scheduler.current_round(&players(4), &[stray]), 3);
    }
}
