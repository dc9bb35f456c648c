//! Standings derived from match history.
//!
//! Standings are never authoritative: they are recomputed on demand from a snapshot of
//! participants and matches. The ordering is points, then wins, then fewest losses. Anything
//! still tied keeps the order in which participants were given.

use std::{cmp::Ordering, collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    match_record::{Match, MatchStatus},
    participant::{Participant, ParticipantId},
};

/// How results turn into points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points for a win.
    pub win_points: f64,
    /// Points for a draw. `None` means draws are not tallied at all.
    pub draw_points: Option<f64>,
    /// Points for a bye, counted as a win. `None` means byes are not tallied at all.
    pub bye_points: Option<f64>,
}

impl ScoringRules {
    /// 3 points per win. Draws and byes are ignored.
    pub const ROUND_ROBIN: ScoringRules = ScoringRules {
        win_points: 3.0,
        draw_points: None,
        bye_points: None,
    };

    /// 1 point per win or bye, half a point per draw.
    pub const SWISS: ScoringRules = ScoringRules {
        win_points: 1.0,
        draw_points: Some(0.5),
        bye_points: Some(1.0),
    };
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::ROUND_ROBIN
    }
}

/// Aggregated results of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// The participant.
    pub participant: Participant,
    /// Number of wins, byes included when the rules count them.
    pub wins: u32,
    /// Number of losses.
    pub losses: u32,
    /// Number of draws.
    pub draws: u32,
    /// Total points.
    pub points: f64,
    /// Number of matches counted.
    pub matches_played: u32,
    /// Format-specific tie-breaker. Always zero for round robin.
    pub tie_breaker: f64,
}

impl Standing {
    fn new(participant: Participant) -> Self {
        Self {
            participant,
            wins: 0,
            losses: 0,
            draws: 0,
            points: 0.0,
            matches_played: 0,
            tie_breaker: 0.0,
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}W-{}L-{}D {}pts",
            self.participant.name, self.wins, self.losses, self.draws, self.points
        )
    }
}

/// A standing with its final 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The participant.
    pub participant: Participant,
    /// 1-based rank.
    pub rank: u32,
    /// Number of wins.
    pub wins: u32,
    /// Number of losses.
    pub losses: u32,
    /// Total points.
    pub points: f64,
    /// Number of matches counted.
    pub matches_played: u32,
}

/// Ordering used by round robin: points desc, wins desc, losses asc.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.losses.cmp(&b.losses))
}

/// Turns sorted standings into placements, ranked by position.
pub fn placements(standings: &[Standing]) -> Vec<Placement> {
    standings
        .iter()
        .enumerate()
        .map(|(i, s)| Placement {
            participant: s.participant.clone(),
            rank: i as u32 + 1,
            wins: s.wins,
            losses: s.losses,
            points: s.points,
            matches_played: s.matches_played,
        })
        .collect()
}

/// Aggregates match history into standings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandingsCalculator {
    rules: ScoringRules,
}

impl StandingsCalculator {
    /// Calculator with the given rules.
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    /// Calculator with [`ScoringRules::ROUND_ROBIN`].
    pub fn round_robin() -> Self {
        Self::new(ScoringRules::ROUND_ROBIN)
    }

    /// Calculator with [`ScoringRules::SWISS`].
    pub fn swiss() -> Self {
        Self::new(ScoringRules::SWISS)
    }

    /// The rules in use.
    pub fn rules(&self) -> ScoringRules {
        self.rules
    }

    /// Per-participant totals, in participant order (unsorted).
    ///
    /// Matches that reference an unknown participant are skipped.
    pub fn tally(&self, participants: &[Participant], matches: &[Match]) -> Vec<Standing> {
        let mut standings: Vec<Standing> =
            participants.iter().cloned().map(Standing::new).collect();
        let index: HashMap<&ParticipantId, usize> = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (&p.id, i))
            .collect();

        for m in matches {
            match m.status {
                MatchStatus::Completed => self.tally_completed(m, &index, &mut standings),
                MatchStatus::Bye => self.tally_bye(m, &index, &mut standings),
                MatchStatus::Scheduled => {}
            }
        }

        standings
    }

    /// Standings sorted by [`compare_standings`].
    pub fn calculate(&self, participants: &[Participant], matches: &[Match]) -> Vec<Standing> {
        let mut standings = self.tally(participants, matches);
        standings.sort_by(compare_standings);
        standings
    }

    fn tally_completed(
        &self,
        m: &Match,
        index: &HashMap<&ParticipantId, usize>,
        standings: &mut [Standing],
    ) {
        if m.opponents().is_none() {
            // only one slot filled: a bye that was recorded as a completed match
            self.tally_bye(m, index, standings);
            return;
        }

        match &m.winner {
            Some(winner) => {
                let Some(loser) = m.loser() else {
                    debug!(match_id = %m.id, %winner, "winner is not part of the match, skipped");
                    return;
                };
                let (Some(&w), Some(&l)) = (index.get(winner), index.get(loser)) else {
                    debug!(match_id = %m.id, "match references an unknown participant, skipped");
                    return;
                };
                standings[w].wins += 1;
                standings[w].points += self.rules.win_points;
                standings[w].matches_played += 1;
                standings[l].losses += 1;
                standings[l].matches_played += 1;
            }
            None => {
                let Some(draw_points) = self.rules.draw_points else {
                    return;
                };
                let Some((a, b)) = m.opponents() else {
                    return;
                };
                let (Some(&a), Some(&b)) = (index.get(a), index.get(b)) else {
                    debug!(match_id = %m.id, "match references an unknown participant, skipped");
                    return;
                };
                for i in [a, b] {
                    standings[i].draws += 1;
                    standings[i].points += draw_points;
                    standings[i].matches_played += 1;
                }
            }
        }
    }

    fn tally_bye(
        &self,
        m: &Match,
        index: &HashMap<&ParticipantId, usize>,
        standings: &mut [Standing],
    ) {
        let Some(bye_points) = self.rules.bye_points else {
            return;
        };
        let mut players = m.players();
        let (Some(player), None) = (players.next(), players.next()) else {
            return;
        };
        let Some(&i) = index.get(player) else {
            debug!(match_id = %m.id, %player, "bye for an unknown participant, skipped");
            return;
        };
        standings[i].wins += 1;
        standings[i].points += bye_points;
        standings[i].matches_played += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant::new(format!("P{i}"), format!("Player {i}")))
            .collect()
    }

    fn win(id: &str, a: &str, b: &str, winner: &str) -> Match {
        Match::new(id, 1, 1, Some(a.into()), Some(b.into())).with_result(Some(winner.into()))
    }

    fn summary(standings: &[Standing]) -> Vec<(&str, u32, u32, f64)> {
        standings
            .iter()
            .map(|s| (s.participant.id.as_str(), s.wins, s.losses, s.points))
            .collect()
    }

    #[test]
    fn four_player_round_robin_scenario() {
        let matches = vec![
            win("m1", "P1", "P2", "P1"),
            win("m2", "P3", "P4", "P3"),
            win("m3", "P1", "P3", "P1"),
            win("m4", "P2", "P4", "P2"),
            win("m5", "P1", "P4", "P1"),
            win("m6", "P2", "P3", "P2"),
        ];
        let standings = StandingsCalculator::round_robin().calculate(&players(4), &matches);
        assert_eq!(
            summary(&standings),
            vec![
                ("P1", 3, 0, 9.0),
                ("P2", 2, 1, 6.0),
                ("P3", 1, 2, 3.0),
                ("P4", 0, 3, 0.0),
            ]
        );
        assert!(standings.iter().all(|s| s.matches_played == 3));
    }

    #[test]
    fn unknown_participants_are_skipped() {
        let matches = vec![win("m1", "P1", "ghost", "P1"), win("m2", "P1", "P2", "P2")];
        let standings = StandingsCalculator::round_robin().calculate(&players(2), &matches);
        assert_eq!(summary(&standings), vec![("P2", 1, 0, 3.0), ("P1", 0, 1, 0.0)]);
    }

    #[test]
    fn scheduled_matches_do_not_count() {
        let matches = vec![Match::new("m1", 1, 1, Some("P1".into()), Some("P2".into()))];
        let standings = StandingsCalculator::round_robin().calculate(&players(2), &matches);
        assert!(standings.iter().all(|s| s.matches_played == 0));
    }

    #[test]
    fn round_robin_ignores_draws_and_byes() {
        let matches = vec![
            Match::new("m1", 1, 1, Some("P1".into()), Some("P2".into())).with_result(None),
            Match::new("m2", 1, 2, Some("P3".into()), None).with_bye(),
        ];
        let standings = StandingsCalculator::round_robin().tally(&players(3), &matches);
        assert!(standings
            .iter()
            .all(|s| s.matches_played == 0 && s.draws == 0 && s.points == 0.0));
    }

    #[test]
    fn swiss_counts_draws_and_byes() {
        let matches = vec![
            Match::new("m1", 1, 1, Some("P1".into()), Some("P2".into())).with_result(None),
            Match::new("m2", 1, 2, Some("P3".into()), None).with_bye(),
        ];
        let standings = StandingsCalculator::swiss().calculate(&players(3), &matches);
        assert_eq!(standings[0].participant.id.as_str(), "P3");
        assert_eq!(standings[0].points, 1.0);
        assert_eq!(standings[0].wins, 1);
        assert_eq!(standings[1].draws, 1);
        assert_eq!(standings[1].points, 0.5);
        assert_eq!(standings[2].points, 0.5);
    }

    #[test]
    fn residual_ties_keep_input_order() {
        let standings = StandingsCalculator::round_robin().calculate(&players(3), &[]);
        let ids: Vec<_> = standings.iter().map(|s| s.participant.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn fewer_losses_break_ties() {
        // P1, P2 and P3 all have one win; only P1 is unbeaten
        let matches = vec![
            win("m1", "P2", "P3", "P2"),
            win("m2", "P1", "P4", "P1"),
            win("m3", "P3", "P2", "P3"),
        ];
        let standings = StandingsCalculator::round_robin().calculate(&players(4), &matches);
        let ids: Vec<_> = standings.iter().map(|s| s.participant.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3", "P4"]);
    }

    #[test]
    fn placements_are_one_based() {
        let matches = vec![win("m1", "P1", "P2", "P2")];
        let standings = StandingsCalculator::round_robin().calculate(&players(2), &matches);
        let placed = placements(&standings);
        assert_eq!(placed[0].rank, 1);
        assert_eq!(placed[0].participant.id.as_str(), "P2");
        assert_eq!(placed[1].rank, 2);
        assert_eq!(placed[1].losses, 1);
    }
}
