//! Elimination brackets.
//!
//! [`BracketScheduler`] seeds participants with a uniform shuffle drawn from an injected random
//! source, pairs them up for round 1 and lays out empty placeholder matches for every later round.
//! Filling the placeholders as winners advance is the orchestrator's job.
//!
//! Double elimination is not implemented: asking for it produces a single-elimination bracket.

use std::{fmt, str::FromStr};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::EngineError,
    match_record::{Match, MatchId},
    participant::Participant,
};

/// Kind of elimination bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketType {
    /// One loss and you are out.
    SingleElimination,
    /// Currently generated as a single-elimination bracket.
    DoubleElimination,
}

impl FromStr for BracketType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SINGLE_ELIMINATION" => Ok(Self::SingleElimination),
            "DOUBLE_ELIMINATION" => Ok(Self::DoubleElimination),
            _ => Err(EngineError::UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for BracketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleElimination => f.write_str("SINGLE_ELIMINATION"),
            Self::DoubleElimination => f.write_str("DOUBLE_ELIMINATION"),
        }
    }
}

/// `ceil(log2(n))` rounds, zero below two participants.
pub fn round_count(participant_count: usize) -> u32 {
    if participant_count < 2 {
        0
    } else {
        participant_count.next_power_of_two().trailing_zeros()
    }
}

/// Generates elimination brackets, seeding from its own random source.
pub struct BracketScheduler<R = StdRng> {
    rng: R,
}

impl BracketScheduler<StdRng> {
    /// Reproducible seeding: the same seed always yields the same brackets.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeding from operating-system entropy.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> BracketScheduler<R> {
    /// Scheduler drawing its seeding from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Round 1 with seeded pairs, then placeholder matches for every later round.
    ///
    /// Returns an empty bracket below two participants.
    pub fn generate_bracket(
        &mut self,
        participants: &[Participant],
        bracket_type: BracketType,
    ) -> Vec<Match> {
        if bracket_type == BracketType::DoubleElimination {
            warn!("double elimination is not supported, generating a single-elimination bracket");
        }
        self.single_elimination(participants)
    }

    fn single_elimination(&mut self, participants: &[Participant]) -> Vec<Match> {
        let rounds = round_count(participants.len());
        if rounds == 0 {
            return vec![];
        }

        let mut seeded: Vec<&Participant> = participants.iter().collect();
        seeded.shuffle(&mut self.rng);
        let seeding: Vec<&str> = seeded.iter().map(|p| p.id.as_str()).collect();
        debug!(?seeding, "bracket seeded");

        let mut matches = Vec::with_capacity(participants.len());
        for (i, slot) in seeded.chunks(2).enumerate() {
            let position = i as u32 + 1;
            let m = Match::new(
                MatchId::for_slot(1, position),
                1,
                position,
                Some(slot[0].id.clone()),
                slot.get(1).map(|p| p.id.clone()),
            );
            matches.push(if slot.len() == 1 { m.with_bye() } else { m });
        }

        for round in 2..=rounds {
            for position in 1..=(1u32 << (rounds - round)) {
                matches.push(Match::new(
                    MatchId::for_slot(round, position),
                    round,
                    position,
                    None,
                    None,
                ));
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::match_record::{matches_for_round, MatchStatus};

    fn players(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant::new(format!("P{i}"), format!("Player {i}")))
            .collect()
    }

    #[test]
    fn five_participants() {
        let bracket = BracketScheduler::from_seed(7)
            .generate_bracket(&players(5), BracketType::SingleElimination);

        let round_one = matches_for_round(&bracket, 1);
        assert_eq!(round_one.len(), 3);
        assert_eq!(
            round_one.iter().filter(|m| m.status == MatchStatus::Bye).count(),
            1
        );
        assert_eq!(round_one[2].status, MatchStatus::Bye);
        assert!(round_one[2].player2.is_none());

        assert_eq!(matches_for_round(&bracket, 2).len(), 2);
        assert_eq!(matches_for_round(&bracket, 3).len(), 1);
        assert!(matches_for_round(&bracket, 4).is_empty());
        assert_eq!(bracket.iter().map(|m| m.round).max(), Some(3));
    }

    #[test]
    fn placeholders_are_empty() {
        let bracket = BracketScheduler::from_seed(1)
            .generate_bracket(&players(8), BracketType::SingleElimination);
        for m in bracket.iter().filter(|m| m.round > 1) {
            assert!(m.player1.is_none() && m.player2.is_none());
            assert_eq!(m.status, MatchStatus::Scheduled);
        }
        let last = bracket.last().unwrap();
        assert_eq!(last.id.as_str(), "R3-M1");
    }

    #[test]
    fn first_round_is_a_permutation() {
        let field = players(11);
        let bracket =
            BracketScheduler::from_seed(99).generate_bracket(&field, BracketType::SingleElimination);
        let seen: Vec<_> = matches_for_round(&bracket, 1)
            .into_iter()
            .flat_map(|m| m.players().cloned().collect::<Vec<_>>())
            .collect();
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(seen.len(), 11);
        assert_eq!(unique.len(), 11);
    }

    #[test]
    fn seeding_follows_the_injected_rng() {
        let field = players(6);
        let bracket = BracketScheduler::new(StdRng::seed_from_u64(2024))
            .generate_bracket(&field, BracketType::SingleElimination);

        let mut expected: Vec<&Participant> = field.iter().collect();
        expected.shuffle(&mut StdRng::seed_from_u64(2024));

        let actual: Vec<_> = matches_for_round(&bracket, 1)
            .into_iter()
            .flat_map(|m| m.players().cloned().collect::<Vec<_>>())
            .collect();
        let expected: Vec<_> = expected.into_iter().map(|p| p.id.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn same_seed_same_bracket() {
        let field = players(9);
        let a =
            BracketScheduler::from_seed(5).generate_bracket(&field, BracketType::SingleElimination);
        let b =
            BracketScheduler::from_seed(5).generate_bracket(&field, BracketType::SingleElimination);
        assert_eq!(a, b);
    }

    #[test]
    fn double_elimination_falls_back() {
        let field = players(6);
        let single =
            BracketScheduler::from_seed(3).generate_bracket(&field, BracketType::SingleElimination);
        let double =
            BracketScheduler::from_seed(3).generate_bracket(&field, BracketType::DoubleElimination);
        assert_eq!(single, double);
    }

    #[test]
    fn too_few_participants() {
        let mut scheduler = BracketScheduler::from_seed(0);
        assert!(scheduler
            .generate_bracket(&[], BracketType::SingleElimination)
            .is_empty());
        assert!(scheduler
            .generate_bracket(&players(1), BracketType::SingleElimination)
            .is_empty());
    }

    #[test]
    fn two_participants_single_final() {
        let bracket = BracketScheduler::from_seed(0)
            .generate_bracket(&players(2), BracketType::SingleElimination);
        assert_eq!(bracket.len(), 1);
        assert_eq!(bracket[0].status, MatchStatus::Scheduled);
        assert!(bracket[0].opponents().is_some());
    }

    #[test]
    fn round_counts() {
        assert_eq!(round_count(1), 0);
        assert_eq!(round_count(2), 1);
        assert_eq!(round_count(5), 3);
        assert_eq!(round_count(16), 4);
        assert_eq!(round_count(17), 5);
    }

    #[test]
    fn parse_bracket_type() {
        assert_eq!(
            "single_elimination".parse::<BracketType>(),
            Ok(BracketType::SingleElimination)
        );
        assert_eq!(
            "DOUBLE-ELIMINATION".parse::<BracketType>(),
            Ok(BracketType::DoubleElimination)
        );
        assert_eq!(
            "ladder".parse::<BracketType>(),
            Err(EngineError::UnknownFormat("ladder".into()))
        );
    }
}
