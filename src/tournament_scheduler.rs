//! Round advancement across tournament formats.
//!
//! [`TournamentScheduler`] looks at a snapshot and tells the orchestrator what to do next: persist
//! the pairings of a new round, wait for pending results, generate the bracket, or stop. It never
//! decides *when* a round starts, and it cannot tell whether another caller already generated
//! the round it proposes: the orchestrator must serialize calls per tournament.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    bracket::BracketType,
    error::EngineError,
    match_record::{matches_for_round, Match, MatchStatus, Pairing},
    participant::Participant,
    round_robin::RoundRobinScheduler,
    swiss::SwissScheduler,
    tournament_strategy::TournamentStrategy,
};

/// Supported tournament formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentFormat {
    /// Everybody meets everybody once.
    RoundRobin,
    /// Score-based pairing, one round at a time.
    Swiss,
    /// Knockout bracket.
    SingleElimination,
    /// Generated as a single-elimination bracket.
    DoubleElimination,
}

impl TournamentFormat {
    /// Bracket kind for elimination formats, `None` for round-based ones.
    pub fn bracket_type(self) -> Option<BracketType> {
        match self {
            Self::SingleElimination => Some(BracketType::SingleElimination),
            Self::DoubleElimination => Some(BracketType::DoubleElimination),
            Self::RoundRobin | Self::Swiss => None,
        }
    }
}

impl FromStr for TournamentFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ROUND_ROBIN" => Ok(Self::RoundRobin),
            "SWISS" => Ok(Self::Swiss),
            "SINGLE_ELIMINATION" => Ok(Self::SingleElimination),
            "DOUBLE_ELIMINATION" => Ok(Self::DoubleElimination),
            _ => Err(EngineError::UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RoundRobin => "ROUND_ROBIN",
            Self::Swiss => "SWISS",
            Self::SingleElimination => "SINGLE_ELIMINATION",
            Self::DoubleElimination => "DOUBLE_ELIMINATION",
        };
        f.write_str(name)
    }
}

/// What the orchestrator should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPlan {
    /// Persist these pairings as round `round`.
    Round {
        /// Round being created.
        round: u32,
        /// Pairings of that round.
        pairings: Vec<Pairing>,
    },
    /// Round `round` still has `pending` matches without a result.
    Waiting {
        /// Round in progress.
        round: u32,
        /// Matches still to be played.
        pending: usize,
    },
    /// No match exists yet: generate the bracket.
    GenerateBracket(BracketType),
    /// Nothing left to play.
    Finished,
}

/// Dispatches round advancement to the scheduler of a format.
#[derive(Debug, Clone, Copy)]
pub struct TournamentScheduler {
    format: TournamentFormat,
    round_robin: RoundRobinScheduler,
    swiss: SwissScheduler,
}

impl TournamentScheduler {
    /// Scheduler for `format`. Swiss tournaments use `swiss` to know their round count.
    pub fn new(format: TournamentFormat, swiss: SwissScheduler) -> Self {
        Self {
            format,
            round_robin: RoundRobinScheduler::new(),
            swiss,
        }
    }

    /// Format being scheduled.
    pub fn format(&self) -> TournamentFormat {
        self.format
    }

    /// Strategy behind a round-based format.
    pub fn strategy(&self) -> Option<&dyn TournamentStrategy> {
        match self.format {
            TournamentFormat::RoundRobin => Some(&self.round_robin),
            TournamentFormat::Swiss => Some(&self.swiss),
            TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => None,
        }
    }

    /// Next step for the tournament described by the snapshot.
    pub fn advance(&self, participants: &[Participant], matches: &[Match]) -> RoundPlan {
        let plan = match (self.strategy(), self.format.bracket_type()) {
            (Some(strategy), _) => Self::advance_rounds(strategy, participants, matches),
            (None, Some(bracket_type)) => {
                Self::advance_bracket(bracket_type, participants, matches)
            }
            (None, None) => RoundPlan::Finished,
        };
        debug!(format = %self.format, ?plan, "advance");
        plan
    }

    /// True once nothing is left to play.
    pub fn is_finished(&self, participants: &[Participant], matches: &[Match]) -> bool {
        self.advance(participants, matches) == RoundPlan::Finished
    }

    fn advance_rounds(
        strategy: &dyn TournamentStrategy,
        participants: &[Participant],
        matches: &[Match],
    ) -> RoundPlan {
        let total = strategy.total_rounds(participants.len());
        let latest = matches.iter().map(|m| m.round).max().unwrap_or(0);

        if latest > 0 {
            let pending = count_pending(matches, latest);
            if pending > 0 {
                return RoundPlan::Waiting {
                    round: latest,
                    pending,
                };
            }
        }
        if latest >= total {
            return RoundPlan::Finished;
        }

        let round = latest + 1;
        trace!(round, total, "next round");
        RoundPlan::Round {
            round,
            pairings: strategy.pairings_for_round(participants, matches, round),
        }
    }

    fn advance_bracket(
        bracket_type: BracketType,
        participants: &[Participant],
        matches: &[Match],
    ) -> RoundPlan {
        let Some(last) = matches.iter().map(|m| m.round).max() else {
            return if participants.len() < 2 {
                RoundPlan::Finished
            } else {
                RoundPlan::GenerateBracket(bracket_type)
            };
        };

        // advancing winners is done outside: report the earliest round still being played
        match (1..=last)
            .map(|round| (round, count_pending(matches, round)))
            .find(|&(_, pending)| pending > 0)
        {
            Some((round, pending)) => RoundPlan::Waiting { round, pending },
            None => RoundPlan::Finished,
        }
    }
}

/// Matches of `round` still waiting for a result.
///
/// Only the status counts: a bracket slot holding one advanced winner is still waiting for the
/// other, it is not a bye.
fn count_pending(matches: &[Match], round: u32) -> usize {
    matches_for_round(matches, round)
        .into_iter()
        .filter(|m| m.status == MatchStatus::Scheduled)
        .count()
}
