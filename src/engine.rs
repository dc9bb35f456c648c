//! Facade over the schedulers, standings and ratings.
//!
//! [`TournamentEngine`] is what the orchestration layer talks to. It is built from a validated
//! [`Configuration`], owns the random source used for bracket seeding and exposes every
//! operation as a method over a snapshot of participants and matches.
//!
//! Nothing here performs I/O besides the optional log file. Results must be persisted by the
//! caller.
//!
//! # Example
//!
//! ```
//! use tournament_engine::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = TournamentEngine::new(Configuration::new().with_bracket_seed(7))?;
//! let field: Vec<_> = (1..=4)
//!     .map(|i| Participant::new(format!("P{i}"), format!("Player {i}")))
//!     .collect();
//!
//! let schedule = engine.generate_round_robin_pairings(&field);
//! assert_eq!(schedule.len(), 6);
//!
//! assert_eq!(engine.get_new_ratings(1000, 1000, "win")?, (1016, 984));
//! # Ok(())
//! # }
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{instrument, trace};

use crate::{
    bracket::{BracketScheduler, BracketType},
    configuration::Configuration,
    error::EngineResult,
    logger::init_logger,
    match_record::{matches_for_round, Match, Pairing},
    participant::Participant,
    rating::RatingUpdater,
    round_robin::RoundRobinScheduler,
    standings::{Placement, Standing},
    swiss::SwissScheduler,
    tournament_scheduler::{TournamentFormat, TournamentScheduler},
    tournament_strategy::TournamentStrategy,
};

/// Entry point of the engine.
///
/// # Type Parameters
/// - `R`: random source used to seed elimination brackets
pub struct TournamentEngine<R = StdRng> {
    config: Configuration,
    round_robin: RoundRobinScheduler,
    swiss: SwissScheduler,
    bracket: BracketScheduler<R>,
    ratings: RatingUpdater,
}

impl TournamentEngine<StdRng> {
    /// Create a [`TournamentEngine`] from a [`Configuration`].
    ///
    /// Brackets are seeded from `bracket_seed` when set, from operating-system entropy
    /// otherwise.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the log file cannot be created.
    pub fn new(config: Configuration) -> anyhow::Result<Self> {
        let rng = match config.bracket_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> TournamentEngine<R> {
    /// Create a [`TournamentEngine`] seeding brackets from `rng`. `bracket_seed` is ignored.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the log file cannot be created.
    #[instrument(skip_all)]
    pub fn with_rng(config: Configuration, rng: R) -> anyhow::Result<Self> {
        config.validate()?;
        if config.log {
            init_logger(&config)?;
        }

        trace!(?config);

        Ok(TournamentEngine {
            round_robin: RoundRobinScheduler::new(),
            swiss: SwissScheduler::with_rounds(config.swiss_rounds),
            bracket: BracketScheduler::new(rng),
            ratings: RatingUpdater::new(config.k_factor, config.max_rating),
            config,
        })
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Round advancement driver for `format`, sharing the engine's Swiss settings.
    pub fn scheduler(&self, format: TournamentFormat) -> TournamentScheduler {
        TournamentScheduler::new(format, self.swiss)
    }

    /// Full round-robin schedule, ordered by round.
    #[instrument(skip_all, fields(participants = participants.len()))]
    pub fn generate_round_robin_pairings(&self, participants: &[Participant]) -> Vec<Pairing> {
        self.round_robin.generate_pairings(participants)
    }

    /// Round-robin standings: 3 points per win, sorted by points, wins, then fewer losses.
    #[instrument(skip_all, fields(participants = participants.len(), matches = matches.len()))]
    pub fn calculate_round_robin_standings(
        &self,
        participants: &[Participant],
        matches: &[Match],
    ) -> Vec<Standing> {
        self.round_robin.standings(participants, matches)
    }

    /// Swiss standings: 1 point per win, half a point per draw, median-Buchholz tie-breaker.
    #[instrument(skip_all, fields(participants = participants.len(), matches = matches.len()))]
    pub fn calculate_swiss_standings(
        &self,
        participants: &[Participant],
        matches: &[Match],
    ) -> Vec<Standing> {
        self.swiss.standings(participants, matches)
    }

    /// Round-robin standings with 1-based ranks.
    #[instrument(skip_all, fields(participants = participants.len(), matches = matches.len()))]
    pub fn calculate_round_robin_placements(
        &self,
        participants: &[Participant],
        matches: &[Match],
    ) -> Vec<Placement> {
        self.round_robin.placements(participants, matches)
    }

    /// Swiss standings with 1-based ranks.
    #[instrument(skip_all, fields(participants = participants.len(), matches = matches.len()))]
    pub fn calculate_swiss_placements(
        &self,
        participants: &[Participant],
        matches: &[Match],
    ) -> Vec<Placement> {
        self.swiss.placements(participants, matches)
    }

    /// True once every round-robin game has a result.
    #[instrument(skip_all, fields(participants = participants.len(), matches = matches.len()))]
    pub fn is_round_robin_tournament_complete(
        &self,
        participants: &[Participant],
        matches: &[Match],
    ) -> bool {
        self.round_robin.is_complete(participants, matches)
    }

    /// Highest round-robin round present in `matches`, capped at the number of rounds.
    #[instrument(skip_all, fields(participants = participants.len(), matches = matches.len()))]
    pub fn get_current_round(&self, participants: &[Participant], matches: &[Match]) -> u32 {
        self.round_robin.current_round(participants, matches)
    }

    /// Matches of `round`, in input order.
    pub fn get_matches_for_round<'a>(&self, matches: &'a [Match], round: u32) -> Vec<&'a Match> {
        matches_for_round(matches, round)
    }

    /// Swiss pairings of `round`, given the results of earlier rounds.
    #[instrument(skip_all, fields(participants = participants.len(), round = round))]
    pub fn generate_swiss_pairings(
        &self,
        participants: &[Participant],
        matches: &[Match],
        round: u32,
    ) -> Vec<Pairing> {
        self.swiss.generate_pairings(participants, matches, round)
    }

    /// Seeded elimination bracket: round 1 plus empty matches for later rounds.
    #[instrument(skip_all, fields(participants = participants.len(), kind = %bracket_type))]
    pub fn generate_bracket(
        &mut self,
        participants: &[Participant],
        bracket_type: BracketType,
    ) -> Vec<Match> {
        self.bracket.generate_bracket(participants, bracket_type)
    }

    /// New ratings of (challenger, challenged). `result` is the challenger's: `win`, `loss` or
    /// `draw`.
    ///
    /// # Errors
    /// [`EngineError::InvalidResult`](crate::error::EngineError::InvalidResult) for any other
    /// result.
    #[instrument(skip(self))]
    pub fn get_new_ratings(
        &self,
        challenger: i32,
        challenged: i32,
        result: &str,
    ) -> EngineResult<(i32, i32)> {
        self.ratings.new_ratings(challenger, challenged, result)
    }
}
