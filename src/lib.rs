//! # Tournament Engine
//!
//! Pairing, standings and rating computations for tournaments, meant to sit behind an
//! orchestration and persistence layer.
//!
//! It provides:
//! - Round-robin schedules with the circle method ([`RoundRobinScheduler`](crate::round_robin::RoundRobinScheduler))
//! - Swiss pairings avoiding rematches ([`SwissScheduler`](crate::swiss::SwissScheduler))
//! - Seeded single-elimination brackets ([`BracketScheduler`](crate::bracket::BracketScheduler))
//! - Standings and placements derived from match history ([`standings`])
//! - Elo rating updates ([`rating`])
//!
//! Every operation is a pure function over a snapshot of participants and matches: the engine
//! never decides when a round starts and never stores anything. Persist the returned pairings,
//! submit results, then ask again.
//!
//! # Documentation Overview
//!
//! - Every operation is available on [`TournamentEngine`](crate::engine::TournamentEngine), see
//!   the [`engine`] module.
//! - Behavior (rating parameters, bracket seed, Swiss round count, logging) is set through
//!   [`Configuration`](crate::configuration::Configuration).
//! - Round-based formats share the [`TournamentStrategy`](crate::tournament_strategy::TournamentStrategy)
//!   trait; [`TournamentScheduler`](crate::tournament_scheduler::TournamentScheduler) drives any
//!   format round after round.
//!
//! # Usage Example
//!
//! A Swiss tournament played to the end:
//!
//! ```
//! use tournament_engine::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = TournamentEngine::new(Configuration::new())?;
//!     let scheduler = engine.scheduler(TournamentFormat::Swiss);
//!
//!     let field: Vec<_> = ["ada", "bob", "cyd", "dee", "eve"]
//!         .iter()
//!         .map(|name| Participant::new(*name, name.to_uppercase()))
//!         .collect();
//!     let mut matches: Vec<Match> = vec![];
//!
//!     loop {
//!         match scheduler.advance(&field, &matches) {
//!             RoundPlan::Round { pairings, .. } => {
//!                 for (i, pairing) in pairings.into_iter().enumerate() {
//!                     let id = format!("m{}", matches.len());
//!                     matches.push(pairing.into_match(id, i as u32 + 1));
//!                 }
//!             }
//!             RoundPlan::Waiting { .. } => {
//!                 // here the real results would be submitted
//!                 for m in matches.iter_mut().filter(|m| m.status == MatchStatus::Scheduled) {
//!                     let winner = m.player1.clone();
//!                     *m = m.clone().with_result(winner);
//!                 }
//!             }
//!             RoundPlan::GenerateBracket(_) => unreachable!(),
//!             RoundPlan::Finished => break,
//!         }
//!     }
//!
//!     for placement in engine.calculate_swiss_placements(&field, &matches) {
//!         println!("{}. {} ({} pts)", placement.rank, placement.participant, placement.points);
//!     }
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub use anyhow;
pub mod bracket;
pub mod configuration;
pub mod engine;
pub mod error;
mod logger;
pub mod match_record;
pub mod participant;
pub mod rating;
pub mod round_robin;
pub mod standings;
pub mod swiss;
pub mod tournament_scheduler;
pub mod tournament_strategy;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use tournament_engine::prelude::*;
/// ```
///
/// Includes:
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`TournamentEngine`](crate::engine::TournamentEngine)
/// - the data model and error types
/// - all built-in schedulers and the [`TournamentStrategy`](crate::tournament_strategy::TournamentStrategy) trait
pub mod prelude {
    pub use crate::bracket::{BracketScheduler, BracketType};
    pub use crate::configuration::Configuration;
    pub use crate::engine::TournamentEngine;
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::match_record::{Match, MatchId, MatchStatus, Pairing};
    pub use crate::participant::{Participant, ParticipantId};
    pub use crate::rating::{MatchOutcome, RatingUpdater};
    pub use crate::round_robin::RoundRobinScheduler;
    pub use crate::standings::{Placement, ScoringRules, Standing, StandingsCalculator};
    pub use crate::swiss::SwissScheduler;
    pub use crate::tournament_scheduler::{RoundPlan, TournamentFormat, TournamentScheduler};
    pub use crate::tournament_strategy::TournamentStrategy;
}
