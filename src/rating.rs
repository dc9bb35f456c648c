//! Elo rating updates

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// K-factor for Elo updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Ratings are never raised above this value
pub const MAX_RATING: i32 = 3000;

/// Result of a match from the challenger's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    /// Challenger won
    Win,
    /// Challenger lost
    Loss,
    /// Nobody won
    Draw,
}

impl MatchOutcome {
    /// Actual scores of (challenger, challenged)
    pub fn scores(self) -> (f64, f64) {
        match self {
            MatchOutcome::Win => (1.0, 0.0),
            MatchOutcome::Loss => (0.0, 1.0),
            MatchOutcome::Draw => (0.5, 0.5),
        }
    }
}

impl FromStr for MatchOutcome {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(MatchOutcome::Win),
            "loss" => Ok(MatchOutcome::Loss),
            "draw" => Ok(MatchOutcome::Draw),
            other => Err(EngineError::InvalidResult(other.to_owned())),
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Win => f.write_str("win"),
            MatchOutcome::Loss => f.write_str("loss"),
            MatchOutcome::Draw => f.write_str("draw"),
        }
    }
}

/// Expected score of a player rated `rating` against `opponent_rating`.
///
/// `expected_score(a, b) + expected_score(b, a) == 1` for any pair of ratings.
pub fn expected_score(rating: f64, opponent_rating: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent_rating - rating) / 400.0))
}

/// Elo calculator. Ratings are capped at `max_rating`; there is no floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingUpdater {
    k_factor: f64,
    max_rating: i32,
}

impl Default for RatingUpdater {
    fn default() -> Self {
        Self::new(K_FACTOR, MAX_RATING)
    }
}

impl RatingUpdater {
    /// Calculator with a custom K-factor and cap.
    pub fn new(k_factor: f64, max_rating: i32) -> Self {
        Self {
            k_factor,
            max_rating,
        }
    }

    /// K-factor in use.
    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }

    /// Rating cap in use.
    pub fn max_rating(&self) -> i32 {
        self.max_rating
    }

    /// New rating after scoring `score` (1 win, 0.5 draw, 0 loss) against `opponent_rating`.
    ///
    /// Halves round up, toward positive infinity, for negative ratings too.
    pub fn new_rating(&self, rating: i32, opponent_rating: i32, score: f64) -> i32 {
        let expected = expected_score(rating as f64, opponent_rating as f64);
        let new = (rating as f64 + self.k_factor * (score - expected) + 0.5).floor();
        // `as` saturates on overflow
        (new as i32).min(self.max_rating)
    }

    /// New ratings of (challenger, challenged) for a given outcome.
    pub fn update(&self, challenger: i32, challenged: i32, outcome: MatchOutcome) -> (i32, i32) {
        let (score_challenger, score_challenged) = outcome.scores();
        let ratings = (
            self.new_rating(challenger, challenged, score_challenger),
            self.new_rating(challenged, challenger, score_challenged),
        );
        debug!(challenger, challenged, %outcome, ?ratings, "ratings updated");
        ratings
    }

    /// New ratings of (challenger, challenged), `result` being `win`, `loss` or `draw`.
    ///
    /// # Errors
    /// [`EngineError::InvalidResult`] for any other result string.
    pub fn new_ratings(
        &self,
        challenger: i32,
        challenged: i32,
        result: &str,
    ) -> EngineResult<(i32, i32)> {
        let outcome = result.parse::<MatchOutcome>()?;
        Ok(self.update(challenger, challenged, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_score_equal_ratings() {
        let expected = expected_score(1500.0, 1500.0);
        assert!((expected - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_expected_score_higher_rated() {
        let expected = expected_score(1700.0, 1500.0);
        assert!(expected > 0.7);
        assert!(expected < 0.8);
    }

    #[test]
    fn test_win_between_equals() {
        let ratings = RatingUpdater::default().new_ratings(1000, 1000, "win");
        assert_eq!(ratings, Ok((1016, 984)));
    }

    #[test]
    fn test_loss_and_draw() {
        let updater = RatingUpdater::default();
        assert_eq!(updater.new_ratings(1000, 1000, "loss"), Ok((984, 1016)));
        assert_eq!(updater.new_ratings(1000, 1000, "draw"), Ok((1000, 1000)));
        // the favourite loses points on a draw
        assert_eq!(updater.new_ratings(1400, 1000, "draw"), Ok((1387, 1013)));
    }

    #[test]
    fn test_invalid_result() {
        let err = RatingUpdater::default().new_ratings(1000, 1000, "forfeit");
        assert_eq!(err, Err(EngineError::InvalidResult("forfeit".to_owned())));
        assert!(RatingUpdater::default().new_ratings(1000, 1000, "Win").is_err());
    }

    #[test]
    fn test_cap() {
        let updater = RatingUpdater::default();
        assert_eq!(updater.new_rating(2995, 1000, 1.0), 2995);
        assert_eq!(updater.new_rating(2990, 2990, 1.0), 3000);
        assert_eq!(updater.new_rating(3000, 3000, 1.0), 3000);
    }

    #[test]
    fn test_no_floor() {
        let updater = RatingUpdater::default();
        assert_eq!(updater.new_rating(0, 0, 0.0), -16);
    }

    #[test]
    fn test_halves_round_up() {
        let updater = RatingUpdater::new(1.0, 3000);
        assert_eq!(updater.new_rating(1000, 1000, 1.0), 1001);
        assert_eq!(updater.new_rating(-1000, -1000, 0.0), -1000);
        assert_eq!(updater.new_rating(-1000, -1000, 1.0), -999);
    }

    #[test]
    fn test_custom_k_factor() {
        let updater = RatingUpdater::new(16.0, 2500);
        assert_eq!(updater.new_rating(1000, 1000, 1.0), 1008);
        assert_eq!(updater.new_rating(2499, 2499, 1.0), 2500);
    }
}
