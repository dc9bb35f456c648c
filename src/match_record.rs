//! Match records and pairing proposals.
//!
//! A [`Pairing`] is what a scheduler proposes; once the orchestrator persists it, it becomes a
//! [`Match`]. Matches are created by a scheduler and later mutated (status and winner) by the
//! external result-submission flow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Match identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Wraps a persistence-layer identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier derived from a bracket slot, e.g. `R2-M1`.
    pub fn for_slot(round: u32, position: u32) -> Self {
        Self(format!("R{round}-M{position}"))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for MatchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Waiting to be played (or, in a bracket, waiting for its players).
    Scheduled,
    /// Only one participant; nobody to play against.
    Bye,
    /// Result submitted. `winner` is `None` for a draw.
    Completed,
}

/// A persisted match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Identifier.
    pub id: MatchId,
    /// 1-based round number.
    pub round: u32,
    /// 1-based position inside the round.
    pub position: u32,
    /// First slot.
    pub player1: Option<ParticipantId>,
    /// Second slot.
    pub player2: Option<ParticipantId>,
    /// Winner, once completed.
    pub winner: Option<ParticipantId>,
    /// Lifecycle state.
    pub status: MatchStatus,
}

impl Match {
    /// A scheduled match between the given slots.
    pub fn new(
        id: impl Into<MatchId>,
        round: u32,
        position: u32,
        player1: Option<ParticipantId>,
        player2: Option<ParticipantId>,
    ) -> Self {
        Self {
            id: id.into(),
            round,
            position,
            player1,
            player2,
            winner: None,
            status: MatchStatus::Scheduled,
        }
    }

    /// Marks the match completed with the given winner (`None` for a draw).
    #[must_use]
    pub fn with_result(self, winner: Option<ParticipantId>) -> Self {
        Self {
            winner,
            status: MatchStatus::Completed,
            ..self
        }
    }

    /// Marks the match as a bye.
    #[must_use]
    pub fn with_bye(self) -> Self {
        Self {
            status: MatchStatus::Bye,
            ..self
        }
    }

    /// True once a result has been recorded.
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// True if the match is a bye, either explicitly or because only one slot is filled.
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Bye || (self.player1.is_some() != self.player2.is_some())
    }

    /// The filled slots, in order.
    pub fn players(&self) -> impl Iterator<Item = &ParticipantId> {
        self.player1.iter().chain(self.player2.iter())
    }

    /// Both players, if the match has two.
    pub fn opponents(&self) -> Option<(&ParticipantId, &ParticipantId)> {
        Some((self.player1.as_ref()?, self.player2.as_ref()?))
    }

    /// The player that did not win, for a completed two-player match with a winner.
    pub fn loser(&self) -> Option<&ParticipantId> {
        let winner = self.winner.as_ref()?;
        let (a, b) = self.opponents()?;
        if winner == a {
            Some(b)
        } else if winner == b {
            Some(a)
        } else {
            None
        }
    }
}

/// A proposed match that has not been persisted yet.
///
/// `player2 == None` is a bye.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pairing {
    /// First player.
    pub player1: ParticipantId,
    /// Second player, absent for a bye.
    pub player2: Option<ParticipantId>,
    /// 1-based round number.
    pub round: u32,
}

impl Pairing {
    /// A pairing between two participants.
    pub fn new(player1: ParticipantId, player2: ParticipantId, round: u32) -> Self {
        Self {
            player1,
            player2: Some(player2),
            round,
        }
    }

    /// A bye for `player` in `round`.
    pub fn bye(player: ParticipantId, round: u32) -> Self {
        Self {
            player1: player,
            player2: None,
            round,
        }
    }

    /// True if there is no opponent.
    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    /// True if `id` takes part in this pairing.
    pub fn involves(&self, id: &ParticipantId) -> bool {
        &self.player1 == id || self.player2.as_ref() == Some(id)
    }

    /// Turns the proposal into a match row. Byes are created with [`MatchStatus::Bye`].
    pub fn into_match(self, id: impl Into<MatchId>, position: u32) -> Match {
        let is_bye = self.is_bye();
        let m = Match::new(id, self.round, position, Some(self.player1), self.player2);
        if is_bye {
            m.with_bye()
        } else {
            m
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.player2 {
            Some(p2) => write!(f, "round {}: {} vs {}", self.round, self.player1, p2),
            None => write!(f, "round {}: {} (bye)", self.round, self.player1),
        }
    }
}

/// Matches belonging to `round`, in input order.
pub fn matches_for_round(matches: &[Match], round: u32) -> Vec<&Match> {
    matches.iter().filter(|m| m.round == round).collect()
}
