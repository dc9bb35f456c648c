//! Swiss-system pairing, one round at a time.
//!
//! Participants are ranked by their Swiss score (win 1, draw ½, bye 1) and split into score
//! groups, highest first. Each participant, in rank order, is paired with the first participant
//! below it that it has not met yet. When a score group cannot be paired completely, its
//! leftover floats down into the next group. The search backtracks, so a participant left
//! without a legal opponent further down makes the pairings above it be revisited. Rematches are
//! only accepted when no rematch-free assignment exists at all.
//!
//! With an odd field, the lowest-ranked participant that has not had a bye yet sits out and is
//! credited a win.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::{
    match_record::{matches_for_round, Match, Pairing},
    participant::{Participant, ParticipantId},
    standings::{ScoringRules, Standing, StandingsCalculator},
    tournament_strategy::TournamentStrategy,
};

/// Upper bound on backtracking steps before falling back to allowing rematches.
const SEARCH_BUDGET: usize = 100_000;

/// Swiss-system scheduler.
///
/// The number of rounds can be fixed, or derived from the field size as `ceil(log2(n))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwissScheduler {
    rounds: Option<u32>,
}

impl SwissScheduler {
    /// Number of rounds is `ceil(log2(n))`, `n` being the number of participants.
    pub fn with_auto_rounds() -> Self {
        Self { rounds: None }
    }

    /// Fixed number of rounds. `0` is the same as [`with_auto_rounds`](Self::with_auto_rounds).
    pub fn with_rounds(rounds: u32) -> Self {
        Self {
            rounds: (rounds > 0).then_some(rounds),
        }
    }

    /// `ceil(log2(n))`, zero below two participants.
    pub fn auto_round_count(participant_count: usize) -> u32 {
        if participant_count < 2 {
            0
        } else {
            participant_count.next_power_of_two().trailing_zeros()
        }
    }

    /// Pairings for `round`, using only matches from earlier rounds.
    ///
    /// Regular pairings come first, in rank order, followed by the bye (if any). The
    /// higher-ranked participant is always `player1`.
    pub fn generate_pairings(
        &self,
        participants: &[Participant],
        matches: &[Match],
        round: u32,
    ) -> Vec<Pairing> {
        if participants.len() < 2 || round == 0 {
            return vec![];
        }

        let previous: Vec<Match> = matches.iter().filter(|m| m.round < round).cloned().collect();
        let standings = self.standings(participants, &previous);

        let mut played: HashSet<(&ParticipantId, &ParticipantId)> = HashSet::new();
        let mut had_bye: HashSet<&ParticipantId> = HashSet::new();
        for m in &previous {
            if let Some((a, b)) = m.opponents() {
                played.insert(ordered(a, b));
            } else if m.is_bye() {
                had_bye.extend(m.players());
            }
        }

        let mut order: Vec<&ParticipantId> = vec![];
        for (score, group) in score_groups(&standings) {
            let ids: Vec<&str> = group.iter().map(|s| s.participant.id.as_str()).collect();
            debug!(round, score, group = ?ids, "score group");
            order.extend(group.into_iter().map(|s| &s.participant.id));
        }

        let bye = if order.len() % 2 == 1 {
            let pos = match order.iter().rposition(|id| !had_bye.contains(id)) {
                Some(pos) => pos,
                None => {
                    warn!(round, "every participant already had a bye, assigning a second one");
                    order.len() - 1
                }
            };
            let id = order.remove(pos);
            info!(round, participant = %id, "receives a bye");
            Some(id)
        } else {
            None
        };

        let pairs = match pair_participants(&order, &played) {
            Some(pairs) => pairs,
            None => {
                let pairs = pair_fewest_rematches(&order, &played);
                let rematches = pairs
                    .iter()
                    .filter(|(a, b)| played.contains(&ordered(a, b)))
                    .count();
                warn!(round, rematches, "no pairing without rematch exists");
                pairs
            }
        };

        let mut pairings: Vec<Pairing> = pairs
            .into_iter()
            .map(|(a, b)| Pairing::new(a.clone(), b.clone(), round))
            .collect();
        if let Some(id) = bye {
            pairings.push(Pairing::bye(id.clone(), round));
        }
        pairings
    }
}

impl TournamentStrategy for SwissScheduler {
    fn scoring(&self) -> ScoringRules {
        ScoringRules::SWISS
    }

    fn total_rounds(&self, participant_count: usize) -> u32 {
        if participant_count < 2 {
            return 0;
        }
        self.rounds
            .unwrap_or_else(|| Self::auto_round_count(participant_count))
    }

    fn pairings_for_round(
        &self,
        participants: &[Participant],
        matches: &[Match],
        round: u32,
    ) -> Vec<Pairing> {
        self.generate_pairings(participants, matches, round)
    }

    /// True once the last round exists and all of its matches are completed or byes.
    fn is_complete(&self, participants: &[Participant], matches: &[Match]) -> bool {
        let last = self.total_rounds(participants.len());
        if last == 0 {
            return false;
        }
        let last_round = matches_for_round(matches, last);
        !last_round.is_empty() && last_round.iter().all(|m| m.is_completed() || m.is_bye())
    }

    /// Standings sorted by points, median-Buchholz, wins, then fewest losses.
    fn standings(&self, participants: &[Participant], matches: &[Match]) -> Vec<Standing> {
        let mut standings = StandingsCalculator::new(self.scoring()).tally(participants, matches);
        update_tie_breakers(&mut standings, matches);
        standings.sort_by(|a, b| {
            b.points
                .total_cmp(&a.points)
                .then_with(|| b.tie_breaker.total_cmp(&a.tie_breaker))
                .then_with(|| b.wins.cmp(&a.wins))
                .then_with(|| a.losses.cmp(&b.losses))
        });
        standings
    }
}

fn ordered<'a>(
    a: &'a ParticipantId,
    b: &'a ParticipantId,
) -> (&'a ParticipantId, &'a ParticipantId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Groups consecutive standings sharing the same points, highest score first.
///
/// `standings` must already be sorted.
fn score_groups(standings: &[Standing]) -> Vec<(f64, Vec<&Standing>)> {
    let mut groups: Vec<(f64, Vec<&Standing>)> = vec![];
    for standing in standings {
        if let Some((score, group)) = groups.last_mut() {
            if *score == standing.points {
                group.push(standing);
                continue;
            }
        }
        groups.push((standing.points, vec![standing]));
    }
    groups
}

/// Median tie-breaker: sum of the opponents' points minus the best and the worst.
/// <https://en.wikipedia.org/wiki/Tie-breaking_in_Swiss-system_tournaments#Median_/_Buchholz_/_Solkoff>
fn update_tie_breakers(standings: &mut [Standing], matches: &[Match]) {
    let points: HashMap<ParticipantId, f64> = standings
        .iter()
        .map(|s| (s.participant.id.clone(), s.points))
        .collect();

    let mut opponents: HashMap<&ParticipantId, Vec<f64>> = HashMap::new();
    for m in matches.iter().filter(|m| m.is_completed()) {
        let Some((a, b)) = m.opponents() else {
            continue;
        };
        let (Some(&pa), Some(&pb)) = (points.get(a), points.get(b)) else {
            continue;
        };
        opponents.entry(a).or_default().push(pb);
        opponents.entry(b).or_default().push(pa);
    }

    for standing in standings.iter_mut() {
        let adv_scores = opponents
            .get(&standing.participant.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        standing.tie_breaker = if adv_scores.len() <= 1 {
            0.0
        } else {
            let min = adv_scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = adv_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            adv_scores.iter().sum::<f64>() - min - max
        };
    }
}

/// Pairs `order` (even length, best first) so that nobody meets a previous opponent.
///
/// Returns `None` if that is impossible (or too expensive to find).
fn pair_participants<'a>(
    order: &[&'a ParticipantId],
    played: &HashSet<(&ParticipantId, &ParticipantId)>,
) -> Option<Vec<(&'a ParticipantId, &'a ParticipantId)>> {
    let mut remaining = order.to_vec();
    let mut pairs = Vec::with_capacity(order.len() / 2);
    let mut budget = SEARCH_BUDGET;
    search(&mut remaining, played, &mut budget, &mut pairs).then_some(pairs)
}

fn search<'a>(
    remaining: &mut Vec<&'a ParticipantId>,
    played: &HashSet<(&ParticipantId, &ParticipantId)>,
    budget: &mut usize,
    pairs: &mut Vec<(&'a ParticipantId, &'a ParticipantId)>,
) -> bool {
    if remaining.len() < 2 {
        return remaining.is_empty();
    }
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    let first = remaining.remove(0);
    for j in 0..remaining.len() {
        let candidate = remaining[j];
        if played.contains(&ordered(first, candidate)) {
            continue;
        }
        remaining.remove(j);
        pairs.push((first, candidate));
        if search(remaining, played, budget, pairs) {
            return true;
        }
        pairs.pop();
        remaining.insert(j, candidate);
    }
    remaining.insert(0, first);
    false
}

/// Pairs `order` (even length, best first) with as few rematches as the search budget allows.
///
/// Opponents not met yet are always tried first, in rank order.
fn pair_fewest_rematches<'a>(
    order: &[&'a ParticipantId],
    played: &HashSet<(&ParticipantId, &ParticipantId)>,
) -> Vec<(&'a ParticipantId, &'a ParticipantId)> {
    let mut search = RematchSearch {
        played,
        budget: SEARCH_BUDGET,
        pairs: Vec::with_capacity(order.len() / 2),
        best: None,
    };
    search.run(&mut order.to_vec(), 0);
    search.best.map(|(pairs, _)| pairs).unwrap_or_default()
}

/// Branch and bound over pairings, counting rematches.
struct RematchSearch<'a, 'p> {
    played: &'p HashSet<(&'p ParticipantId, &'p ParticipantId)>,
    budget: usize,
    pairs: Vec<(&'a ParticipantId, &'a ParticipantId)>,
    best: Option<(Vec<(&'a ParticipantId, &'a ParticipantId)>, usize)>,
}

impl<'a> RematchSearch<'a, '_> {
    fn is_rematch(&self, a: &ParticipantId, b: &ParticipantId) -> bool {
        self.played.contains(&ordered(a, b))
    }

    fn run(&mut self, remaining: &mut Vec<&'a ParticipantId>, rematches: usize) {
        if let Some((_, fewest)) = &self.best {
            // the first complete pairing is always kept, the budget only cuts improvements
            if rematches >= *fewest || self.budget == 0 {
                return;
            }
        }
        if remaining.is_empty() {
            self.best = Some((self.pairs.clone(), rematches));
            return;
        }
        if remaining.len() < 2 {
            return;
        }
        self.budget = self.budget.saturating_sub(1);

        let first = remaining.remove(0);
        let (fresh, met): (Vec<usize>, Vec<usize>) =
            (0..remaining.len()).partition(|&j| !self.is_rematch(first, remaining[j]));
        for j in fresh.into_iter().chain(met) {
            let candidate = remaining.remove(j);
            let cost = usize::from(self.is_rematch(first, candidate));
            self.pairs.push((first, candidate));
            self.run(remaining, rematches + cost);
            self.pairs.pop();
            remaining.insert(j, candidate);
        }
        remaining.insert(0, first);
    }
}
