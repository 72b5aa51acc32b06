//! Schedule generation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::circle::{round_opponents, seeded_order};
use super::config::PairingConfig;
use super::seed::first_player_tiebreak;
use super::types::{GamePairing, Schedule};
use crate::error::{LeagueError, Result};

/// Generates round-robin schedules.
///
/// # Usage
///
/// ```
/// use u_ladder::pairing::{PairingConfig, PairingRunner};
///
/// let schedule = PairingRunner::generate(14, 12345, &PairingConfig::default()).unwrap();
/// assert_eq!(schedule.pairings.len(), 91);
/// assert_eq!(schedule.rounds, 13);
/// ```
pub struct PairingRunner;

impl PairingRunner {
    /// Generates the schedule for `n` players.
    ///
    /// A full round robin has `n - 1` rounds for even `n` and `n` rounds
    /// (one bye each) for odd `n`. A round cap below that drops the later
    /// rounds. Odd fields at or above `subset_min_players` instead keep
    /// the full rotation and drop individual games until everyone plays
    /// `subset_games`.
    pub fn generate(n: usize, seed: u64, config: &PairingConfig) -> Result<Schedule> {
        config.validate().map_err(LeagueError::InvalidConfig)?;
        if n < 2 {
            return Err(LeagueError::InvalidPairing(format!(
                "need at least 2 players, got {n}"
            )));
        }

        let full_rounds = if n % 2 == 0 { n - 1 } else { n };
        let subset_target = config
            .subset_games
            .filter(|&g| n % 2 == 1 && n >= config.subset_min_players && g < n - 1);

        let mut rounds = full_rounds;
        let mut complete = true;
        if subset_target.is_none() {
            if let Some(cap) = config.round_cap_for(n) {
                if rounds > cap {
                    rounds = cap;
                    complete = false;
                }
            }
        }

        let order = seeded_order(n, seed);
        let mut pairings = Vec::with_capacity(rounds * n / 2);
        for round in 0..rounds {
            let opponents = round_opponents(&order, n, round);
            for (i, opponent) in opponents.iter().enumerate() {
                let Some(o) = *opponent else { continue };
                if o < i {
                    continue;
                }
                pairings.push(GamePairing {
                    player1: i,
                    player2: o,
                    player1_first: complete && phase_first(i, o, round, n),
                    round,
                });
            }
        }

        if let Some(target) = subset_target {
            pairings = select_balanced_subset(&pairings, n, target, seed, config.subset_attempts)?;
            complete = false;
            pairings.sort_by_key(|p| (p.round, p.player1 + p.player2));
            assign_firsts_greedy(&mut pairings, n, seed);
        } else if !complete {
            assign_firsts_greedy(&mut pairings, n, seed);
        }

        debug!(
            players = n,
            rounds,
            games = pairings.len(),
            complete,
            "generated schedule"
        );
        Ok(Schedule {
            players: n,
            rounds,
            complete,
            pairings,
        })
    }

    /// Generates one schedule per `(players, seed)` request, in order.
    pub fn generate_many(requests: &[(usize, u64)], config: &PairingConfig) -> Result<Vec<Schedule>> {
        let one = |&(n, seed): &(usize, u64)| Self::generate(n, seed, config);

        #[cfg(feature = "parallel")]
        let schedules = if config.parallel {
            requests.par_iter().map(one).collect()
        } else {
            requests.iter().map(one).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let schedules = requests.iter().map(one).collect();

        schedules
    }
}

/// Phase rule for complete schedules: player 1 moves first unless
/// `round / total_rounds + player1 + player2` is odd.
fn phase_first(player1: usize, player2: usize, round: usize, n: usize) -> bool {
    let total_rounds = n + (n % 2) - 1;
    let sum = round / total_rounds + player1 + player2;
    sum % 2 == 0
}

/// Gives the first move to whichever player has fewer so far.
fn assign_firsts_greedy(pairings: &mut [GamePairing], n: usize, seed: u64) {
    let mut firsts = vec![0u32; n];
    for p in pairings.iter_mut() {
        let (a, b) = (firsts[p.player1], firsts[p.player2]);
        p.player1_first = if a == b {
            first_player_tiebreak(p.player1, p.player2, p.round, seed)
        } else {
            a < b
        };
        let (first, _) = p.order();
        firsts[first] += 1;
    }
}

/// Drops games so every player plays exactly `target`.
///
/// Each attempt shuffles the games and removes any game whose two players
/// both still have games to shed. Attempts use `seed`, `seed + 1`, ...
fn select_balanced_subset(
    all: &[GamePairing],
    n: usize,
    target: usize,
    seed: u64,
    attempts: usize,
) -> Result<Vec<GamePairing>> {
    let shed = (n - 1).saturating_sub(target);
    if shed == 0 {
        return Ok(all.to_vec());
    }
    for attempt in 0..attempts {
        let attempt_seed = seed.wrapping_add(attempt as u64);
        if let Some(subset) = try_subset(all, n, shed, attempt_seed) {
            debug!(players = n, attempt, "balanced subset found");
            return Ok(subset);
        }
    }
    warn!(players = n, attempts, "balanced subset selection failed");
    Err(LeagueError::InvalidPairing(format!(
        "no balanced {target}-game subset for {n} players after {attempts} attempts"
    )))
}

fn try_subset(all: &[GamePairing], n: usize, shed: usize, seed: u64) -> Option<Vec<GamePairing>> {
    let mut shuffled = all.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut to_shed = vec![shed; n];
    let mut kept = Vec::with_capacity(shuffled.len());
    for p in shuffled {
        if to_shed[p.player1] > 0 && to_shed[p.player2] > 0 {
            to_shed[p.player1] -= 1;
            to_shed[p.player2] -= 1;
        } else {
            kept.push(p);
        }
    }
    to_shed.iter().all(|&r| r == 0).then_some(kept)
}
