//! DP partition search.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::PartitionConfig;
use super::cost::{division_cost, player_penalty, size_penalty};
use super::types::{PartitionBlock, PartitionPlayer, PartitionResult};
use crate::error::{LeagueError, Result};

/// Solves the division partition problem.
///
/// # Usage
///
/// ```ignore
/// let config = PartitionConfig::default().with_ideal_size(15);
/// let result = PartitionSolver::solve(&players, &config)?;
/// for block in &result.divisions {
///     println!("division {}: {} players", block.number, block.players.len());
/// }
/// ```
///
/// # Algorithm
///
/// Players are sorted by priority (highest first). `dp[k][i]` is the least
/// cost of splitting the first `i` players into `k` contiguous divisions,
/// where division `k` takes between `absolute_min` and `absolute_max`
/// players. Because a division's cost depends only on its members and its
/// own number, one table up to the largest candidate count answers every
/// candidate `K ∈ [max(1, K₀ − r), K₀ + r]` with `K₀ = round(N / ideal)`.
/// The cheapest `dp[K][N]` wins; ties go to the smaller `K`.
///
/// Per-division placement penalties are prefix-summed so each transition
/// is O(1). The whole search is O(K · N · (absolute_max − absolute_min)).
pub struct PartitionSolver;

const INF: f64 = f64::INFINITY;

impl PartitionSolver {
    /// Runs the partitioner.
    pub fn solve(players: &[PartitionPlayer], config: &PartitionConfig) -> Result<PartitionResult> {
        Self::solve_with_cancel(players, config, None)
    }

    /// Runs the partitioner with an optional cancellation token.
    ///
    /// The flag is checked between DP rows. If it is raised after at least
    /// one candidate division count has been fully evaluated, the best of
    /// those is returned with `cancelled` set; otherwise the call fails with
    /// [`LeagueError::Cancelled`].
    pub fn solve_with_cancel(
        players: &[PartitionPlayer],
        config: &PartitionConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<PartitionResult> {
        Self::solve_until(players, config, |_| {
            cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
        })
    }

    /// Runs the search, stopping before DP row `k` when `stop(k)` holds.
    fn solve_until(
        players: &[PartitionPlayer],
        config: &PartitionConfig,
        stop: impl Fn(usize) -> bool,
    ) -> Result<PartitionResult> {
        config.validate().map_err(LeagueError::InvalidConfig)?;

        let n = players.len();
        if n == 0 {
            return Ok(PartitionResult::empty());
        }
        if n > config.max_players {
            return Err(LeagueError::TooManyPlayers {
                players: n,
                max: config.max_players,
            });
        }

        let mut sorted: Vec<PartitionPlayer> = players.to_vec();
        sorted.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        if n < config.absolute_min {
            warn!(
                players = n,
                absolute_min = config.absolute_min,
                "too few players to partition, using a single division"
            );
            let cost = division_cost(&sorted, 1, config);
            return Ok(build_result(&sorted, &[0, n], cost, vec![(1, cost)], false, config));
        }

        let estimated = ((n as f64) / (config.ideal_size as f64)).round() as usize;
        let k_lo = estimated.saturating_sub(config.k_radius).max(1);
        // No layout has more than n / absolute_min divisions.
        let k_hi = (estimated + config.k_radius).min(n / config.absolute_min);
        if k_lo > k_hi {
            error!(players = n, "no candidate division count");
            return Err(LeagueError::NoFeasiblePartition { players: n });
        }

        let size_cost: Vec<f64> = (0..=config.absolute_max)
            .map(|s| size_penalty(s, config))
            .collect();

        // prefix[d][i]: penalty of players[..i] all placed in division d.
        let prefix: Vec<Vec<f64>> = (0..=k_hi)
            .map(|d| {
                let mut row = Vec::with_capacity(n + 1);
                row.push(0.0);
                if d == 0 {
                    row.resize(n + 1, 0.0);
                    return row;
                }
                let mut acc = 0.0;
                for p in &sorted {
                    acc += player_penalty(p, d as u32, &config.weights);
                    row.push(acc);
                }
                row
            })
            .collect();

        let mut dp: Vec<Vec<f64>> = Vec::with_capacity(k_hi + 1);
        let mut cut: Vec<Vec<usize>> = Vec::with_capacity(k_hi + 1);
        let mut first = vec![INF; n + 1];
        first[0] = 0.0;
        dp.push(first);
        cut.push(vec![0; n + 1]);

        let mut cancelled = false;
        for k in 1..=k_hi {
            if stop(k) {
                cancelled = true;
                break;
            }
            let (row, back) = fill_row(&dp[k - 1], &prefix[k], &size_cost, k, config);
            dp.push(row);
            cut.push(back);
        }

        let evaluated = dp.len() - 1;
        let mut cost_by_k = Vec::new();
        let mut best: Option<(usize, f64)> = None;
        for k in k_lo..=evaluated.min(k_hi) {
            let cost = dp[k][n];
            if !cost.is_finite() {
                continue;
            }
            debug!(k, cost, "candidate division count");
            cost_by_k.push((k, cost));
            match best {
                Some((_, c)) if c <= cost => {}
                _ => best = Some((k, cost)),
            }
        }

        let Some((best_k, best_cost)) = best else {
            if cancelled {
                return Err(LeagueError::Cancelled);
            }
            error!(players = n, k_lo, k_hi, "no feasible partition");
            return Err(LeagueError::NoFeasiblePartition { players: n });
        };

        // Walk the cut table back from (best_k, n).
        let mut bounds = vec![n];
        let mut i = n;
        for k in (1..=best_k).rev() {
            i = cut[k][i];
            bounds.push(i);
        }
        bounds.reverse();

        info!(
            players = n,
            divisions = best_k,
            cost = best_cost,
            cancelled,
            "partition solved"
        );
        Ok(build_result(&sorted, &bounds, best_cost, cost_by_k, cancelled, config))
    }
}

/// Fills `dp[k][*]` from `dp[k - 1][*]`.
fn fill_row(
    prev: &[f64],
    prefix: &[f64],
    size_cost: &[f64],
    k: usize,
    config: &PartitionConfig,
) -> (Vec<f64>, Vec<usize>) {
    let n = prev.len() - 1;
    let cell = |i: usize| -> (f64, usize) {
        if i < k * config.absolute_min {
            return (INF, 0);
        }
        let mut best = (INF, 0);
        for s in config.absolute_min..=config.absolute_max.min(i) {
            let j = i - s;
            let base = prev[j];
            if !base.is_finite() {
                continue;
            }
            let c = base + size_cost[s] + (prefix[i] - prefix[j]);
            if c < best.0 {
                best = (c, j);
            }
        }
        best
    };

    #[cfg(feature = "parallel")]
    let cells: Vec<(f64, usize)> = if config.parallel {
        (0..=n).into_par_iter().map(cell).collect()
    } else {
        (0..=n).map(cell).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let cells: Vec<(f64, usize)> = (0..=n).map(cell).collect();

    cells.into_iter().unzip()
}

fn build_result(
    sorted: &[PartitionPlayer],
    bounds: &[usize],
    total_cost: f64,
    cost_by_k: Vec<(usize, f64)>,
    cancelled: bool,
    config: &PartitionConfig,
) -> PartitionResult {
    let mut divisions = Vec::with_capacity(bounds.len().saturating_sub(1));
    let mut assignments = HashMap::with_capacity(sorted.len());
    for (idx, w) in bounds.windows(2).enumerate() {
        let number = idx as u32 + 1;
        let members = &sorted[w[0]..w[1]];
        for p in members {
            assignments.insert(p.id, number);
        }
        divisions.push(PartitionBlock {
            number,
            players: members.iter().map(|p| p.id).collect(),
            cost: division_cost(members, number, config),
        });
    }
    PartitionResult {
        divisions,
        assignments,
        total_cost,
        cost_by_k,
        cancelled,
    }
}
