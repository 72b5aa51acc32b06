//! Partition cost function.

use super::config::{CostWeights, PartitionConfig};
use super::types::{PartitionPlayer, PlayerKind};

/// Size penalty of a division with `size` players.
pub fn size_penalty(size: usize, config: &PartitionConfig) -> f64 {
    let w = &config.weights;
    let dev = size as f64 - config.ideal_size as f64;
    let mut penalty = w.size * dev * dev;
    if size < config.ideal_min {
        penalty += (config.ideal_min - size) as f64 * w.size_out_of_range;
    } else if size > config.ideal_max {
        penalty += (size - config.ideal_max) as f64 * w.size_out_of_range;
    }
    penalty
}

/// Cost of placing `player` in `division`.
pub fn player_penalty(player: &PartitionPlayer, division: u32, weights: &CostWeights) -> f64 {
    let diff = division as f64 - player.target as f64;
    match player.kind {
        PlayerKind::New => weights.new_deviation * diff.abs(),
        PlayerKind::Returning {
            relegated,
            seasons_away,
        } => {
            if diff > 0.0 {
                if relegated {
                    weights.double_relegation * diff
                } else {
                    weights.forced_relegation * diff / (seasons_away as f64 + 1.0)
                }
            } else if diff < 0.0 {
                let rate = if relegated {
                    weights.bad_keep
                } else {
                    weights.lucky_promotion
                };
                rate * -diff
            } else {
                0.0
            }
        }
    }
}

/// Total cost of `players` forming division number `division`.
pub fn division_cost(players: &[PartitionPlayer], division: u32, config: &PartitionConfig) -> f64 {
    size_penalty(players.len(), config)
        + players
            .iter()
            .map(|p| player_penalty(p, division, &config.weights))
            .sum::<f64>()
}
