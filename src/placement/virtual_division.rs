//! Provisional target divisions.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{PlacementStatus, PlayerRecord};

/// Assigns each player a virtual division for next season.
pub struct VirtualDivisionAssigner;

impl VirtualDivisionAssigner {
    /// Target for a returning player who played in `previous` last time.
    ///
    /// Promoted players move up one (never above 1), relegated players move
    /// down one, everyone else keeps their division.
    pub fn returning_target(status: PlacementStatus, previous: u32) -> u32 {
        match status {
            PlacementStatus::Promoted => previous.saturating_sub(1).max(1),
            PlacementStatus::Relegated => previous + 1,
            _ => previous.max(1),
        }
    }

    /// Targets for a NEW cohort too small to form rookie divisions.
    ///
    /// Players are ordered by rating (highest first, username breaking
    /// ties). The top half targets the second-lowest regular division and
    /// the rest target the lowest. A league with one regular division (or
    /// none yet) sends everyone to division 1.
    pub fn new_player_targets(players: &[&PlayerRecord], regular_count: u32) -> Vec<(Uuid, u32)> {
        let mut sorted: Vec<&PlayerRecord> = players.to_vec();
        sorted.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.username.cmp(&b.username))
        });
        if regular_count <= 1 {
            return sorted.iter().map(|p| (p.user_id, 1)).collect();
        }
        let midpoint = sorted.len() / 2;
        sorted
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let target = if i < midpoint {
                    regular_count - 1
                } else {
                    regular_count
                };
                (p.user_id, target)
            })
            .collect()
    }

    /// Fills `virtual_division` on every record.
    ///
    /// `regular_count` is the number of regular divisions last season.
    /// `graduation` maps graduating rookies to their group's target.
    /// Returning targets are clamped into `1..=regular_count` so players
    /// whose old division no longer exists land in the lowest one.
    pub fn assign(
        records: &mut [PlayerRecord],
        regular_count: u32,
        graduation: &HashMap<Uuid, u32>,
    ) {
        let lowest = regular_count.max(1);

        let new_targets: HashMap<Uuid, u32> = {
            let new_players: Vec<&PlayerRecord> =
                records.iter().filter(|r| r.status.is_new()).collect();
            Self::new_player_targets(&new_players, regular_count)
                .into_iter()
                .collect()
        };

        for record in records.iter_mut() {
            let target = match record.status {
                PlacementStatus::New | PlacementStatus::None => {
                    new_targets.get(&record.user_id).copied().unwrap_or(lowest)
                }
                PlacementStatus::Graduated => match graduation.get(&record.user_id) {
                    Some(&t) => t,
                    None => {
                        warn!(
                            user = %record.username,
                            "graduate missing from rookie standings, targeting lowest division"
                        );
                        lowest
                    }
                },
                status => match record.previous_division() {
                    Some(prev) if !record.last_season.as_ref().is_some_and(|h| h.was_rookie()) => {
                        Self::returning_target(status, prev).min(lowest)
                    }
                    _ => lowest,
                },
            };
            debug!(
                user = %record.username,
                status = record.status.as_str(),
                virtual_division = target,
                "virtual division"
            );
            record.virtual_division = Some(target);
        }
    }
}
