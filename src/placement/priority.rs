//! Priority scoring.

use std::cmp::Ordering;

use super::config::PriorityConfig;
use crate::model::{PlacementStatus, PlayerRecord};

/// Scores and orders players by the strength of their claim to a division.
///
/// ```text
/// score = ( division_weight * (total_virtual_divisions - virtual_division)
///         + bonus(status)
///         + rank_weight * (previous_division_size - previous_rank) )
///         * hiatus_decay ^ seasons_away
/// ```
pub struct PriorityScorer;

impl PriorityScorer {
    /// Outcome bonus for a status.
    pub fn bonus(status: PlacementStatus, config: &PriorityConfig) -> f64 {
        let b = &config.bonus;
        match status {
            PlacementStatus::Stayed => b.stayed,
            PlacementStatus::Promoted => b.promoted,
            PlacementStatus::Relegated => b.relegated,
            PlacementStatus::Graduated => b.graduated,
            PlacementStatus::ShortHiatusReturning | PlacementStatus::LongHiatusReturning => {
                b.hiatus
            }
            PlacementStatus::New | PlacementStatus::None => b.new,
        }
    }

    /// Places above the bottom of the previous division, capped by the
    /// configured maximum division size.
    fn rank_term(record: &PlayerRecord, config: &PriorityConfig) -> f64 {
        if record.is_new() {
            return 0.0;
        }
        let Some(rank) = record.previous_rank() else {
            return 0.0;
        };
        let size = record.previous_division_size().min(config.max_division_size);
        let above_bottom = size.saturating_sub(rank as usize);
        config.rank_weight * above_bottom as f64
    }

    /// Score for one record. Records without a virtual division score as
    /// if they targeted the lowest one.
    pub fn score(record: &PlayerRecord, total_virtual_divisions: u32, config: &PriorityConfig) -> f64 {
        let vd = record.virtual_division.unwrap_or(total_virtual_divisions);
        let steps = total_virtual_divisions.saturating_sub(vd) as f64;
        let raw = config.division_weight * steps
            + Self::bonus(record.status, config)
            + Self::rank_term(record, config);
        if record.seasons_away > 0 {
            raw * config.hiatus_decay.powi(record.seasons_away as i32)
        } else {
            raw
        }
    }

    /// Scores every record against the largest virtual division present.
    pub fn score_all(records: &mut [PlayerRecord], config: &PriorityConfig) {
        let total = records
            .iter()
            .filter_map(|r| r.virtual_division)
            .max()
            .unwrap_or(1);
        for record in records.iter_mut() {
            record.priority = Some(Self::score(record, total, config));
        }
    }

    /// Sorts highest priority first.
    ///
    /// Equal scores fall back to rating (highest first) and then username,
    /// so the order is fully deterministic.
    pub fn sort(records: &mut [PlayerRecord]) {
        records.sort_by(Self::compare);
    }

    fn compare(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
        let pa = a.priority.unwrap_or(f64::NEG_INFINITY);
        let pb = b.priority.unwrap_or(f64::NEG_INFINITY);
        pb.total_cmp(&pa)
            .then_with(|| b.rating.cmp(&a.rating))
            .then_with(|| a.username.cmp(&b.username))
    }
}
