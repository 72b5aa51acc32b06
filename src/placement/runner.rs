//! Placement stage execution.

use std::collections::{BTreeSet, HashMap};

use tracing::info;
use uuid::Uuid;

use super::config::PriorityConfig;
use super::priority::PriorityScorer;
use super::virtual_division::VirtualDivisionAssigner;
use crate::error::{LeagueError, Result};
use crate::model::PlayerRecord;

/// Runs the in-memory placement stages over a season's records.
pub struct PlacementRunner;

impl PlacementRunner {
    /// Assigns virtual divisions, scores, and sorts highest priority first.
    ///
    /// Records must already carry their placement status.
    pub fn prepare(
        records: &mut [PlayerRecord],
        regular_count: u32,
        graduation: &HashMap<Uuid, u32>,
        config: &PriorityConfig,
    ) -> Result<()> {
        config.validate().map_err(LeagueError::InvalidConfig)?;
        VirtualDivisionAssigner::assign(records, regular_count, graduation);
        PriorityScorer::score_all(records, config);
        PriorityScorer::sort(records);
        info!(
            players = records.len(),
            regular_divisions = regular_count,
            "prepared placement order"
        );
        Ok(())
    }

    /// Places every player directly in their virtual division.
    ///
    /// Virtual divisions left empty are squeezed out so the result is
    /// numbered `1..=K`. Returns `K`.
    pub fn place_direct(records: &mut [PlayerRecord]) -> u32 {
        let used: BTreeSet<u32> = records.iter().filter_map(|r| r.virtual_division).collect();
        let renumber: HashMap<u32, u32> = used
            .iter()
            .enumerate()
            .map(|(i, &vd)| (vd, i as u32 + 1))
            .collect();
        let lowest = renumber.len().max(1) as u32;
        for record in records.iter_mut() {
            record.assigned_division = Some(
                record
                    .virtual_division
                    .and_then(|vd| renumber.get(&vd).copied())
                    .unwrap_or(lowest),
            );
        }
        renumber.len() as u32
    }
}
