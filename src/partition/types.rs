//! Partitioner input and output.

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::{PlacementStatus, PlayerRecord};

/// How a player's misplacement is charged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerKind {
    Returning {
        /// Already relegated this cycle.
        relegated: bool,
        seasons_away: u32,
    },
    New,
}

/// One player as the partitioner sees them.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionPlayer {
    pub id: Uuid,
    pub priority: f64,
    /// Target division, at least 1.
    pub target: u32,
    pub kind: PlayerKind,
}

impl PartitionPlayer {
    pub fn returning(id: Uuid, priority: f64, target: u32, relegated: bool, seasons_away: u32) -> Self {
        Self {
            id,
            priority,
            target,
            kind: PlayerKind::Returning {
                relegated,
                seasons_away,
            },
        }
    }

    pub fn newcomer(id: Uuid, priority: f64, target: u32) -> Self {
        Self {
            id,
            priority,
            target,
            kind: PlayerKind::New,
        }
    }
}

impl From<&PlayerRecord> for PartitionPlayer {
    fn from(r: &PlayerRecord) -> Self {
        let target = r.virtual_division.unwrap_or(1).max(1);
        let priority = r.priority.unwrap_or(0.0);
        match r.status {
            PlacementStatus::New | PlacementStatus::None => {
                Self::newcomer(r.user_id, priority, target)
            }
            status => Self::returning(
                r.user_id,
                priority,
                target,
                status == PlacementStatus::Relegated,
                r.seasons_away,
            ),
        }
    }
}

/// One division of a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionBlock {
    /// Division number, starting at 1.
    pub number: u32,
    /// Members in priority order.
    pub players: Vec<Uuid>,
    pub cost: f64,
}

/// Result of a partitioner run.
#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub divisions: Vec<PartitionBlock>,
    /// Player id to division number.
    pub assignments: HashMap<Uuid, u32>,
    pub total_cost: f64,
    /// Cost of the best layout for every feasible division count searched.
    pub cost_by_k: Vec<(usize, f64)>,
    /// Whether the search stopped early on the cancellation flag.
    pub cancelled: bool,
}

impl PartitionResult {
    pub(crate) fn empty() -> Self {
        Self {
            divisions: Vec::new(),
            assignments: HashMap::new(),
            total_cost: 0.0,
            cost_by_k: Vec::new(),
            cancelled: false,
        }
    }

    /// Number of divisions.
    pub fn k(&self) -> usize {
        self.divisions.len()
    }

    /// Division sizes in division order.
    pub fn sizes(&self) -> Vec<usize> {
        self.divisions.iter().map(|d| d.players.len()).collect()
    }
}
