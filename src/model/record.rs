//! The per-player record carried through one rebalance.
//!
//! A [`PlayerRecord`] starts out as the categorizer's output and is
//! enriched in place: placement status, then virtual division, then
//! priority, then the assigned division. Later stages read what earlier
//! stages wrote instead of re-deriving it.

use uuid::Uuid;

use super::entities::SeasonHistoryEntry;
use super::types::PlacementStatus;

/// NEW versus RETURNING, decided from league history alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCategory {
    New,
    Returning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub registration_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub rating: i32,
    pub category: PlayerCategory,
    /// Most recent earlier season the player took part in.
    pub last_season: Option<SeasonHistoryEntry>,

    pub status: PlacementStatus,
    pub seasons_away: u32,
    pub virtual_division: Option<u32>,
    pub priority: Option<f64>,
    pub assigned_division: Option<u32>,
}

impl PlayerRecord {
    pub fn new(
        registration_id: Uuid,
        user_id: Uuid,
        username: impl Into<String>,
        rating: i32,
        last_season: Option<SeasonHistoryEntry>,
    ) -> Self {
        let category = if last_season.is_some() {
            PlayerCategory::Returning
        } else {
            PlayerCategory::New
        };
        Self {
            registration_id,
            user_id,
            username: username.into(),
            rating,
            category,
            last_season,
            status: PlacementStatus::None,
            seasons_away: 0,
            virtual_division: None,
            priority: None,
            assigned_division: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.category == PlayerCategory::New
    }

    /// Division number the player played in last time, if any.
    pub fn previous_division(&self) -> Option<u32> {
        self.last_season.as_ref().and_then(|h| h.division_number)
    }

    /// Final rank in the previous division, if recorded.
    pub fn previous_rank(&self) -> Option<u32> {
        self.last_season.as_ref().and_then(|h| h.rank)
    }

    /// Size of the previous division, zero when unknown.
    pub fn previous_division_size(&self) -> usize {
        self.last_season.as_ref().map_or(0, |h| h.division_size)
    }
}
