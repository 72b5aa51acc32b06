//! Persistent entities.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{PlacementStatus, PromotionFormula, SeasonStatus, StandingResult};

/// First division number of the rookie numbering space.
///
/// Regular divisions are numbered `1..N`; rookie divisions start here and
/// are never renumbered into the regular range.
pub const ROOKIE_DIVISION_BASE: u32 = 100;

/// One season of a league.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Season {
    pub id: Uuid,
    pub league_id: Uuid,
    pub number: u32,
    pub status: SeasonStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub promotion_formula: PromotionFormula,
}

impl Season {
    /// A new season open for registration.
    pub fn new(league_id: Uuid, number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            league_id,
            number,
            status: SeasonStatus::RegistrationOpen,
            start_date: None,
            end_date: None,
            promotion_formula: PromotionFormula::default(),
        }
    }

    pub fn with_promotion_formula(mut self, formula: PromotionFormula) -> Self {
        self.promotion_formula = formula;
        self
    }
}

/// A bracket of players inside one season.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Division {
    pub id: Uuid,
    pub season_id: Uuid,
    pub number: u32,
    pub name: String,
    pub player_count: usize,
    pub complete: bool,
}

impl Division {
    /// A regular ladder division named after its number.
    pub fn regular(season_id: Uuid, number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            season_id,
            number,
            name: format!("Division {number}"),
            player_count: 0,
            complete: false,
        }
    }

    /// A rookie division. `ordinal` starts at 1.
    pub fn rookie(season_id: Uuid, ordinal: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            season_id,
            number: ROOKIE_DIVISION_BASE + ordinal - 1,
            name: format!("Rookie Division {ordinal}"),
            player_count: 0,
            complete: false,
        }
    }

    pub fn is_rookie(&self) -> bool {
        self.number >= ROOKIE_DIVISION_BASE
    }
}

/// One player's participation in one season.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registration {
    pub id: Uuid,
    pub season_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    /// `None` until placed.
    pub division_id: Option<Uuid>,
    pub rating: i32,
    pub registered_at: DateTime<Utc>,
    pub placement_status: PlacementStatus,
    /// Rank in the division the player came from.
    pub previous_division_rank: Option<u32>,
    pub seasons_away: u32,
    pub firsts_count: u32,
    /// Outcome of this season, written when the season closes.
    pub outcome: StandingResult,
    /// Final rank in this season's division, written when the season closes.
    pub final_rank: Option<u32>,
}

impl Registration {
    pub fn new(
        season_id: Uuid,
        user_id: Uuid,
        username: impl Into<String>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            season_id,
            user_id,
            username: username.into(),
            division_id: None,
            rating: 0,
            registered_at,
            placement_status: PlacementStatus::None,
            previous_division_rank: None,
            seasons_away: 0,
            firsts_count: 0,
            outcome: StandingResult::None,
            final_rank: None,
        }
    }
}

/// Per-division per-player aggregate.
///
/// Rank is derived by sorting, never stored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standing {
    pub division_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub spread: i32,
    pub games_played: u32,
    pub result: StandingResult,
}

impl Standing {
    pub fn new(division_id: Uuid, user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            division_id,
            user_id,
            username: username.into(),
            wins: 0,
            losses: 0,
            draws: 0,
            spread: 0,
            games_played: 0,
            result: StandingResult::None,
        }
    }

    /// Two per win, one per draw.
    pub fn points(&self) -> u32 {
        self.wins * 2 + self.draws
    }
}

/// Which side won a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameWinner {
    First,
    Second,
    Tie,
}

/// A finished game between two division players.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameResult {
    pub division_id: Uuid,
    pub players: [Uuid; 2],
    pub scores: [i32; 2],
    pub winner: GameWinner,
}

impl GameResult {
    /// Derives the winner from the scores.
    pub fn from_scores(division_id: Uuid, players: [Uuid; 2], scores: [i32; 2]) -> Self {
        let winner = match scores[0].cmp(&scores[1]) {
            std::cmp::Ordering::Greater => GameWinner::First,
            std::cmp::Ordering::Less => GameWinner::Second,
            std::cmp::Ordering::Equal => GameWinner::Tie,
        };
        Self {
            division_id,
            players,
            scores,
            winner,
        }
    }
}

/// One past season of a player, as seen from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonHistoryEntry {
    pub season_id: Uuid,
    pub season_number: u32,
    /// `None` if the player registered but was never placed.
    pub division_number: Option<u32>,
    pub division_size: usize,
    pub outcome: StandingResult,
    pub rank: Option<u32>,
}

impl SeasonHistoryEntry {
    pub fn was_rookie(&self) -> bool {
        self.division_number
            .is_some_and(|n| n >= ROOKIE_DIVISION_BASE)
    }
}

/// A player's rating in one game variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRating {
    pub variant: String,
    pub rating: f64,
    pub deviation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rookie_numbering() {
        let season = Uuid::new_v4();
        let first = Division::rookie(season, 1);
        let third = Division::rookie(season, 3);
        assert_eq!(first.number, ROOKIE_DIVISION_BASE);
        assert_eq!(third.number, ROOKIE_DIVISION_BASE + 2);
        assert_eq!(third.name, "Rookie Division 3");
        assert!(first.is_rookie());
        assert!(!Division::regular(season, 4).is_rookie());
    }

    #[test]
    fn test_standing_points() {
        let mut s = Standing::new(Uuid::nil(), Uuid::nil(), "a");
        s.wins = 5;
        s.draws = 2;
        s.losses = 3;
        assert_eq!(s.points(), 12);
    }
}
