//! The external game-creation boundary.

use uuid::Uuid;

use super::config::{ChallengeRule, MatchSettings};

/// Everything needed to create one league game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRequest {
    pub season_id: Uuid,
    pub division_id: Uuid,
    /// Users in move order: `players[0]` goes first.
    pub players: [Uuid; 2],
    /// 0-based schedule round.
    pub round: usize,
    pub lexicon: String,
    pub variant: String,
    pub initial_time_seconds: u32,
    pub increment_seconds: u32,
    pub time_bank_minutes: u32,
    pub challenge_rule: ChallengeRule,
    pub rated: bool,
}

impl GameRequest {
    /// Builds a request for `players` under `settings`.
    pub fn new(
        season_id: Uuid,
        division_id: Uuid,
        players: [Uuid; 2],
        round: usize,
        settings: &MatchSettings,
    ) -> Self {
        Self {
            season_id,
            division_id,
            players,
            round,
            lexicon: settings.lexicon.clone(),
            variant: settings.variant.clone(),
            initial_time_seconds: settings.increment_seconds,
            increment_seconds: settings.increment_seconds,
            time_bank_minutes: settings.time_bank_minutes,
            challenge_rule: settings.challenge_rule(),
            rated: settings.rated,
        }
    }
}

/// Creates and starts games on behalf of the league.
///
/// Implemented by the game service; the league only hands over requests.
pub trait GameCreator {
    /// Creates a game and returns its id.
    fn instantiate_new_game(&mut self, request: &GameRequest) -> Result<Uuid, String>;

    /// Starts the clock on a created game.
    fn start_game(&mut self, game_id: Uuid) -> Result<(), String>;
}
