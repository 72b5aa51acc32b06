//! Pairing output.

/// One game of a schedule, by player index within the division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePairing {
    /// Lower player index.
    pub player1: usize,
    /// Higher player index.
    pub player2: usize,
    pub player1_first: bool,
    /// 0-based round.
    pub round: usize,
}

impl GamePairing {
    /// `(first, second)` player indices.
    pub fn order(&self) -> (usize, usize) {
        if self.player1_first {
            (self.player1, self.player2)
        } else {
            (self.player2, self.player1)
        }
    }
}

/// A division's generated schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub players: usize,
    /// Rounds that contain games.
    pub rounds: usize,
    /// Whether every pair meets.
    pub complete: bool,
    pub pairings: Vec<GamePairing>,
}

impl Schedule {
    /// Games each player moves first in.
    pub fn firsts_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.players];
        for p in &self.pairings {
            counts[p.order().0] += 1;
        }
        counts
    }

    /// Games each player plays.
    pub fn games_per_player(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.players];
        for p in &self.pairings {
            counts[p.player1] += 1;
            counts[p.player2] += 1;
        }
        counts
    }
}
