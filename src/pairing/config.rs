//! Pairing configuration.

/// Configuration for [`PairingRunner`](super::PairingRunner).
///
/// # Examples
///
/// ```
/// use u_ladder::pairing::PairingConfig;
///
/// let config = PairingConfig::default().with_max_rounds(14);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairingConfig {
    /// Drop rounds beyond this count. `None` plays the full round robin.
    pub max_rounds: Option<usize>,

    /// Smallest field the round cap applies to.
    pub cap_min_players: usize,

    /// Games per player for large odd fields. `None` disables subset
    /// selection.
    pub subset_games: Option<usize>,

    /// Smallest odd field that uses subset selection.
    pub subset_min_players: usize,

    /// Reshuffles tried before subset selection gives up.
    pub subset_attempts: usize,

    /// Generate several schedules in parallel (requires the `parallel`
    /// feature).
    pub parallel: bool,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            cap_min_players: 0,
            subset_games: Some(14),
            subset_min_players: 17,
            subset_attempts: 100,
            parallel: false,
        }
    }
}

impl PairingConfig {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Caps fields of at least `min_players` at `rounds` rounds.
    pub fn with_round_cap(mut self, rounds: usize, min_players: usize) -> Self {
        self.max_rounds = Some(rounds);
        self.cap_min_players = min_players;
        self
    }

    /// Round cap in effect for a field of `players`.
    pub fn round_cap_for(&self, players: usize) -> Option<usize> {
        self.max_rounds.filter(|_| players >= self.cap_min_players)
    }

    pub fn without_round_cap(mut self) -> Self {
        self.max_rounds = None;
        self
    }

    pub fn with_subset_games(mut self, games: Option<usize>) -> Self {
        self.subset_games = games;
        self
    }

    pub fn with_subset_attempts(mut self, attempts: usize) -> Self {
        self.subset_attempts = attempts;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rounds == Some(0) {
            return Err("max_rounds must be positive when set".into());
        }
        if self.subset_games == Some(0) {
            return Err("subset_games must be positive when set".into());
        }
        if self.subset_games.is_some() && self.subset_attempts == 0 {
            return Err("subset_attempts must be positive".into());
        }
        Ok(())
    }
}
