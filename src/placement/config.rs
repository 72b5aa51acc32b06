//! Priority score configuration.

/// Per-status bonus, the second term of the priority score.
///
/// Only breaks ties inside one virtual division; it never outweighs a
/// division step.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeBonus {
    pub stayed: f64,
    pub promoted: f64,
    pub relegated: f64,
    pub graduated: f64,
    pub hiatus: f64,
    pub new: f64,
}

impl Default for OutcomeBonus {
    fn default() -> Self {
        Self {
            stayed: 500.0,
            promoted: 400.0,
            relegated: 300.0,
            graduated: 200.0,
            hiatus: 100.0,
            new: 0.0,
        }
    }
}

impl OutcomeBonus {
    /// Bonuses in dominance order, strongest first.
    pub fn ordered(&self) -> [(&'static str, f64); 6] {
        [
            ("stayed", self.stayed),
            ("promoted", self.promoted),
            ("relegated", self.relegated),
            ("graduated", self.graduated),
            ("hiatus", self.hiatus),
            ("new", self.new),
        ]
    }
}

/// Configuration for [`PriorityScorer`](super::PriorityScorer).
///
/// # Examples
///
/// ```
/// use u_ladder::placement::PriorityConfig;
///
/// let config = PriorityConfig::default()
///     .with_division_weight(10_000.0)
///     .with_hiatus_decay(0.9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityConfig {
    /// Score per division step between a player's target and the lowest
    /// target.
    pub division_weight: f64,

    /// Outcome bonus table.
    pub bonus: OutcomeBonus,

    /// Score per place a player finished above the bottom of their
    /// previous division.
    pub rank_weight: f64,

    /// Largest division the rank term must cover.
    pub max_division_size: usize,

    /// Per-season multiplier for time away. `0.933^10 ≈ 0.5`.
    pub hiatus_decay: f64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            division_weight: 1000.0,
            bonus: OutcomeBonus::default(),
            rank_weight: 1.0,
            max_division_size: 30,
            hiatus_decay: 0.933,
        }
    }
}

impl PriorityConfig {
    pub fn with_division_weight(mut self, w: f64) -> Self {
        self.division_weight = w;
        self
    }

    pub fn with_bonus(mut self, bonus: OutcomeBonus) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_rank_weight(mut self, w: f64) -> Self {
        self.rank_weight = w;
        self
    }

    pub fn with_max_division_size(mut self, n: usize) -> Self {
        self.max_division_size = n;
        self
    }

    pub fn with_hiatus_decay(mut self, base: f64) -> Self {
        self.hiatus_decay = base;
        self
    }

    /// Widest possible rank term.
    pub fn rank_span(&self) -> f64 {
        self.rank_weight * self.max_division_size.saturating_sub(1) as f64
    }

    /// Validates the configuration, including the dominance ordering.
    ///
    /// Adjacent outcome bonuses must differ by more than the rank span, and
    /// the largest bonus plus the rank span must stay below one division
    /// step.
    pub fn validate(&self) -> Result<(), String> {
        if self.division_weight <= 0.0 {
            return Err("division_weight must be positive".into());
        }
        if self.rank_weight < 0.0 {
            return Err("rank_weight must be non-negative".into());
        }
        if self.hiatus_decay <= 0.0 || self.hiatus_decay > 1.0 {
            return Err(format!(
                "hiatus_decay must be in (0, 1], got {}",
                self.hiatus_decay
            ));
        }
        let span = self.rank_span();
        let ordered = self.bonus.ordered();
        if ordered[5].1 < 0.0 {
            return Err("outcome bonuses must be non-negative".into());
        }
        for pair in ordered.windows(2) {
            let (hi_name, hi) = pair[0];
            let (lo_name, lo) = pair[1];
            if hi - lo <= span {
                return Err(format!(
                    "{hi_name} bonus must exceed {lo_name} bonus by more than the rank span {span}"
                ));
            }
        }
        if ordered[0].1 + span >= self.division_weight {
            return Err(format!(
                "division_weight {} must exceed the largest bonus plus rank span",
                self.division_weight
            ));
        }
        Ok(())
    }
}
