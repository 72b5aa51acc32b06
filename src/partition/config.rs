//! Partitioner configuration.

/// Weights of the partition cost function.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostWeights {
    /// Multiplier on `(size - ideal)^2`.
    pub size: f64,
    /// Per player below the ideal minimum or above the ideal maximum.
    pub size_out_of_range: f64,
    /// Per division between a NEW player's target and their division.
    pub new_deviation: f64,
    /// Per division a safe returning player is pulled above target.
    pub lucky_promotion: f64,
    /// Per division an already-relegated player is pulled above target.
    pub bad_keep: f64,
    /// Per division a safe returning player is pushed below target.
    pub forced_relegation: f64,
    /// Per division an already-relegated player is pushed below target.
    pub double_relegation: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            size: 10.0,
            size_out_of_range: 50.0,
            new_deviation: 100.0,
            lucky_promotion: 50.0,
            bad_keep: 500.0,
            forced_relegation: 1000.0,
            double_relegation: 100_000.0,
        }
    }
}

/// Configuration for [`PartitionSolver`](super::PartitionSolver).
///
/// # Examples
///
/// ```
/// use u_ladder::partition::PartitionConfig;
///
/// let config = PartitionConfig::default()
///     .with_ideal_size(14)
///     .with_k_radius(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionConfig {
    /// Smallest division the solver may create.
    pub absolute_min: usize,
    /// Largest division the solver may create.
    pub absolute_max: usize,
    /// Lower edge of the penalty-free size range.
    pub ideal_min: usize,
    /// Upper edge of the penalty-free size range.
    pub ideal_max: usize,
    /// Target division size.
    pub ideal_size: usize,
    pub weights: CostWeights,
    /// Division counts searched on each side of `round(N / ideal_size)`.
    pub k_radius: usize,
    /// Inputs larger than this are rejected.
    pub max_players: usize,
    /// Fill DP rows in parallel (requires the `parallel` feature).
    pub parallel: bool,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            absolute_min: 8,
            absolute_max: 30,
            ideal_min: 12,
            ideal_max: 18,
            ideal_size: 15,
            weights: CostWeights::default(),
            k_radius: 2,
            max_players: 2_000,
            parallel: false,
        }
    }
}

impl PartitionConfig {
    pub fn with_absolute_bounds(mut self, min: usize, max: usize) -> Self {
        self.absolute_min = min;
        self.absolute_max = max;
        self
    }

    pub fn with_ideal_range(mut self, min: usize, max: usize) -> Self {
        self.ideal_min = min;
        self.ideal_max = max;
        self
    }

    pub fn with_ideal_size(mut self, size: usize) -> Self {
        self.ideal_size = size;
        self
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_k_radius(mut self, radius: usize) -> Self {
        self.k_radius = radius;
        self
    }

    pub fn with_max_players(mut self, n: usize) -> Self {
        self.max_players = n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.absolute_min == 0 {
            return Err("absolute_min must be at least 1".into());
        }
        if self.absolute_min > self.absolute_max {
            return Err(format!(
                "absolute_min ({}) must not exceed absolute_max ({})",
                self.absolute_min, self.absolute_max
            ));
        }
        if self.ideal_min > self.ideal_max {
            return Err("ideal_min must not exceed ideal_max".into());
        }
        if self.ideal_size < self.absolute_min || self.ideal_size > self.absolute_max {
            return Err(format!(
                "ideal_size {} must lie within the absolute bounds",
                self.ideal_size
            ));
        }
        if self.max_players == 0 {
            return Err("max_players must be positive".into());
        }
        let w = &self.weights;
        let all = [
            w.size,
            w.size_out_of_range,
            w.new_deviation,
            w.lucky_promotion,
            w.bad_keep,
            w.forced_relegation,
            w.double_relegation,
        ];
        if all.iter().any(|x| x.is_nan() || *x < 0.0) {
            return Err("cost weights must be non-negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PartitionConfig::default();
        assert_eq!(config.absolute_min, 8);
        assert_eq!(config.absolute_max, 30);
        assert_eq!(config.ideal_min, 12);
        assert_eq!(config.ideal_max, 18);
        assert!((config.weights.double_relegation - 100_000.0).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(PartitionConfig::default()
            .with_absolute_bounds(20, 10)
            .validate()
            .is_err());
        assert!(PartitionConfig::default()
            .with_ideal_size(40)
            .validate()
            .is_err());
        assert!(PartitionConfig::default()
            .with_ideal_range(18, 12)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_weights() {
        let weights = CostWeights {
            bad_keep: -1.0,
            ..CostWeights::default()
        };
        assert!(PartitionConfig::default()
            .with_weights(weights)
            .validate()
            .is_err());
    }
}
