//! Categorizer configuration.

/// Configuration for [`Categorizer`](super::Categorizer).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategorizerConfig {
    /// Ratings with a deviation strictly below this count as stable.
    pub stable_deviation: f64,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            stable_deviation: 90.0,
        }
    }
}

impl CategorizerConfig {
    pub fn with_stable_deviation(mut self, deviation: f64) -> Self {
        self.stable_deviation = deviation;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.stable_deviation.is_nan() || self.stable_deviation <= 0.0 {
            return Err(format!(
                "stable_deviation must be positive, got {}",
                self.stable_deviation
            ));
        }
        Ok(())
    }
}
