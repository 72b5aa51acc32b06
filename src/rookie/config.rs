//! Rookie division configuration.

/// Configuration for rookie division building and graduation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RookieConfig {
    /// Smallest NEW cohort that gets rookie divisions.
    pub min_rookies: usize,
    pub min_division_size: usize,
    pub max_division_size: usize,
    pub target_division_size: usize,
    /// Rookies per graduation group is `ceil(count / graduation_divisor)`.
    pub graduation_divisor: usize,
}

impl Default for RookieConfig {
    fn default() -> Self {
        Self {
            min_rookies: 10,
            min_division_size: 10,
            max_division_size: 20,
            target_division_size: 15,
            graduation_divisor: 6,
        }
    }
}

impl RookieConfig {
    pub fn with_min_rookies(mut self, n: usize) -> Self {
        self.min_rookies = n;
        self
    }

    pub fn with_division_sizes(mut self, min: usize, target: usize, max: usize) -> Self {
        self.min_division_size = min;
        self.target_division_size = target;
        self.max_division_size = max;
        self
    }

    pub fn with_graduation_divisor(mut self, divisor: usize) -> Self {
        self.graduation_divisor = divisor;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_division_size == 0 {
            return Err("min_division_size must be positive".into());
        }
        if !(self.min_division_size <= self.target_division_size
            && self.target_division_size <= self.max_division_size)
        {
            return Err(format!(
                "rookie sizes must satisfy min <= target <= max, got {} / {} / {}",
                self.min_division_size, self.target_division_size, self.max_division_size
            ));
        }
        // Any cohort above max must be splittable into sizes within bounds.
        if self.max_division_size < 2 * self.min_division_size - 1 {
            return Err("max_division_size must be at least 2 * min_division_size - 1".into());
        }
        if self.min_rookies < self.min_division_size {
            return Err("min_rookies must be at least min_division_size".into());
        }
        if self.graduation_divisor == 0 {
            return Err("graduation_divisor must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RookieConfig::default();
        assert_eq!(config.min_rookies, 10);
        assert_eq!(config.graduation_divisor, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_size_order() {
        let config = RookieConfig::default().with_division_sizes(12, 10, 30);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_splittable() {
        let config = RookieConfig::default().with_division_sizes(10, 12, 15);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_divisor() {
        let config = RookieConfig::default().with_graduation_divisor(0);
        assert!(config.validate().is_err());
    }
}
