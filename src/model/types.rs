//! Status enums shared across the pipeline.

/// Lifecycle state of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeasonStatus {
    RegistrationOpen,
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

/// How many players move up or down at the end of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PromotionFormula {
    /// `ceil(N / 6)`
    #[default]
    CeilNOver6,
    /// `ceil((N + 1) / 5)`
    CeilNPlus1Over5,
    /// `ceil(N / 5)`
    CeilNOver5,
}

impl PromotionFormula {
    /// Number of players promoted (and, symmetrically, relegated) from a
    /// division of `size` players.
    pub fn count(self, size: usize) -> usize {
        match self {
            PromotionFormula::CeilNOver6 => size.div_ceil(6),
            PromotionFormula::CeilNPlus1Over5 => (size + 1).div_ceil(5),
            PromotionFormula::CeilNOver5 => size.div_ceil(5),
        }
    }
}

/// Why a player sits where they do at the start of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementStatus {
    #[default]
    None,
    New,
    Graduated,
    Promoted,
    Relegated,
    Stayed,
    ShortHiatusReturning,
    LongHiatusReturning,
}

impl PlacementStatus {
    /// True for both hiatus variants.
    pub fn is_hiatus(self) -> bool {
        matches!(
            self,
            PlacementStatus::ShortHiatusReturning | PlacementStatus::LongHiatusReturning
        )
    }

    /// True for a player with no prior season in the league.
    pub fn is_new(self) -> bool {
        self == PlacementStatus::New
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlacementStatus::None => "NONE",
            PlacementStatus::New => "NEW",
            PlacementStatus::Graduated => "GRADUATED",
            PlacementStatus::Promoted => "PROMOTED",
            PlacementStatus::Relegated => "RELEGATED",
            PlacementStatus::Stayed => "STAYED",
            PlacementStatus::ShortHiatusReturning => "SHORT_HIATUS_RETURNING",
            PlacementStatus::LongHiatusReturning => "LONG_HIATUS_RETURNING",
        }
    }
}

/// End-of-season outcome recorded on a standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandingResult {
    #[default]
    None,
    Promoted,
    Relegated,
    Stayed,
    /// Winner of the top division. Carries forward as a stay.
    Champion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_formula_counts() {
        assert_eq!(PromotionFormula::CeilNOver6.count(15), 3);
        assert_eq!(PromotionFormula::CeilNOver6.count(12), 2);
        assert_eq!(PromotionFormula::CeilNOver6.count(13), 3);
        assert_eq!(PromotionFormula::CeilNPlus1Over5.count(14), 3);
        assert_eq!(PromotionFormula::CeilNPlus1Over5.count(15), 4);
        assert_eq!(PromotionFormula::CeilNOver5.count(15), 3);
        assert_eq!(PromotionFormula::CeilNOver5.count(16), 4);
        assert_eq!(PromotionFormula::CeilNOver6.count(0), 0);
    }

    #[test]
    fn test_hiatus_variants() {
        assert!(PlacementStatus::ShortHiatusReturning.is_hiatus());
        assert!(PlacementStatus::LongHiatusReturning.is_hiatus());
        assert!(!PlacementStatus::Stayed.is_hiatus());
        assert!(PlacementStatus::New.is_new());
    }
}
