//! League settings and rebalance configuration.

use crate::model::PromotionFormula;
use crate::pairing::PairingConfig;
use crate::partition::PartitionConfig;
use crate::placement::PriorityConfig;
use crate::registration::CategorizerConfig;
use crate::rookie::RookieConfig;

/// How challenged words are penalized in league games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChallengeRule {
    FivePoint,
    Double,
}

impl ChallengeRule {
    /// Five-point for CSW lexicons, double for everything else.
    pub fn for_lexicon(lexicon: &str) -> Self {
        if lexicon.to_ascii_uppercase().starts_with("CSW") {
            ChallengeRule::FivePoint
        } else {
            ChallengeRule::Double
        }
    }
}

/// Parameters of every game a season creates.
///
/// These shape the game requests handed to the
/// [`GameCreator`](super::GameCreator) and play no part in placement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchSettings {
    pub lexicon: String,
    pub variant: String,
    /// Seconds per turn. Correspondence games also start with this much.
    pub increment_seconds: u32,
    pub time_bank_minutes: u32,
    /// `None` derives the rule from the lexicon.
    pub challenge_rule: Option<ChallengeRule>,
    pub rated: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            lexicon: "CSW24".into(),
            variant: "classic".into(),
            increment_seconds: 28_800,
            time_bank_minutes: 4_320,
            challenge_rule: None,
            rated: true,
        }
    }
}

impl MatchSettings {
    pub fn with_lexicon(mut self, lexicon: impl Into<String>) -> Self {
        self.lexicon = lexicon.into();
        self
    }

    pub fn with_challenge_rule(mut self, rule: ChallengeRule) -> Self {
        self.challenge_rule = Some(rule);
        self
    }

    /// The configured rule, or the lexicon default.
    pub fn challenge_rule(&self) -> ChallengeRule {
        self.challenge_rule
            .unwrap_or_else(|| ChallengeRule::for_lexicon(&self.lexicon))
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.lexicon.trim().is_empty() {
            return Err("lexicon must not be empty".into());
        }
        if self.variant.trim().is_empty() {
            return Err("variant must not be empty".into());
        }
        if self.increment_seconds == 0 {
            return Err("increment_seconds must be positive".into());
        }
        Ok(())
    }
}

/// Per-league settings.
///
/// # Examples
///
/// ```
/// use u_ladder::season::LeagueSettings;
///
/// let settings = LeagueSettings::default().with_ideal_division_size(14);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeagueSettings {
    /// Division size the partitioner aims for.
    pub ideal_division_size: usize,
    pub promotion_formula: PromotionFormula,
    pub match_settings: MatchSettings,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            ideal_division_size: 15,
            promotion_formula: PromotionFormula::default(),
            match_settings: MatchSettings::default(),
        }
    }
}

impl LeagueSettings {
    pub fn with_ideal_division_size(mut self, size: usize) -> Self {
        self.ideal_division_size = size;
        self
    }

    pub fn with_promotion_formula(mut self, formula: PromotionFormula) -> Self {
        self.promotion_formula = formula;
        self
    }

    pub fn with_match_settings(mut self, settings: MatchSettings) -> Self {
        self.match_settings = settings;
        self
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.ideal_division_size < 2 {
            return Err(format!(
                "ideal_division_size must be at least 2, got {}",
                self.ideal_division_size
            ));
        }
        self.match_settings.validate()
    }
}

/// How regular players are turned into divisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementStrategy {
    /// Size-balance with the DP partitioner.
    #[default]
    Partition,
    /// Keep everyone in their virtual division.
    Direct,
}

/// Configuration for a season rebalance and schedule.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceConfig {
    pub categorizer: CategorizerConfig,
    pub priority: PriorityConfig,
    pub partition: PartitionConfig,
    pub rookie: RookieConfig,
    /// Schedules for season start. Divisions of 16 or more play at most
    /// 14 rounds; large odd divisions use subset selection instead.
    pub pairing: PairingConfig,
    pub strategy: PlacementStrategy,

    /// A final regular division smaller than this is merged into the one
    /// above it.
    pub merge_below: usize,

    /// Fewest registrations a season needs before it can be prepared.
    pub min_players: usize,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        let partition = PartitionConfig::default();
        Self {
            categorizer: CategorizerConfig::default(),
            priority: PriorityConfig::default(),
            merge_below: partition.absolute_min,
            partition,
            rookie: RookieConfig::default(),
            pairing: PairingConfig::default().with_round_cap(14, 16),
            strategy: PlacementStrategy::default(),
            min_players: 11,
        }
    }
}

impl RebalanceConfig {
    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_partition(mut self, partition: PartitionConfig) -> Self {
        self.partition = partition;
        self
    }

    pub fn with_priority(mut self, priority: PriorityConfig) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_rookie(mut self, rookie: RookieConfig) -> Self {
        self.rookie = rookie;
        self
    }

    pub fn with_pairing(mut self, pairing: PairingConfig) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn with_merge_below(mut self, size: usize) -> Self {
        self.merge_below = size;
        self
    }

    pub fn with_min_players(mut self, n: usize) -> Self {
        self.min_players = n;
        self
    }

    /// Validates every component.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players == 0 {
            return Err("min_players must be at least 1".into());
        }
        self.categorizer.validate()?;
        self.priority.validate()?;
        self.partition.validate()?;
        self.rookie.validate()?;
        self.pairing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_rule_from_lexicon() {
        assert_eq!(ChallengeRule::for_lexicon("CSW24"), ChallengeRule::FivePoint);
        assert_eq!(ChallengeRule::for_lexicon("csw21"), ChallengeRule::FivePoint);
        assert_eq!(ChallengeRule::for_lexicon("NWL23"), ChallengeRule::Double);
        let explicit = MatchSettings::default().with_challenge_rule(ChallengeRule::Double);
        assert_eq!(explicit.challenge_rule(), ChallengeRule::Double);
    }

    #[test]
    fn test_default_round_cap() {
        let config = RebalanceConfig::default();
        assert_eq!(config.pairing.round_cap_for(15), None);
        assert_eq!(config.pairing.round_cap_for(16), Some(14));
        assert_eq!(config.pairing.subset_games, Some(14));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(LeagueSettings::default().validate().is_ok());
        assert!(RebalanceConfig::default().validate().is_ok());
        assert_eq!(RebalanceConfig::default().merge_below, 8);
        assert_eq!(RebalanceConfig::default().min_players, 11);
        assert!(RebalanceConfig::default().with_min_players(0).validate().is_err());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(LeagueSettings::default()
            .with_ideal_division_size(1)
            .validate()
            .is_err());
        let blank = MatchSettings::default().with_lexicon(" ");
        assert!(blank.validate().is_err());
        let zero_cap = PairingConfig::default().with_round_cap(0, 16);
        assert!(RebalanceConfig::default()
            .with_pairing(zero_cap)
            .validate()
            .is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_settings_from_json() {
        let settings = LeagueSettings::default()
            .with_ideal_division_size(14)
            .with_match_settings(MatchSettings::default().with_lexicon("NWL23"));
        let json = serde_json::to_string(&settings).unwrap();
        let back: LeagueSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        assert_eq!(back.match_settings.challenge_rule(), ChallengeRule::Double);

        let config = RebalanceConfig::default()
            .with_strategy(PlacementStrategy::Direct)
            .with_min_players(6);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["strategy"], "Direct");
        let back: RebalanceConfig = serde_json::from_value(value).unwrap();
        assert!(back.validate().is_ok());
        assert_eq!(back.strategy, PlacementStrategy::Direct);
        assert_eq!(back.min_players, 6);
        assert_eq!(back.pairing.round_cap_for(16), Some(14));
    }
}
