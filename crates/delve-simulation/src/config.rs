use chrono::{DateTime, Utc};
use delve_mechanics::{CheckConfig, Die};
use serde::{Deserialize, Serialize};

/// Configuration for an encounter run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// RNG seed for deterministic encounters.
    pub seed: u64,
    /// Grid width in cells.
    pub width: i32,
    /// Grid height in cells.
    pub height: i32,
    /// Success threshold, botch face and critical margin for every check.
    pub check: CheckConfig,
    /// Die rolled for initiative.
    pub initiative_die: Die,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// In-world seconds per round.
    pub round_seconds: i64,
    /// In-world time at round zero.
    pub start: DateTime<Utc>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: 12,
            height: 12,
            check: CheckConfig::default(),
            initiative_die: Die::D20,
            max_events: 0,
            round_seconds: 6,
            start: DateTime::UNIX_EPOCH,
        }
    }
}

impl EncounterConfig {
    /// Set the RNG seed for deterministic encounters.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the grid dimensions.
    pub fn with_grid(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the check classification parameters.
    pub fn with_check(mut self, check: CheckConfig) -> Self {
        self.check = check;
        self
    }

    /// Set the initiative die.
    pub fn with_initiative_die(mut self, die: Die) -> Self {
        self.initiative_die = die;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the in-world length of a round.
    pub fn with_round_seconds(mut self, seconds: i64) -> Self {
        self.round_seconds = seconds;
        self
    }

    /// Set the in-world start time.
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = EncounterConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!((config.width, config.height), (12, 12));
        assert_eq!(config.initiative_die, Die::D20);
        assert_eq!(config.max_events, 0);
        assert_eq!(config.round_seconds, 6);
        assert_eq!(config.check.success_threshold, 8);
    }

    #[test]
    fn config_builder_chain() {
        let config = EncounterConfig::default()
            .with_seed(123)
            .with_grid(5, 4)
            .with_initiative_die(Die::D10)
            .with_max_events(500)
            .with_round_seconds(10);
        assert_eq!(config.seed, 123);
        assert_eq!((config.width, config.height), (5, 4));
        assert_eq!(config.initiative_die, Die::D10);
        assert_eq!(config.max_events, 500);
        assert_eq!(config.round_seconds, 10);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EncounterConfig =
            serde_json::from_str(r#"{"seed": 7, "check": {"success_threshold": 6}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.width, 12);
        assert_eq!(config.check.success_threshold, 6);
        assert_eq!(config.check.botch_face, 1);
    }
}
