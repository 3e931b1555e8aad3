//! Difficulty classes and the named tiers content usually refers to.

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// The net successes a check must meet or exceed. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct DifficultyClass(i32);

impl DifficultyClass {
    /// Create a difficulty class. Zero or negative values are rejected.
    pub fn new(value: i32) -> MechResult<Self> {
        if value <= 0 {
            return Err(MechError::InvalidArgument(format!(
                "difficulty class must be positive, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// The raw value.
    pub fn value(self) -> i32 {
        self.0
    }

    /// Raise the difficulty by a non-negative amount, e.g. for cover.
    pub fn raised_by(self, amount: i32) -> Self {
        Self(self.0.saturating_add(amount.max(0)))
    }
}

impl TryFrom<i32> for DifficultyClass {
    type Error = MechError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DifficultyClass> for i32 {
    fn from(dc: DifficultyClass) -> Self {
        dc.0
    }
}

impl std::fmt::Display for DifficultyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DC {}", self.0)
    }
}

/// Standard difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    /// DC 1.
    Trivial,
    /// DC 2.
    Easy,
    /// DC 3.
    Moderate,
    /// DC 4.
    Hard,
    /// DC 5.
    Extreme,
    /// DC 6.
    Legendary,
}

impl DifficultyTier {
    /// The difficulty class for this tier.
    pub fn class(self) -> DifficultyClass {
        let value = match self {
            Self::Trivial => 1,
            Self::Easy => 2,
            Self::Moderate => 3,
            Self::Hard => 4,
            Self::Extreme => 5,
            Self::Legendary => 6,
        };
        DifficultyClass(value)
    }

    /// Display name of the tier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Trivial => "Trivial",
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Hard => "Hard",
            Self::Extreme => "Extreme",
            Self::Legendary => "Legendary",
        }
    }
}

/// A difficulty class together with the name content gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Net successes required.
    pub class: DifficultyClass,
    /// Human label, e.g. "Hard".
    pub name: String,
}

impl Difficulty {
    /// A custom named difficulty.
    pub fn named(name: impl Into<String>, class: DifficultyClass) -> Self {
        Self {
            class,
            name: name.into(),
        }
    }

    /// The same difficulty raised by `amount`, keeping its name.
    pub fn raised_by(&self, amount: i32) -> Self {
        Self {
            class: self.class.raised_by(amount),
            name: self.name.clone(),
        }
    }
}

impl From<DifficultyTier> for Difficulty {
    fn from(tier: DifficultyTier) -> Self {
        Self::named(tier.name(), tier.class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_class() {
        assert!(DifficultyClass::new(0).is_err());
        assert!(DifficultyClass::new(-2).is_err());
        assert_eq!(DifficultyClass::new(3).unwrap().value(), 3);
    }

    #[test]
    fn tiers_map_to_classes() {
        assert_eq!(DifficultyTier::Trivial.class().value(), 1);
        assert_eq!(DifficultyTier::Moderate.class().value(), 3);
        assert_eq!(DifficultyTier::Legendary.class().value(), 6);
        let d = Difficulty::from(DifficultyTier::Hard);
        assert_eq!(d.name, "Hard");
        assert_eq!(d.class.value(), 4);
    }

    #[test]
    fn raising_ignores_negative_amounts() {
        let dc = DifficultyClass::new(2).unwrap();
        assert_eq!(dc.raised_by(3).value(), 5);
        assert_eq!(dc.raised_by(-3).value(), 2);
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<DifficultyClass>("0").is_err());
        let dc: DifficultyClass = serde_json::from_str("4").unwrap();
        assert_eq!(dc.to_string(), "DC 4");
    }
}
