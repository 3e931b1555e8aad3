//! Skill check resolution.
//!
//! A check rolls a pool, counts faces at or above the success threshold,
//! subtracts botches, and adds flat bonuses. The resulting net successes
//! are compared against a [`DifficultyClass`]:
//!
//! ```text
//! net = successes - botches + attribute_bonus + other_bonus
//! success  <=> net >= dc
//! critical <=> net - dc >= critical_margin
//! fumble   <=> net < 0 and at least one botch
//! ```

pub mod difficulty;

pub use difficulty::{Difficulty, DifficultyClass, DifficultyTier};

use delve_core::CatalogId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dice::{DicePool, DiceRollResult, RandomSource};
use crate::error::MechResult;

/// Tunables for classifying dice and margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// A face at or above this value scores one success.
    pub success_threshold: u32,
    /// A face equal to this value is a botch and cancels one success.
    pub botch_face: u32,
    /// Margin at or above which a success is critical.
    pub critical_margin: i32,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            success_threshold: 8,
            botch_face: 1,
            critical_margin: 3,
        }
    }
}

impl CheckConfig {
    /// Set the success threshold.
    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set the botch face.
    pub fn with_botch_face(mut self, face: u32) -> Self {
        self.botch_face = face;
        self
    }

    /// Set the critical success margin.
    pub fn with_critical_margin(mut self, margin: i32) -> Self {
        self.critical_margin = margin;
        self
    }
}

/// Which skill a check tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    /// Normalized catalog id.
    pub id: CatalogId,
    /// Display name.
    pub name: String,
}

impl SkillRef {
    /// Reference a skill by id and display name.
    pub fn new(id: impl AsRef<str>, name: impl Into<String>) -> MechResult<Self> {
        Ok(Self {
            id: CatalogId::new(id)?,
            name: name.into(),
        })
    }
}

/// A request to perform a skill check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    /// The skill being tested.
    pub skill: SkillRef,
    /// Bonus from the governing attribute or skill rank.
    pub attribute_bonus: i32,
    /// Situational bonus (status effects, tools). May be negative.
    pub other_bonus: i32,
    /// The difficulty to meet.
    pub difficulty: Difficulty,
}

impl CheckRequest {
    /// A request with no bonuses.
    pub fn new(skill: SkillRef, difficulty: impl Into<Difficulty>) -> Self {
        Self {
            skill,
            attribute_bonus: 0,
            other_bonus: 0,
            difficulty: difficulty.into(),
        }
    }

    /// Set the attribute bonus.
    pub fn with_attribute_bonus(mut self, bonus: i32) -> Self {
        self.attribute_bonus = bonus;
        self
    }

    /// Set the situational bonus.
    pub fn with_other_bonus(mut self, bonus: i32) -> Self {
        self.other_bonus = bonus;
        self
    }
}

/// Coarse classification of a resolved check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// Margin reached the critical threshold.
    CriticalSuccess {
        /// Net successes above the DC.
        margin: i32,
    },
    /// Met or beat the DC.
    Success {
        /// Net successes above the DC.
        margin: i32,
    },
    /// Fell short of the DC.
    Failure,
    /// Botches outweighed everything else.
    Fumble,
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalSuccess { margin } => write!(f, "Critical Success (margin {margin})"),
            Self::Success { margin } => write!(f, "Success (margin {margin})"),
            Self::Failure => write!(f, "Failure"),
            Self::Fumble => write!(f, "Fumble"),
        }
    }
}

/// The immutable record of one check attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheckResult {
    skill_id: CatalogId,
    skill_name: String,
    dice: DiceRollResult,
    attribute_bonus: i32,
    other_bonus: i32,
    difficulty_class: DifficultyClass,
    difficulty_name: String,
    config: CheckConfig,
}

impl SkillCheckResult {
    /// Skill tested.
    pub fn skill_id(&self) -> &CatalogId {
        &self.skill_id
    }

    /// Skill display name.
    pub fn skill_name(&self) -> &str {
        &self.skill_name
    }

    /// The dice that were rolled.
    pub fn dice(&self) -> &DiceRollResult {
        &self.dice
    }

    /// Attribute bonus applied.
    pub fn attribute_bonus(&self) -> i32 {
        self.attribute_bonus
    }

    /// Situational bonus applied.
    pub fn other_bonus(&self) -> i32 {
        self.other_bonus
    }

    /// The DC the check was made against.
    pub fn difficulty_class(&self) -> DifficultyClass {
        self.difficulty_class
    }

    /// The DC's name.
    pub fn difficulty_name(&self) -> &str {
        &self.difficulty_name
    }

    /// Faces at or above the success threshold.
    pub fn success_count(&self) -> u32 {
        self.dice.success_count(self.config.success_threshold)
    }

    /// Faces showing the botch face.
    pub fn botch_count(&self) -> u32 {
        self.dice.botch_count(self.config.botch_face)
    }

    /// Successes minus botches plus bonuses. May be negative.
    pub fn net_successes(&self) -> i32 {
        self.success_count() as i32 - self.botch_count() as i32
            + self.attribute_bonus
            + self.other_bonus
    }

    /// Net successes minus the DC.
    pub fn margin(&self) -> i32 {
        self.net_successes() - self.difficulty_class.value()
    }

    /// True when net successes meet or exceed the DC.
    pub fn is_success(&self) -> bool {
        self.margin() >= 0
    }

    /// True when the margin reaches the configured critical margin.
    pub fn is_critical_success(&self) -> bool {
        self.is_success() && self.margin() >= self.config.critical_margin
    }

    /// True when botches drove the net result below zero.
    pub fn is_fumble(&self) -> bool {
        self.net_successes() < 0 && self.botch_count() > 0
    }

    /// Classify the result.
    pub fn outcome(&self) -> CheckOutcome {
        let margin = self.margin();
        if self.is_critical_success() {
            CheckOutcome::CriticalSuccess { margin }
        } else if self.is_success() {
            CheckOutcome::Success { margin }
        } else if self.is_fumble() {
            CheckOutcome::Fumble
        } else {
            CheckOutcome::Failure
        }
    }
}

/// Combines dice, bonuses, and a DC into a [`SkillCheckResult`].
#[derive(Debug, Clone, Default)]
pub struct SkillCheckResolver {
    config: CheckConfig,
}

impl SkillCheckResolver {
    /// Create a resolver with the given classification config.
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    /// The active config.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Resolve already-rolled dice against a request.
    pub fn resolve(&self, request: &CheckRequest, dice: DiceRollResult) -> SkillCheckResult {
        let result = SkillCheckResult {
            skill_id: request.skill.id.clone(),
            skill_name: request.skill.name.clone(),
            dice,
            attribute_bonus: request.attribute_bonus,
            other_bonus: request.other_bonus,
            difficulty_class: request.difficulty.class,
            difficulty_name: request.difficulty.name.clone(),
            config: self.config,
        };
        debug!(
            skill = %result.skill_id,
            dice = %result.dice,
            net = result.net_successes(),
            dc = result.difficulty_class.value(),
            outcome = %result.outcome(),
            "resolved skill check"
        );
        result
    }

    /// Roll the pool and resolve it.
    pub fn roll_and_resolve<R>(
        &self,
        request: &CheckRequest,
        pool: DicePool,
        source: &mut R,
    ) -> MechResult<SkillCheckResult>
    where
        R: RandomSource + ?Sized,
    {
        let dice = pool.roll(source)?;
        Ok(self.resolve(request, dice))
    }
}
