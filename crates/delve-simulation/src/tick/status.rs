//! Status effects: timed buffs, debuffs and damage over time.

use std::collections::BTreeMap;

use delve_core::CatalogId;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{TurnDuration, TurnTick};
use crate::error::{SimError, SimResult};

/// Broad category of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// Beneficial.
    Buff,
    /// Harmful modifiers.
    Debuff,
    /// Deals damage each round.
    DamageOverTime,
    /// Restricts actions.
    Control,
}

/// What happens when an effect is applied to someone who already has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingRule {
    /// Reset the duration.
    #[default]
    Refresh,
    /// Add a stack, up to the maximum, and reset the duration.
    Stack,
    /// Keep the existing effect unchanged.
    Ignore,
}

fn one() -> u32 {
    1
}

/// Content definition of an effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffectDefinition {
    /// Catalog id.
    pub effect_id: CatalogId,
    /// Category.
    pub category: StatusCategory,
    /// Base duration; `-1` in content means permanent.
    pub duration: TurnDuration,
    /// Stacking behaviour.
    #[serde(default)]
    pub stacking: StackingRule,
    /// Maximum stacks.
    #[serde(default = "one")]
    pub max_stacks: u32,
    /// Damage per stack each round.
    #[serde(default)]
    pub damage_per_turn: i32,
    /// Flat stat modifiers keyed by stat id.
    #[serde(default)]
    pub modifiers: BTreeMap<CatalogId, i32>,
}

impl StatusEffectDefinition {
    /// Define a non-stacking effect. The duration must be permanent or at least one round.
    pub fn new(
        effect_id: CatalogId,
        category: StatusCategory,
        duration: TurnDuration,
    ) -> SimResult<Self> {
        let definition = Self {
            effect_id,
            category,
            duration,
            stacking: StackingRule::Refresh,
            max_stacks: 1,
            damage_per_turn: 0,
            modifiers: BTreeMap::new(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Set the stacking rule and the stack cap (at least one).
    pub fn with_stacking(mut self, stacking: StackingRule, max_stacks: u32) -> SimResult<Self> {
        self.stacking = stacking;
        self.max_stacks = max_stacks;
        self.validate()?;
        Ok(self)
    }

    /// Set damage per stack per round.
    pub fn with_damage_per_turn(mut self, damage: i32) -> Self {
        self.damage_per_turn = damage;
        self
    }

    /// Add a flat stat modifier.
    pub fn with_modifier(mut self, stat: CatalogId, value: i32) -> Self {
        self.modifiers.insert(stat, value);
        self
    }

    /// Check the invariants a deserialized definition must also hold.
    pub fn validate(&self) -> SimResult<()> {
        if self.duration.is_elapsed() {
            return Err(SimError::InvalidArgument(format!(
                "effect '{}' must last at least one round",
                self.effect_id
            )));
        }
        if self.max_stacks == 0 {
            return Err(SimError::InvalidArgument(format!(
                "effect '{}' needs a stack cap of at least one",
                self.effect_id
            )));
        }
        Ok(())
    }
}

/// An effect currently applied to a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveStatusEffect {
    definition: StatusEffectDefinition,
    remaining: TurnDuration,
    stacks: u32,
    expired: bool,
}

impl ActiveStatusEffect {
    /// Apply a fresh single stack.
    pub fn new(definition: StatusEffectDefinition) -> Self {
        Self {
            remaining: definition.duration,
            definition,
            stacks: 1,
            expired: false,
        }
    }

    /// Count one round off. Returns `true` on the round it expires.
    pub fn tick_duration(&mut self) -> bool {
        if self.expired || !self.remaining.count_down() {
            return false;
        }
        self.expired = true;
        true
    }

    /// Add stacks. Refuses, leaving the effect unchanged, past the cap.
    pub fn add_stacks(&mut self, count: u32) -> bool {
        match self.stacks.checked_add(count) {
            Some(total) if total <= self.definition.max_stacks => {
                self.stacks = total;
                true
            }
            _ => false,
        }
    }

    /// Restore the full duration.
    pub fn refresh(&mut self) {
        self.remaining = self.definition.duration;
        self.expired = false;
    }

    /// Damage dealt this round: per-stack damage times stacks.
    pub fn damage_this_turn(&self) -> i32 {
        if self.expired {
            return 0;
        }
        let stacks = i32::try_from(self.stacks).unwrap_or(i32::MAX);
        self.definition.damage_per_turn.saturating_mul(stacks)
    }

    /// Flat modifier for a stat. Not scaled by stacks.
    pub fn modifier(&self, stat: &CatalogId) -> i32 {
        if self.expired {
            return 0;
        }
        self.definition.modifiers.get(stat).copied().unwrap_or(0)
    }

    /// The definition.
    pub fn definition(&self) -> &StatusEffectDefinition {
        &self.definition
    }

    /// Catalog id.
    pub fn effect_id(&self) -> &CatalogId {
        &self.definition.effect_id
    }

    /// Remaining duration.
    pub fn remaining(&self) -> TurnDuration {
        self.remaining
    }

    /// Current stacks.
    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Whether the effect has run out.
    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

impl TurnTick for ActiveStatusEffect {
    fn process_turn_tick(&mut self) -> bool {
        self.tick_duration()
    }
}

/// What applying an effect did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// New effect.
    Applied,
    /// Existing effect's duration reset.
    Refreshed,
    /// Existing effect gained a stack.
    Stacked,
    /// Existing effect is at its stack cap; duration reset only.
    StackLimit,
    /// Existing effect left unchanged.
    Ignored,
}

/// Result of one round of status effects on a combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Damage dealt before the effects aged.
    pub damage: i32,
    /// Effects that ran out and were removed.
    pub expired: Vec<CatalogId>,
}

/// Every effect on one combatant, at most one per effect id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusEffects {
    effects: Vec<ActiveStatusEffect>,
}

impl StatusEffects {
    /// No effects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect, honouring its stacking rule if already present.
    pub fn apply(&mut self, definition: StatusEffectDefinition) -> ApplyOutcome {
        let Some(index) = self
            .effects
            .iter()
            .position(|e| e.effect_id() == &definition.effect_id)
        else {
            trace!(effect = %definition.effect_id, "status applied");
            self.effects.push(ActiveStatusEffect::new(definition));
            return ApplyOutcome::Applied;
        };
        let existing = &mut self.effects[index];
        match existing.definition.stacking {
            StackingRule::Ignore => ApplyOutcome::Ignored,
            StackingRule::Refresh => {
                existing.refresh();
                ApplyOutcome::Refreshed
            }
            StackingRule::Stack => {
                existing.refresh();
                if existing.add_stacks(1) {
                    ApplyOutcome::Stacked
                } else {
                    ApplyOutcome::StackLimit
                }
            }
        }
    }

    /// Deal this round's damage, age every effect, and drop the expired ones.
    pub fn tick_all(&mut self) -> StatusTick {
        let damage = self.total_damage();
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            if effect.tick_duration() {
                expired.push(effect.effect_id().clone());
            }
        }
        self.effects.retain(|e| !e.is_expired());
        if !expired.is_empty() {
            debug!(expired = expired.len(), "status effects expired");
        }
        StatusTick { damage, expired }
    }

    /// Damage the current effects would deal this round.
    pub fn total_damage(&self) -> i32 {
        self.effects
            .iter()
            .fold(0, |sum, e| sum.saturating_add(e.damage_this_turn()))
    }

    /// Summed flat modifier for a stat.
    pub fn modifier(&self, stat: &CatalogId) -> i32 {
        self.effects.iter().map(|e| e.modifier(stat)).sum()
    }

    /// Remove an effect early.
    pub fn remove(&mut self, effect_id: &CatalogId) -> Option<ActiveStatusEffect> {
        let index = self.effects.iter().position(|e| e.effect_id() == effect_id)?;
        Some(self.effects.remove(index))
    }

    /// Look up an effect.
    pub fn get(&self, effect_id: &CatalogId) -> Option<&ActiveStatusEffect> {
        self.effects.iter().find(|e| e.effect_id() == effect_id)
    }

    /// All current effects.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveStatusEffect> {
        self.effects.iter()
    }

    /// Number of effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether there are no effects.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> CatalogId {
        CatalogId::new(raw).unwrap()
    }

    fn poison() -> StatusEffectDefinition {
        StatusEffectDefinition::new(id("poison"), StatusCategory::DamageOverTime, TurnDuration::Turns(3))
            .unwrap()
            .with_stacking(StackingRule::Stack, 3)
            .unwrap()
            .with_damage_per_turn(2)
    }

    fn blessed() -> StatusEffectDefinition {
        StatusEffectDefinition::new(id("blessed"), StatusCategory::Buff, TurnDuration::Permanent)
            .unwrap()
            .with_modifier(id("defense"), 1)
    }

    #[test]
    fn tick_duration_expires_once() {
        let mut effect = ActiveStatusEffect::new(poison());
        assert!(!effect.tick_duration());
        assert!(!effect.tick_duration());
        assert!(effect.tick_duration());
        assert!(effect.is_expired());
        assert!(!effect.tick_duration());
        assert_eq!(effect.remaining(), TurnDuration::Turns(0));
    }

    #[test]
    fn permanent_effect_never_expires() {
        let mut effect = ActiveStatusEffect::new(blessed());
        for _ in 0..20 {
            assert!(!effect.process_turn_tick());
        }
        assert_eq!(effect.modifier(&id("defense")), 1);
    }

    #[test]
    fn stacks_cap_and_scale_damage() {
        let mut effect = ActiveStatusEffect::new(poison());
        assert_eq!(effect.damage_this_turn(), 2);
        assert!(effect.add_stacks(2));
        assert_eq!(effect.damage_this_turn(), 6);
        assert!(!effect.add_stacks(1));
        assert_eq!(effect.stacks(), 3);
    }

    #[test]
    fn stacking_rules_on_reapply() {
        let mut effects = StatusEffects::new();
        assert_eq!(effects.apply(poison()), ApplyOutcome::Applied);
        assert_eq!(effects.apply(poison()), ApplyOutcome::Stacked);
        assert_eq!(effects.apply(poison()), ApplyOutcome::Stacked);
        assert_eq!(effects.apply(poison()), ApplyOutcome::StackLimit);
        assert_eq!(effects.len(), 1);

        assert_eq!(effects.apply(blessed()), ApplyOutcome::Applied);
        assert_eq!(effects.apply(blessed()), ApplyOutcome::Refreshed);

        let stun = StatusEffectDefinition::new(id("stunned"), StatusCategory::Control, TurnDuration::Turns(1))
            .unwrap()
            .with_stacking(StackingRule::Ignore, 1)
            .unwrap();
        assert_eq!(effects.apply(stun.clone()), ApplyOutcome::Applied);
        assert_eq!(effects.apply(stun), ApplyOutcome::Ignored);
    }

    #[test]
    fn tick_all_deals_damage_then_drops_expired() {
        let mut effects = StatusEffects::new();
        effects.apply(poison());
        effects.apply(poison());
        effects.apply(blessed());
        assert_eq!(effects.modifier(&id("defense")), 1);

        assert_eq!(effects.tick_all(), StatusTick { damage: 4, expired: vec![] });
        assert_eq!(effects.tick_all().damage, 4);
        let last = effects.tick_all();
        assert_eq!(last.damage, 4);
        assert_eq!(last.expired, vec![id("poison")]);
        assert!(effects.get(&id("poison")).is_none());
        assert_eq!(effects.tick_all().damage, 0);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn reapply_refreshes_duration() {
        let mut effects = StatusEffects::new();
        effects.apply(poison());
        effects.tick_all();
        effects.tick_all();
        effects.apply(poison());
        assert_eq!(effects.get(&id("poison")).unwrap().remaining(), TurnDuration::Turns(3));
    }

    #[test]
    fn invalid_definitions_rejected() {
        assert!(StatusEffectDefinition::new(id("x"), StatusCategory::Buff, TurnDuration::Turns(0)).is_err());
        assert!(
            StatusEffectDefinition::new(id("x"), StatusCategory::Buff, TurnDuration::Turns(1))
                .unwrap()
                .with_stacking(StackingRule::Stack, 0)
                .is_err()
        );
    }

    #[test]
    fn remove_effect() {
        let mut effects = StatusEffects::new();
        effects.apply(blessed());
        assert!(effects.remove(&id("blessed")).is_some());
        assert!(effects.is_empty());
    }
}
