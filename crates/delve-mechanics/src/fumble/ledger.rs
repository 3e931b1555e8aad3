//! Per-encounter store of fumble consequences.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use delve_core::{CatalogId, ConsequenceId, EntityId};
use tracing::debug;

use super::{FumbleConsequence, FumbleSpec};
use crate::check::SkillCheckResult;

/// Reason recorded when a consequence lapses on its own.
pub const EXPIRED_REASON: &str = "expired";

/// Reason recorded when a recovery condition lifts a consequence.
pub const RECOVERED_REASON: &str = "recovered";

/// All consequences created during play, active or not.
#[derive(Debug, Clone, Default)]
pub struct FumbleLedger {
    consequences: Vec<FumbleConsequence>,
}

impl FumbleLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a consequence if `result` is a fumble. Returns its id.
    pub fn record(
        &mut self,
        spec: &FumbleSpec,
        character_id: EntityId,
        result: &SkillCheckResult,
        target_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> Option<ConsequenceId> {
        if !result.is_fumble() {
            return None;
        }
        let consequence = FumbleConsequence::apply(
            spec,
            character_id,
            result.skill_id().clone(),
            target_id,
            now,
        );
        let id = consequence.consequence_id();
        debug!(
            character = %character_id,
            skill = %result.skill_id(),
            kind = %spec.fumble_type,
            "recorded fumble consequence"
        );
        self.consequences.push(consequence);
        Some(id)
    }

    /// True if any active, unexpired consequence of the character blocks the check.
    pub fn blocks_check(
        &self,
        character_id: EntityId,
        skill_id: &CatalogId,
        target_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> bool {
        self.consequences.iter().any(|c| {
            c.character_id() == character_id
                && !c.is_expired(now)
                && c.blocks_check(skill_id, target_id)
        })
    }

    /// Deactivate every naturally expired consequence. Returns their ids.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<ConsequenceId> {
        let mut expired = Vec::new();
        for c in &mut self.consequences {
            if c.is_active() && c.is_expired(now) && c.deactivate(EXPIRED_REASON, now) {
                expired.push(c.consequence_id());
            }
        }
        expired
    }

    /// Lift the character's consequences whose recovery condition is met.
    pub fn recover(
        &mut self,
        character_id: EntityId,
        completed_conditions: &HashSet<CatalogId>,
        now: DateTime<Utc>,
    ) -> Vec<ConsequenceId> {
        let mut recovered = Vec::new();
        for c in &mut self.consequences {
            if c.character_id() == character_id
                && c.is_active()
                && c.can_recover(completed_conditions)
                && c.deactivate(RECOVERED_REASON, now)
            {
                recovered.push(c.consequence_id());
            }
        }
        recovered
    }

    /// Active, unexpired consequences of a character.
    pub fn active_for(
        &self,
        character_id: EntityId,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &FumbleConsequence> {
        self.consequences
            .iter()
            .filter(move |c| c.character_id() == character_id && c.is_active() && !c.is_expired(now))
    }

    /// Look up a consequence.
    pub fn get(&self, id: ConsequenceId) -> Option<&FumbleConsequence> {
        self.consequences.iter().find(|c| c.consequence_id() == id)
    }

    /// Number of consequences ever recorded.
    pub fn len(&self) -> usize {
        self.consequences.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.consequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckRequest, DifficultyTier, SkillCheckResolver, SkillRef};
    use crate::dice::{DiceRollResult, Die};
    use crate::fumble::FumbleType;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn skill(s: &str) -> CatalogId {
        CatalogId::new(s).unwrap()
    }

    fn check(faces: &[u32]) -> SkillCheckResult {
        let request = CheckRequest::new(
            SkillRef::new("lockpicking", "Lockpicking").unwrap(),
            DifficultyTier::Moderate,
        );
        let dice = DiceRollResult::from_faces(Die::D10, faces.to_vec()).unwrap();
        SkillCheckResolver::default().resolve(&request, dice)
    }

    fn jammed() -> FumbleSpec {
        FumbleSpec::new(FumbleType::Jammed, "The lock jams")
            .lasting(Duration::seconds(30))
            .recoverable_by(skill("oil_the_lock"))
    }

    #[test]
    fn only_fumbles_are_recorded() {
        let mut ledger = FumbleLedger::new();
        let hero = EntityId::new();
        assert!(ledger.record(&jammed(), hero, &check(&[5, 6]), None, now()).is_none());
        assert!(ledger.record(&jammed(), hero, &check(&[1, 1]), None, now()).is_some());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn blocks_until_expired() {
        let mut ledger = FumbleLedger::new();
        let hero = EntityId::new();
        let door = EntityId::new();
        ledger.record(&jammed(), hero, &check(&[1]), Some(door), now());

        assert!(ledger.blocks_check(hero, &skill("lockpicking"), Some(door), now()));
        assert!(!ledger.blocks_check(EntityId::new(), &skill("lockpicking"), Some(door), now()));

        let later = now() + Duration::seconds(31);
        assert!(!ledger.blocks_check(hero, &skill("lockpicking"), Some(door), later));
        let expired = ledger.expire(later);
        assert_eq!(expired.len(), 1);
        let c = ledger.get(expired[0]).unwrap();
        assert_eq!(c.deactivation_reason(), Some(EXPIRED_REASON));
        assert!(ledger.expire(later + Duration::seconds(5)).is_empty());
    }

    #[test]
    fn recovery_lifts_only_that_character() {
        let mut ledger = FumbleLedger::new();
        let hero = EntityId::new();
        let rogue = EntityId::new();
        ledger.record(&jammed(), hero, &check(&[1]), None, now());
        ledger.record(&jammed(), rogue, &check(&[1]), None, now());

        let done: HashSet<CatalogId> = [skill("oil_the_lock")].into_iter().collect();
        assert_eq!(ledger.recover(hero, &done, now()).len(), 1);
        assert_eq!(ledger.active_for(hero, now()).count(), 0);
        assert_eq!(ledger.active_for(rogue, now()).count(), 1);
    }
}
