//! Chained-check and fumble-ledger behaviour across many generated inputs.

use chrono::{TimeZone, Utc};
use delve_core::EntityId;
use delve_mechanics::{
    ChainStatus, ChainedCheckState, ChainedCheckStep, CheckRequest, DiceRollResult,
    DifficultyClass, DifficultyTier, Die, FumbleLedger, FumbleSpec, FumbleType,
    SkillCheckResolver, SkillCheckResult, SkillRef,
};
use proptest::prelude::*;

fn resolve(skill: &str, faces: Vec<u32>, dc: i32) -> SkillCheckResult {
    let request = CheckRequest::new(
        SkillRef::new(skill, skill).unwrap(),
        delve_mechanics::Difficulty::named("Custom", DifficultyClass::new(dc).unwrap()),
    );
    let dice = DiceRollResult::from_faces(Die::D10, faces).unwrap();
    SkillCheckResolver::default().resolve(&request, dice)
}

fn steps(count: usize, retries: u32) -> Vec<ChainedCheckStep> {
    (0..count)
        .map(|i| {
            ChainedCheckStep::new(
                format!("step-{i}"),
                format!("Step {i}"),
                "lockpicking",
                DifficultyClass::new(1).unwrap(),
                retries,
            )
            .unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn all_successes_finish_exactly_once(count in 1usize..8) {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut chain = ChainedCheckState::new(EntityId::new(), "Vault", steps(count, 0), None, now).unwrap();
        for i in 0..count {
            let status = chain.record_step_result(resolve("lockpicking", vec![9], 1), false, now).unwrap();
            if i + 1 == count {
                prop_assert_eq!(status, ChainStatus::Succeeded);
            } else {
                prop_assert_eq!(status, ChainStatus::InProgress);
            }
        }
        prop_assert!(chain.is_complete());
        prop_assert_eq!(chain.step_results().len(), count);
        prop_assert!(chain.record_step_result(resolve("lockpicking", vec![9], 1), false, now).is_err());
    }

    #[test]
    fn retries_run_out_then_fail(retries in 0u32..5) {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut chain = ChainedCheckState::new(EntityId::new(), "Vault", steps(1, retries), None, now).unwrap();
        let mut was_retry = false;
        for left in (0..retries).rev() {
            let status = chain.record_step_result(resolve("lockpicking", vec![2], 1), was_retry, now).unwrap();
            prop_assert_eq!(status, ChainStatus::AwaitingRetry);
            prop_assert_eq!(chain.retries_remaining(0), Some(left));
            was_retry = true;
        }
        let status = chain.record_step_result(resolve("lockpicking", vec![2], 1), was_retry, now).unwrap();
        prop_assert_eq!(status, ChainStatus::Failed);
        prop_assert_eq!(chain.attempts().len(), retries as usize + 1);
        prop_assert!(chain.completed_at().is_some());
    }

    #[test]
    fn outcome_classes_are_exclusive(faces in prop::collection::vec(1u32..=10, 0..8), dc in 1i32..6) {
        let result = resolve("athletics", faces, dc);
        let classes = [result.is_critical_success() && result.is_success(), result.is_success() && !result.is_critical_success(), !result.is_success() && !result.is_fumble(), result.is_fumble()];
        prop_assert_eq!(classes.iter().filter(|c| **c).count(), 1);
    }
}

#[test]
fn fumbled_lock_blocks_until_it_expires() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    let rogue = EntityId::new();
    let door = EntityId::new();
    let request = CheckRequest::new(
        SkillRef::new("lockpicking", "Lockpicking").unwrap(),
        DifficultyTier::Easy,
    );
    let dice = DiceRollResult::from_faces(Die::D10, vec![1, 3]).unwrap();
    let result = SkillCheckResolver::default().resolve(&request, dice);
    assert!(result.is_fumble());

    let mut ledger = FumbleLedger::new();
    let spec = FumbleSpec::new(FumbleType::BrokenTool, "The pick snaps")
        .lasting(chrono::Duration::minutes(10));
    let id = ledger.record(&spec, rogue, &result, Some(door), now);
    assert!(id.is_some());

    let skill = request.skill.id.clone();
    assert!(ledger.blocks_check(rogue, &skill, Some(door), now));
    assert!(!ledger.blocks_check(rogue, &skill, Some(EntityId::new()), now));

    let later = now + chrono::Duration::minutes(11);
    assert_eq!(ledger.expire(later), vec![id.unwrap()]);
    assert!(!ledger.blocks_check(rogue, &skill, Some(door), later));
}
