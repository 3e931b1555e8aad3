//! Chained checks: ordered skill-check steps with per-step retry budgets.
//!
//! ```text
//! NotStarted -> InProgress -> (AwaitingRetry <-> InProgress) -> Succeeded | Failed
//! ```
//!
//! A chain advances by exactly one recorded result at a time. Once it is
//! Succeeded or Failed it accepts no further results.

use chrono::{DateTime, Utc};
use delve_core::{CatalogId, CheckId, EntityId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::check::{CheckRequest, Difficulty, DifficultyClass, SkillCheckResult, SkillRef};
use crate::error::{MechError, MechResult};

/// Static definition of one step in a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedCheckStep {
    /// Step identifier.
    pub step_id: CatalogId,
    /// Display label, e.g. "Pick the outer lock".
    pub label: String,
    /// Skill the step tests.
    pub skill_id: CatalogId,
    /// DC of the step.
    pub difficulty_class: DifficultyClass,
    /// How many failed attempts may be retried.
    #[serde(default)]
    pub retries_allowed: u32,
}

impl ChainedCheckStep {
    /// Define a step.
    pub fn new(
        step_id: impl AsRef<str>,
        label: impl Into<String>,
        skill_id: impl AsRef<str>,
        difficulty_class: DifficultyClass,
        retries_allowed: u32,
    ) -> MechResult<Self> {
        Ok(Self {
            step_id: CatalogId::new(step_id)?,
            label: label.into(),
            skill_id: CatalogId::new(skill_id)?,
            difficulty_class,
            retries_allowed,
        })
    }
}

/// Where a chain is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainStatus {
    /// No result recorded yet.
    NotStarted,
    /// At least one step cleared, more remain.
    InProgress,
    /// The current step failed and may be retried.
    AwaitingRetry,
    /// Every step succeeded.
    Succeeded,
    /// A step failed with no retries left, or the chain was abandoned.
    Failed,
}

impl ChainStatus {
    /// Succeeded and Failed are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::InProgress => write!(f, "in progress"),
            Self::AwaitingRetry => write!(f, "awaiting retry"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One recorded attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAttempt {
    /// Index of the step the attempt was made against.
    pub step_index: usize,
    /// Whether the caller flagged it as a retry.
    pub was_retry: bool,
    /// The check result.
    pub result: SkillCheckResult,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// The mutable state of one run through a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ChainSnapshot")]
pub struct ChainedCheckState {
    check_id: CheckId,
    character_id: EntityId,
    chain_name: String,
    steps: Vec<ChainedCheckStep>,
    current_step_index: usize,
    status: ChainStatus,
    retries_remaining: Vec<u32>,
    step_results: Vec<SkillCheckResult>,
    attempts: Vec<StepAttempt>,
    target_id: Option<EntityId>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Wire form of [`ChainedCheckState`], checked before it becomes live state.
#[derive(Deserialize)]
struct ChainSnapshot {
    check_id: CheckId,
    character_id: EntityId,
    chain_name: String,
    steps: Vec<ChainedCheckStep>,
    current_step_index: usize,
    status: ChainStatus,
    retries_remaining: Vec<u32>,
    step_results: Vec<SkillCheckResult>,
    attempts: Vec<StepAttempt>,
    target_id: Option<EntityId>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ChainSnapshot> for ChainedCheckState {
    type Error = MechError;

    fn try_from(raw: ChainSnapshot) -> MechResult<Self> {
        let invalid = |reason: &str| {
            Err(MechError::InvalidArgument(format!(
                "chain '{}' snapshot {reason}",
                raw.chain_name
            )))
        };
        if raw.steps.is_empty() {
            return invalid("has no steps");
        }
        if raw.retries_remaining.len() != raw.steps.len() {
            return invalid("does not have one retry budget per step");
        }
        if raw.current_step_index > raw.steps.len()
            || (!raw.status.is_terminal() && raw.current_step_index == raw.steps.len())
        {
            return invalid("points past its last step");
        }
        if raw.step_results.len() != raw.current_step_index {
            return invalid("has results that disagree with its step index");
        }
        if raw.status.is_terminal() != raw.completed_at.is_some() {
            return invalid("has a completion time that disagrees with its status");
        }
        Ok(Self {
            check_id: raw.check_id,
            character_id: raw.character_id,
            chain_name: raw.chain_name,
            steps: raw.steps,
            current_step_index: raw.current_step_index,
            status: raw.status,
            retries_remaining: raw.retries_remaining,
            step_results: raw.step_results,
            attempts: raw.attempts,
            target_id: raw.target_id,
            created_at: raw.created_at,
            completed_at: raw.completed_at,
        })
    }
}

impl ChainedCheckState {
    /// Start a chain for a character. Fails on an empty step list.
    pub fn new(
        character_id: EntityId,
        chain_name: impl Into<String>,
        steps: Vec<ChainedCheckStep>,
        target_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> MechResult<Self> {
        if steps.is_empty() {
            return Err(MechError::InvalidArgument(
                "a chained check needs at least one step".to_string(),
            ));
        }
        let retries_remaining = steps.iter().map(|s| s.retries_allowed).collect();
        Ok(Self {
            check_id: CheckId::new(),
            character_id,
            chain_name: chain_name.into(),
            steps,
            current_step_index: 0,
            status: ChainStatus::NotStarted,
            retries_remaining,
            step_results: Vec::new(),
            attempts: Vec::new(),
            target_id,
            created_at: now,
            completed_at: None,
        })
    }

    /// Record the result for the current step.
    ///
    /// Rejects results once the chain is terminal, retries that were not
    /// offered, and results for a skill other than the current step's.
    pub fn record_step_result(
        &mut self,
        result: SkillCheckResult,
        was_retry: bool,
        now: DateTime<Utc>,
    ) -> MechResult<ChainStatus> {
        if self.status.is_terminal() {
            warn!(chain = %self.chain_name, status = %self.status, "result recorded on finished chain");
            return Err(MechError::InvalidOperation(format!(
                "chain '{}' is already {}",
                self.chain_name, self.status
            )));
        }
        if was_retry && self.status != ChainStatus::AwaitingRetry {
            return Err(MechError::InvalidOperation(format!(
                "chain '{}' has no retry pending",
                self.chain_name
            )));
        }
        let index = self.current_step_index;
        let step = &self.steps[index];
        if result.skill_id() != &step.skill_id {
            return Err(MechError::InvalidOperation(format!(
                "step '{}' expects skill '{}', got '{}'",
                step.step_id,
                step.skill_id,
                result.skill_id()
            )));
        }

        if result.difficulty_class() != step.difficulty_class {
            return Err(MechError::InvalidOperation(format!(
                "step '{}' is {}, got a result rolled against {}",
                step.step_id,
                step.difficulty_class,
                result.difficulty_class()
            )));
        }

        let succeeded = result.is_success();
        self.attempts.push(StepAttempt {
            step_index: index,
            was_retry,
            result: result.clone(),
            recorded_at: now,
        });

        if succeeded {
            self.step_results.push(result);
            self.current_step_index += 1;
            if self.current_step_index == self.steps.len() {
                self.finish(ChainStatus::Succeeded, now);
            } else {
                self.status = ChainStatus::InProgress;
            }
        } else if self.retries_remaining[index] > 0 {
            self.retries_remaining[index] -= 1;
            self.status = ChainStatus::AwaitingRetry;
        } else {
            self.finish(ChainStatus::Failed, now);
        }

        debug!(
            chain = %self.chain_name,
            step = index,
            succeeded,
            status = %self.status,
            "recorded chained check step"
        );
        Ok(self.status)
    }

    /// Give up on the chain. Never reverts a finished chain.
    pub fn abandon(&mut self, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        debug!(chain = %self.chain_name, step = self.current_step_index, "abandoned chained check");
        self.finish(ChainStatus::Failed, now);
    }

    fn finish(&mut self, status: ChainStatus, now: DateTime<Utc>) {
        self.status = status;
        self.completed_at = Some(now);
    }

    /// Build the check request for the current step.
    pub fn request_for_current_step(
        &self,
        skill_name: impl Into<String>,
        attribute_bonus: i32,
        other_bonus: i32,
    ) -> Option<CheckRequest> {
        let step = self.current_step()?;
        let skill = SkillRef {
            id: step.skill_id.clone(),
            name: skill_name.into(),
        };
        let difficulty = Difficulty::named(step.label.clone(), step.difficulty_class);
        Some(
            CheckRequest::new(skill, difficulty)
                .with_attribute_bonus(attribute_bonus)
                .with_other_bonus(other_bonus),
        )
    }

    /// Identifier of this run.
    pub fn check_id(&self) -> CheckId {
        self.check_id
    }

    /// The character attempting the chain.
    pub fn character_id(&self) -> EntityId {
        self.character_id
    }

    /// Chain display name.
    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// The step definitions.
    pub fn steps(&self) -> &[ChainedCheckStep] {
        &self.steps
    }

    /// The step awaiting a result, if the chain is not finished.
    pub fn current_step(&self) -> Option<&ChainedCheckStep> {
        if self.status.is_terminal() {
            return None;
        }
        self.steps.get(self.current_step_index)
    }

    /// Index of the step awaiting a result.
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    /// Current status.
    pub fn status(&self) -> ChainStatus {
        self.status
    }

    /// Retries left for a step.
    pub fn retries_remaining(&self, step_index: usize) -> Option<u32> {
        self.retries_remaining.get(step_index).copied()
    }

    /// One successful result per cleared step, in order.
    pub fn step_results(&self) -> &[SkillCheckResult] {
        &self.step_results
    }

    /// Every recorded attempt, in order.
    pub fn attempts(&self) -> &[StepAttempt] {
        &self.attempts
    }

    /// Target of the chain, if any.
    pub fn target_id(&self) -> Option<EntityId> {
        self.target_id
    }

    /// When the chain was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the chain reached a terminal state.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// True once Succeeded or Failed.
    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    /// True while a failed step may be retried.
    pub fn can_retry(&self) -> bool {
        self.status == ChainStatus::AwaitingRetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{SkillCheckResolver, SkillRef};
    use crate::dice::{DiceRollResult, Die};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn step(id: &str, skill: &str, dc: i32, retries: u32) -> ChainedCheckStep {
        ChainedCheckStep::new(id, id, skill, DifficultyClass::new(dc).unwrap(), retries).unwrap()
    }

    fn result(skill: &str, dc: i32, faces: &[u32]) -> SkillCheckResult {
        let request = CheckRequest::new(
            SkillRef::new(skill, skill).unwrap(),
            Difficulty::named("test", DifficultyClass::new(dc).unwrap()),
        );
        let dice = DiceRollResult::from_faces(Die::D10, faces.to_vec()).unwrap();
        SkillCheckResolver::default().resolve(&request, dice)
    }

    fn pass(skill: &str) -> SkillCheckResult {
        result(skill, 1, &[9])
    }

    fn fail(skill: &str) -> SkillCheckResult {
        result(skill, 1, &[3])
    }

    fn chain(steps: Vec<ChainedCheckStep>) -> ChainedCheckState {
        ChainedCheckState::new(EntityId::new(), "vault door", steps, None, now()).unwrap()
    }

    #[test]
    fn empty_chain_is_rejected() {
        let err = ChainedCheckState::new(EntityId::new(), "empty", vec![], None, now());
        assert!(matches!(err, Err(MechError::InvalidArgument(_))));
    }

    #[test]
    fn new_chain_is_not_started() {
        let c = chain(vec![step("a", "lockpicking", 2, 2)]);
        assert_eq!(c.status(), ChainStatus::NotStarted);
        assert_eq!(c.current_step_index(), 0);
        assert_eq!(c.retries_remaining(0), Some(2));
        assert!(!c.is_complete());
        assert!(c.completed_at().is_none());
    }

    #[test]
    fn single_step_success_completes_immediately() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 0)]);
        let status = c.record_step_result(pass("lockpicking"), false, now()).unwrap();
        assert_eq!(status, ChainStatus::Succeeded);
        assert!(c.is_complete());
        assert_eq!(c.current_step_index(), 1);
        assert_eq!(c.completed_at(), Some(now()));
        assert!(c.current_step().is_none());
    }

    #[test]
    fn single_step_failure_without_retries_fails() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 0)]);
        let status = c.record_step_result(fail("lockpicking"), false, now()).unwrap();
        assert_eq!(status, ChainStatus::Failed);
        assert!(c.is_complete());
        assert!(c.completed_at().is_some());
        assert!(!c.can_retry());
    }

    #[test]
    fn failure_consumes_retry() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 1), step("b", "athletics", 1, 0)]);
        c.record_step_result(fail("lockpicking"), false, now()).unwrap();
        assert_eq!(c.status(), ChainStatus::AwaitingRetry);
        assert_eq!(c.retries_remaining(0), Some(0));
        assert!(c.can_retry());

        c.record_step_result(pass("lockpicking"), true, now()).unwrap();
        assert_eq!(c.status(), ChainStatus::InProgress);
        assert_eq!(c.current_step_index(), 1);

        c.record_step_result(pass("athletics"), false, now()).unwrap();
        assert_eq!(c.status(), ChainStatus::Succeeded);
        assert_eq!(c.step_results().len(), 2);
        assert_eq!(c.attempts().len(), 3);
        assert!(c.attempts()[1].was_retry);
    }

    #[test]
    fn exhausted_retries_fail_the_chain() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 1)]);
        c.record_step_result(fail("lockpicking"), false, now()).unwrap();
        let status = c.record_step_result(fail("lockpicking"), true, now()).unwrap();
        assert_eq!(status, ChainStatus::Failed);
    }

    #[test]
    fn finished_chain_rejects_results() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 0)]);
        c.record_step_result(pass("lockpicking"), false, now()).unwrap();
        let err = c.record_step_result(pass("lockpicking"), false, now());
        assert!(matches!(err, Err(MechError::InvalidOperation(_))));
        assert_eq!(c.status(), ChainStatus::Succeeded);
    }

    #[test]
    fn retry_without_pending_retry_is_rejected() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 3)]);
        let err = c.record_step_result(pass("lockpicking"), true, now());
        assert!(matches!(err, Err(MechError::InvalidOperation(_))));
        assert_eq!(c.status(), ChainStatus::NotStarted);
        assert!(c.attempts().is_empty());
    }

    #[test]
    fn wrong_skill_is_rejected() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 0)]);
        let err = c.record_step_result(pass("athletics"), false, now());
        assert!(matches!(err, Err(MechError::InvalidOperation(_))));
    }

    #[test]
    fn result_against_another_difficulty_is_rejected() {
        let mut c = chain(vec![step("a", "lockpicking", 5, 0)]);
        let err = c.record_step_result(result("lockpicking", 1, &[9]), false, now());
        assert!(matches!(err, Err(MechError::InvalidOperation(_))));
        assert_eq!(c.status(), ChainStatus::NotStarted);
        assert!(c.attempts().is_empty());

        let status = c
            .record_step_result(result("lockpicking", 5, &[9, 9, 9, 9, 9]), false, now())
            .unwrap();
        assert_eq!(status, ChainStatus::Succeeded);
    }

    #[test]
    fn abandon_forces_failure() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 0), step("b", "athletics", 1, 0)]);
        c.record_step_result(pass("lockpicking"), false, now()).unwrap();
        let later = now() + chrono::Duration::seconds(30);
        c.abandon(later);
        assert_eq!(c.status(), ChainStatus::Failed);
        assert_eq!(c.completed_at(), Some(later));
        assert!(c.record_step_result(pass("athletics"), false, later).is_err());
    }

    #[test]
    fn abandon_does_not_revert_success() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 0)]);
        c.record_step_result(pass("lockpicking"), false, now()).unwrap();
        c.abandon(now() + chrono::Duration::seconds(5));
        assert_eq!(c.status(), ChainStatus::Succeeded);
        assert_eq!(c.completed_at(), Some(now()));
    }

    #[test]
    fn request_uses_step_definition() {
        let c = chain(vec![step("outer", "lockpicking", 3, 0)]);
        let request = c.request_for_current_step("Lockpicking", 2, -1).unwrap();
        assert_eq!(request.skill.id.as_str(), "lockpicking");
        assert_eq!(request.difficulty.class.value(), 3);
        assert_eq!(request.attribute_bonus, 2);
        assert_eq!(request.other_bonus, -1);
    }

    #[test]
    fn state_serializes_for_snapshots() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 1)]);
        c.record_step_result(fail("lockpicking"), false, now()).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["status"], "AwaitingRetry");
        assert_eq!(json["retries_remaining"][0], 0);
    }

    #[test]
    fn snapshot_round_trips_mid_chain() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 1), step("b", "athletics", 1, 0)]);
        c.record_step_result(pass("lockpicking"), false, now()).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let mut restored: ChainedCheckState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current_step_index(), 1);
        assert_eq!(
            restored.record_step_result(pass("athletics"), false, now()).unwrap(),
            ChainStatus::Succeeded
        );
    }

    #[test]
    fn inconsistent_snapshots_are_rejected() {
        let mut c = chain(vec![step("a", "lockpicking", 1, 1)]);
        c.record_step_result(fail("lockpicking"), false, now()).unwrap();
        let good = serde_json::to_value(&c).unwrap();

        let mut no_steps = good.clone();
        no_steps["steps"] = serde_json::json!([]);
        no_steps["retries_remaining"] = serde_json::json!([]);
        assert!(serde_json::from_value::<ChainedCheckState>(no_steps).is_err());

        let mut short_budget = good.clone();
        short_budget["retries_remaining"] = serde_json::json!([]);
        assert!(serde_json::from_value::<ChainedCheckState>(short_budget).is_err());

        let mut past_end = good.clone();
        past_end["current_step_index"] = serde_json::json!(1);
        assert!(serde_json::from_value::<ChainedCheckState>(past_end).is_err());

        assert!(serde_json::from_value::<ChainedCheckState>(good).is_ok());
    }
}
