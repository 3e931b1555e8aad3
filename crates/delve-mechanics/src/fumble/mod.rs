//! Fumble consequences: lingering penalties left behind by botched checks.
//!
//! A consequence ties a character, a skill, and optionally a target
//! together. While active it can block further checks; it ends when it
//! expires, when its recovery condition is met, or when deactivated.

pub mod ledger;

pub use ledger::FumbleLedger;

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use delve_core::{CatalogId, ConsequenceId, EntityId};
use serde::{Deserialize, Serialize};

/// What kind of trouble a fumble caused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FumbleType {
    /// The character hurt themselves.
    Injury,
    /// A tool or weapon broke.
    BrokenTool,
    /// The target noticed and is now on guard.
    Alerted,
    /// The mechanism jammed.
    Jammed,
    /// The character is too winded to try again soon.
    Exhausted,
}

impl std::fmt::Display for FumbleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Injury => write!(f, "injury"),
            Self::BrokenTool => write!(f, "broken tool"),
            Self::Alerted => write!(f, "alerted"),
            Self::Jammed => write!(f, "jammed"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Content-supplied template for the consequence a fumble creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FumbleSpec {
    /// Kind of consequence.
    pub fumble_type: FumbleType,
    /// Text handed to the narrative layer.
    pub description: String,
    /// How long the consequence lasts. `None` is permanent.
    #[serde(default)]
    pub lasts_seconds: Option<i64>,
    /// Condition that lifts the consequence early.
    #[serde(default)]
    pub recovery_condition: Option<CatalogId>,
}

impl FumbleSpec {
    /// A permanent consequence with no recovery condition.
    pub fn new(fumble_type: FumbleType, description: impl Into<String>) -> Self {
        Self {
            fumble_type,
            description: description.into(),
            lasts_seconds: None,
            recovery_condition: None,
        }
    }

    /// Limit the consequence to a duration.
    pub fn lasting(mut self, duration: Duration) -> Self {
        self.lasts_seconds = Some(duration.num_seconds());
        self
    }

    /// Allow early recovery once a condition is met.
    pub fn recoverable_by(mut self, condition: CatalogId) -> Self {
        self.recovery_condition = Some(condition);
        self
    }
}

/// `now + seconds`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A live consequence attached to a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FumbleConsequence {
    consequence_id: ConsequenceId,
    character_id: EntityId,
    skill_id: CatalogId,
    fumble_type: FumbleType,
    target_id: Option<EntityId>,
    applied_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    description: String,
    recovery_condition: Option<CatalogId>,
    is_active: bool,
    deactivated_at: Option<DateTime<Utc>>,
    deactivation_reason: Option<String>,
}

impl FumbleConsequence {
    /// Instantiate a consequence from its template.
    pub fn apply(
        spec: &FumbleSpec,
        character_id: EntityId,
        skill_id: CatalogId,
        target_id: Option<EntityId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            consequence_id: ConsequenceId::new(),
            character_id,
            skill_id,
            fumble_type: spec.fumble_type,
            target_id,
            applied_at: now,
            expires_at: spec.lasts_seconds.map(|s| expiry_after(now, s)),
            description: spec.description.clone(),
            recovery_condition: spec.recovery_condition.clone(),
            is_active: true,
            deactivated_at: None,
            deactivation_reason: None,
        }
    }

    /// True if this consequence stops a check with `skill_id` against
    /// `target_id`. A check with no target matches any stored target.
    pub fn blocks_check(&self, skill_id: &CatalogId, target_id: Option<EntityId>) -> bool {
        self.is_active
            && &self.skill_id == skill_id
            && target_id.is_none_or(|t| self.target_id == Some(t))
    }

    /// True once `now` is past the expiry. Permanent consequences never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    /// Deactivate. Only the first call records its reason and timestamp;
    /// returns whether this call changed anything.
    pub fn deactivate(&mut self, reason: impl Into<String>, when: DateTime<Utc>) -> bool {
        if self.deactivated_at.is_some() {
            return false;
        }
        self.is_active = false;
        self.deactivated_at = Some(when);
        self.deactivation_reason = Some(reason.into());
        true
    }

    /// True if the recovery condition is among the completed conditions.
    pub fn can_recover(&self, completed_conditions: &HashSet<CatalogId>) -> bool {
        self.recovery_condition
            .as_ref()
            .is_some_and(|c| completed_conditions.contains(c))
    }

    /// Identifier.
    pub fn consequence_id(&self) -> ConsequenceId {
        self.consequence_id
    }

    /// Affected character.
    pub fn character_id(&self) -> EntityId {
        self.character_id
    }

    /// Skill the fumble happened on.
    pub fn skill_id(&self) -> &CatalogId {
        &self.skill_id
    }

    /// Kind of consequence.
    pub fn fumble_type(&self) -> FumbleType {
        self.fumble_type
    }

    /// Target the fumble was made against.
    pub fn target_id(&self) -> Option<EntityId> {
        self.target_id
    }

    /// When it was applied.
    pub fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    /// When it lapses, if ever.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Narrative description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Condition that lifts it early.
    pub fn recovery_condition(&self) -> Option<&CatalogId> {
        self.recovery_condition.as_ref()
    }

    /// Still in force.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// When it was deactivated.
    pub fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.deactivated_at
    }

    /// Why it was deactivated.
    pub fn deactivation_reason(&self) -> Option<&str> {
        self.deactivation_reason.as_deref()
    }
}
