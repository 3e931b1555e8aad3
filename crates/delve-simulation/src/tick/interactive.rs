use delve_core::CatalogId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TurnDuration, TurnTick};
use crate::error::{SimError, SimResult};

/// Kind of mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Springs back after a while.
    Button,
    /// Stays where it was thrown.
    Lever,
    /// Triggered by weight.
    PressurePlate,
    /// Opens when activated.
    Door,
}

/// Current state of a mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectState {
    /// Ready to be used.
    Inactive,
    /// Triggered.
    Active,
    /// Cannot be used until unlocked.
    Locked,
    /// Broken for good.
    Destroyed,
}

/// Result of trying to use a mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// The object is now active.
    Activated,
    /// It was active already.
    AlreadyActive,
    /// It is locked.
    Locked,
    /// It is destroyed.
    Destroyed,
    /// It was used too recently.
    CoolingDown,
}

/// A button, lever, pressure plate or door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveObject {
    object_id: CatalogId,
    kind: ObjectKind,
    state: ObjectState,
    reset_after: TurnDuration,
    reset_remaining: Option<u32>,
    cooldown_turns: u32,
    cooldown: u32,
}

impl InteractiveObject {
    /// Create an inactive object. `reset_after` is how long it stays active
    /// (permanent for levers); `cooldown_turns` blocks reuse after activation.
    pub fn new(
        object_id: CatalogId,
        kind: ObjectKind,
        reset_after: TurnDuration,
        cooldown_turns: u32,
    ) -> SimResult<Self> {
        if reset_after.is_elapsed() {
            return Err(SimError::InvalidArgument(format!(
                "object '{object_id}' must stay active for at least one round"
            )));
        }
        Ok(Self {
            object_id,
            kind,
            state: ObjectState::Inactive,
            reset_after,
            reset_remaining: None,
            cooldown_turns,
            cooldown: 0,
        })
    }

    /// Start locked.
    pub fn locked(mut self) -> Self {
        self.state = ObjectState::Locked;
        self
    }

    /// Try to trigger the object.
    pub fn activate(&mut self) -> ActivationOutcome {
        match self.state {
            ObjectState::Destroyed => return ActivationOutcome::Destroyed,
            ObjectState::Locked => return ActivationOutcome::Locked,
            ObjectState::Active => return ActivationOutcome::AlreadyActive,
            ObjectState::Inactive => {}
        }
        if self.cooldown > 0 {
            return ActivationOutcome::CoolingDown;
        }
        self.state = ObjectState::Active;
        self.reset_remaining = self.reset_after.remaining();
        self.cooldown = self.cooldown_turns;
        debug!(object = %self.object_id, "object activated");
        ActivationOutcome::Activated
    }

    /// Shorten the cooldown, never below zero.
    pub fn reduce_cooldown(&mut self, turns: u32) {
        self.cooldown = self.cooldown.saturating_sub(turns);
    }

    /// Lock the object. Fails on destroyed objects.
    pub fn lock(&mut self) -> bool {
        if self.state == ObjectState::Destroyed {
            return false;
        }
        self.state = ObjectState::Locked;
        self.reset_remaining = None;
        true
    }

    /// Unlock a locked object back to inactive.
    pub fn unlock(&mut self) -> bool {
        if self.state != ObjectState::Locked {
            return false;
        }
        self.state = ObjectState::Inactive;
        true
    }

    /// Break the object. Returns `false` if it was already destroyed.
    pub fn destroy(&mut self) -> bool {
        if self.state == ObjectState::Destroyed {
            return false;
        }
        self.state = ObjectState::Destroyed;
        self.reset_remaining = None;
        self.cooldown = 0;
        true
    }

    /// Catalog id.
    pub fn object_id(&self) -> &CatalogId {
        &self.object_id
    }

    /// Kind of mechanism.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Current state.
    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Whether the object is currently active.
    pub fn is_active(&self) -> bool {
        self.state == ObjectState::Active
    }

    /// Rounds until the object may be used again.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Rounds until an active object resets, if it resets at all.
    pub fn reset_remaining(&self) -> Option<u32> {
        self.reset_remaining
    }
}

impl TurnTick for InteractiveObject {
    fn process_turn_tick(&mut self) -> bool {
        if self.state == ObjectState::Destroyed {
            return false;
        }
        self.cooldown = self.cooldown.saturating_sub(1);
        if self.state != ObjectState::Active {
            return false;
        }
        let Some(remaining) = self.reset_remaining.as_mut() else {
            return false;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return false;
        }
        self.reset_remaining = None;
        self.state = ObjectState::Inactive;
        debug!(object = %self.object_id, "object reset");
        true
    }
}
