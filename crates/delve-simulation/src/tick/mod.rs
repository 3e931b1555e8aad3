//! Entities advanced exactly once per round at the round boundary.
//!
//! Every entity here follows one contract: [`TurnTick::process_turn_tick`]
//! is the only operation that counts durations, fuel and cooldowns down.
//! Permanent entities never transition. Finite ones lose exactly one unit
//! per tick, and the tick that reaches zero performs the entity's terminal
//! transition and reports `true`. Ticking an entity already in its terminal
//! state does nothing.

mod hazard;
mod interactive;
mod light;
mod puzzle;
mod status;

pub use hazard::{HazardKind, HazardZone};
pub use interactive::{ActivationOutcome, InteractiveObject, ObjectKind, ObjectState};
pub use light::{LightKind, LightSource};
pub use puzzle::{Puzzle, PuzzleKind, PuzzleOutcome, PuzzleState};
pub use status::{
    ActiveStatusEffect, ApplyOutcome, StackingRule, StatusCategory, StatusEffectDefinition,
    StatusEffects, StatusTick,
};

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Per-round advancement shared by every tick-driven entity.
pub trait TurnTick {
    /// Advance one round. Returns `true` when this tick caused the
    /// entity's transition (expired, reset, went dark).
    fn process_turn_tick(&mut self) -> bool;
}

/// How long something lasts, counted in rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TurnDuration {
    /// Never runs out.
    Permanent,
    /// Runs out after this many more rounds.
    Turns(u32),
}

impl TurnDuration {
    /// Convert from the raw content encoding where −1 means permanent.
    pub fn from_raw(raw: i32) -> SimResult<Self> {
        match raw {
            -1 => Ok(Self::Permanent),
            n if n >= 0 => Ok(Self::Turns(n.unsigned_abs())),
            n => Err(SimError::InvalidArgument(format!(
                "duration must be -1 (permanent) or non-negative, got {n}"
            ))),
        }
    }

    /// Whether this never runs out.
    pub fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// Rounds left, `None` when permanent.
    pub fn remaining(self) -> Option<u32> {
        match self {
            Self::Permanent => None,
            Self::Turns(n) => Some(n),
        }
    }

    /// Whether a finite duration has reached zero.
    pub fn is_elapsed(self) -> bool {
        self == Self::Turns(0)
    }

    /// Count one round off. Returns `true` on the tick that reaches zero.
    pub(crate) fn count_down(&mut self) -> bool {
        match self {
            Self::Turns(n) if *n > 0 => {
                *n -= 1;
                *n == 0
            }
            _ => false,
        }
    }
}

impl TryFrom<i32> for TurnDuration {
    type Error = SimError;

    fn try_from(raw: i32) -> SimResult<Self> {
        Self::from_raw(raw)
    }
}

impl From<TurnDuration> for i32 {
    fn from(duration: TurnDuration) -> Self {
        match duration {
            TurnDuration::Permanent => -1,
            TurnDuration::Turns(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }
}

impl std::fmt::Display for TurnDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Turns(1) => write!(f, "1 turn"),
            Self::Turns(n) => write!(f, "{n} turns"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_encoding() {
        assert_eq!(TurnDuration::from_raw(-1).unwrap(), TurnDuration::Permanent);
        assert_eq!(TurnDuration::from_raw(3).unwrap(), TurnDuration::Turns(3));
        assert!(TurnDuration::from_raw(-2).is_err());
        assert_eq!(i32::from(TurnDuration::Permanent), -1);
    }

    #[test]
    fn count_down_reports_reaching_zero_once() {
        let mut d = TurnDuration::Turns(2);
        assert!(!d.count_down());
        assert!(d.count_down());
        assert!(d.is_elapsed());
        assert!(!d.count_down());
        assert_eq!(d, TurnDuration::Turns(0));

        let mut p = TurnDuration::Permanent;
        assert!(!p.count_down());
        assert_eq!(p.remaining(), None);
    }

    #[test]
    fn deserializes_from_integers() {
        let d: TurnDuration = serde_json::from_str("-1").unwrap();
        assert!(d.is_permanent());
        let d: TurnDuration = serde_json::from_str("4").unwrap();
        assert_eq!(d.remaining(), Some(4));
        assert!(serde_json::from_str::<TurnDuration>("-5").is_err());
    }
}
