//! Resolution mechanics for Delve.
//!
//! Provides the dice engine, the skill check resolver, chained checks with
//! bounded per-step retries, the fumble consequence ledger, and
//! initiative-ordered turn sequencing. Everything here is deterministic
//! given a [`RandomSource`].

pub mod chain;
pub mod check;
pub mod combat;
pub mod dice;
pub mod error;
pub mod fumble;

pub use chain::{ChainStatus, ChainedCheckState, ChainedCheckStep, StepAttempt};
pub use check::{
    CheckConfig, CheckOutcome, CheckRequest, Difficulty, DifficultyClass, DifficultyTier,
    SkillCheckResolver, SkillCheckResult, SkillRef,
};
pub use combat::{Combatant, CombatantKind, TurnOrder};
pub use dice::{DicePool, DiceRollResult, Die, RandomSource, ScriptedFaces};
pub use error::{MechError, MechResult};
pub use fumble::{FumbleConsequence, FumbleLedger, FumbleSpec, FumbleType};
