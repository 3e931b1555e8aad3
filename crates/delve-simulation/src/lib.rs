//! Turn-based encounter simulation for Delve.
//!
//! Owns the spatial side of combat (the [`grid::CombatGrid`]), every entity
//! that changes on the per-round tick (hazards, interactive objects, puzzles,
//! light sources, status effects), and the [`Encounter`] loop that drives
//! actions in initiative order and runs the round boundary pass.

/// Round counter mapped onto in-world time.
pub mod clock;
/// Configuration types for encounter runs.
pub mod config;
/// The encounter turn loop.
pub mod encounter;
/// Error types for the simulation crate.
pub mod error;
/// Encounter event types and the event log.
pub mod event;
/// Combat grid: cover, placement, facing, movement and sight.
pub mod grid;
/// Plain-data scenario definitions.
pub mod scenario;
/// Entities advanced once per round.
pub mod tick;

/// Re-export of [`clock::RoundClock`].
pub use clock::RoundClock;
/// Re-export of [`config::EncounterConfig`].
pub use config::EncounterConfig;
/// Re-exports of the encounter loop types.
pub use encounter::{ActionOutcome, CombatAction, Encounter, RoundSummary};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::EncounterEvent`], and [`event::EventKind`].
pub use event::{EncounterEvent, EventKind, EventLog};
/// Re-exports of the grid types.
pub use grid::{
    CombatGrid, CoverDefinition, CoverObject, CoverType, Facing, GridPosition, MoveOutcome,
};
/// Re-exports of scenario definitions.
pub use scenario::{
    CombatantDef, CoverDef, EffectDef, HazardDef, LightDef, ObjectDef, PuzzleDef, Scenario,
};
/// Re-exports of the tick-driven entities.
pub use tick::{
    ActivationOutcome, ActiveStatusEffect, ApplyOutcome, HazardKind, HazardZone,
    InteractiveObject, LightKind, LightSource, ObjectKind, ObjectState, Puzzle, PuzzleKind,
    PuzzleOutcome, PuzzleState, StackingRule, StatusCategory, StatusEffectDefinition,
    StatusEffects, StatusTick, TurnDuration, TurnTick,
};
