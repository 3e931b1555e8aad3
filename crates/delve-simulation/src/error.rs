use delve_core::{CoreError, EntityId};
use delve_mechanics::MechError;

/// Result alias for the simulation crate.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by grid, tick-entity, and encounter operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A value was malformed at construction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not permitted in the current state.
    #[error("operation not permitted: {0}")]
    InvalidOperation(String),

    /// No combatant with this id takes part in the encounter.
    #[error("entity not found in encounter: {0}")]
    EntityNotFound(EntityId),

    /// Every combatant has already acted this round.
    #[error("no combatant left to act this round")]
    NoActiveCombatant,

    /// Propagated from the mechanics crate.
    #[error(transparent)]
    Mechanics(#[from] MechError),

    /// Propagated from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A scenario document failed to parse.
    #[error("invalid scenario: {0}")]
    Scenario(#[from] serde_json::Error),
}
