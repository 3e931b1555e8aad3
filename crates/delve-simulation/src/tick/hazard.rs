use std::collections::BTreeSet;

use delve_core::CatalogId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TurnDuration, TurnTick};
use crate::error::{SimError, SimResult};
use crate::grid::GridPosition;

/// What a hazard does to those standing in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// Burning ground.
    Fire,
    /// Poison cloud.
    Poison,
    /// Spike trap.
    Spikes,
    /// Acid pool.
    Acid,
    /// Freezing mist.
    Frost,
}

/// An area of cells that hurts anyone standing in it while active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HazardZone {
    hazard_id: CatalogId,
    kind: HazardKind,
    cells: BTreeSet<GridPosition>,
    damage_per_turn: i32,
    duration: TurnDuration,
    active: bool,
}

impl HazardZone {
    /// Create an active hazard. Needs at least one cell, non-negative
    /// damage, and a duration that is permanent or at least one round.
    pub fn new(
        hazard_id: CatalogId,
        kind: HazardKind,
        cells: impl IntoIterator<Item = GridPosition>,
        damage_per_turn: i32,
        duration: TurnDuration,
    ) -> SimResult<Self> {
        let cells: BTreeSet<_> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(SimError::InvalidArgument(format!(
                "hazard '{hazard_id}' covers no cells"
            )));
        }
        if damage_per_turn < 0 {
            return Err(SimError::InvalidArgument(format!(
                "hazard '{hazard_id}' has negative damage {damage_per_turn}"
            )));
        }
        if duration.is_elapsed() {
            return Err(SimError::InvalidArgument(format!(
                "hazard '{hazard_id}' must last at least one round"
            )));
        }
        Ok(Self {
            hazard_id,
            kind,
            cells,
            damage_per_turn,
            duration,
            active: true,
        })
    }

    /// Whether the hazard is active and covers the cell.
    pub fn affects(&self, position: GridPosition) -> bool {
        self.active && self.cells.contains(&position)
    }

    /// Switch the hazard off for good.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Catalog id.
    pub fn hazard_id(&self) -> &CatalogId {
        &self.hazard_id
    }

    /// Kind of hazard.
    pub fn kind(&self) -> HazardKind {
        self.kind
    }

    /// Covered cells.
    pub fn cells(&self) -> impl Iterator<Item = &GridPosition> {
        self.cells.iter()
    }

    /// Damage dealt each round to anyone inside.
    pub fn damage_per_turn(&self) -> i32 {
        self.damage_per_turn
    }

    /// Remaining duration.
    pub fn duration(&self) -> TurnDuration {
        self.duration
    }

    /// Whether the hazard is still active.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl TurnTick for HazardZone {
    fn process_turn_tick(&mut self) -> bool {
        if !self.active || !self.duration.count_down() {
            return false;
        }
        self.active = false;
        debug!(hazard = %self.hazard_id, "hazard expired");
        true
    }
}
