use delve_core::CatalogId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TurnTick;
use crate::error::{SimError, SimResult};
use crate::grid::GridPosition;

/// Kind of light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    /// Handheld torch.
    Torch,
    /// Oil lantern.
    Lantern,
    /// Candle.
    Candle,
    /// Magical glow.
    Magical,
}

/// A light that may burn fuel each round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightSource {
    light_id: CatalogId,
    kind: LightKind,
    position: GridPosition,
    radius: i32,
    fuel: Option<u32>,
    lit: bool,
}

impl LightSource {
    /// Create a light. `fuel` of `None` never burns down. Starts lit
    /// unless it has no fuel.
    pub fn new(
        light_id: CatalogId,
        kind: LightKind,
        position: GridPosition,
        radius: i32,
        fuel: Option<u32>,
    ) -> SimResult<Self> {
        if radius < 0 {
            return Err(SimError::InvalidArgument(format!(
                "light '{light_id}' has negative radius {radius}"
            )));
        }
        Ok(Self {
            light_id,
            kind,
            position,
            radius,
            lit: fuel != Some(0),
            fuel,
        })
    }

    /// Light it. Fails when out of fuel.
    pub fn light(&mut self) -> bool {
        if self.fuel == Some(0) {
            return false;
        }
        self.lit = true;
        true
    }

    /// Put it out.
    pub fn extinguish(&mut self) {
        self.lit = false;
    }

    /// Add fuel. No effect on lights that do not burn fuel.
    pub fn refuel(&mut self, amount: u32) {
        if let Some(fuel) = self.fuel.as_mut() {
            *fuel = fuel.saturating_add(amount);
        }
    }

    /// Whether the light reaches a cell.
    pub fn illuminates(&self, position: GridPosition) -> bool {
        let radius = i64::from(self.radius);
        self.lit && self.position.distance_squared(position) <= radius * radius
    }

    /// Catalog id.
    pub fn light_id(&self) -> &CatalogId {
        &self.light_id
    }

    /// Kind of light.
    pub fn kind(&self) -> LightKind {
        self.kind
    }

    /// Where the light stands.
    pub fn position(&self) -> GridPosition {
        self.position
    }

    /// Reach in cells.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Rounds of fuel left, `None` when it burns forever.
    pub fn fuel(&self) -> Option<u32> {
        self.fuel
    }

    /// Whether it is burning.
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl TurnTick for LightSource {
    fn process_turn_tick(&mut self) -> bool {
        if !self.lit {
            return false;
        }
        let Some(fuel) = self.fuel.as_mut() else {
            return false;
        };
        *fuel = fuel.saturating_sub(1);
        if *fuel > 0 {
            return false;
        }
        self.lit = false;
        debug!(light = %self.light_id, "light went dark");
        true
    }
}
