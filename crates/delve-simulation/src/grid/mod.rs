//! The combat grid: a bounded rectangle of cells holding cover and combatants.
//!
//! Cover is keyed by cell with at most one object per cell. Combatant
//! placement and facing are tracked per entity id, independently of cover.
//! Removing a combatant is terminal: a removed id can never be placed again.

mod cover;
mod facing;
mod sight;

pub use cover::{CoverDefinition, CoverObject, CoverType};
pub use facing::Facing;
pub use sight::line_between;

use std::collections::{HashMap, HashSet};

use delve_core::EntityId;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{SimError, SimResult};

/// A cell coordinate. `y` grows southward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridPosition {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPosition {
    /// Create a position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Moves needed to reach `other` when diagonal steps cost the same as straight ones.
    pub fn chebyshev_distance(self, other: GridPosition) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Squared straight-line distance.
    pub fn distance_squared(self, other: GridPosition) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// The neighbouring cell in a direction.
    pub fn step(self, facing: Facing) -> GridPosition {
        let (dx, dy) = facing.delta();
        GridPosition::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Result of a movement request. Every variant except `Moved` leaves the grid unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The entity moved, spending `cost` movement points.
    Moved {
        /// Movement points spent.
        cost: u32,
    },
    /// The destination lies outside the grid.
    OutOfBounds,
    /// Another entity stands on the destination.
    Occupied,
    /// Intact cover stands on the destination.
    Blocked,
    /// The destination is further away than the movement points allow.
    InsufficientMovement,
    /// The entity is not on the grid.
    NotOnGrid,
}

/// Bounded rectangle of cells with cover and tracked entities.
#[derive(Debug, Clone)]
pub struct CombatGrid {
    width: i32,
    height: i32,
    cover: HashMap<GridPosition, CoverObject>,
    positions: HashMap<EntityId, GridPosition>,
    facings: HashMap<EntityId, Facing>,
    removed: HashSet<EntityId>,
}

impl CombatGrid {
    /// Create an empty grid. Both dimensions must be positive.
    pub fn new(width: i32, height: i32) -> SimResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SimError::InvalidArgument(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cover: HashMap::new(),
            positions: HashMap::new(),
            facings: HashMap::new(),
            removed: HashSet::new(),
        })
    }

    /// Grid width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether a position lies within `[0, width) x [0, height)`.
    pub fn in_bounds(&self, position: GridPosition) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    // --- cover ---

    /// Store cover at its position. Fails (returns `false`) out of bounds
    /// or when the cell already holds cover.
    pub fn add_cover(&mut self, cover: CoverObject) -> bool {
        let position = cover.position();
        if !self.in_bounds(position) || self.cover.contains_key(&position) {
            return false;
        }
        self.cover.insert(position, cover);
        true
    }

    /// Remove and return the cover at a position.
    pub fn remove_cover(&mut self, position: GridPosition) -> Option<CoverObject> {
        self.cover.remove(&position)
    }

    /// Cover at a position, destroyed or not.
    pub fn cover_at(&self, position: GridPosition) -> Option<&CoverObject> {
        self.cover.get(&position)
    }

    /// Whether a position holds cover.
    pub fn has_cover(&self, position: GridPosition) -> bool {
        self.cover.contains_key(&position)
    }

    /// Remove every cover object.
    pub fn clear_cover(&mut self) {
        self.cover.clear();
    }

    /// All cover on the grid.
    pub fn cover(&self) -> impl Iterator<Item = &CoverObject> {
        self.cover.values()
    }

    /// Damage the cover at a position. Returns `true` if this destroyed it.
    pub fn damage_cover(&mut self, position: GridPosition, amount: i32) -> bool {
        self.cover
            .get_mut(&position)
            .is_some_and(|cover| cover.take_damage(amount))
    }

    // --- entities ---

    /// Place (or teleport) an entity. Fails out of bounds, on a cell held by
    /// another entity, or for an entity that was removed.
    pub fn place_entity(&mut self, id: EntityId, position: GridPosition) -> bool {
        if self.removed.contains(&id) || !self.in_bounds(position) {
            return false;
        }
        if self.entity_at(position).is_some_and(|other| other != id) {
            return false;
        }
        self.positions.insert(id, position);
        self.facings.entry(id).or_insert(Facing::North);
        trace!(entity = %id, %position, "entity placed");
        true
    }

    /// Take an entity off the grid for good. Returns its last position.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<GridPosition> {
        self.facings.remove(&id);
        let position = self.positions.remove(&id)?;
        self.removed.insert(id);
        debug!(entity = %id, %position, "entity removed from grid");
        Some(position)
    }

    /// Where an entity stands.
    pub fn entity_position(&self, id: EntityId) -> Option<GridPosition> {
        self.positions.get(&id).copied()
    }

    /// The entity standing on a cell.
    pub fn entity_at(&self, position: GridPosition) -> Option<EntityId> {
        self.positions
            .iter()
            .find_map(|(id, p)| (*p == position).then_some(*id))
    }

    /// Number of entities on the grid.
    pub fn entity_count(&self) -> usize {
        self.positions.len()
    }

    /// Set an entity's facing. Returns `false` if the entity is not on the grid.
    pub fn set_entity_facing(&mut self, id: EntityId, facing: Facing) -> bool {
        if !self.positions.contains_key(&id) {
            return false;
        }
        self.facings.insert(id, facing);
        true
    }

    /// An entity's facing.
    pub fn entity_facing(&self, id: EntityId) -> Option<Facing> {
        self.facings.get(&id).copied()
    }

    /// Turn an entity toward a cell. No-op when the entity is untracked,
    /// the target is off the grid, or the entity already stands on it.
    /// Returns the new facing when it changed.
    pub fn face_toward(&mut self, id: EntityId, target: GridPosition) -> Option<Facing> {
        if !self.in_bounds(target) {
            return None;
        }
        let from = self.entity_position(id)?;
        let facing = Facing::from_delta(target.x - from.x, target.y - from.y)?;
        self.facings.insert(id, facing);
        Some(facing)
    }

    /// Whether an entity could stand on a cell: in bounds, free of intact
    /// cover, and not held by another entity.
    pub fn is_passable(&self, position: GridPosition) -> bool {
        self.in_bounds(position)
            && self.entity_at(position).is_none()
            && !self
                .cover_at(position)
                .is_some_and(CoverObject::blocks_movement)
    }

    /// Move an entity, spending Chebyshev distance in movement points.
    pub fn move_entity(
        &mut self,
        id: EntityId,
        to: GridPosition,
        movement_points: u32,
    ) -> MoveOutcome {
        let Some(from) = self.entity_position(id) else {
            return MoveOutcome::NotOnGrid;
        };
        if !self.in_bounds(to) {
            return MoveOutcome::OutOfBounds;
        }
        if self.entity_at(to).is_some_and(|other| other != id) {
            return MoveOutcome::Occupied;
        }
        if self.cover_at(to).is_some_and(CoverObject::blocks_movement) {
            return MoveOutcome::Blocked;
        }
        let cost = from.chebyshev_distance(to);
        if cost > movement_points {
            return MoveOutcome::InsufficientMovement;
        }
        self.positions.insert(id, to);
        self.face_toward_from(id, from, to);
        trace!(entity = %id, %from, %to, cost, "entity moved");
        MoveOutcome::Moved { cost }
    }

    fn face_toward_from(&mut self, id: EntityId, from: GridPosition, to: GridPosition) {
        if let Some(facing) = Facing::from_delta(to.x - from.x, to.y - from.y) {
            self.facings.insert(id, facing);
        }
    }
}
