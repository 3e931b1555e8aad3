//! Cover placed on the grid: static walls, pillars, and destructible barricades.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GridPosition;
use crate::error::{SimError, SimResult};

/// Broad category of cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverType {
    /// Waist-high wall.
    Low,
    /// Full-height wall.
    High,
    /// Stone pillar.
    Pillar,
    /// Crates, barrels and similar clutter.
    Crate,
    /// Improvised barricade.
    Barricade,
}

impl std::fmt::Display for CoverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low wall"),
            Self::High => write!(f, "high wall"),
            Self::Pillar => write!(f, "pillar"),
            Self::Crate => write!(f, "crate"),
            Self::Barricade => write!(f, "barricade"),
        }
    }
}

/// Static description of a kind of cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverDefinition {
    /// Category.
    pub cover_type: CoverType,
    /// Added to the difficulty of attacks through this cover.
    pub defense_bonus: i32,
    /// Whether the cover blocks line of sight.
    #[serde(default)]
    pub blocks_line_of_sight: bool,
    /// Whether the cover can be destroyed.
    #[serde(default)]
    pub destructible: bool,
    /// Hit points of destructible cover.
    #[serde(default)]
    pub max_hit_points: i32,
}

impl CoverDefinition {
    /// Indestructible cover that does not block sight.
    pub fn new(cover_type: CoverType, defense_bonus: i32) -> Self {
        Self {
            cover_type,
            defense_bonus,
            blocks_line_of_sight: false,
            destructible: false,
            max_hit_points: 0,
        }
    }

    /// Make the cover block line of sight.
    pub fn blocking_sight(mut self) -> Self {
        self.blocks_line_of_sight = true;
        self
    }

    /// Make the cover destructible with the given hit points.
    pub fn destructible(mut self, max_hit_points: i32) -> Self {
        self.destructible = true;
        self.max_hit_points = max_hit_points;
        self
    }
}

/// A piece of cover standing on one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverObject {
    definition: CoverDefinition,
    position: GridPosition,
    current_hit_points: i32,
    destroyed: bool,
}

impl CoverObject {
    /// Place cover from a definition. Destructible cover needs positive hit points.
    pub fn new(definition: CoverDefinition, position: GridPosition) -> SimResult<Self> {
        if definition.defense_bonus < 0 {
            return Err(SimError::InvalidArgument(format!(
                "cover defense bonus must not be negative, got {}",
                definition.defense_bonus
            )));
        }
        if definition.destructible && definition.max_hit_points <= 0 {
            return Err(SimError::InvalidArgument(format!(
                "destructible cover needs positive hit points, got {}",
                definition.max_hit_points
            )));
        }
        let current_hit_points = definition.max_hit_points.max(0);
        Ok(Self {
            definition,
            position,
            current_hit_points,
            destroyed: false,
        })
    }

    /// Apply damage. Returns `true` only on the call that destroys the cover.
    ///
    /// Indestructible or already destroyed cover ignores damage.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.definition.destructible || self.destroyed {
            return false;
        }
        self.current_hit_points = (self.current_hit_points - amount.max(0)).max(0);
        if self.current_hit_points == 0 {
            self.destroyed = true;
            debug!(position = %self.position, cover = %self.definition.cover_type, "cover destroyed");
            return true;
        }
        false
    }

    /// The static definition.
    pub fn definition(&self) -> &CoverDefinition {
        &self.definition
    }

    /// Cell the cover stands on.
    pub fn position(&self) -> GridPosition {
        self.position
    }

    /// Remaining hit points.
    pub fn current_hit_points(&self) -> i32 {
        self.current_hit_points
    }

    /// Whether the cover has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Defense bonus while intact, zero once destroyed.
    pub fn defense_bonus(&self) -> i32 {
        if self.destroyed {
            0
        } else {
            self.definition.defense_bonus
        }
    }

    /// Whether the cover currently blocks sight.
    pub fn blocks_sight(&self) -> bool {
        !self.destroyed && self.definition.blocks_line_of_sight
    }

    /// Whether the cover currently blocks movement into its cell.
    pub fn blocks_movement(&self) -> bool {
        !self.destroyed
    }
}
