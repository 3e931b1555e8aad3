//! Plain-data scenario documents.
//!
//! A scenario lists combatants, cover and tick-driven entities as JSON.
//! Every definition goes through the same validating constructors as code
//! does, so a malformed document fails at [`Scenario::build`].

use std::collections::{BTreeMap, HashMap};

use delve_core::{CatalogId, EntityId, Monster, Player, Side};
use delve_mechanics::Combatant;
use serde::Deserialize;

use crate::config::EncounterConfig;
use crate::encounter::Encounter;
use crate::error::{SimError, SimResult};
use crate::grid::{CoverDefinition, CoverObject, GridPosition};
use crate::tick::{
    HazardKind, HazardZone, InteractiveObject, LightKind, LightSource, ObjectKind, Puzzle,
    PuzzleKind, StatusEffectDefinition, TurnDuration,
};

fn default_max_rounds() -> u32 {
    20
}

fn unlimited() -> i32 {
    -1
}

/// A complete encounter description.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Title shown by front ends.
    #[serde(default)]
    pub name: String,
    /// Encounter settings.
    #[serde(default)]
    pub config: EncounterConfig,
    /// Round cap when the encounter is played out automatically.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Who fights.
    pub combatants: Vec<CombatantDef>,
    /// Cover on the grid.
    #[serde(default)]
    pub cover: Vec<CoverDef>,
    /// Hazard zones.
    #[serde(default)]
    pub hazards: Vec<HazardDef>,
    /// Buttons, levers, plates and doors.
    #[serde(default)]
    pub objects: Vec<ObjectDef>,
    /// Puzzles.
    #[serde(default)]
    pub puzzles: Vec<PuzzleDef>,
    /// Light sources.
    #[serde(default)]
    pub lights: Vec<LightDef>,
    /// Status effects already on combatants when the fight begins.
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// One combatant. Unset stats keep the player or monster defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CombatantDef {
    /// Display name, unique within the scenario.
    pub name: String,
    /// Players or monsters.
    pub side: Side,
    /// Catalog type for monsters; defaults to the name.
    #[serde(default)]
    pub monster_kind: Option<CatalogId>,
    /// Maximum hit points.
    pub max_health: i32,
    /// Starting cell.
    pub position: GridPosition,
    /// Defense override.
    #[serde(default)]
    pub defense: Option<i32>,
    /// Attack pool override.
    #[serde(default)]
    pub attack_dice: Option<u32>,
    /// Damage override.
    #[serde(default)]
    pub damage: Option<i32>,
    /// Speed override.
    #[serde(default)]
    pub speed: Option<u32>,
    /// Initiative modifier.
    #[serde(default)]
    pub initiative_modifier: i32,
    /// Skill ranks (players) keyed by skill id.
    #[serde(default)]
    pub skills: BTreeMap<CatalogId, i32>,
    /// Flat bonus on every check (monsters).
    #[serde(default)]
    pub attack_bonus: i32,
}

impl CombatantDef {
    /// Build the combatant.
    pub fn build(&self) -> SimResult<Combatant> {
        match self.side {
            Side::Players => {
                let mut player = Player::new(&self.name, self.max_health)?
                    .with_initiative_modifier(self.initiative_modifier);
                player.skills = self.skills.clone();
                if let Some(defense) = self.defense {
                    player.defense = defense;
                }
                if let Some(dice) = self.attack_dice {
                    player.attack_dice = dice;
                }
                if let Some(damage) = self.damage {
                    player.damage = damage;
                }
                if let Some(speed) = self.speed {
                    player.speed = speed;
                }
                Ok(Combatant::player(player))
            }
            Side::Monsters => {
                let kind = match &self.monster_kind {
                    Some(kind) => kind.clone(),
                    None => CatalogId::new(&self.name)?,
                };
                let mut monster = Monster::new(&self.name, kind, self.max_health)?
                    .with_initiative_modifier(self.initiative_modifier)
                    .with_attack_bonus(self.attack_bonus);
                if let Some(defense) = self.defense {
                    monster.defense = defense;
                }
                if let Some(dice) = self.attack_dice {
                    monster.attack_dice = dice;
                }
                if let Some(damage) = self.damage {
                    monster.damage = damage;
                }
                if let Some(speed) = self.speed {
                    monster.speed = speed;
                }
                Ok(Combatant::monster(monster))
            }
        }
    }
}

/// Cover standing on one cell.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverDef {
    /// Cell.
    pub position: GridPosition,
    /// What kind of cover.
    #[serde(flatten)]
    pub definition: CoverDefinition,
}

/// A hazard zone.
#[derive(Debug, Clone, Deserialize)]
pub struct HazardDef {
    /// Catalog id.
    pub id: CatalogId,
    /// Kind.
    pub kind: HazardKind,
    /// Covered cells.
    pub cells: Vec<GridPosition>,
    /// Damage per round.
    pub damage_per_turn: i32,
    /// Rounds it lasts; `-1` is permanent.
    pub duration: TurnDuration,
}

/// An interactive object.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDef {
    /// Catalog id.
    pub id: CatalogId,
    /// Kind.
    pub kind: ObjectKind,
    /// Rounds it stays active; `-1` never resets.
    pub reset_after: TurnDuration,
    /// Rounds before it can be used again.
    #[serde(default)]
    pub cooldown: u32,
    /// Whether it starts locked.
    #[serde(default)]
    pub locked: bool,
}

/// A puzzle.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleDef {
    /// Catalog id.
    pub id: CatalogId,
    /// Riddle or sequence, with its solution.
    #[serde(flatten)]
    pub kind: PuzzleKind,
    /// Attempts before failure; `-1` is unlimited.
    #[serde(default = "unlimited")]
    pub max_attempts: i32,
    /// Rounds until a failed puzzle reopens; absent means never.
    #[serde(default)]
    pub reset_delay: Option<u32>,
}

/// A light source.
#[derive(Debug, Clone, Deserialize)]
pub struct LightDef {
    /// Catalog id.
    pub id: CatalogId,
    /// Kind.
    pub kind: LightKind,
    /// Cell.
    pub position: GridPosition,
    /// Reach in cells.
    pub radius: i32,
    /// Rounds of fuel; absent never burns down.
    #[serde(default)]
    pub fuel: Option<u32>,
}

/// A status effect on a named combatant.
#[derive(Debug, Clone, Deserialize)]
pub struct EffectDef {
    /// Name of the combatant.
    pub target: String,
    /// The effect.
    pub effect: StatusEffectDefinition,
}

impl Scenario {
    /// Parse a scenario document.
    pub fn from_json(source: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Build a ready-to-start encounter.
    pub fn build(&self) -> SimResult<Encounter> {
        let mut encounter = Encounter::new(self.config.clone())?;

        let mut names: HashMap<&str, EntityId> = HashMap::new();
        for def in &self.combatants {
            let id = encounter.add_combatant(def.build()?, def.position)?;
            if names.insert(def.name.as_str(), id).is_some() {
                return Err(SimError::InvalidArgument(format!(
                    "combatant name '{}' is used twice",
                    def.name
                )));
            }
        }

        for def in &self.cover {
            let cover = CoverObject::new(def.definition.clone(), def.position)?;
            if !encounter.grid_mut().add_cover(cover) {
                return Err(SimError::InvalidArgument(format!(
                    "cover at {} is outside the grid or overlaps other cover",
                    def.position
                )));
            }
        }

        for def in &self.hazards {
            encounter.add_hazard(HazardZone::new(
                def.id.clone(),
                def.kind,
                def.cells.iter().copied(),
                def.damage_per_turn,
                def.duration,
            )?)?;
        }

        for def in &self.objects {
            let object =
                InteractiveObject::new(def.id.clone(), def.kind, def.reset_after, def.cooldown)?;
            encounter.add_object(if def.locked { object.locked() } else { object })?;
        }

        for def in &self.puzzles {
            let mut puzzle =
                Puzzle::new(def.id.clone(), def.kind.clone())?.with_max_attempts(def.max_attempts)?;
            if let Some(delay) = def.reset_delay {
                puzzle = puzzle.resettable(delay)?;
            }
            encounter.add_puzzle(puzzle)?;
        }

        for def in &self.lights {
            encounter.add_light(LightSource::new(
                def.id.clone(),
                def.kind,
                def.position,
                def.radius,
                def.fuel,
            )?)?;
        }

        for def in &self.effects {
            let target = names.get(def.target.as_str()).copied().ok_or_else(|| {
                SimError::InvalidArgument(format!("no combatant named '{}'", def.target))
            })?;
            encounter.apply_status(target, def.effect.clone())?;
        }

        Ok(encounter)
    }
}
