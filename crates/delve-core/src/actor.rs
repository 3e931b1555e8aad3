//! Read-mostly stat snapshots for the two kinds of combatant.
//!
//! Players and monsters have disjoint models; combat only needs the
//! uniform surface described by [`Actor`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::id::{CatalogId, EntityId};
use crate::track::Track;

/// Which side of an encounter an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Player characters.
    Players,
    /// Monsters and other hostiles.
    Monsters,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Players => write!(f, "players"),
            Self::Monsters => write!(f, "monsters"),
        }
    }
}

/// The capability surface combat needs from anything that takes turns.
pub trait Actor {
    /// Stable identity used for grid placement and consequence lookups.
    fn id(&self) -> EntityId;

    /// Name shown by the presentation layer.
    fn display_name(&self) -> &str;

    /// Current hit points.
    fn current_health(&self) -> i32;

    /// An actor is active while it has hit points left.
    fn is_active(&self) -> bool {
        self.current_health() > 0
    }

    /// Apply damage. Returns the hit points actually lost.
    fn take_damage(&mut self, amount: i32) -> i32;

    /// Apply healing. Returns the hit points actually restored.
    fn heal(&mut self, amount: i32) -> i32;

    /// Which side the actor fights for.
    fn side(&self) -> Side;

    /// Difficulty added to attack checks made against this actor.
    fn defense(&self) -> i32;

    /// Dice in this actor's attack pool.
    fn attack_dice(&self) -> u32;

    /// Damage dealt by a successful attack before margin is added.
    fn base_damage(&self) -> i32;

    /// Movement points available each round.
    fn speed(&self) -> u32;

    /// Flat modifier added to the initiative roll.
    fn initiative_modifier(&self) -> i32;

    /// Bonus this actor brings to a check with the given skill.
    fn check_bonus(&self, skill: &CatalogId) -> i32;
}

/// A player character snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Identity on the grid.
    #[serde(default)]
    pub id: EntityId,
    /// Character name.
    pub name: String,
    /// Hit points.
    pub health: Track,
    /// Attribute scores keyed by attribute id.
    #[serde(default)]
    pub attributes: BTreeMap<CatalogId, i32>,
    /// Skill ranks keyed by skill id.
    #[serde(default)]
    pub skills: BTreeMap<CatalogId, i32>,
    /// Defense added to incoming attack difficulty.
    #[serde(default)]
    pub defense: i32,
    /// Attack pool size.
    pub attack_dice: u32,
    /// Base weapon damage.
    pub damage: i32,
    /// Movement points per round.
    pub speed: u32,
    /// Initiative modifier.
    #[serde(default)]
    pub initiative_modifier: i32,
}

impl Player {
    /// Create a player with full health and modest default combat stats.
    pub fn new(name: impl Into<String>, max_health: i32) -> CoreResult<Self> {
        Ok(Self {
            id: EntityId::new(),
            name: name.into(),
            health: Track::new("HP", max_health)?,
            attributes: BTreeMap::new(),
            skills: BTreeMap::new(),
            defense: 1,
            attack_dice: 5,
            damage: 2,
            speed: 6,
            initiative_modifier: 0,
        })
    }

    /// Set a skill rank.
    pub fn with_skill(mut self, skill: CatalogId, rank: i32) -> Self {
        self.skills.insert(skill, rank);
        self
    }

    /// Set an attribute score.
    pub fn with_attribute(mut self, attribute: CatalogId, score: i32) -> Self {
        self.attributes.insert(attribute, score);
        self
    }

    /// Set the initiative modifier.
    pub fn with_initiative_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }

    /// Set defense.
    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    /// Attribute score, 0 when the attribute is not recorded.
    pub fn attribute(&self, attribute: &CatalogId) -> i32 {
        self.attributes.get(attribute).copied().unwrap_or(0)
    }
}

impl Actor for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn current_health(&self) -> i32 {
        self.health.current()
    }

    fn take_damage(&mut self, amount: i32) -> i32 {
        self.health.drain(amount)
    }

    fn heal(&mut self, amount: i32) -> i32 {
        self.health.restore(amount)
    }

    fn side(&self) -> Side {
        Side::Players
    }

    fn defense(&self) -> i32 {
        self.defense
    }

    fn attack_dice(&self) -> u32 {
        self.attack_dice
    }

    fn base_damage(&self) -> i32 {
        self.damage
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn initiative_modifier(&self) -> i32 {
        self.initiative_modifier
    }

    fn check_bonus(&self, skill: &CatalogId) -> i32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }
}

/// A monster snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    /// Identity on the grid.
    #[serde(default)]
    pub id: EntityId,
    /// Display name, e.g. "Cave Troll".
    pub name: String,
    /// Catalog type of the monster.
    pub kind: CatalogId,
    /// Hit points.
    pub health: Track,
    /// Defense added to incoming attack difficulty.
    #[serde(default)]
    pub defense: i32,
    /// Attack pool size.
    pub attack_dice: u32,
    /// Flat bonus on every check.
    #[serde(default)]
    pub attack_bonus: i32,
    /// Base damage.
    pub damage: i32,
    /// Movement points per round.
    pub speed: u32,
    /// Initiative modifier.
    #[serde(default)]
    pub initiative_modifier: i32,
}

impl Monster {
    /// Create a monster with full health and default combat stats.
    pub fn new(name: impl Into<String>, kind: CatalogId, max_health: i32) -> CoreResult<Self> {
        Ok(Self {
            id: EntityId::new(),
            name: name.into(),
            kind,
            health: Track::new("HP", max_health)?,
            defense: 0,
            attack_dice: 4,
            attack_bonus: 0,
            damage: 2,
            speed: 4,
            initiative_modifier: 0,
        })
    }

    /// Set the initiative modifier.
    pub fn with_initiative_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }

    /// Set the flat attack bonus.
    pub fn with_attack_bonus(mut self, bonus: i32) -> Self {
        self.attack_bonus = bonus;
        self
    }
}

impl Actor for Monster {
    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn current_health(&self) -> i32 {
        self.health.current()
    }

    fn take_damage(&mut self, amount: i32) -> i32 {
        self.health.drain(amount)
    }

    fn heal(&mut self, amount: i32) -> i32 {
        self.health.restore(amount)
    }

    fn side(&self) -> Side {
        Side::Monsters
    }

    fn defense(&self) -> i32 {
        self.defense
    }

    fn attack_dice(&self) -> u32 {
        self.attack_dice
    }

    fn base_damage(&self) -> i32 {
        self.damage
    }

    fn speed(&self) -> u32 {
        self.speed
    }

    fn initiative_modifier(&self) -> i32 {
        self.initiative_modifier
    }

    fn check_bonus(&self, _skill: &CatalogId) -> i32 {
        self.attack_bonus
    }
}
