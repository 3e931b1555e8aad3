//! The encounter turn loop.
//!
//! Combatants act one at a time in initiative order. Once everyone has had
//! their turn the caller closes the round with [`Encounter::end_round`], the
//! single boundary pass where hazards and status effects deal damage and
//! then every tick-driven entity ages by one round.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use delve_core::{Actor, CatalogId, ConsequenceId, EntityId, Side};
use delve_mechanics::{
    CheckOutcome, CheckRequest, Combatant, DicePool, DiceRollResult, Die, Difficulty,
    DifficultyClass, FumbleLedger, FumbleSpec, FumbleType, SkillCheckResolver, SkillRef,
    TurnOrder,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::RoundClock;
use crate::config::EncounterConfig;
use crate::error::{SimError, SimResult};
use crate::event::{EncounterEvent, EventKind, EventLog};
use crate::grid::{CombatGrid, GridPosition, MoveOutcome, line_between};
use crate::tick::{
    ActivationOutcome, ApplyOutcome, HazardZone, InteractiveObject, LightSource, Puzzle,
    StatusEffectDefinition, StatusEffects, TurnTick,
};

/// Skill used by attacks the encounter plans itself.
pub const DEFAULT_ATTACK_SKILL: &str = "melee";

/// Stat ids that status-effect modifiers apply to.
#[derive(Debug, Clone)]
struct StatIds {
    attack: CatalogId,
    defense: CatalogId,
    speed: CatalogId,
}

impl StatIds {
    fn new() -> SimResult<Self> {
        Ok(Self {
            attack: CatalogId::new("attack")?,
            defense: CatalogId::new("defense")?,
            speed: CatalogId::new("speed")?,
        })
    }
}

/// Something a combatant does on its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CombatAction {
    /// Move to a cell within movement range.
    Move {
        /// Destination.
        to: GridPosition,
    },
    /// Attack another combatant with a skill check.
    Attack {
        /// Defender.
        target: EntityId,
        /// Skill the attack tests.
        skill: CatalogId,
    },
    /// Strike adjacent cover.
    StrikeCover {
        /// Cell holding the cover.
        position: GridPosition,
    },
    /// Use an interactive object.
    UseObject {
        /// The object.
        object: CatalogId,
    },
    /// Do nothing.
    Wait,
}

/// What an action achieved. Gameplay failures are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Result of a move.
    Moved {
        /// Grid response.
        movement: MoveOutcome,
    },
    /// The attack check was rolled.
    Attacked {
        /// Classification of the check.
        outcome: CheckOutcome,
        /// Hit points the defender lost.
        damage: i32,
        /// Whether the defender dropped.
        target_defeated: bool,
    },
    /// Cover blocks the attacker's view of the target.
    NoLineOfSight,
    /// A fumble consequence prevents this attack.
    Hindered,
    /// The target is already down.
    TargetDown,
    /// Cover was struck.
    CoverStruck {
        /// Whether this blow destroyed it.
        destroyed: bool,
    },
    /// No cover on that cell.
    NoCover,
    /// The cell is not adjacent.
    OutOfReach,
    /// Result of using an object.
    ObjectUsed {
        /// The object's response.
        result: ActivationOutcome,
    },
    /// The combatant waited.
    Waited,
}

/// Everything the round boundary pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    /// The round that ended.
    pub round: u32,
    /// Total hit points lost to hazards.
    pub hazard_damage: i32,
    /// Total hit points lost to status effects.
    pub status_damage: i32,
    /// Hazards that burned out.
    pub expired_hazards: Vec<CatalogId>,
    /// Status effects that ran out, with their bearer.
    pub expired_effects: Vec<(EntityId, CatalogId)>,
    /// Objects that returned to inactive.
    pub reset_objects: Vec<CatalogId>,
    /// Failed puzzles that reopened.
    pub reset_puzzles: Vec<CatalogId>,
    /// Lights that ran out of fuel.
    pub darkened_lights: Vec<CatalogId>,
    /// Fumble consequences that lapsed.
    pub expired_consequences: Vec<ConsequenceId>,
    /// Combatants removed from the grid.
    pub defeated: Vec<EntityId>,
}

/// One fight: combatants on a grid plus every tick-driven entity around them.
pub struct Encounter {
    config: EncounterConfig,
    rng: StdRng,
    clock: RoundClock,
    resolver: SkillCheckResolver,
    turns: TurnOrder,
    grid: CombatGrid,
    hazards: Vec<HazardZone>,
    objects: Vec<InteractiveObject>,
    puzzles: Vec<Puzzle>,
    lights: Vec<LightSource>,
    statuses: HashMap<EntityId, StatusEffects>,
    fumbles: FumbleLedger,
    attack_fumble: FumbleSpec,
    attack_skill: CatalogId,
    stats: StatIds,
    events: EventLog,
}

impl std::fmt::Debug for Encounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encounter")
            .field("round", &self.turns.round())
            .field("combatants", &self.turns.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Encounter {
    /// Create an empty encounter from a configuration.
    pub fn new(config: EncounterConfig) -> SimResult<Self> {
        let clock = RoundClock::new(config.start, config.round_seconds)?;
        let grid = CombatGrid::new(config.width, config.height)?;
        let attack_fumble = FumbleSpec::new(FumbleType::Injury, "Overextended on a wild swing")
            .lasting(clock.round_length() * 2);
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            resolver: SkillCheckResolver::new(config.check),
            events: EventLog::new(config.max_events),
            clock,
            grid,
            turns: TurnOrder::new(),
            hazards: Vec::new(),
            objects: Vec::new(),
            puzzles: Vec::new(),
            lights: Vec::new(),
            statuses: HashMap::new(),
            fumbles: FumbleLedger::new(),
            attack_fumble,
            attack_skill: CatalogId::new(DEFAULT_ATTACK_SKILL)?,
            stats: StatIds::new()?,
            config,
        })
    }

    /// Replace the consequence left by fumbled attacks.
    pub fn with_attack_fumble(mut self, spec: FumbleSpec) -> Self {
        self.attack_fumble = spec;
        self
    }

    /// Replace the skill used by planned attacks.
    pub fn with_attack_skill(mut self, skill: CatalogId) -> Self {
        self.attack_skill = skill;
        self
    }

    // --- setup ---

    /// Add a combatant standing on a cell. Only before the encounter starts.
    pub fn add_combatant(
        &mut self,
        combatant: Combatant,
        position: GridPosition,
    ) -> SimResult<EntityId> {
        if !self.turns.is_not_started() {
            return Err(SimError::InvalidOperation(
                "combatants must join before the encounter starts".to_string(),
            ));
        }
        let id = combatant.id();
        if self.turns.find(id).is_some() {
            return Err(SimError::InvalidArgument(format!(
                "combatant {id} already takes part"
            )));
        }
        if !self.grid.place_entity(id, position) {
            return Err(SimError::InvalidArgument(format!(
                "cannot place {} at {position}",
                combatant.display_name()
            )));
        }
        self.turns.add(combatant);
        Ok(id)
    }

    /// Add a hazard zone.
    pub fn add_hazard(&mut self, hazard: HazardZone) -> SimResult<()> {
        if self.hazards.iter().any(|h| h.hazard_id() == hazard.hazard_id()) {
            return Err(duplicate("hazard", hazard.hazard_id()));
        }
        self.hazards.push(hazard);
        Ok(())
    }

    /// Add an interactive object.
    pub fn add_object(&mut self, object: InteractiveObject) -> SimResult<()> {
        if self.objects.iter().any(|o| o.object_id() == object.object_id()) {
            return Err(duplicate("object", object.object_id()));
        }
        self.objects.push(object);
        Ok(())
    }

    /// Add a puzzle.
    pub fn add_puzzle(&mut self, puzzle: Puzzle) -> SimResult<()> {
        if self.puzzles.iter().any(|p| p.puzzle_id() == puzzle.puzzle_id()) {
            return Err(duplicate("puzzle", puzzle.puzzle_id()));
        }
        self.puzzles.push(puzzle);
        Ok(())
    }

    /// Add a light source standing on the grid.
    pub fn add_light(&mut self, light: LightSource) -> SimResult<()> {
        if !self.grid.in_bounds(light.position()) {
            return Err(SimError::InvalidArgument(format!(
                "light '{}' stands outside the grid at {}",
                light.light_id(),
                light.position()
            )));
        }
        if self.lights.iter().any(|l| l.light_id() == light.light_id()) {
            return Err(duplicate("light", light.light_id()));
        }
        self.lights.push(light);
        Ok(())
    }

    /// Apply a status effect to a combatant.
    pub fn apply_status(
        &mut self,
        target: EntityId,
        definition: StatusEffectDefinition,
    ) -> SimResult<ApplyOutcome> {
        definition.validate()?;
        if self.turns.find(target).is_none() {
            return Err(SimError::EntityNotFound(target));
        }
        Ok(self.statuses.entry(target).or_default().apply(definition))
    }

    // --- turn loop ---

    /// Roll initiative for everyone, fix the order, and begin round 1.
    pub fn start(&mut self) -> SimResult<()> {
        if !self.turns.is_not_started() {
            return Err(SimError::InvalidOperation(
                "encounter already started".to_string(),
            ));
        }
        self.turns
            .roll_initiative(self.config.initiative_die, &mut self.rng)?;
        self.turns.start()?;
        let rolled: Vec<(EntityId, String, i32)> = self
            .turns
            .in_order()
            .map(|c| (c.id(), c.display_name().to_string(), c.initiative()))
            .collect();
        for (entity, name, initiative) in rolled {
            self.log(
                EventKind::InitiativeRolled { entity, initiative },
                format!("{name} rolls {initiative} for initiative"),
            );
        }
        self.log_round_start();
        Ok(())
    }

    /// The combatant due to act, or `None` once the round is exhausted.
    pub fn next_actor(&mut self) -> Option<EntityId> {
        let index = self.turns.next_actor()?;
        self.turns.get(index).map(Actor::id)
    }

    /// Perform the due combatant's action and end its turn.
    pub fn perform(&mut self, actor: EntityId, action: CombatAction) -> SimResult<ActionOutcome> {
        if self.turns.is_not_started() {
            return Err(SimError::InvalidOperation(
                "encounter has not started".to_string(),
            ));
        }
        let index = self
            .turns
            .find(actor)
            .ok_or(SimError::EntityNotFound(actor))?;
        let due = self.turns.next_actor().ok_or(SimError::NoActiveCombatant)?;
        if due != index {
            return Err(SimError::InvalidOperation(format!(
                "it is not {}'s turn",
                self.name_of(actor)
            )));
        }
        let outcome = match action {
            CombatAction::Move { to } => self.move_actor(index, to),
            CombatAction::Attack { target, skill } => self.attack(index, target, skill)?,
            CombatAction::StrikeCover { position } => self.strike_cover(index, position)?,
            CombatAction::UseObject { object } => self.use_object(index, &object)?,
            CombatAction::Wait => ActionOutcome::Waited,
        };
        self.turns.mark_acted(index)?;
        Ok(outcome)
    }

    fn move_actor(&mut self, index: usize, to: GridPosition) -> ActionOutcome {
        let Some(mover) = self.turns.get(index) else {
            return ActionOutcome::Moved {
                movement: MoveOutcome::NotOnGrid,
            };
        };
        let id = mover.id();
        let base = i32::try_from(mover.speed()).unwrap_or(i32::MAX);
        let speed = base.saturating_add(self.status_modifier(id, &self.stats.speed)).max(0);
        let from = self.grid.entity_position(id);
        let movement = self.grid.move_entity(id, to, speed.unsigned_abs());
        if let (MoveOutcome::Moved { cost }, Some(from)) = (movement, from) {
            self.log(
                EventKind::Moved {
                    entity: id,
                    from,
                    to,
                    cost,
                },
                format!("{} moves from {from} to {to}", self.name_of(id)),
            );
        }
        ActionOutcome::Moved { movement }
    }

    fn attack(
        &mut self,
        index: usize,
        target: EntityId,
        skill: CatalogId,
    ) -> SimResult<ActionOutcome> {
        let attacker = self
            .turns
            .get(index)
            .ok_or(SimError::NoActiveCombatant)?;
        let attacker_id = attacker.id();
        let attack_dice = attacker.attack_dice();
        let base_damage = attacker.base_damage();
        let skill_bonus = attacker.check_bonus(&skill);

        let target_index = self
            .turns
            .find(target)
            .ok_or(SimError::EntityNotFound(target))?;
        if target_index == index {
            return Err(SimError::InvalidOperation(
                "a combatant cannot attack itself".to_string(),
            ));
        }
        let defender = self
            .turns
            .get(target_index)
            .ok_or(SimError::EntityNotFound(target))?;
        if !defender.is_active() {
            return Ok(ActionOutcome::TargetDown);
        }
        let defense = defender.defense();

        let from = self
            .grid
            .entity_position(attacker_id)
            .ok_or(SimError::EntityNotFound(attacker_id))?;
        let to = self
            .grid
            .entity_position(target)
            .ok_or(SimError::EntityNotFound(target))?;
        let cover = self.grid.cover_bonus_between(from, to);
        let dc = defense
            .saturating_add(cover)
            .saturating_add(self.status_modifier(target, &self.stats.defense));
        let difficulty = Difficulty::named("attack", DifficultyClass::new(dc.max(1))?);
        let request = CheckRequest::new(SkillRef::new(skill.as_str(), skill.as_str())?, difficulty)
            .with_attribute_bonus(skill_bonus)
            .with_other_bonus(self.status_modifier(attacker_id, &self.stats.attack));
        // No dice is a plain miss, not a broken encounter.
        let pool = match attack_dice {
            0 => None,
            count => Some(DicePool::new(count, Die::D10)?),
        };

        self.grid.face_toward(attacker_id, to);
        if !self.grid.line_of_sight(from, to) {
            return Ok(ActionOutcome::NoLineOfSight);
        }
        let now = self.clock.now();
        if self.fumbles.blocks_check(attacker_id, &skill, Some(target), now) {
            debug!(attacker = %attacker_id, %skill, "attack hindered by fumble");
            return Ok(ActionOutcome::Hindered);
        }

        let result = match pool {
            Some(pool) => self.resolver.roll_and_resolve(&request, pool, &mut self.rng)?,
            None => self
                .resolver
                .resolve(&request, DiceRollResult::from_faces(Die::D10, Vec::new())?),
        };

        let mut damage = 0;
        let mut target_defeated = false;
        if result.is_success()
            && let Some(defender) = self.turns.get_mut(target_index)
        {
            damage = defender.take_damage(base_damage.saturating_add(result.margin()));
            target_defeated = !defender.is_active();
        }
        let outcome = result.outcome();
        self.log(
            EventKind::Attacked {
                attacker: attacker_id,
                target,
                outcome,
                damage,
            },
            format!(
                "{} attacks {}: {outcome}, {damage} damage",
                self.name_of(attacker_id),
                self.name_of(target)
            ),
        );
        if self
            .fumbles
            .record(&self.attack_fumble, attacker_id, &result, Some(target), now)
            .is_some()
        {
            self.log(
                EventKind::Fumbled {
                    entity: attacker_id,
                    skill: skill.clone(),
                },
                format!("{} fumbles {skill}", self.name_of(attacker_id)),
            );
        }
        Ok(ActionOutcome::Attacked {
            outcome,
            damage,
            target_defeated,
        })
    }

    fn strike_cover(&mut self, index: usize, position: GridPosition) -> SimResult<ActionOutcome> {
        let striker = self
            .turns
            .get(index)
            .ok_or(SimError::NoActiveCombatant)?;
        let id = striker.id();
        let damage = striker.base_damage();
        let from = self
            .grid
            .entity_position(id)
            .ok_or(SimError::EntityNotFound(id))?;
        if !self.grid.has_cover(position) {
            return Ok(ActionOutcome::NoCover);
        }
        if from.chebyshev_distance(position) > 1 {
            return Ok(ActionOutcome::OutOfReach);
        }
        self.grid.face_toward(id, position);
        let destroyed = self.grid.damage_cover(position, damage);
        self.log(
            EventKind::CoverStruck {
                entity: id,
                position,
                destroyed,
            },
            format!("{} strikes the cover at {position}", self.name_of(id)),
        );
        Ok(ActionOutcome::CoverStruck { destroyed })
    }

    fn use_object(&mut self, index: usize, object: &CatalogId) -> SimResult<ActionOutcome> {
        let id = self
            .turns
            .get(index)
            .map(Actor::id)
            .ok_or(SimError::NoActiveCombatant)?;
        let target = self
            .objects
            .iter_mut()
            .find(|o| o.object_id() == object)
            .ok_or_else(|| SimError::InvalidArgument(format!("unknown object '{object}'")))?;
        let result = target.activate();
        if result == ActivationOutcome::Activated {
            self.log(
                EventKind::ObjectUsed {
                    entity: id,
                    object: object.clone(),
                },
                format!("{} uses {object}", self.name_of(id)),
            );
        }
        Ok(ActionOutcome::ObjectUsed { result })
    }

    /// Close the round: hazard and status damage, then every tick-driven
    /// entity ages once, lapsed fumbles expire, the fallen leave the grid,
    /// and the next round begins. Fails while anyone still has to act.
    pub fn end_round(&mut self) -> SimResult<RoundSummary> {
        if self.turns.is_not_started() {
            return Err(SimError::InvalidOperation(
                "encounter has not started".to_string(),
            ));
        }
        if let Some(pending) = self.next_actor() {
            return Err(SimError::InvalidOperation(format!(
                "{} has not acted this round",
                self.name_of(pending)
            )));
        }
        let mut summary = RoundSummary {
            round: self.turns.round(),
            ..RoundSummary::default()
        };
        self.clock.advance();
        let now = self.clock.now();

        self.apply_hazard_damage(&mut summary);
        self.apply_status_effects(&mut summary);

        for hazard in &mut self.hazards {
            if hazard.process_turn_tick() {
                summary.expired_hazards.push(hazard.hazard_id().clone());
            }
        }
        for object in &mut self.objects {
            if object.process_turn_tick() {
                summary.reset_objects.push(object.object_id().clone());
            }
        }
        for puzzle in &mut self.puzzles {
            if puzzle.process_turn_tick() {
                summary.reset_puzzles.push(puzzle.puzzle_id().clone());
            }
        }
        for light in &mut self.lights {
            if light.process_turn_tick() {
                summary.darkened_lights.push(light.light_id().clone());
            }
        }
        summary.expired_consequences = self.fumbles.expire(now);
        self.log_entity_ticks(&summary);

        for index in 0..self.turns.len() {
            let Some(combatant) = self.turns.get(index) else {
                continue;
            };
            let id = combatant.id();
            if combatant.is_active() || self.grid.entity_position(id).is_none() {
                continue;
            }
            self.grid.remove_entity(id);
            summary.defeated.push(id);
            self.log(
                EventKind::Defeated { entity: id },
                format!("{} falls", self.name_of(id)),
            );
        }

        debug!(
            round = summary.round,
            hazard_damage = summary.hazard_damage,
            status_damage = summary.status_damage,
            defeated = summary.defeated.len(),
            "round ended"
        );
        self.turns.begin_round();
        self.log_round_start();
        Ok(summary)
    }

    fn apply_hazard_damage(&mut self, summary: &mut RoundSummary) {
        for index in 0..self.turns.len() {
            let Some(combatant) = self.turns.get(index) else {
                continue;
            };
            if !combatant.is_active() {
                continue;
            }
            let id = combatant.id();
            let Some(position) = self.grid.entity_position(id) else {
                continue;
            };
            let hits: Vec<(CatalogId, i32)> = self
                .hazards
                .iter()
                .filter(|h| h.affects(position))
                .map(|h| (h.hazard_id().clone(), h.damage_per_turn()))
                .collect();
            for (hazard, damage) in hits {
                let Some(combatant) = self.turns.get_mut(index) else {
                    break;
                };
                let dealt = combatant.take_damage(damage);
                summary.hazard_damage += dealt;
                self.log(
                    EventKind::HazardDamage {
                        entity: id,
                        hazard: hazard.clone(),
                        damage: dealt,
                    },
                    format!("{} takes {dealt} damage from {hazard}", self.name_of(id)),
                );
            }
        }
    }

    // Durations run down on the fallen too; only the standing take damage.
    fn apply_status_effects(&mut self, summary: &mut RoundSummary) {
        for index in 0..self.turns.len() {
            let Some(combatant) = self.turns.get(index) else {
                continue;
            };
            let id = combatant.id();
            let standing = combatant.is_active();
            let Some(effects) = self.statuses.get_mut(&id) else {
                continue;
            };
            let tick = effects.tick_all();
            if standing && tick.damage > 0 {
                let dealt = self
                    .turns
                    .get_mut(index)
                    .map_or(0, |c| c.take_damage(tick.damage));
                summary.status_damage += dealt;
                self.log(
                    EventKind::StatusDamage {
                        entity: id,
                        damage: dealt,
                    },
                    format!("{} takes {dealt} damage from status effects", self.name_of(id)),
                );
            }
            for effect in tick.expired {
                self.log(
                    EventKind::StatusExpired {
                        entity: id,
                        effect: effect.clone(),
                    },
                    format!("{effect} wears off {}", self.name_of(id)),
                );
                summary.expired_effects.push((id, effect));
            }
        }
    }

    fn log_entity_ticks(&mut self, summary: &RoundSummary) {
        for hazard in &summary.expired_hazards {
            self.log(
                EventKind::HazardExpired {
                    hazard: hazard.clone(),
                },
                format!("{hazard} dies down"),
            );
        }
        for object in &summary.reset_objects {
            self.log(
                EventKind::ObjectReset {
                    object: object.clone(),
                },
                format!("{object} resets"),
            );
        }
        for puzzle in &summary.reset_puzzles {
            self.log(
                EventKind::PuzzleReset {
                    puzzle: puzzle.clone(),
                },
                format!("{puzzle} can be attempted again"),
            );
        }
        for light in &summary.darkened_lights {
            self.log(
                EventKind::LightDarkened {
                    light: light.clone(),
                },
                format!("{light} goes dark"),
            );
        }
        for consequence in &summary.expired_consequences {
            if let Some(entity) = self.fumbles.get(*consequence).map(|c| c.character_id()) {
                self.log(
                    EventKind::ConsequenceExpired { entity },
                    format!("{} recovers from a fumble", self.name_of(entity)),
                );
            }
        }
    }

    /// Whether at most one side still has combatants standing.
    pub fn is_over(&self) -> bool {
        self.turns.active_sides().len() <= 1
    }

    /// The only side still standing, if the encounter is over and anyone is left.
    pub fn winner(&self) -> Option<Side> {
        let sides = self.turns.active_sides();
        if sides.len() == 1 {
            sides.into_iter().next()
        } else {
            None
        }
    }

    /// Choose an action for a combatant: attack an adjacent enemy, else
    /// close in on the nearest one, else break cover in the way, else wait.
    pub fn plan_action(&self, actor: EntityId) -> SimResult<CombatAction> {
        let index = self
            .turns
            .find(actor)
            .ok_or(SimError::EntityNotFound(actor))?;
        let me = self
            .turns
            .get(index)
            .ok_or(SimError::EntityNotFound(actor))?;
        let Some(here) = self.grid.entity_position(actor) else {
            return Ok(CombatAction::Wait);
        };
        let side = me.side();
        let nearest = self
            .turns
            .combatants()
            .iter()
            .filter(|c| c.is_active() && c.side() != side)
            .filter_map(|c| Some((c.id(), self.grid.entity_position(c.id())?)))
            .min_by_key(|(_, there)| here.chebyshev_distance(*there));
        let Some((target, there)) = nearest else {
            return Ok(CombatAction::Wait);
        };
        if here.chebyshev_distance(there) <= 1 {
            return Ok(CombatAction::Attack {
                target,
                skill: self.attack_skill.clone(),
            });
        }

        let path = line_between(here, there);
        let reach = usize::try_from(me.speed())
            .unwrap_or(usize::MAX)
            .min(path.len().saturating_sub(2));
        if let Some(step) = (1..=reach).rev().map(|k| path[k]).find(|p| self.grid.is_passable(*p)) {
            return Ok(CombatAction::Move { to: step });
        }
        if let Some(next) = path.get(1).copied()
            && self
                .grid
                .cover_at(next)
                .is_some_and(|c| c.definition().destructible && !c.is_destroyed())
        {
            return Ok(CombatAction::StrikeCover { position: next });
        }
        Ok(CombatAction::Wait)
    }

    /// Run planned turns until one side is left or `max_rounds` rounds
    /// have ended. Starts the encounter if needed. Returns rounds played.
    pub fn run(&mut self, max_rounds: u32) -> SimResult<u32> {
        if self.turns.is_not_started() {
            self.start()?;
        }
        let mut rounds = 0;
        while rounds < max_rounds && !self.is_over() {
            // Once one side is down the rest plan to wait out the round.
            while let Some(actor) = self.next_actor() {
                let action = self.plan_action(actor)?;
                self.perform(actor, action)?;
            }
            self.end_round()?;
            rounds += 1;
        }
        Ok(rounds)
    }

    // --- queries ---

    /// The configuration.
    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    /// Current round (0 before start).
    pub fn round(&self) -> u32 {
        self.turns.round()
    }

    /// Current in-world time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The grid.
    pub fn grid(&self) -> &CombatGrid {
        &self.grid
    }

    /// The grid, for placing cover.
    pub fn grid_mut(&mut self) -> &mut CombatGrid {
        &mut self.grid
    }

    /// Combatants and their order.
    pub fn turns(&self) -> &TurnOrder {
        &self.turns
    }

    /// Look up a combatant.
    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.turns.find(id).and_then(|i| self.turns.get(i))
    }

    /// Status effects on a combatant.
    pub fn statuses(&self, id: EntityId) -> Option<&StatusEffects> {
        self.statuses.get(&id)
    }

    /// Fumble consequences recorded so far.
    pub fn fumbles(&self) -> &FumbleLedger {
        &self.fumbles
    }

    /// Fumble consequences, for recording recoveries.
    pub fn fumbles_mut(&mut self) -> &mut FumbleLedger {
        &mut self.fumbles
    }

    /// Hazard zones.
    pub fn hazards(&self) -> &[HazardZone] {
        &self.hazards
    }

    /// Interactive objects.
    pub fn objects(&self) -> &[InteractiveObject] {
        &self.objects
    }

    /// Puzzles.
    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    /// A puzzle, for attempts.
    pub fn puzzle_mut(&mut self, id: &CatalogId) -> Option<&mut Puzzle> {
        self.puzzles.iter_mut().find(|p| p.puzzle_id() == id)
    }

    /// Light sources.
    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    /// A light source, for lighting or refuelling.
    pub fn light_mut(&mut self, id: &CatalogId) -> Option<&mut LightSource> {
        self.lights.iter_mut().find(|l| l.light_id() == id)
    }

    /// Events recorded so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    // --- helpers ---

    fn status_modifier(&self, id: EntityId, stat: &CatalogId) -> i32 {
        self.statuses.get(&id).map_or(0, |s| s.modifier(stat))
    }

    fn name_of(&self, id: EntityId) -> String {
        self.combatant(id)
            .map_or_else(|| id.to_string(), |c| c.display_name().to_string())
    }

    fn log(&mut self, kind: EventKind, description: String) {
        let round = self.turns.round();
        self.events.push(EncounterEvent::new(round, kind, description));
    }

    fn log_round_start(&mut self) {
        let round = self.turns.round();
        self.log(EventKind::RoundStarted { round }, format!("Round {round} begins"));
    }
}

fn duplicate(what: &str, id: &CatalogId) -> SimError {
    SimError::InvalidArgument(format!("{what} '{id}' already exists"))
}
