use delve_core::{CatalogId, EntityId};
use delve_mechanics::CheckOutcome;
use serde::Serialize;

use crate::grid::GridPosition;

/// What kind of encounter event occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    // Turn order
    /// A combatant rolled initiative.
    InitiativeRolled {
        /// The combatant.
        entity: EntityId,
        /// Roll plus modifier.
        initiative: i32,
    },
    /// A new round began.
    RoundStarted {
        /// The round number.
        round: u32,
    },

    // Actions
    /// A combatant changed cells.
    Moved {
        /// The combatant that moved.
        entity: EntityId,
        /// Starting cell.
        from: GridPosition,
        /// Destination cell.
        to: GridPosition,
        /// Movement points spent.
        cost: u32,
    },
    /// A combatant attacked another.
    Attacked {
        /// The attacker.
        attacker: EntityId,
        /// The defender.
        target: EntityId,
        /// How the attack check landed.
        outcome: CheckOutcome,
        /// Hit points the defender lost.
        damage: i32,
    },
    /// A fumble left a lingering consequence.
    Fumbled {
        /// The combatant who fumbled.
        entity: EntityId,
        /// The skill that was fumbled.
        skill: CatalogId,
    },
    /// A combatant struck cover.
    CoverStruck {
        /// The striker.
        entity: EntityId,
        /// The cover cell.
        position: GridPosition,
        /// Whether this blow destroyed the cover.
        destroyed: bool,
    },
    /// A combatant used an interactive object.
    ObjectUsed {
        /// The user.
        entity: EntityId,
        /// The object.
        object: CatalogId,
    },

    // Round boundary
    /// A hazard hurt a combatant standing in it.
    HazardDamage {
        /// The combatant hurt.
        entity: EntityId,
        /// The hazard responsible.
        hazard: CatalogId,
        /// Hit points lost.
        damage: i32,
    },
    /// Status effects hurt a combatant.
    StatusDamage {
        /// The combatant hurt.
        entity: EntityId,
        /// Hit points lost.
        damage: i32,
    },
    /// A status effect ran out.
    StatusExpired {
        /// The affected combatant.
        entity: EntityId,
        /// The effect that expired.
        effect: CatalogId,
    },
    /// A hazard burned out.
    HazardExpired {
        /// The hazard.
        hazard: CatalogId,
    },
    /// An interactive object returned to inactive.
    ObjectReset {
        /// The object.
        object: CatalogId,
    },
    /// A failed puzzle became attemptable again.
    PuzzleReset {
        /// The puzzle.
        puzzle: CatalogId,
    },
    /// A light source ran out of fuel.
    LightDarkened {
        /// The light.
        light: CatalogId,
    },
    /// A fumble consequence lapsed.
    ConsequenceExpired {
        /// The combatant it applied to.
        entity: EntityId,
    },
    /// A combatant dropped and left the grid.
    Defeated {
        /// The defeated combatant.
        entity: EntityId,
    },
}

impl EventKind {
    /// Check whether a given combatant is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::InitiativeRolled { entity, .. }
            | Self::Moved { entity, .. }
            | Self::Fumbled { entity, .. }
            | Self::CoverStruck { entity, .. }
            | Self::ObjectUsed { entity, .. }
            | Self::HazardDamage { entity, .. }
            | Self::StatusDamage { entity, .. }
            | Self::StatusExpired { entity, .. }
            | Self::ConsequenceExpired { entity }
            | Self::Defeated { entity } => *entity == id,
            Self::Attacked {
                attacker, target, ..
            } => *attacker == id || *target == id,
            Self::RoundStarted { .. }
            | Self::HazardExpired { .. }
            | Self::ObjectReset { .. }
            | Self::PuzzleReset { .. }
            | Self::LightDarkened { .. } => false,
        }
    }
}

/// A record of something that happened during an encounter.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterEvent {
    /// The round in which this event occurred.
    pub round: u32,
    /// The specific kind of event that occurred.
    pub kind: EventKind,
    /// A short human-readable description of the event.
    pub description: String,
}

impl EncounterEvent {
    /// Create a new event with the given round, kind, and description.
    pub fn new(round: u32, kind: EventKind, description: impl Into<String>) -> Self {
        Self {
            round,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during an encounter.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<EncounterEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: EncounterEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[EncounterEvent] {
        &self.events
    }

    /// Return all events that occurred in the given round.
    pub fn events_in_round(&self, round: u32) -> Vec<&EncounterEvent> {
        self.events.iter().filter(|e| e.round == round).collect()
    }

    /// Return all events involving the given combatant.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&EncounterEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Events whose kind satisfies `predicate`, oldest first.
    pub fn matching(&self, predicate: impl Fn(&EventKind) -> bool) -> Vec<&EncounterEvent> {
        self.events.iter().filter(|e| predicate(&e.kind)).collect()
    }

    /// Combatants that fell, in the order they left the grid.
    pub fn defeated(&self) -> Vec<EntityId> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Defeated { entity } => Some(entity),
                _ => None,
            })
            .collect()
    }

    /// Attack damage a combatant landed on others.
    pub fn damage_dealt_by(&self, id: EntityId) -> i32 {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Attacked {
                    attacker, damage, ..
                } if attacker == id => Some(damage),
                _ => None,
            })
            .fold(0, i32::saturating_add)
    }

    /// Damage a combatant suffered from attacks, hazards, and status effects.
    pub fn damage_taken_by(&self, id: EntityId) -> i32 {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Attacked { target, damage, .. } if target == id => Some(damage),
                EventKind::HazardDamage { entity, damage, .. }
                | EventKind::StatusDamage { entity, damage }
                    if entity == id =>
                {
                    Some(damage)
                }
                _ => None,
            })
            .fold(0, i32::saturating_add)
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defeated(round: u32, entity: EntityId) -> EncounterEvent {
        EncounterEvent::new(round, EventKind::Defeated { entity }, "down")
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        let id = EntityId::new();
        log.push(defeated(1, id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_in_round(1).len(), 1);
        assert_eq!(log.events_for_entity(id).len(), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        let id = EntityId::new();
        for round in 0..5 {
            log.push(defeated(round, id));
        }
        assert_eq!(log.len(), 2);
        // Oldest dropped
        assert_eq!(log.events()[0].round, 3);
        assert_eq!(log.events()[1].round, 4);
    }

    #[test]
    fn attack_involves_both_sides() {
        let a = EntityId::new();
        let b = EntityId::new();
        let kind = EventKind::Attacked {
            attacker: a,
            target: b,
            outcome: CheckOutcome::Failure,
            damage: 0,
        };
        assert!(kind.involves(a));
        assert!(kind.involves(b));
        assert!(!kind.involves(EntityId::new()));

        let kind = EventKind::HazardExpired {
            hazard: CatalogId::new("fire").unwrap(),
        };
        assert!(!kind.involves(a));
    }

    #[test]
    fn damage_totals_split_by_role() {
        let mut log = EventLog::new(0);
        let (a, b) = (EntityId::new(), EntityId::new());
        let hit = |attacker, target, damage| EventKind::Attacked {
            attacker,
            target,
            outcome: CheckOutcome::Success { margin: 1 },
            damage,
        };
        log.push(EncounterEvent::new(1, hit(a, b, 4), "a hits b"));
        log.push(EncounterEvent::new(1, hit(b, a, 2), "b hits a"));
        log.push(EncounterEvent::new(
            1,
            EventKind::HazardDamage {
                entity: b,
                hazard: CatalogId::new("fire").unwrap(),
                damage: 3,
            },
            "b burns",
        ));
        log.push(EncounterEvent::new(1, EventKind::StatusDamage { entity: b, damage: 1 }, "b bleeds"));
        log.push(defeated(1, b));

        assert_eq!(log.damage_dealt_by(a), 4);
        assert_eq!(log.damage_dealt_by(b), 2);
        assert_eq!(log.damage_taken_by(a), 2);
        assert_eq!(log.damage_taken_by(b), 8);
        assert_eq!(log.defeated(), vec![b]);
        assert_eq!(
            log.matching(|k| matches!(k, EventKind::Attacked { .. })).len(),
            2
        );
        assert!(log.matching(|k| matches!(k, EventKind::Fumbled { .. })).is_empty());
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(defeated(1, EntityId::new()));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn events_serialize_with_a_kind_tag() {
        let event = EncounterEvent::new(2, EventKind::RoundStarted { round: 2 }, "round 2");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["kind"], "round_started");
        assert_eq!(json["round"], 2);
    }
}
