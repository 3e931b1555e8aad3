//! Encounters built from scenario documents, played across round boundaries.

use delve_core::{Actor, CatalogId};
use delve_simulation::{
    ActionOutcome, CombatAction, CoverDefinition, CoverObject, CoverType, EventKind, GridPosition,
    HazardKind, HazardZone, Scenario, SimError, TurnDuration, TurnTick,
};

const CRYPT: &str = r#"{
    "name": "Crypt of the Hollow King",
    "config": { "seed": 1234, "width": 10, "height": 10 },
    "max_rounds": 15,
    "combatants": [
        { "name": "Aldric", "side": "players", "max_health": 16, "position": { "x": 1, "y": 1 },
          "defense": 2, "damage": 3 },
        { "name": "Sela", "side": "players", "max_health": 10, "position": { "x": 1, "y": 3 },
          "initiative_modifier": 2 },
        { "name": "Ghoul", "side": "monsters", "max_health": 8, "position": { "x": 7, "y": 2 } },
        { "name": "Skeleton", "side": "monsters", "monster_kind": "undead", "max_health": 6,
          "position": { "x": 8, "y": 6 }, "attack_bonus": 1 }
    ],
    "cover": [
        { "position": { "x": 4, "y": 2 }, "cover_type": "crate", "defense_bonus": 1,
          "destructible": true, "max_hit_points": 6 },
        { "position": { "x": 5, "y": 5 }, "cover_type": "pillar", "defense_bonus": 3,
          "blocks_line_of_sight": true }
    ],
    "hazards": [
        { "id": "grave-mist", "kind": "poison", "cells": [{ "x": 3, "y": 3 }, { "x": 3, "y": 4 }],
          "damage_per_turn": 1, "duration": 2 }
    ],
    "lights": [
        { "id": "candle", "kind": "candle", "position": { "x": 0, "y": 0 }, "radius": 2, "fuel": 1 }
    ]
}"#;

fn descriptions(scenario: &Scenario) -> Vec<String> {
    let mut encounter = scenario.build().unwrap();
    encounter.run(scenario.max_rounds).unwrap();
    encounter
        .events()
        .events()
        .iter()
        .map(|e| e.description.clone())
        .collect()
}

#[test]
fn cover_absorbs_damage_until_destroyed() {
    let definition = CoverDefinition::new(CoverType::Barricade, 2).destructible(10);
    let mut cover = CoverObject::new(definition, GridPosition::new(2, 2)).unwrap();

    assert!(!cover.take_damage(4));
    assert_eq!(cover.current_hit_points(), 6);

    assert!(cover.take_damage(15));
    assert_eq!(cover.current_hit_points(), 0);
    assert!(cover.is_destroyed());
    assert_eq!(cover.defense_bonus(), 0);

    assert!(!cover.take_damage(5));
    assert_eq!(cover.current_hit_points(), 0);
}

#[test]
fn hazard_burns_out_after_its_duration() {
    let mut hazard = HazardZone::new(
        CatalogId::new("fire-pit").unwrap(),
        HazardKind::Fire,
        vec![GridPosition::new(0, 0)],
        2,
        TurnDuration::Turns(2),
    )
    .unwrap();

    assert!(!hazard.process_turn_tick());
    assert_eq!(hazard.duration(), TurnDuration::Turns(1));
    assert!(hazard.is_active());

    assert!(hazard.process_turn_tick());
    assert!(!hazard.is_active());
    assert!(!hazard.process_turn_tick());
}

#[test]
fn scenario_round_boundaries_expire_entities() {
    let scenario = Scenario::from_json(CRYPT).unwrap();
    let mut encounter = scenario.build().unwrap();
    encounter.start().unwrap();

    while let Some(actor) = encounter.next_actor() {
        encounter.perform(actor, CombatAction::Wait).unwrap();
    }
    let first = encounter.end_round().unwrap();
    assert_eq!(first.round, 1);
    assert!(first.expired_hazards.is_empty());
    assert_eq!(first.darkened_lights, vec![CatalogId::new("candle").unwrap()]);

    while let Some(actor) = encounter.next_actor() {
        encounter.perform(actor, CombatAction::Wait).unwrap();
    }
    let second = encounter.end_round().unwrap();
    assert_eq!(second.expired_hazards, vec![CatalogId::new("grave-mist").unwrap()]);
    assert!(!encounter.hazards()[0].is_active());
    assert_eq!(encounter.round(), 3);
    assert_eq!(
        encounter.now() - encounter.config().start,
        chrono::TimeDelta::seconds(12)
    );
}

#[test]
fn pillar_hides_the_skeleton_from_sela() {
    let scenario = Scenario::from_json(
        &CRYPT
            .replace(r#""x": 1, "y": 3 },"#, r#""x": 2, "y": 2 },"#)
            .replace(r#""x": 8, "y": 6 }"#, r#""x": 8, "y": 8 }"#),
    )
    .unwrap();
    let mut encounter = scenario.build().unwrap();
    let sela = encounter.turns().combatants()[1].id();
    let skeleton = encounter.turns().combatants()[3].id();
    assert!(!encounter.grid().line_of_sight(
        encounter.grid().entity_position(sela).unwrap(),
        encounter.grid().entity_position(skeleton).unwrap(),
    ));

    encounter.start().unwrap();
    while let Some(actor) = encounter.next_actor() {
        let action = if actor == sela {
            CombatAction::Attack {
                target: skeleton,
                skill: CatalogId::new("melee").unwrap(),
            }
        } else {
            CombatAction::Wait
        };
        let outcome = encounter.perform(actor, action).unwrap();
        if actor == sela {
            assert_eq!(outcome, ActionOutcome::NoLineOfSight);
        }
    }
}

#[test]
fn scenario_plays_out_deterministically() {
    let scenario = Scenario::from_json(CRYPT).unwrap();
    let first = descriptions(&scenario);
    assert_eq!(first, descriptions(&scenario));
    assert!(first.iter().any(|d| d == "Round 1 begins"));

    let mut encounter = scenario.build().unwrap();
    let rounds = encounter.run(scenario.max_rounds).unwrap();
    assert!((1..=scenario.max_rounds).contains(&rounds));
    let initiative = encounter
        .events()
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EventKind::InitiativeRolled { .. }))
        .count();
    assert_eq!(initiative, 4);
    if encounter.is_over() {
        assert!(encounter.winner().is_some());
    }
}

#[test]
fn acting_before_start_is_rejected() {
    let scenario = Scenario::from_json(CRYPT).unwrap();
    let mut encounter = scenario.build().unwrap();
    let aldric = encounter.turns().combatants()[0].id();
    assert!(matches!(
        encounter.perform(aldric, CombatAction::Wait),
        Err(SimError::InvalidOperation(_))
    ));
}

#[test]
fn unarmed_scenario_combatant_does_not_stall_the_fight() {
    let scenario = Scenario::from_json(&CRYPT.replace(
        r#""initiative_modifier": 2 },"#,
        r#""initiative_modifier": 2, "attack_dice": 0 },"#,
    ))
    .unwrap();
    let mut encounter = scenario.build().unwrap();
    assert_eq!(encounter.turns().combatants()[1].attack_dice(), 0);
    let rounds = encounter.run(3).unwrap();
    assert!((1..=3).contains(&rounds));
}
