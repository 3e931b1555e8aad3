use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use delve_core::Actor;
use delve_mechanics::{Combatant, CombatantKind};
use delve_simulation::{Encounter, EventKind, Scenario};

pub fn run(
    path: &Path,
    rounds: Option<u32>,
    seed: Option<u64>,
    show_events: bool,
) -> Result<(), String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut scenario =
        Scenario::from_json(&source).map_err(|e| format!("invalid scenario: {e}"))?;
    if let Some(seed) = seed {
        scenario.config.seed = seed;
    }
    let max_rounds = rounds.unwrap_or(scenario.max_rounds);

    let mut encounter = scenario
        .build()
        .map_err(|e| format!("invalid scenario: {e}"))?;
    let played = encounter
        .run(max_rounds)
        .map_err(|e| format!("encounter error: {e}"))?;

    let title = if scenario.name.is_empty() {
        path.display().to_string()
    } else {
        scenario.name.clone()
    };
    println!(
        "  {} '{}' {}",
        "Encounter".bold(),
        title,
        format!(
            "({played} rounds, seed={}, {}x{} grid)",
            scenario.config.seed, scenario.config.width, scenario.config.height
        )
        .dimmed()
    );
    println!(
        "  {} combatants, {} events logged",
        encounter.turns().len(),
        encounter.events().len()
    );
    println!();

    if show_events {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in encounter.events().events() {
            let round_label = format!("[round {:>2}]", event.round).dimmed();
            println!(
                "  {round_label} {}",
                colorize_event(&event.kind, &event.description)
            );
        }
        println!();
    } else {
        let notable = encounter
            .events()
            .matching(|k| matches!(k, EventKind::Defeated { .. } | EventKind::Fumbled { .. }));
        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                let tag = match event.kind {
                    EventKind::Defeated { .. } => "DOWN".red().bold(),
                    _ => "FUMBLE".yellow().bold(),
                };
                println!("  {tag:<6} {}", event.description);
            }
            println!();
        }
    }

    println!("  {}", "Combatants".bold().underline());
    println!();
    println!("{}", combatant_table(&encounter));
    println!();

    match encounter.winner() {
        Some(side) if encounter.is_over() => {
            println!("  {} the {side} hold the field", "VICTORY".green().bold());
        }
        _ => println!(
            "  {} after {played} rounds",
            "UNDECIDED".yellow().bold()
        ),
    }

    Ok(())
}

fn combatant_table(encounter: &Encounter) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Name", "Side", "HP", "Dealt", "Taken", "Position", "Effects", "Status",
    ]);
    let log = encounter.events();

    for combatant in encounter.turns().in_order() {
        let id = combatant.id();
        let position = encounter
            .grid()
            .entity_position(id)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "--".to_string());
        let effects = encounter
            .statuses(id)
            .map(|s| {
                s.iter()
                    .map(|e| e.effect_id().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "--".to_string());
        let status = if combatant.is_active() {
            "active".green()
        } else {
            "down".red()
        };
        table.add_row(vec![
            combatant.display_name().to_string(),
            combatant.side().to_string(),
            health_label(combatant),
            log.damage_dealt_by(id).to_string(),
            log.damage_taken_by(id).to_string(),
            position,
            effects,
            status.to_string(),
        ]);
    }
    table
}

fn health_label(combatant: &Combatant) -> String {
    let track = match combatant.kind() {
        CombatantKind::Player(player) => &player.health,
        CombatantKind::Monster(monster) => &monster.health,
    };
    format!("{}/{}", track.current(), track.max())
}

fn colorize_event(kind: &EventKind, description: &str) -> colored::ColoredString {
    match kind {
        EventKind::Defeated { .. } => description.red().bold(),
        EventKind::Fumbled { .. } => description.yellow(),
        EventKind::Attacked { .. } => description.normal(),
        EventKind::HazardDamage { .. } | EventKind::StatusDamage { .. } => description.red(),
        EventKind::RoundStarted { .. } => description.bold(),
        EventKind::InitiativeRolled { .. } | EventKind::Moved { .. } => description.cyan(),
        _ => description.dimmed(),
    }
}
