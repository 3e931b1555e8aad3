use chrono::Utc;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use delve_core::EntityId;
use delve_mechanics::{
    ChainStatus, ChainedCheckState, ChainedCheckStep, CheckConfig, DifficultyClass,
    SkillCheckResolver,
};

pub fn run(
    notation: &str,
    steps: usize,
    dc: i32,
    retries: u32,
    skill: &str,
    seed: Option<u64>,
) -> Result<(), String> {
    let pool = super::parse_pool(notation)?;
    let class = DifficultyClass::new(dc).map_err(|e| e.to_string())?;
    let steps = (1..=steps)
        .map(|n| {
            ChainedCheckStep::new(format!("step-{n}"), format!("Step {n}"), skill, class, retries)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    let mut chain = ChainedCheckState::new(EntityId::new(), skill, steps, None, Utc::now())
        .map_err(|e| e.to_string())?;
    let config = CheckConfig::default();
    let resolver = SkillCheckResolver::new(config);
    let (mut rng, seed) = super::seeded_rng(seed);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Step", "Retry", "Dice", "Net", "Outcome", "Chain"]);

    while !chain.is_complete() {
        let step_label = chain
            .current_step()
            .map(|s| s.label.clone())
            .unwrap_or_default();
        let request = chain
            .request_for_current_step(skill, 0, 0)
            .ok_or("chain has no current step")?;
        let result = resolver
            .roll_and_resolve(&request, pool, &mut rng)
            .map_err(|e| format!("check failed: {e}"))?;
        let was_retry = chain.status() == ChainStatus::AwaitingRetry;
        let status = chain
            .record_step_result(result.clone(), was_retry, Utc::now())
            .map_err(|e| e.to_string())?;

        table.add_row(vec![
            chain.attempts().len().to_string(),
            step_label,
            if was_retry { "yes" } else { "" }.to_string(),
            super::render_faces(result.dice().faces(), config.success_threshold, config.botch_face),
            super::net_vs_dc(&result),
            super::colorize_outcome(result.outcome()).to_string(),
            status.to_string(),
        ]);
    }

    println!(
        "  {} {} {}",
        "Chained check".bold(),
        chain.chain_name(),
        format!("({} steps, {pool}, seed={seed})", chain.steps().len()).dimmed()
    );
    println!();
    println!("{table}");
    println!();
    let cleared = chain.step_results().len();
    match chain.status() {
        ChainStatus::Succeeded => println!(
            "  {} after {} attempts",
            "SUCCEEDED".green().bold(),
            chain.attempts().len()
        ),
        _ => println!(
            "  {} with {cleared} of {} steps cleared",
            "FAILED".red().bold(),
            chain.steps().len()
        ),
    }

    Ok(())
}
