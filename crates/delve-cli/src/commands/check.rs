use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use delve_mechanics::{CheckConfig, CheckRequest, SkillCheckResolver, SkillRef};

pub fn run(
    notation: &str,
    difficulty: &str,
    skill: &str,
    attribute: i32,
    bonus: i32,
    threshold: u32,
    seed: Option<u64>,
) -> Result<(), String> {
    let pool = super::parse_pool(notation)?;
    let difficulty = super::parse_difficulty(difficulty)?;
    let skill = SkillRef::new(skill, skill).map_err(|e| e.to_string())?;
    let config = CheckConfig::default().with_success_threshold(threshold);
    let resolver = SkillCheckResolver::new(config);
    let request = CheckRequest::new(skill, difficulty)
        .with_attribute_bonus(attribute)
        .with_other_bonus(bonus);

    let (mut rng, seed) = super::seeded_rng(seed);
    let result = resolver
        .roll_and_resolve(&request, pool, &mut rng)
        .map_err(|e| format!("check failed: {e}"))?;

    println!(
        "  {} {} {}",
        "Check".bold(),
        result.skill_name(),
        format!("({pool}, seed={seed})").dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Value"]);
    table.add_row(vec![
        "Dice".to_string(),
        super::render_faces(result.dice().faces(), config.success_threshold, config.botch_face),
    ]);
    table.add_row(vec![
        "Successes".to_string(),
        result.success_count().to_string(),
    ]);
    table.add_row(vec!["Botches".to_string(), result.botch_count().to_string()]);
    table.add_row(vec![
        "Bonuses".to_string(),
        format!("{:+}", result.attribute_bonus() + result.other_bonus()),
    ]);
    table.add_row(vec![
        "Difficulty".to_string(),
        format!(
            "{} ({})",
            result.difficulty_name(),
            result.difficulty_class()
        ),
    ]);
    table.add_row(vec!["Net".to_string(), super::net_vs_dc(&result)]);
    table.add_row(vec!["Margin".to_string(), format!("{:+}", result.margin())]);
    println!("{table}");
    println!();
    println!(
        "  {}",
        super::colorize_outcome(result.outcome())
    );

    Ok(())
}
