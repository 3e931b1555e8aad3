pub mod chain;
pub mod check;
pub mod roll;
pub mod run;

use colored::Colorize;
use delve_mechanics::{
    CheckOutcome, DicePool, Difficulty, DifficultyClass, DifficultyTier, SkillCheckResult,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TIERS: [DifficultyTier; 6] = [
    DifficultyTier::Trivial,
    DifficultyTier::Easy,
    DifficultyTier::Moderate,
    DifficultyTier::Hard,
    DifficultyTier::Extreme,
    DifficultyTier::Legendary,
];

/// Parse pool notation such as `5d10`.
fn parse_pool(notation: &str) -> Result<DicePool, String> {
    notation.parse().map_err(|e| format!("{e}"))
}

/// Parse a numeric difficulty class or a tier name.
fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    if let Ok(value) = raw.trim().parse::<i32>() {
        let class = DifficultyClass::new(value).map_err(|e| e.to_string())?;
        return Ok(Difficulty::named("Custom", class));
    }
    TIERS
        .iter()
        .find(|tier| tier.name().eq_ignore_ascii_case(raw.trim()))
        .map(|&tier| Difficulty::from(tier))
        .ok_or_else(|| format!("unknown difficulty '{raw}'"))
}

/// A seeded RNG; draws a fresh seed when none was given so it can be printed.
fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

/// Faces rendered with successes green and botches red.
fn render_faces(faces: &[u32], threshold: u32, botch: u32) -> String {
    let rendered: Vec<String> = faces
        .iter()
        .map(|&face| {
            if face >= threshold {
                face.to_string().green().bold().to_string()
            } else if face == botch {
                face.to_string().red().to_string()
            } else {
                face.to_string()
            }
        })
        .collect();
    format!("[{}]", rendered.join(", "))
}

fn colorize_outcome(outcome: CheckOutcome) -> colored::ColoredString {
    let label = outcome.to_string();
    match outcome {
        CheckOutcome::CriticalSuccess { .. } => label.green().bold(),
        CheckOutcome::Success { .. } => label.green(),
        CheckOutcome::Failure => label.yellow(),
        CheckOutcome::Fumble => label.red().bold(),
    }
}

/// `net vs DC` summary used by both check and chain output.
fn net_vs_dc(result: &SkillCheckResult) -> String {
    format!(
        "{} vs {}",
        result.net_successes(),
        result.difficulty_class()
    )
}
