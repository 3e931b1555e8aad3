use colored::Colorize;

pub fn run(notation: &str, threshold: u32, botch: u32, seed: Option<u64>) -> Result<(), String> {
    let pool = super::parse_pool(notation)?;
    let (mut rng, seed) = super::seeded_rng(seed);
    let roll = pool
        .roll(&mut rng)
        .map_err(|e| format!("roll failed: {e}"))?;

    println!(
        "  {} {} {}",
        "Roll".bold(),
        pool,
        format!("(seed={seed})").dimmed()
    );
    println!(
        "  Faces:     {}",
        super::render_faces(roll.faces(), threshold, botch)
    );
    println!("  Successes: {}", roll.success_count(threshold));
    println!("  Botches:   {}", roll.botch_count(botch));
    println!("  Total:     {}", roll.total());
    println!("  Highest:   {}", roll.highest());

    Ok(())
}
