//! CLI frontend for the Delve dungeon-crawler resolution core.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "delve",
    about = "Delve: dice pools, skill checks, and grid encounters for dungeon crawls",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log more detail to stderr (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice pool and count successes and botches
    Roll {
        /// Pool notation, e.g. 5d10
        pool: String,

        /// Lowest face that counts as a success
        #[arg(short, long, default_value = "8")]
        threshold: u32,

        /// Face that counts as a botch
        #[arg(short, long, default_value = "1")]
        botch: u32,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Resolve a single skill check
    Check {
        /// Pool notation, e.g. 5d10
        pool: String,

        /// Difficulty: a number or a tier (trivial, easy, moderate, hard, extreme, legendary)
        #[arg(short, long, default_value = "moderate")]
        difficulty: String,

        /// Skill being tested
        #[arg(long, default_value = "athletics")]
        skill: String,

        /// Attribute bonus added to net successes
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        attribute: i32,

        /// Any other bonus added to net successes
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        bonus: i32,

        /// Lowest face that counts as a success
        #[arg(short, long, default_value = "8")]
        threshold: u32,

        /// RNG seed for a reproducible roll
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Work through a chained check until it succeeds or fails
    Chain {
        /// Pool notation rolled for every attempt, e.g. 5d10
        pool: String,

        /// Number of steps in the chain
        #[arg(long, default_value = "3")]
        steps: usize,

        /// Difficulty class of every step
        #[arg(short, long, default_value = "2")]
        dc: i32,

        /// Retries allowed on each step
        #[arg(short, long, default_value = "1")]
        retries: u32,

        /// Skill tested by every step
        #[arg(long, default_value = "lockpicking")]
        skill: String,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Play out an encounter described by a scenario JSON file
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Round cap (default: the scenario's own)
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Override the scenario's RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the full event log
        #[arg(short, long)]
        events: bool,
    },
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Roll {
            pool,
            threshold,
            botch,
            seed,
        } => commands::roll::run(&pool, threshold, botch, seed),
        Commands::Check {
            pool,
            difficulty,
            skill,
            attribute,
            bonus,
            threshold,
            seed,
        } => commands::check::run(
            &pool,
            &difficulty,
            &skill,
            attribute,
            bonus,
            threshold,
            seed,
        ),
        Commands::Chain {
            pool,
            steps,
            dc,
            retries,
            skill,
            seed,
        } => commands::chain::run(&pool, steps, dc, retries, &skill, seed),
        Commands::Run {
            scenario,
            rounds,
            seed,
            events,
        } => commands::run::run(&scenario, rounds, seed, events),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
