//! Print the win-probability heatmap, or the full breakdown of one battle.
//!
//! ```text
//! risk-chart --faces 6 --size 10
//! risk-chart --faces 8 --attackers 12 --defenders 9 --simulate 200000
//! ```

use clap::Parser;

use risk_odds::constants::DEFAULT_FACE_COUNT;
use risk_odds::distribution::compute_battle_outcome_distribution;
use risk_odds::env_config;
use risk_odds::report::{describe_win_probability, format_percentage, render_heatmap, summarize_distribution};
use risk_odds::round_table::build_round_probability_table;
use risk_odds::simulation::estimate_outcomes;
use risk_odds::win_grid::build_battle_win_grid;

#[derive(Parser, Debug)]
#[command(name = "risk-chart", about = "Risk battle odds in the terminal")]
struct Args {
    /// Faces on each die
    #[arg(long, default_value_t = DEFAULT_FACE_COUNT)]
    faces: u32,

    /// Heatmap size (attackers and defenders 1..=size)
    #[arg(long, default_value_t = 10)]
    size: u32,

    /// Attacking armies for a single-battle breakdown
    #[arg(long, requires = "defenders")]
    attackers: Option<u32>,

    /// Defending armies for a single-battle breakdown
    #[arg(long, requires = "attackers")]
    defenders: Option<u32>,

    /// Also run this many Monte Carlo battles for comparison
    #[arg(long)]
    simulate: Option<usize>,

    /// Seed for --simulate
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_config::init_tracing();
    let args = Args::parse();
    let table = build_round_probability_table(args.faces)?;

    let (Some(attackers), Some(defenders)) = (args.attackers, args.defenders) else {
        let grid = build_battle_win_grid(&table, args.size)?;
        print!("{}", render_heatmap(&grid, args.size)?);
        return Ok(());
    };

    let dist = compute_battle_outcome_distribution(&table, attackers, defenders)?;
    println!(
        "{}",
        describe_win_probability(attackers, defenders, dist.attacker_win_probability())
    );
    println!("{}", summarize_distribution(&dist));

    println!("\nAttackers remaining:");
    for (k, p) in dist.attacker_outcomes() {
        println!("  {k:>4}  {:>8}", format_percentage(p));
    }
    println!("Defenders remaining:");
    for (k, p) in dist.defender_outcomes() {
        println!("  {k:>4}  {:>8}", format_percentage(p));
    }

    if let Some(trials) = args.simulate {
        env_config::init_rayon_threads();
        let sim = estimate_outcomes(args.faces, attackers, defenders, trials, args.seed)?;
        println!(
            "\nMonte Carlo ({} battles): attacker won {} (exact {})",
            sim.trials,
            format_percentage(sim.attacker_win_rate()),
            format_percentage(dist.attacker_win_probability())
        );
    }
    Ok(())
}
