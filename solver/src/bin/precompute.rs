//! Build round probability tables and write one file per face count.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use risk_odds::constants::STANDARD_FACE_COUNTS;
use risk_odds::env_config;
use risk_odds::round_table::build_tables;
use risk_odds::storage::{save_round_table, table_file_path};

#[derive(Parser, Debug)]
#[command(name = "risk-precompute", about = "Precompute round probability tables")]
struct Args {
    /// Output directory (default: $RISK_DATA_DIR or data/round_tables)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Face counts to build (default: 4 6 8 12 20)
    #[arg(long, num_args = 1..)]
    faces: Vec<u32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_config::init_tracing();
    let args = Args::parse();
    env_config::init_base_path()?;
    env_config::init_rayon_threads();

    let out = args.out.unwrap_or_else(env_config::data_dir);
    let faces = if args.faces.is_empty() {
        STANDARD_FACE_COUNTS.to_vec()
    } else {
        args.faces
    };

    let start = Instant::now();
    let tables = build_tables(&faces)?;
    for table in &tables {
        save_round_table(table, &table_file_path(&out, table.face_count()))?;
        println!(
            "d{:<3} 1v1 {:.6}  2v1 {:.6}  3v2 (no loss) {:.6}",
            table.face_count(),
            table.attacker_round_win_probability(1, 1),
            table.attacker_round_win_probability(2, 1),
            table.attacker_round_win_probability(3, 2),
        );
    }
    info!(
        count = tables.len(),
        out = %out.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "precomputation complete"
    );
    Ok(())
}
