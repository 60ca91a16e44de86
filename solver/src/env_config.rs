//! Shared environment configuration for all risk-odds binaries.
//!
//! | Variable | Default | Used by |
//! |----------|---------|---------|
//! | `RISK_BASE_PATH` | `.` | all binaries (working directory) |
//! | `RISK_DATA_DIR` | `data/round_tables` | precompute, server |
//! | `RISK_PORT` | 9000 | server |
//! | `RISK_GRID_SIZE` | 30 (max 4096) | server |
//! | `RAYON_NUM_THREADS` / `OMP_NUM_THREADS` | 8 | precompute, chart |
//! | `RUST_LOG` | `info` | all binaries |

use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE};

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Read `RISK_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> std::io::Result<PathBuf> {
    let base_path = std::env::var("RISK_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    std::env::set_current_dir(&base_path)?;
    let cwd = std::env::current_dir()?;
    info!(base_path = %base_path, cwd = %cwd.display(), "working directory set");
    Ok(PathBuf::from(base_path))
}

/// Read `RISK_DATA_DIR` (default `data/round_tables`).
pub fn data_dir() -> PathBuf {
    std::env::var("RISK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/round_tables"))
}

/// Read `RISK_PORT` (default 9000).
pub fn server_port() -> u16 {
    parsed_var("RISK_PORT").unwrap_or(9000)
}

/// Read `RISK_GRID_SIZE` (default [`DEFAULT_GRID_SIZE`], at most [`MAX_GRID_SIZE`]).
pub fn grid_size() -> u32 {
    clamp_grid_size(parsed_var("RISK_GRID_SIZE").unwrap_or(DEFAULT_GRID_SIZE))
}

fn clamp_grid_size(size: u32) -> u32 {
    if size > MAX_GRID_SIZE {
        warn!(size, limit = MAX_GRID_SIZE, "RISK_GRID_SIZE too large, clamping");
        return MAX_GRID_SIZE;
    }
    size
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8) and build
/// the rayon global pool. Tolerates an already-initialized pool.
pub fn init_rayon_threads() -> usize {
    let num_threads = parsed_var("RAYON_NUM_THREADS")
        .or_else(|| parsed_var("OMP_NUM_THREADS"))
        .unwrap_or(8);
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        warn!(error = %e, "rayon pool already initialized");
    }
    info!(num_threads, "rayon threads");
    num_threads
}
